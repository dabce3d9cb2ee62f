use std::sync::Arc;

use pagequiz_logging::{quiz_debug, quiz_info, quiz_warn, redact_secret};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::generation::GenerationClient;
use crate::storage::{KeyValueStore, API_KEY_ENTRY};
use crate::{ContextId, GenerationError, MissingInput, Request, Response};

pub const PANEL_OPENED: &str = "Side panel opened";
pub const PAGE_TEXT_RECEIVED: &str = "Page text received";
pub const API_KEY_SAVED: &str = "API key saved";

/// Displays the quiz panel belonging to a context.
#[async_trait::async_trait]
pub trait PanelHost: Send + Sync {
    async fn open_panel(&self, context: ContextId);
}

#[derive(Debug, Default)]
struct RouterState {
    page_text: String,
    api_key: String,
}

/// Owns the current page text and the API key, and answers requests
/// from every context. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct MessageRouter {
    state: Arc<Mutex<RouterState>>,
    store: Arc<dyn KeyValueStore>,
    generator: Arc<dyn GenerationClient>,
    panels: Arc<dyn PanelHost>,
}

impl MessageRouter {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        generator: Arc<dyn GenerationClient>,
        panels: Arc<dyn PanelHost>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(RouterState::default())),
            store,
            generator,
            panels,
        }
    }

    /// Seeds the in-memory key from storage. A missing entry or a failed
    /// read leaves it empty.
    pub async fn load(&self) {
        let key = self.read_stored_key().await.unwrap_or_default();
        quiz_info!(
            "Loaded API key from storage: {}",
            if key.is_empty() { "no key found" } else { "key exists" }
        );
        self.state.lock().await.api_key = key;
    }

    pub async fn set_page_text(&self, text: String) -> Response {
        quiz_debug!("Page text set ({} chars)", text.chars().count());
        self.state.lock().await.page_text = text;
        Response::status(PAGE_TEXT_RECEIVED)
    }

    pub async fn get_page_text(&self) -> Response {
        Response::Text {
            text: self.state.lock().await.page_text.clone(),
        }
    }

    pub async fn save_api_key(&self, key: String) -> Response {
        self.state.lock().await.api_key = key.clone();
        match self.store.set(API_KEY_ENTRY, &key).await {
            Ok(()) => {
                quiz_info!("API key saved ({})", redact_secret(&key));
                Response::status(API_KEY_SAVED)
            }
            Err(err) => {
                quiz_warn!("Persisting API key failed: {}", err);
                Response::error(format!("Failed to save API key: {err}"))
            }
        }
    }

    pub async fn get_api_key(&self) -> Response {
        Response::Key {
            key: self.resolve_api_key().await,
        }
    }

    pub async fn generate_quiz(&self) -> Response {
        let api_key = self.resolve_api_key().await;
        let page_text = self.state.lock().await.page_text.clone();

        let missing = if api_key.is_empty() {
            Some(MissingInput::ApiKey)
        } else if page_text.is_empty() {
            Some(MissingInput::PageText)
        } else {
            None
        };
        if let Some(missing) = missing {
            quiz_warn!("Quiz generation refused: missing {}", missing);
            return Response::error(GenerationError::MissingInput(missing).user_message());
        }

        match self.generator.generate_quiz(&api_key, &page_text).await {
            Ok(quiz) => {
                quiz_info!("Quiz generated with {} questions", quiz.len());
                Response::Quiz { quiz }
            }
            Err(err) => {
                quiz_warn!("Quiz generation failed: {}", err);
                Response::error(err.user_message())
            }
        }
    }

    pub async fn open_panel(&self, context: ContextId) -> Response {
        self.panels.open_panel(context).await;
        Response::status(PANEL_OPENED)
    }

    pub async fn handle(&self, context: ContextId, request: Request) -> Response {
        quiz_debug!("Handling {} from context {}", request.kind(), context);
        match request {
            Request::OpenPanel => self.open_panel(context).await,
            Request::SetPageText { text } => self.set_page_text(text).await,
            Request::GetPageText => self.get_page_text().await,
            Request::SaveApiKey { key } => self.save_api_key(key).await,
            Request::GetApiKey => self.get_api_key().await,
            Request::GenerateQuiz => self.generate_quiz().await,
        }
    }

    /// Entry point for untyped envelopes. Anything that is not a known
    /// request is logged and gets no reply.
    pub async fn dispatch_json(&self, context: ContextId, envelope: Value) -> Option<Response> {
        let action = envelope
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or("<none>")
            .to_string();
        match serde_json::from_value::<Request>(envelope) {
            Ok(request) => Some(self.handle(context, request).await),
            Err(err) => {
                quiz_warn!("Unknown message action: {} ({})", action, err);
                None
            }
        }
    }

    /// Storage first, in-memory copy when storage has nothing.
    async fn resolve_api_key(&self) -> String {
        if let Some(stored) = self.read_stored_key().await.filter(|key| !key.is_empty()) {
            self.state.lock().await.api_key = stored.clone();
            return stored;
        }
        self.state.lock().await.api_key.clone()
    }

    async fn read_stored_key(&self) -> Option<String> {
        match self.store.get(API_KEY_ENTRY).await {
            Ok(value) => value,
            Err(err) => {
                quiz_warn!("Reading API key from storage failed: {}", err);
                None
            }
        }
    }
}
