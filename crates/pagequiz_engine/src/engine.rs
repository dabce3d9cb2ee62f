use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use pagequiz_logging::{quiz_info, quiz_warn};
use serde_json::Value;

use crate::capture::{capture_page_text, CaptureSettings, HttpPageSource};
use crate::extract::{TextExtractor, VisibleTextExtractor};
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::generation::{ChatCompletionsClient, GenerationClient, GenerationSettings};
use crate::router::{MessageRouter, PanelHost};
use crate::storage::KeyValueStore;
use crate::{ContextId, EngineEvent, FetchError, GenerationError, Request, RequestId};

#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub fetch: FetchSettings,
    pub capture: CaptureSettings,
    pub generation: GenerationSettings,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error("failed to build page fetcher: {0}")]
    Fetcher(#[from] FetchError),
    #[error("failed to build generation client: {0}")]
    Generation(#[from] GenerationError),
}

enum EngineCommand {
    Request {
        request_id: RequestId,
        context: ContextId,
        request: Request,
    },
    Envelope {
        request_id: RequestId,
        context: ContextId,
        envelope: Value,
    },
    Capture {
        context: ContextId,
        url: String,
    },
}

/// Services the engine thread runs on.
pub struct EngineServices {
    pub store: Arc<dyn KeyValueStore>,
    pub generator: Arc<dyn GenerationClient>,
    pub fetcher: Arc<dyn Fetcher>,
    pub extractor: Arc<dyn TextExtractor>,
    pub capture: CaptureSettings,
}

impl EngineServices {
    /// Production wiring: reqwest for pages and for the provider.
    pub fn from_settings(
        settings: EngineSettings,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            store,
            generator: Arc::new(ChatCompletionsClient::new(settings.generation)?),
            fetcher: Arc::new(ReqwestFetcher::new(settings.fetch)?),
            extractor: Arc::new(VisibleTextExtractor),
            capture: settings.capture,
        })
    }
}

/// Forwards panel-open requests to whoever drains the event channel.
struct ChannelPanelHost {
    event_tx: mpsc::Sender<EngineEvent>,
}

#[async_trait::async_trait]
impl PanelHost for ChannelPanelHost {
    async fn open_panel(&self, context: ContextId) {
        let _ = self.event_tx.send(EngineEvent::PanelOpened { context });
    }
}

/// Runs the router on a background tokio runtime. Commands go in through
/// [`EngineHandle::dispatch`] and friends; replies come back as
/// [`EngineEvent`]s polled with [`EngineHandle::try_recv`].
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    next_request_id: AtomicU64,
}

impl EngineHandle {
    pub fn new(
        settings: EngineSettings,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, EngineError> {
        Self::with_services(EngineServices::from_settings(settings, store)?)
    }

    /// Starts the engine thread. The stored API key is loaded before this
    /// returns, so the first request already sees it.
    pub fn with_services(services: EngineServices) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("pagequiz-engine")
            .build()?;

        let panels = Arc::new(ChannelPanelHost {
            event_tx: event_tx.clone(),
        });
        let router = MessageRouter::new(services.store, services.generator, panels);
        runtime.block_on(router.load());

        let worker = Worker {
            router,
            fetcher: services.fetcher,
            extractor: services.extractor,
            capture: services.capture,
        };

        thread::Builder::new()
            .name("pagequiz-engine-commands".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let worker = worker.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        worker.handle_command(command, event_tx).await;
                    });
                }
                quiz_info!("Engine command channel closed");
            })?;

        Ok(Self {
            cmd_tx,
            event_rx,
            next_request_id: AtomicU64::new(1),
        })
    }

    /// Sends a typed request; its reply arrives as `EngineEvent::Response`
    /// carrying the returned id.
    pub fn dispatch(&self, context: ContextId, request: Request) -> RequestId {
        let request_id = self.allocate_id();
        self.send(EngineCommand::Request {
            request_id,
            context,
            request,
        });
        request_id
    }

    /// Sends an untyped `{action, ...}` envelope. Unknown actions produce a
    /// `Response` event with no payload.
    pub fn dispatch_json(&self, context: ContextId, envelope: Value) -> RequestId {
        let request_id = self.allocate_id();
        self.send(EngineCommand::Envelope {
            request_id,
            context,
            envelope,
        });
        request_id
    }

    /// Extracts the text of `url` and hands it to the router.
    pub fn capture(&self, context: ContextId, url: impl Into<String>) {
        self.send(EngineCommand::Capture {
            context,
            url: url.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Waits up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn allocate_id(&self) -> RequestId {
        self.next_request_id.fetch_add(1, Ordering::Relaxed)
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            quiz_warn!("Engine thread is gone; command dropped");
        }
    }
}

#[derive(Clone)]
struct Worker {
    router: MessageRouter,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn TextExtractor>,
    capture: CaptureSettings,
}

impl Worker {
    async fn handle_command(&self, command: EngineCommand, event_tx: mpsc::Sender<EngineEvent>) {
        match command {
            EngineCommand::Request {
                request_id,
                context,
                request,
            } => {
                let response = self.router.handle(context, request).await;
                let _ = event_tx.send(EngineEvent::Response {
                    request_id,
                    response: Some(response),
                });
            }
            EngineCommand::Envelope {
                request_id,
                context,
                envelope,
            } => {
                let response = self.router.dispatch_json(context, envelope).await;
                let _ = event_tx.send(EngineEvent::Response {
                    request_id,
                    response,
                });
            }
            EngineCommand::Capture { context, url } => {
                let source = HttpPageSource::new(self.fetcher.clone(), url.clone());
                let captured =
                    capture_page_text(&source, self.extractor.as_ref(), &self.capture).await;
                let event = match captured {
                    Ok(text) => {
                        let chars = text.chars().count();
                        quiz_info!("Captured {} chars from {}", chars, url);
                        self.router.set_page_text(text).await;
                        EngineEvent::PageCaptured { context, chars }
                    }
                    Err(error) => {
                        quiz_warn!("Capturing {} failed: {}", url, error);
                        EngineEvent::CaptureFailed { context, error }
                    }
                };
                let _ = event_tx.send(event);
            }
        }
    }
}
