use std::fmt;

use pagequiz_core::Quiz;
use serde::{Deserialize, Serialize};

/// Identifies the UI context (page tab, panel) a request came from.
pub type ContextId = u64;
pub type RequestId = u64;

/// Requests accepted by the router, tagged by `action` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    #[serde(alias = "openSidePanel")]
    OpenPanel,
    SetPageText { text: String },
    GetPageText,
    SaveApiKey { key: String },
    GetApiKey,
    GenerateQuiz,
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Request::OpenPanel => "openPanel",
            Request::SetPageText { .. } => "setPageText",
            Request::GetPageText => "getPageText",
            Request::SaveApiKey { .. } => "saveApiKey",
            Request::GetApiKey => "getApiKey",
            Request::GenerateQuiz => "generateQuiz",
        }
    }
}

/// Router replies. Failures never escape as errors; they travel as
/// `Response::Error` with a message meant for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Status { status: String },
    Text { text: String },
    Key { key: String },
    Quiz { quiz: Quiz },
    Error { error: String },
}

impl Response {
    pub fn status(status: impl Into<String>) -> Self {
        Response::Status {
            status: status.into(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Response::Error {
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Reply to a dispatched request; `None` when the router sent nothing.
    Response {
        request_id: RequestId,
        response: Option<Response>,
    },
    PanelOpened {
        context: ContextId,
    },
    PageCaptured {
        context: ContextId,
        chars: usize,
    },
    CaptureFailed {
        context: ContextId,
        error: FetchError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Which precondition of a generation was not met.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingInput {
    ApiKey,
    PageText,
}

impl fmt::Display for MissingInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingInput::ApiKey => write!(f, "api key"),
            MissingInput::PageText => write!(f, "page text"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("missing input: {0}")]
    MissingInput(MissingInput),
    #[error("provider rejected the request: {message}")]
    ProviderError { message: String },
    #[error("transport failure: {detail}")]
    NetworkError { detail: String },
    /// The provider answered but the content is not a valid quiz. The raw
    /// text is kept for diagnostics and never shown to the user.
    #[error("provider returned content that is not a valid quiz")]
    MalformedQuizResponse { raw_content: String },
    #[error("provider response had neither a completion nor an error")]
    UnexpectedResponseShape { raw_body: String },
}

impl GenerationError {
    /// Text for the panel's error line.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::MissingInput(MissingInput::ApiKey) => {
                "API key not set. Please set your API key in the extension settings.".to_string()
            }
            GenerationError::MissingInput(MissingInput::PageText) => {
                "No page text available to generate quiz.".to_string()
            }
            GenerationError::ProviderError { message } => format!("API error: {message}"),
            GenerationError::NetworkError { detail } => format!("Network error: {detail}"),
            GenerationError::MalformedQuizResponse { .. } => {
                "Failed to parse quiz data from the provider. Please try again.".to_string()
            }
            GenerationError::UnexpectedResponseShape { .. } => {
                "Unexpected response from the quiz provider.".to_string()
            }
        }
    }
}
