//! Page quiz engine: page capture, quiz generation and the message router.
mod capture;
mod decode;
mod engine;
mod extract;
mod fetch;
mod generation;
mod router;
mod storage;
mod types;

pub use capture::{capture_page_text, CaptureSettings, HttpPageSource, PageSource};
pub use decode::{decode_page, DecodedPage};
pub use engine::{EngineError, EngineHandle, EngineServices, EngineSettings};
pub use extract::{
    normalize_whitespace, TextExtractor, VisibleTextExtractor, EXTENSION_CHROME_MARKER,
};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use generation::{
    build_prompt, interpret_completion_body, parse_quiz_content, provider_error_message,
    strip_code_fences, truncate_chars, ChatCompletionsClient, GenerationClient,
    GenerationSettings, DEFAULT_ENDPOINT, DEFAULT_MODEL,
};
pub use router::{MessageRouter, PanelHost, API_KEY_SAVED, PAGE_TEXT_RECEIVED, PANEL_OPENED};
pub use storage::{KeyValueStore, MemoryStore, StorageError, API_KEY_ENTRY};
pub use types::{
    ContextId, EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput,
    GenerationError, MissingInput, Request, RequestId, Response,
};
