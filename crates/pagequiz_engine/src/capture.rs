use std::sync::Arc;
use std::time::Duration;

use pagequiz_logging::{quiz_debug, quiz_warn};

use crate::decode::decode_page;
use crate::extract::TextExtractor;
use crate::fetch::Fetcher;
use crate::FetchError;

/// Retry policy for pages whose content arrives late.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSettings {
    pub initial_delay: Duration,
    pub retry_delay: Duration,
    pub max_retries: u32,
    /// Text shorter than this (in chars) counts as "not loaded yet".
    pub min_chars: usize,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            retry_delay: Duration::from_secs(1),
            max_retries: 3,
            min_chars: 50,
        }
    }
}

/// Something that can hand out the current HTML of one document.
#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    async fn snapshot(&self) -> Result<String, FetchError>;
}

/// Re-downloads the page on every snapshot.
pub struct HttpPageSource {
    fetcher: Arc<dyn Fetcher>,
    url: String,
}

impl HttpPageSource {
    pub fn new(fetcher: Arc<dyn Fetcher>, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl PageSource for HttpPageSource {
    async fn snapshot(&self) -> Result<String, FetchError> {
        let output = self.fetcher.fetch(&self.url).await?;
        let decoded = decode_page(&output.bytes, output.metadata.content_type.as_deref());
        quiz_debug!(
            "Fetched {} bytes from {} ({})",
            output.metadata.byte_len,
            output.metadata.final_url,
            decoded.encoding_label
        );
        Ok(decoded.html)
    }
}

/// Extracts page text, retrying while the result is too short.
///
/// Waits `initial_delay` before the first attempt and `retry_delay` before
/// each of at most `max_retries` further attempts. The last successful
/// extraction is returned even when it is still short; an error is
/// returned only when no attempt produced a document at all.
pub async fn capture_page_text(
    source: &dyn PageSource,
    extractor: &dyn TextExtractor,
    settings: &CaptureSettings,
) -> Result<String, FetchError> {
    tokio::time::sleep(settings.initial_delay).await;

    let mut best: Option<String> = None;
    let mut last_error = None;
    let mut attempt: u32 = 0;
    loop {
        match source.snapshot().await {
            Ok(html) => {
                let text = extractor.extract(&html);
                quiz_debug!(
                    "Extraction attempt {} yielded {} chars",
                    attempt,
                    text.chars().count()
                );
                best = Some(text);
            }
            Err(err) => {
                quiz_warn!("Extraction attempt {} failed: {}", attempt, err);
                last_error = Some(err);
            }
        }

        let long_enough = best
            .as_ref()
            .is_some_and(|text| text.chars().count() >= settings.min_chars);
        if long_enough || attempt >= settings.max_retries {
            break;
        }
        attempt += 1;
        tokio::time::sleep(settings.retry_delay).await;
    }

    match (best, last_error) {
        (Some(text), _) => {
            if text.chars().count() < settings.min_chars {
                quiz_warn!(
                    "Minimal text extracted ({} chars); the page might still be loading",
                    text.chars().count()
                );
            }
            Ok(text)
        }
        (None, Some(err)) => Err(err),
        (None, None) => Ok(String::new()),
    }
}
