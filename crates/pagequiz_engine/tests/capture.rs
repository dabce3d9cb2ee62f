use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pagequiz_engine::{
    capture_page_text, CaptureSettings, FailureKind, FetchError, FetchSettings, HttpPageSource,
    PageSource, ReqwestFetcher, VisibleTextExtractor,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LONG_BODY: &str = "<html><body><p>This paragraph is comfortably longer than fifty characters of text.</p></body></html>";

/// Hands out prepared snapshots in order, repeating the last one.
struct ScriptedSource {
    snapshots: Mutex<VecDeque<Result<String, FetchError>>>,
    calls: Mutex<usize>,
}

impl ScriptedSource {
    fn new(snapshots: Vec<Result<String, FetchError>>) -> Self {
        Self {
            snapshots: Mutex::new(snapshots.into()),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl PageSource for ScriptedSource {
    async fn snapshot(&self) -> Result<String, FetchError> {
        *self.calls.lock().unwrap() += 1;
        let mut snapshots = self.snapshots.lock().unwrap();
        if snapshots.len() > 1 {
            snapshots.pop_front().unwrap()
        } else {
            snapshots.front().cloned().unwrap()
        }
    }
}

fn fast_settings() -> CaptureSettings {
    CaptureSettings {
        initial_delay: Duration::from_millis(1),
        retry_delay: Duration::from_millis(1),
        ..CaptureSettings::default()
    }
}

fn page(body: &str) -> Result<String, FetchError> {
    Ok(format!("<html><body>{body}</body></html>"))
}

#[test]
fn default_policy_matches_reference_timings() {
    let settings = CaptureSettings::default();
    assert_eq!(settings.initial_delay, Duration::from_millis(500));
    assert_eq!(settings.retry_delay, Duration::from_secs(1));
    assert_eq!(settings.max_retries, 3);
    assert_eq!(settings.min_chars, 50);
}

#[tokio::test]
async fn long_text_is_accepted_on_first_attempt() {
    let source = ScriptedSource::new(vec![Ok(LONG_BODY.to_string())]);
    let text = capture_page_text(&source, &VisibleTextExtractor, &fast_settings())
        .await
        .unwrap();
    assert_eq!(
        text,
        "This paragraph is comfortably longer than fifty characters of text."
    );
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn short_text_is_retried_until_content_arrives() {
    let source = ScriptedSource::new(vec![
        page("Loading"),
        page("Loading"),
        Ok(LONG_BODY.to_string()),
    ]);
    let text = capture_page_text(&source, &VisibleTextExtractor, &fast_settings())
        .await
        .unwrap();
    assert!(text.starts_with("This paragraph"));
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn retries_are_bounded_and_short_text_is_kept() {
    let source = ScriptedSource::new(vec![page("Still loading")]);
    let text = capture_page_text(&source, &VisibleTextExtractor, &fast_settings())
        .await
        .unwrap();
    assert_eq!(text, "Still loading");
    // One initial attempt plus three retries.
    assert_eq!(source.calls(), 4);
}

#[tokio::test]
async fn failure_is_returned_only_when_nothing_succeeded() {
    let error = FetchError {
        kind: FailureKind::HttpStatus(503),
        message: "503 Service Unavailable".to_string(),
    };
    let source = ScriptedSource::new(vec![Err(error.clone())]);
    let result = capture_page_text(&source, &VisibleTextExtractor, &fast_settings()).await;
    assert_eq!(result, Err(error.clone()));

    let source = ScriptedSource::new(vec![page("short"), Err(error)]);
    let result = capture_page_text(&source, &VisibleTextExtractor, &fast_settings()).await;
    assert_eq!(result, Ok("short".to_string()));
}

#[tokio::test]
async fn http_source_decodes_and_extracts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            b"<html><body><p>Caf\xe9 culture is older than most people assume it to be.</p></body></html>".to_vec(),
            "text/html; charset=windows-1252",
        ))
        .mount(&server)
        .await;

    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::default()).unwrap());
    let source = HttpPageSource::new(fetcher, format!("{}/article", server.uri()));
    let text = capture_page_text(&source, &VisibleTextExtractor, &fast_settings())
        .await
        .unwrap();
    assert_eq!(
        text,
        "Café culture is older than most people assume it to be."
    );
}
