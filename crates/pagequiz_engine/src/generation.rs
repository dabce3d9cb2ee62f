use std::time::Duration;

use pagequiz_core::{Quiz, RawQuizQuestion};
use pagequiz_logging::{quiz_debug, quiz_error, quiz_info, redact_secret};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{GenerationError, MissingInput};

/// OpenAI-compatible chat-completions endpoint of the Gemini API.
pub const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub endpoint: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub question_count: usize,
    /// Only this many leading characters of the page go into the prompt.
    pub max_source_chars: usize,
    /// `None` leaves timeouts to the transport defaults.
    pub request_timeout: Option<Duration>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            question_count: 3,
            max_source_chars: 8000,
            request_timeout: None,
        }
    }
}

/// Turns source text into a quiz with one remote call. No retries.
#[async_trait::async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate_quiz(&self, api_key: &str, source_text: &str)
        -> Result<Quiz, GenerationError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    settings: GenerationSettings,
    client: reqwest::Client,
}

impl ChatCompletionsClient {
    pub fn new(settings: GenerationSettings) -> Result<Self, GenerationError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|err| GenerationError::NetworkError {
            detail: err.to_string(),
        })?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }
}

#[async_trait::async_trait]
impl GenerationClient for ChatCompletionsClient {
    async fn generate_quiz(
        &self,
        api_key: &str,
        source_text: &str,
    ) -> Result<Quiz, GenerationError> {
        if api_key.is_empty() {
            return Err(GenerationError::MissingInput(MissingInput::ApiKey));
        }
        if source_text.trim().is_empty() {
            return Err(GenerationError::MissingInput(MissingInput::PageText));
        }

        let excerpt = truncate_chars(source_text, self.settings.max_source_chars);
        let prompt = build_prompt(excerpt, self.settings.question_count);
        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        quiz_info!(
            "Requesting {} questions from {} (model {}, key {}, {} source chars)",
            self.settings.question_count,
            self.settings.endpoint,
            self.settings.model,
            redact_secret(api_key),
            excerpt.chars().count()
        );

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| GenerationError::NetworkError {
                detail: err.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| GenerationError::NetworkError {
                detail: err.to_string(),
            })?;
        quiz_info!("Provider answered {} ({} bytes)", status, body.len());

        if !status.is_success() {
            quiz_error!("Provider error response ({}): {}", status, body);
            return Err(GenerationError::ProviderError {
                message: provider_error_message(status, &body),
            });
        }

        interpret_completion_body(&body)
    }
}

/// Returns at most `max_chars` leading characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

pub fn build_prompt(source_text: &str, question_count: usize) -> String {
    format!(
        r#"You are a helpful assistant designed to create multiple-choice quizzes.
Based on the following text, generate {question_count} multiple-choice questions. Each question should have 4 options (A, B, C, D) and clearly indicate the correct answer. The questions should test understanding of the provided text.

Text:
"""
{source_text}
"""

Format the output as a JSON array of objects, where each object has:
- 'question': The question string.
- 'options': An array of 4 option strings.
- 'correctAnswer': The correct option letter ("A", "B", "C" or "D").
Return only the JSON array, with no text before or after it. Ensure the JSON is valid and can be parsed directly."#
    )
}

/// Removes a Markdown code fence (```json or bare ```) around a payload.
/// A fence only counts at the start of the content or of a line; anything
/// else is returned trimmed, backticks inside JSON strings included.
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let open = if trimmed.starts_with("```") {
        0
    } else {
        match trimmed.find("\n```") {
            Some(newline) => newline + 1,
            None => return trimmed,
        }
    };
    let after_open = &trimmed[open + 3..];
    // Skip the info string ("json", "JSON", ...) up to the end of the line.
    let body = match after_open.find('\n') {
        Some(newline) if !after_open[..newline].contains('[') => &after_open[newline + 1..],
        _ => after_open.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    let inner = match body.rfind("```") {
        Some(close) => &body[..close],
        None => body,
    };
    inner.trim()
}

/// Parses model output into a validated quiz.
pub fn parse_quiz_content(content: &str) -> Result<Quiz, GenerationError> {
    let payload = strip_code_fences(content);
    let parsed = serde_json::from_str::<Vec<RawQuizQuestion>>(payload)
        .map_err(|err| err.to_string())
        .and_then(|raw| Quiz::from_raw(raw).map_err(|err| err.to_string()));
    match parsed {
        Ok(quiz) => {
            quiz_debug!("Parsed quiz with {} questions", quiz.len());
            Ok(quiz)
        }
        Err(reason) => {
            quiz_error!("Failed to parse quiz JSON ({}); raw content: {}", reason, content);
            Err(GenerationError::MalformedQuizResponse {
                raw_content: content.to_string(),
            })
        }
    }
}

/// Interprets a 2xx chat-completions body.
pub fn interpret_completion_body(body: &str) -> Result<Quiz, GenerationError> {
    let Ok(parsed) = serde_json::from_str::<ChatResponse>(body) else {
        quiz_error!("Unexpected provider response: {}", body);
        return Err(GenerationError::UnexpectedResponseShape {
            raw_body: body.to_string(),
        });
    };

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content);
    if let Some(content) = content {
        return parse_quiz_content(&content);
    }
    if let Some(error) = parsed.error {
        return Err(GenerationError::ProviderError {
            message: error_object_message(&error),
        });
    }

    quiz_error!("Unexpected provider response: {}", body);
    Err(GenerationError::UnexpectedResponseShape {
        raw_body: body.to_string(),
    })
}

/// Best human-readable message from a non-2xx body.
pub fn provider_error_message(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("error")
        );
    }
    let structured = serde_json::from_str::<Value>(trimmed).ok().and_then(|value| {
        // Some providers wrap the error object in a one-element array.
        let value = match value {
            Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
            other => other,
        };
        value.get("error").map(error_object_message)
    });
    structured.unwrap_or_else(|| trimmed.to_string())
}

fn error_object_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => ["message", "type", "status"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}
