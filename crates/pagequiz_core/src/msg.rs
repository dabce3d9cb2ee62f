use crate::{AnswerLabel, Quiz};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Stored API key resolved at startup (empty when unset).
    ApiKeyLoaded(String),
    /// Page text snapshot resolved at startup (may be empty).
    PageTextLoaded(String),
    /// Extraction finished and the router holds a new snapshot.
    PageCaptured { chars: usize },
    /// The router asked the host to show the panel.
    PanelOpened,
    /// User edited the API key input.
    ApiKeyInputChanged(String),
    /// User clicked Save on the API key form.
    SaveApiKeyClicked,
    /// The router persisted the key.
    ApiKeySaved,
    /// Persisting the key failed.
    ApiKeySaveFailed(String),
    /// User asked for a new quiz.
    GenerateClicked,
    /// Generation finished; the error is already a user-facing message.
    QuizGenerated(Result<Quiz, String>),
    /// User picked an option on the current question.
    OptionClicked(AnswerLabel),
    PrevClicked,
    /// Next, or Finish Quiz on the last question.
    NextClicked,
    RetakeClicked,
    /// Host poll tick; changes nothing.
    Tick,
}
