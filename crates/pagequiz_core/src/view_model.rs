use crate::AnswerLabel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelViewModel {
    pub screen: Screen,
    pub error_message: Option<String>,
    pub key_status: Option<KeyStatus>,
    pub generate_enabled: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    KeyEntry { input: String },
    Controls,
    Loading,
    Question(QuestionView),
    Results { score: usize, total: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStatus {
    Saved,
    Invalid,
    Failed(String),
}

impl KeyStatus {
    pub fn message(&self) -> String {
        match self {
            KeyStatus::Saved => "API key saved successfully!".to_string(),
            KeyStatus::Invalid => "Please enter a valid API key.".to_string(),
            KeyStatus::Failed(reason) => format!("Could not save API key: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub header: String,
    pub text: String,
    pub options: Vec<OptionView>,
    pub can_go_back: bool,
    pub next_label: String,
    pub score_line: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub label: AnswerLabel,
    pub text: String,
    pub selected: bool,
    /// Only set once the question has been answered.
    pub feedback: Option<Feedback>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Incorrect,
}
