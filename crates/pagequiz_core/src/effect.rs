/// Requests the panel controller hands to its host; the host turns them into
/// router requests and feeds the responses back as messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SaveApiKey { key: String },
    GenerateQuiz,
}
