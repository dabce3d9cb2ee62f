use crate::session::{QuizSession, SessionPhase};
use crate::view_model::{Feedback, KeyStatus, OptionView, PanelViewModel, QuestionView, Screen};
use crate::{AnswerLabel, Quiz};

pub(crate) const NO_PAGE_TEXT: &str =
    "No page text available. Navigate to a webpage and click the extension button.";
pub(crate) const KEY_REQUIRED: &str = "Please set your API key first.";
pub(crate) const GENERATION_FAILED: &str = "Failed to generate quiz. Please try again.";

/// Panel controller state. Owns the quiz session for the lifetime of one
/// attempt; everything else mirrors what the router last reported.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PanelState {
    api_key: String,
    api_key_input: String,
    pending_key: Option<String>,
    key_status: Option<KeyStatus>,
    page_chars: usize,
    generating: bool,
    error: Option<String>,
    session: QuizSession,
    dirty: bool,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn has_page_text(&self) -> bool {
        self.page_chars > 0
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// Returns and clears the re-render flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> PanelViewModel {
        PanelViewModel {
            screen: self.screen(),
            error_message: self.error.clone(),
            key_status: self.key_status.clone(),
            generate_enabled: self.generate_enabled(),
            dirty: self.dirty,
        }
    }

    fn screen(&self) -> Screen {
        if self.generating {
            return Screen::Loading;
        }
        match self.session.phase() {
            SessionPhase::InProgress => {
                if let Some(question) = self.question_view() {
                    return Screen::Question(question);
                }
            }
            SessionPhase::Completed => {
                return Screen::Results {
                    score: self.session.score(),
                    total: self.session.total(),
                };
            }
            SessionPhase::Empty => {}
        }
        if self.has_api_key() {
            Screen::Controls
        } else {
            Screen::KeyEntry {
                input: self.api_key_input.clone(),
            }
        }
    }

    fn generate_enabled(&self) -> bool {
        self.has_api_key() && self.has_page_text() && !self.generating
    }

    fn question_view(&self) -> Option<QuestionView> {
        let index = self.session.current_index();
        let question = self.session.current_question()?;
        let total = self.session.total();
        let selected = self.session.answer(index);
        let options = AnswerLabel::ALL
            .iter()
            .map(|&label| OptionView {
                label,
                text: question.option(label).to_string(),
                selected: selected == Some(label),
                feedback: selected
                    .and_then(|chosen| option_feedback(label, chosen, question.correct_answer)),
            })
            .collect();
        let next_label = if self.session.is_last_question() {
            "Finish Quiz"
        } else {
            "Next"
        };
        Some(QuestionView {
            header: format!("Question {} of {}", index + 1, total),
            text: question.question.clone(),
            options,
            can_go_back: self.session.can_go_back(),
            next_label: next_label.to_string(),
            score_line: format!("Score: {}/{}", self.session.score(), total),
        })
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_api_key(&mut self, key: String) {
        self.api_key_input = key.clone();
        self.api_key = key;
        self.refresh_page_hint();
        self.mark_dirty();
    }

    pub(crate) fn set_page_chars(&mut self, chars: usize) {
        self.page_chars = chars;
        self.refresh_page_hint();
        self.mark_dirty();
    }

    pub(crate) fn set_key_input(&mut self, input: String) {
        self.api_key_input = input;
        self.mark_dirty();
    }

    /// Returns the trimmed key when it is worth saving.
    pub(crate) fn begin_key_save(&mut self) -> Option<String> {
        let key = self.api_key_input.trim().to_string();
        self.mark_dirty();
        if key.is_empty() {
            self.key_status = Some(KeyStatus::Invalid);
            return None;
        }
        self.pending_key = Some(key.clone());
        Some(key)
    }

    pub(crate) fn finish_key_save(&mut self) {
        if let Some(key) = self.pending_key.take() {
            self.key_status = Some(KeyStatus::Saved);
            self.set_api_key(key);
        }
    }

    pub(crate) fn fail_key_save(&mut self, message: String) {
        self.pending_key = None;
        self.key_status = Some(KeyStatus::Failed(message));
        self.mark_dirty();
    }

    /// Checks preconditions and enters the loading state. Returns false when
    /// no request should be sent.
    pub(crate) fn begin_generation(&mut self) -> bool {
        if self.generating {
            return false;
        }
        self.mark_dirty();
        if !self.has_api_key() {
            self.error = Some(KEY_REQUIRED.to_string());
            return false;
        }
        if !self.has_page_text() {
            self.error = Some(NO_PAGE_TEXT.to_string());
            return false;
        }
        self.session.reset();
        self.error = None;
        self.generating = true;
        true
    }

    pub(crate) fn finish_generation(&mut self, result: Result<Quiz, String>) {
        self.generating = false;
        self.mark_dirty();
        match result {
            Ok(quiz) => match self.session.load(quiz) {
                Ok(()) => self.error = None,
                Err(_) => {
                    self.session.reset();
                    self.error = Some(GENERATION_FAILED.to_string());
                }
            },
            Err(message) => {
                self.error = Some(format!("Error: {message}"));
            }
        }
    }

    pub(crate) fn session_mut(&mut self) -> &mut QuizSession {
        &mut self.session
    }

    pub(crate) fn retake(&mut self) {
        self.session.reset();
        self.error = None;
        self.refresh_page_hint();
        self.mark_dirty();
    }

    fn refresh_page_hint(&mut self) {
        if !self.has_api_key() || self.generating {
            return;
        }
        if self.has_page_text() {
            if self.error.as_deref() == Some(NO_PAGE_TEXT) {
                self.error = None;
            }
        } else if self.error.is_none() {
            self.error = Some(NO_PAGE_TEXT.to_string());
        }
    }
}

fn option_feedback(
    label: AnswerLabel,
    chosen: AnswerLabel,
    correct: AnswerLabel,
) -> Option<Feedback> {
    if label == correct {
        Some(Feedback::Correct)
    } else if label == chosen {
        Some(Feedback::Incorrect)
    } else {
        None
    }
}
