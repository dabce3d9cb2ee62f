use std::collections::BTreeMap;

use crate::quiz::{AnswerLabel, Quiz, QuizQuestion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Empty,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("cannot load a quiz with no questions")]
    EmptyQuiz,
    #[error("operation requires a quiz in progress (phase {phase:?})")]
    NotInProgress { phase: SessionPhase },
}

/// Outcome of a successful [`QuizSession::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved { index: usize },
    /// Back from the first question; nothing changed.
    AtStart,
    Finished,
}

/// One attempt at a quiz: position, recorded answers and running score.
///
/// `score` is kept incrementally and always equals the number of answered
/// questions whose recorded label matches the correct one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuizSession {
    phase: SessionPhase,
    quiz: Option<Quiz>,
    current_index: usize,
    answers: BTreeMap<usize, AnswerLabel>,
    score: usize,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh attempt. An empty quiz is rejected and leaves the
    /// session untouched.
    pub fn load(&mut self, quiz: Quiz) -> Result<(), SessionError> {
        if quiz.is_empty() {
            return Err(SessionError::EmptyQuiz);
        }
        self.quiz = Some(quiz);
        self.phase = SessionPhase::InProgress;
        self.current_index = 0;
        self.answers.clear();
        self.score = 0;
        Ok(())
    }

    /// Records `label` for the current question, replacing any earlier
    /// choice and adjusting the score by the difference.
    pub fn select_answer(&mut self, label: AnswerLabel) -> Result<(), SessionError> {
        self.require_in_progress()?;
        let correct = match self.current_question() {
            Some(question) => question.correct_answer,
            None => return Err(self.not_in_progress()),
        };

        match self.answers.insert(self.current_index, label) {
            None => {
                if label == correct {
                    self.score += 1;
                }
            }
            Some(previous) if previous != label => {
                if previous == correct {
                    self.score -= 1;
                }
                if label == correct {
                    self.score += 1;
                }
            }
            Some(_) => {}
        }

        debug_assert_eq!(self.score, self.recomputed_score());
        Ok(())
    }

    pub fn advance(&mut self, direction: Direction) -> Result<Advance, SessionError> {
        self.require_in_progress()?;
        let last = self.total().saturating_sub(1);
        let outcome = match direction {
            Direction::Forward if self.current_index >= last => {
                self.phase = SessionPhase::Completed;
                Advance::Finished
            }
            Direction::Forward => {
                self.current_index += 1;
                Advance::Moved {
                    index: self.current_index,
                }
            }
            Direction::Back if self.current_index == 0 => Advance::AtStart,
            Direction::Back => {
                self.current_index -= 1;
                Advance::Moved {
                    index: self.current_index,
                }
            }
        };
        Ok(outcome)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.quiz.as_ref()?.get(self.current_index)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total(&self) -> usize {
        self.quiz.as_ref().map_or(0, Quiz::len)
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn answer(&self, index: usize) -> Option<AnswerLabel> {
        self.answers.get(&index).copied()
    }

    pub fn is_answered(&self, index: usize) -> bool {
        self.answers.contains_key(&index)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn can_go_back(&self) -> bool {
        self.phase == SessionPhase::InProgress && self.current_index > 0
    }

    /// Whether another question follows the current one. On the last
    /// question moving forward finishes the attempt instead.
    pub fn can_go_forward(&self) -> bool {
        self.phase == SessionPhase::InProgress && self.current_index + 1 < self.total()
    }

    pub fn is_last_question(&self) -> bool {
        self.phase == SessionPhase::InProgress && self.current_index + 1 == self.total()
    }

    /// Score counted from scratch; used to check the incremental value.
    pub fn recomputed_score(&self) -> usize {
        let Some(quiz) = self.quiz.as_ref() else {
            return 0;
        };
        self.answers
            .iter()
            .filter(|(index, label)| {
                quiz.get(**index)
                    .is_some_and(|question| question.is_correct(**label))
            })
            .count()
    }

    fn require_in_progress(&self) -> Result<(), SessionError> {
        if self.phase == SessionPhase::InProgress {
            Ok(())
        } else {
            Err(self.not_in_progress())
        }
    }

    fn not_in_progress(&self) -> SessionError {
        SessionError::NotInProgress { phase: self.phase }
    }
}
