use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of options every question must carry.
pub const OPTION_COUNT: usize = 4;

/// Positional option label: option 0 is `A`, option 3 is `D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnswerLabel {
    A,
    B,
    C,
    D,
}

impl AnswerLabel {
    pub const ALL: [AnswerLabel; OPTION_COUNT] =
        [AnswerLabel::A, AnswerLabel::B, AnswerLabel::C, AnswerLabel::D];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            AnswerLabel::A => 0,
            AnswerLabel::B => 1,
            AnswerLabel::C => 2,
            AnswerLabel::D => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnswerLabel::A => "A",
            AnswerLabel::B => "B",
            AnswerLabel::C => "C",
            AnswerLabel::D => "D",
        }
    }
}

impl fmt::Display for AnswerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerLabel {
    type Err = QuizValidationError;

    /// Accepts a single letter, ignoring surrounding whitespace and case.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(AnswerLabel::A),
            "B" => Ok(AnswerLabel::B),
            "C" => Ok(AnswerLabel::C),
            "D" => Ok(AnswerLabel::D),
            _ => Err(QuizValidationError::InvalidCorrectAnswer {
                value: raw.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizValidationError {
    #[error("quiz contains no questions")]
    NoQuestions,
    #[error("question {index} has empty text")]
    EmptyQuestion { index: usize },
    #[error("question {index} has {count} options, expected 4")]
    WrongOptionCount { index: usize, count: usize },
    #[error("correct answer {value:?} is not one of A, B, C, D")]
    InvalidCorrectAnswer { value: String },
}

/// One validated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: [String; OPTION_COUNT],
    #[serde(rename = "correctAnswer")]
    pub correct_answer: AnswerLabel,
}

impl QuizQuestion {
    pub fn option(&self, label: AnswerLabel) -> &str {
        &self.options[label.index()]
    }

    pub fn is_correct(&self, label: AnswerLabel) -> bool {
        self.correct_answer == label
    }
}

/// The question shape as produced by the model, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawQuizQuestion {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer", default)]
    pub correct_answer: String,
}

impl TryFrom<RawQuizQuestion> for QuizQuestion {
    type Error = QuizValidationError;

    fn try_from(raw: RawQuizQuestion) -> Result<Self, Self::Error> {
        validate_question(0, raw)
    }
}

/// An ordered sequence of validated questions, fixed once generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Quiz {
    questions: Vec<QuizQuestion>,
}

impl Quiz {
    /// Wraps already validated questions. The sequence may be empty; a
    /// [`crate::QuizSession`] refuses to load an empty quiz.
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self { questions }
    }

    /// Validates untrusted questions: non-empty text, exactly four options
    /// and a correct answer within `A..=D`. An empty list is rejected.
    pub fn from_raw(raw: Vec<RawQuizQuestion>) -> Result<Self, QuizValidationError> {
        if raw.is_empty() {
            return Err(QuizValidationError::NoQuestions);
        }
        let questions = raw
            .into_iter()
            .enumerate()
            .map(|(index, question)| validate_question(index, question))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { questions })
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn get(&self, index: usize) -> Option<&QuizQuestion> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl<'de> Deserialize<'de> for Quiz {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Vec::<RawQuizQuestion>::deserialize(deserializer)?;
        Quiz::from_raw(raw).map_err(serde::de::Error::custom)
    }
}

fn validate_question(
    index: usize,
    raw: RawQuizQuestion,
) -> Result<QuizQuestion, QuizValidationError> {
    let question = raw.question.trim().to_string();
    if question.is_empty() {
        return Err(QuizValidationError::EmptyQuestion { index });
    }
    let count = raw.options.len();
    let options: [String; OPTION_COUNT] = raw
        .options
        .try_into()
        .map_err(|_| QuizValidationError::WrongOptionCount { index, count })?;
    let correct_answer = raw.correct_answer.parse::<AnswerLabel>()?;
    Ok(QuizQuestion {
        question,
        options,
        correct_answer,
    })
}
