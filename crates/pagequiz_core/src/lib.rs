//! Page quiz core: quiz model, session state machine and panel controller.
//!
//! Nothing in this crate performs IO; the host feeds [`Msg`]s into
//! [`update`] and executes the returned [`Effect`]s.
mod effect;
mod msg;
mod quiz;
mod session;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use quiz::{
    AnswerLabel, Quiz, QuizQuestion, QuizValidationError, RawQuizQuestion, OPTION_COUNT,
};
pub use session::{Advance, Direction, QuizSession, SessionError, SessionPhase};
pub use state::PanelState;
pub use update::update;
pub use view_model::{Feedback, KeyStatus, OptionView, PanelViewModel, QuestionView, Screen};
