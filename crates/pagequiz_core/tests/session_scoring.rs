use std::sync::Once;

use pagequiz_core::{
    Advance, AnswerLabel, Direction, Quiz, QuizSession, RawQuizQuestion, SessionError,
    SessionPhase,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(pagequiz_logging::initialize_for_tests);
}

/// Builds a quiz whose question `i` has `correct[i]` as its answer.
fn quiz_with_answers(correct: &[&str]) -> Quiz {
    let raw = correct
        .iter()
        .enumerate()
        .map(|(i, answer)| RawQuizQuestion {
            question: format!("Question {}", i + 1),
            options: vec![
                "first".to_string(),
                "second".to_string(),
                "third".to_string(),
                "fourth".to_string(),
            ],
            correct_answer: answer.to_string(),
        })
        .collect();
    Quiz::from_raw(raw).expect("valid quiz")
}

fn loaded(correct: &[&str]) -> QuizSession {
    let mut session = QuizSession::new();
    session.load(quiz_with_answers(correct)).expect("load");
    session
}

#[test]
fn score_matches_recount_after_every_selection() {
    init_logging();
    let mut session = loaded(&["A", "B", "C"]);
    let script = [
        (0, AnswerLabel::A),
        (0, AnswerLabel::D),
        (1, AnswerLabel::B),
        (1, AnswerLabel::B),
        (2, AnswerLabel::A),
        (2, AnswerLabel::C),
        (1, AnswerLabel::C),
        (0, AnswerLabel::A),
    ];

    for (target, label) in script {
        while session.current_index() < target {
            session.advance(Direction::Forward).unwrap();
        }
        while session.current_index() > target {
            session.advance(Direction::Back).unwrap();
        }
        session.select_answer(label).unwrap();
        assert_eq!(session.score(), session.recomputed_score());
    }
    assert_eq!(session.score(), 2);
}

#[test]
fn reselecting_same_label_changes_nothing() {
    init_logging();
    let mut session = loaded(&["B"]);
    session.select_answer(AnswerLabel::B).unwrap();
    let before = session.clone();

    session.select_answer(AnswerLabel::B).unwrap();

    assert_eq!(session, before);
    assert_eq!(session.answer(0), Some(AnswerLabel::B));
    assert_eq!(session.score(), 1);
}

#[test]
fn changing_answers_moves_score_by_at_most_one() {
    init_logging();
    let mut session = loaded(&["C"]);

    session.select_answer(AnswerLabel::C).unwrap();
    assert_eq!(session.score(), 1);

    // correct -> incorrect
    session.select_answer(AnswerLabel::A).unwrap();
    assert_eq!(session.score(), 0);

    // incorrect -> different incorrect
    session.select_answer(AnswerLabel::D).unwrap();
    assert_eq!(session.score(), 0);

    // incorrect -> correct
    session.select_answer(AnswerLabel::C).unwrap();
    assert_eq!(session.score(), 1);
    assert_eq!(session.answered_count(), 1);
}

#[test]
fn back_at_first_question_is_noop() {
    init_logging();
    let mut session = loaded(&["A", "B"]);
    let before = session.clone();

    assert_eq!(session.advance(Direction::Back), Ok(Advance::AtStart));
    assert_eq!(session, before);
    assert!(!session.can_go_back());
    assert!(session.can_go_forward());
}

#[test]
fn forward_walk_through_three_questions_then_finish() {
    init_logging();
    let mut session = loaded(&["A", "B", "C"]);
    session.select_answer(AnswerLabel::A).unwrap();

    assert_eq!(
        session.advance(Direction::Forward),
        Ok(Advance::Moved { index: 1 })
    );
    assert_eq!(
        session.advance(Direction::Forward),
        Ok(Advance::Moved { index: 2 })
    );
    assert_eq!(session.phase(), SessionPhase::InProgress);
    assert!(session.is_last_question());
    assert!(!session.can_go_forward());

    let score_before = session.score();
    assert_eq!(session.advance(Direction::Forward), Ok(Advance::Finished));
    assert_eq!(session.phase(), SessionPhase::Completed);
    assert_eq!(session.score(), score_before);
    assert_eq!(session.answer(0), Some(AnswerLabel::A));
    assert_eq!(session.answered_count(), 1);
}

#[test]
fn completed_session_rejects_mutation() {
    init_logging();
    let mut session = loaded(&["A"]);
    session.advance(Direction::Forward).unwrap();

    assert_eq!(
        session.select_answer(AnswerLabel::A),
        Err(SessionError::NotInProgress {
            phase: SessionPhase::Completed
        })
    );
    assert!(session.advance(Direction::Back).is_err());
    assert_eq!(session.score(), 0);
}

#[test]
fn empty_quiz_is_rejected_without_touching_prior_state() {
    init_logging();
    let mut session = loaded(&["A", "B"]);
    session.select_answer(AnswerLabel::A).unwrap();
    session.advance(Direction::Forward).unwrap();
    let before = session.clone();

    assert_eq!(
        session.load(Quiz::new(Vec::new())),
        Err(SessionError::EmptyQuiz)
    );
    assert_eq!(session, before);
}

#[test]
fn reset_returns_to_empty_from_any_phase() {
    init_logging();
    let mut in_progress = loaded(&["A", "B"]);
    in_progress.select_answer(AnswerLabel::A).unwrap();

    let mut completed = loaded(&["A"]);
    completed.select_answer(AnswerLabel::A).unwrap();
    completed.advance(Direction::Forward).unwrap();

    let mut empty = QuizSession::new();

    for session in [&mut in_progress, &mut completed, &mut empty] {
        session.reset();
        assert_eq!(session.phase(), SessionPhase::Empty);
        assert_eq!(session.score(), 0);
        assert_eq!(session.answered_count(), 0);
        assert_eq!(session.total(), 0);
    }
}

#[test]
fn reload_after_completion_starts_over() {
    init_logging();
    let mut session = loaded(&["A"]);
    session.select_answer(AnswerLabel::A).unwrap();
    session.advance(Direction::Forward).unwrap();

    session.load(quiz_with_answers(&["D", "D"])).unwrap();

    assert_eq!(session.phase(), SessionPhase::InProgress);
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.score(), 0);
    assert!(!session.is_answered(0));
    assert_eq!(session.total(), 2);
}

#[test]
fn provider_shaped_quiz_scores_selected_answer() {
    init_logging();
    let quiz: Quiz = serde_json::from_str(
        r#"[{"question":"Q1","options":["a","b","c","d"],"correctAnswer":"B"}]"#,
    )
    .unwrap();
    assert_eq!(quiz.len(), 1);

    let mut session = QuizSession::new();
    session.load(quiz).unwrap();
    session.select_answer(AnswerLabel::B).unwrap();
    assert_eq!(session.score(), 1);
}
