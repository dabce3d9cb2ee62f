use pagequiz_core::{Feedback, OptionView, PanelViewModel, QuestionView, Screen};

/// Renders the panel as plain text lines.
pub fn render(view: &PanelViewModel) -> Vec<String> {
    let mut lines = vec![String::new(), "=== Page Quiz ===".to_string()];

    match &view.screen {
        Screen::KeyEntry { input } => {
            lines.push("An API key is required. Enter it with: key <value>".to_string());
            if !input.is_empty() {
                lines.push(format!("Pending key: {} chars", input.chars().count()));
            }
        }
        Screen::Controls => {
            if view.generate_enabled {
                lines.push("Ready. Type `generate` to create a quiz.".to_string());
            } else {
                lines.push("Quiz generation is unavailable right now.".to_string());
            }
        }
        Screen::Loading => lines.push("Generating quiz...".to_string()),
        Screen::Question(question) => render_question(question, &mut lines),
        Screen::Results { score, total } => {
            lines.push("Quiz complete!".to_string());
            lines.push(format!("You scored {score} out of {total}."));
            lines.push("Type `retake` to start over.".to_string());
        }
    }

    if let Some(status) = &view.key_status {
        lines.push(status.message());
    }
    if let Some(error) = &view.error_message {
        lines.push(format!("! {error}"));
    }
    lines
}

fn render_question(question: &QuestionView, lines: &mut Vec<String>) {
    lines.push(question.header.clone());
    lines.push(question.text.clone());
    lines.extend(question.options.iter().map(render_option));
    let mut nav = Vec::new();
    if question.can_go_back {
        nav.push("prev".to_string());
    }
    nav.push(format!("next ({})", question.next_label));
    lines.push(format!("{} | {}", question.score_line, nav.join(" | ")));
}

fn render_option(option: &OptionView) -> String {
    let marker = if option.selected { '>' } else { ' ' };
    let feedback = match option.feedback {
        Some(Feedback::Correct) => "  [correct]",
        Some(Feedback::Incorrect) => "  [incorrect]",
        None => "",
    };
    format!("{marker} {}. {}{feedback}", option.label, option.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagequiz_core::{AnswerLabel, KeyStatus};
    use pretty_assertions::assert_eq;

    fn view(screen: Screen) -> PanelViewModel {
        PanelViewModel {
            screen,
            error_message: None,
            key_status: None,
            generate_enabled: true,
            dirty: false,
        }
    }

    #[test]
    fn question_screen_marks_selection_and_feedback() {
        let options = [
            (AnswerLabel::A, false, None),
            (AnswerLabel::B, true, Some(Feedback::Incorrect)),
            (AnswerLabel::C, false, Some(Feedback::Correct)),
            (AnswerLabel::D, false, None),
        ]
        .into_iter()
        .map(|(label, selected, feedback)| OptionView {
            label,
            text: format!("option {label}"),
            selected,
            feedback,
        })
        .collect();
        let question = QuestionView {
            header: "Question 2 of 3".to_string(),
            text: "Which one?".to_string(),
            options,
            can_go_back: true,
            next_label: "Next".to_string(),
            score_line: "Score: 1/3".to_string(),
        };

        let lines = render(&view(Screen::Question(question)));
        assert_eq!(
            lines[2..].to_vec(),
            vec![
                "Question 2 of 3",
                "Which one?",
                "  A. option A",
                "> B. option B  [incorrect]",
                "  C. option C  [correct]",
                "  D. option D",
                "Score: 1/3 | prev | next (Next)",
            ]
        );
    }

    #[test]
    fn results_and_messages() {
        let mut model = view(Screen::Results { score: 2, total: 3 });
        model.key_status = Some(KeyStatus::Saved);
        model.error_message = Some("Error: boom".to_string());

        let lines = render(&model);
        assert!(lines.contains(&"You scored 2 out of 3.".to_string()));
        assert!(lines.contains(&"API key saved successfully!".to_string()));
        assert_eq!(lines.last().unwrap(), "! Error: boom");
    }
}
