use crate::{Advance, Direction, Effect, Msg, PanelState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: PanelState, msg: Msg) -> (PanelState, Vec<Effect>) {
    let effects = match msg {
        Msg::ApiKeyLoaded(key) => {
            state.set_api_key(key);
            Vec::new()
        }
        Msg::PageTextLoaded(text) => {
            state.set_page_chars(text.chars().count());
            Vec::new()
        }
        Msg::PageCaptured { chars } => {
            state.set_page_chars(chars);
            Vec::new()
        }
        Msg::PanelOpened => {
            state.mark_dirty();
            Vec::new()
        }
        Msg::ApiKeyInputChanged(input) => {
            state.set_key_input(input);
            Vec::new()
        }
        Msg::SaveApiKeyClicked => match state.begin_key_save() {
            Some(key) => vec![Effect::SaveApiKey { key }],
            None => Vec::new(),
        },
        Msg::ApiKeySaved => {
            state.finish_key_save();
            Vec::new()
        }
        Msg::ApiKeySaveFailed(message) => {
            state.fail_key_save(message);
            Vec::new()
        }
        Msg::GenerateClicked => {
            if state.begin_generation() {
                vec![Effect::GenerateQuiz]
            } else {
                Vec::new()
            }
        }
        Msg::QuizGenerated(result) => {
            // A late response still wins over whatever is on screen.
            state.finish_generation(result);
            Vec::new()
        }
        Msg::OptionClicked(label) => {
            if state.session_mut().select_answer(label).is_ok() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PrevClicked => {
            navigate(&mut state, Direction::Back);
            Vec::new()
        }
        Msg::NextClicked => {
            navigate(&mut state, Direction::Forward);
            Vec::new()
        }
        Msg::RetakeClicked => {
            state.retake();
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn navigate(state: &mut PanelState, direction: Direction) {
    if let Ok(Advance::Moved { .. } | Advance::Finished) =
        state.session_mut().advance(direction)
    {
        state.mark_dirty();
    }
}
