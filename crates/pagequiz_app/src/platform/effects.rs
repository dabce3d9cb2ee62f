use std::collections::HashMap;

use pagequiz_core::{Effect, Msg};
use pagequiz_engine::{ContextId, EngineEvent, EngineHandle, Request, RequestId, Response};
use pagequiz_logging::{quiz_info, quiz_warn};

const UNEXPECTED_REPLY: &str = "Unexpected response from the quiz provider.";

/// What a reply to an outstanding request should turn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    ApiKey,
    PageText,
    SaveKey,
    Generate,
    OpenPanel,
}

/// Result of translating one engine event for the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Msg(Msg),
    /// Host-level information that is not panel state.
    Notice(String),
    Nothing,
}

/// Turns panel effects into router requests and router replies back into
/// panel messages.
pub struct EffectRunner {
    engine: EngineHandle,
    context: ContextId,
    pending: HashMap<RequestId, Pending>,
    captures_in_flight: usize,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, context: ContextId) -> Self {
        Self {
            engine,
            context,
            pending: HashMap::new(),
            captures_in_flight: 0,
        }
    }

    /// Asks the router for the state the panel shows on startup.
    pub fn load_startup_state(&mut self) {
        self.request(Request::GetApiKey, Pending::ApiKey);
        self.request(Request::GetPageText, Pending::PageText);
    }

    /// Opens the panel for a new page context and starts capturing it.
    pub fn open_page(&mut self, url: &str) {
        self.context += 1;
        quiz_info!("Opening context {} for {}", self.context, url);
        self.request(Request::OpenPanel, Pending::OpenPanel);
        self.engine.capture(self.context, url);
        self.captures_in_flight += 1;
    }

    /// True when no request or capture is waiting for the engine.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.captures_in_flight == 0
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SaveApiKey { key } => {
                    self.request(Request::SaveApiKey { key }, Pending::SaveKey)
                }
                Effect::GenerateQuiz => self.request(Request::GenerateQuiz, Pending::Generate),
            }
        }
    }

    pub fn poll(&mut self) -> Option<EngineEvent> {
        self.engine.try_recv()
    }

    pub fn translate(&mut self, event: EngineEvent) -> Inbound {
        match event {
            EngineEvent::Response {
                request_id,
                response,
            } => match self.pending.remove(&request_id) {
                Some(pending) => reply_to_msg(pending, response),
                None => {
                    quiz_warn!("Reply to unknown request {}", request_id);
                    Inbound::Nothing
                }
            },
            EngineEvent::PanelOpened { .. } => Inbound::Msg(Msg::PanelOpened),
            EngineEvent::PageCaptured { chars, .. } => {
                self.captures_in_flight = self.captures_in_flight.saturating_sub(1);
                Inbound::Msg(Msg::PageCaptured { chars })
            }
            EngineEvent::CaptureFailed { context, error } => {
                self.captures_in_flight = self.captures_in_flight.saturating_sub(1);
                quiz_warn!("Capture failed for context {}: {}", context, error);
                Inbound::Notice(format!("Could not read the page: {error}"))
            }
        }
    }

    fn request(&mut self, request: Request, pending: Pending) {
        let request_id = self.engine.dispatch(self.context, request);
        self.pending.insert(request_id, pending);
    }
}

fn reply_to_msg(pending: Pending, response: Option<Response>) -> Inbound {
    let msg = match (pending, response) {
        (Pending::ApiKey, Some(Response::Key { key })) => Msg::ApiKeyLoaded(key),
        (Pending::PageText, Some(Response::Text { text })) => Msg::PageTextLoaded(text),
        (Pending::SaveKey, Some(Response::Status { .. })) => Msg::ApiKeySaved,
        (Pending::SaveKey, Some(Response::Error { error })) => Msg::ApiKeySaveFailed(error),
        (Pending::Generate, Some(Response::Quiz { quiz })) => Msg::QuizGenerated(Ok(quiz)),
        (Pending::Generate, Some(Response::Error { error })) => Msg::QuizGenerated(Err(error)),
        (Pending::Generate, other) => {
            quiz_warn!("Unexpected generation reply: {:?}", other);
            Msg::QuizGenerated(Err(UNEXPECTED_REPLY.to_string()))
        }
        (Pending::OpenPanel, Some(Response::Status { status })) => {
            return Inbound::Notice(status);
        }
        (pending, other) => {
            quiz_warn!("Unexpected reply for {:?}: {:?}", pending, other);
            return Inbound::Nothing;
        }
    };
    Inbound::Msg(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagequiz_core::Quiz;

    #[test]
    fn generation_replies_become_results() {
        assert_eq!(
            reply_to_msg(
                Pending::Generate,
                Some(Response::error("API error: bad key"))
            ),
            Inbound::Msg(Msg::QuizGenerated(Err("API error: bad key".to_string())))
        );
        assert_eq!(
            reply_to_msg(Pending::Generate, None),
            Inbound::Msg(Msg::QuizGenerated(Err(UNEXPECTED_REPLY.to_string())))
        );
        let quiz = Quiz::new(Vec::new());
        assert_eq!(
            reply_to_msg(Pending::Generate, Some(Response::Quiz { quiz: quiz.clone() })),
            Inbound::Msg(Msg::QuizGenerated(Ok(quiz)))
        );
    }

    #[test]
    fn key_replies() {
        assert_eq!(
            reply_to_msg(
                Pending::ApiKey,
                Some(Response::Key {
                    key: "k".to_string()
                })
            ),
            Inbound::Msg(Msg::ApiKeyLoaded("k".to_string()))
        );
        assert_eq!(
            reply_to_msg(Pending::SaveKey, Some(Response::status("API key saved"))),
            Inbound::Msg(Msg::ApiKeySaved)
        );
        assert_eq!(
            reply_to_msg(Pending::SaveKey, Some(Response::error("disk full"))),
            Inbound::Msg(Msg::ApiKeySaveFailed("disk full".to_string()))
        );
    }

    #[test]
    fn mismatched_replies_are_dropped() {
        assert_eq!(
            reply_to_msg(Pending::PageText, Some(Response::status("odd"))),
            Inbound::Nothing
        );
    }
}
