use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use pagequiz_core::{update, Msg, PanelState};
use pagequiz_engine::{ContextId, EngineHandle};
use pagequiz_logging::{quiz_info, quiz_warn};

use super::commands::{self, Command};
use super::config::AppConfig;
use super::effects::{EffectRunner, Inbound};
use super::logging::{self, LogDestination};
use super::persistence::RonKeyStore;
use super::render;

/// Context of the panel itself; opened pages count up from here.
const PANEL_CONTEXT: ContextId = 0;
const POLL_INTERVAL: Duration = Duration::from_millis(75);

pub struct RunOptions {
    pub url: Option<String>,
    pub config: Option<PathBuf>,
    pub log_to: LogDestination,
}

pub fn run_app(options: RunOptions) -> anyhow::Result<()> {
    logging::initialize(options.log_to);

    let config = AppConfig::load(options.config.as_deref()).context("loading configuration")?;
    let store = Arc::new(RonKeyStore::new(config.storage_path.clone()));
    quiz_info!("Key store at {:?}", store.path());
    let engine =
        EngineHandle::new(config.engine_settings(), store).context("starting quiz engine")?;

    let mut runner = EffectRunner::new(engine, PANEL_CONTEXT);
    runner.load_startup_state();
    if let Some(url) = options.url.as_deref() {
        runner.open_page(url);
    }

    let input_rx = spawn_input_reader();
    let mut state = PanelState::new();
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", commands::HELP)?;
    show(&mut stdout, &render::render(&state.view()))?;

    let mut input_closed = false;
    loop {
        let mut inbox = Vec::new();
        while let Some(event) = runner.poll() {
            match runner.translate(event) {
                Inbound::Msg(msg) => inbox.push(msg),
                Inbound::Notice(text) => writeln!(stdout, "* {text}")?,
                Inbound::Nothing => {}
            }
        }

        if input_closed {
            // Piped input: finish outstanding work, then leave.
            if inbox.is_empty() && runner.is_idle() {
                break;
            }
            thread::sleep(POLL_INTERVAL);
        } else {
            match input_rx.recv_timeout(POLL_INTERVAL) {
                Ok(line) => match commands::parse(&line) {
                    Command::Quit => break,
                    Command::Open(url) => runner.open_page(&url),
                    Command::Help | Command::Unknown(_) => writeln!(stdout, "{}", commands::HELP)?,
                    Command::Empty => {}
                    command => inbox.extend(command_msgs(command)),
                },
                Err(mpsc::RecvTimeoutError::Timeout) => inbox.push(Msg::Tick),
                Err(mpsc::RecvTimeoutError::Disconnected) => input_closed = true,
            }
        }

        for msg in inbox {
            let (next, effects) = update(state, msg);
            state = next;
            runner.run(effects);
        }

        if state.consume_dirty() {
            show(&mut stdout, &render::render(&state.view()))?;
        }
    }

    quiz_info!("Exiting");
    Ok(())
}

/// Panel messages for commands that act on the panel.
fn command_msgs(command: Command) -> Vec<Msg> {
    match command {
        Command::Key(value) => vec![Msg::ApiKeyInputChanged(value), Msg::SaveApiKeyClicked],
        Command::Generate => vec![Msg::GenerateClicked],
        Command::Select(label) => vec![Msg::OptionClicked(label)],
        Command::Next => vec![Msg::NextClicked],
        Command::Prev => vec![Msg::PrevClicked],
        Command::Retake => vec![Msg::RetakeClicked],
        Command::Open(_)
        | Command::Help
        | Command::Quit
        | Command::Empty
        | Command::Unknown(_) => Vec::new(),
    }
}

fn spawn_input_reader() -> mpsc::Receiver<String> {
    let (line_tx, line_rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    quiz_warn!("Reading stdin failed: {}", err);
                    break;
                }
            }
        }
    });
    line_rx
}

fn show(out: &mut impl Write, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    write!(out, "> ")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagequiz_core::AnswerLabel;

    #[test]
    fn key_command_fills_and_submits_the_form() {
        assert_eq!(
            command_msgs(Command::Key("abc".to_string())),
            vec![
                Msg::ApiKeyInputChanged("abc".to_string()),
                Msg::SaveApiKeyClicked
            ]
        );
    }

    #[test]
    fn quiz_commands_map_to_clicks() {
        assert_eq!(
            command_msgs(Command::Select(AnswerLabel::C)),
            vec![Msg::OptionClicked(AnswerLabel::C)]
        );
        assert_eq!(command_msgs(Command::Next), vec![Msg::NextClicked]);
        assert!(command_msgs(Command::Help).is_empty());
    }
}
