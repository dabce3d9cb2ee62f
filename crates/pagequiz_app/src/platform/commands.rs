use pagequiz_core::AnswerLabel;

pub const HELP: &str = "\
Commands:
  open <url>     capture a page and open the quiz panel for it
  key <value>    save your API key
  generate, g    generate a quiz from the captured page
  a, b, c, d     pick an option on the current question
  next, n        next question (finishes the quiz on the last one)
  prev, p        previous question
  retake, r      discard the quiz and start over
  help           show this list
  quit, q        exit";

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(String),
    Key(String),
    Generate,
    Select(AnswerLabel),
    Next,
    Prev,
    Retake,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse(line: &str) -> Command {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "" => Command::Empty,
        "open" if !rest.is_empty() => Command::Open(rest.to_string()),
        // The key itself is case sensitive; only the command word is not.
        "key" => Command::Key(rest.to_string()),
        "generate" | "g" if rest.is_empty() => Command::Generate,
        "next" | "n" if rest.is_empty() => Command::Next,
        "prev" | "p" if rest.is_empty() => Command::Prev,
        "retake" | "r" if rest.is_empty() => Command::Retake,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" if rest.is_empty() => Command::Quit,
        single if rest.is_empty() && single.len() == 1 => match single.parse::<AnswerLabel>() {
            Ok(label) => Command::Select(label),
            Err(_) => Command::Unknown(line.to_string()),
        },
        _ => Command::Unknown(line.to_string()),
    }
}
