//! Parsing of interactive input lines.

/// One line typed during a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Pause,
    Resume,
    Voice,
    Help,
    Quit,
    /// Anything that is not a command: the next improvisation.
    Improvise(String),
    Unknown(String),
    Empty,
}

pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Improvise(line.to_string());
    };
    match command.trim().to_ascii_lowercase().as_str() {
        "pause" | "p" => Input::Pause,
        "resume" | "r" | "play" => Input::Resume,
        "voice" | "v" => Input::Voice,
        "help" | "h" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}

pub const HELP: &str = "\
Type a line to improvise the next turn, or:
  /pause    pause the narration
  /resume   resume the narration
  /voice    dictate the next improvisation
  /quit     leave the session";
