//! Console input commands.

use std::str::FromStr;

use strum::EnumString;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
enum Keyword {
    #[strum(serialize = "quit", serialize = "exit", serialize = "bye")]
    Quit,
    #[strum(serialize = "voice")]
    Voice,
}

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// End the session.
    Quit,
    /// Start recording; the next Enter stops it.
    Voice,
    /// Send as a user text message.
    Message(String),
    /// Blank input, ignored.
    Empty,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match Keyword::from_str(trimmed) {
            Ok(Keyword::Quit) => Self::Quit,
            Ok(Keyword::Voice) => Self::Voice,
            Err(_) => Self::Message(trimmed.to_string()),
        }
    }
}
