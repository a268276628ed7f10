//! Input line grammar
//!
//! One event per line, whitespace separated:
//!
//! - `key <identifier>`: key press, identifiers as the browser reports them
//! - `enter <card>` / `leave <card>`: pointer crossing a project card
//! - `filter <all|Carrera|Targa|Turbo>`: change the gallery filter
//! - `remove <card>`: the card's element went away
//! - `wait <ms>`: pause routing, letting timers run
//!
//! Blank lines and lines starting with `#` are skipped.

use std::time::Duration;

use crate::gallery::{CategoryError, CategoryFilter};
use crate::hover::PointerEvent;

/// Leading word of an input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Key,
    Enter,
    Leave,
    Filter,
    Remove,
    Wait,
}

impl Command {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "key" => Some(Command::Key),
            "enter" => Some(Command::Enter),
            "leave" => Some(Command::Leave),
            "filter" => Some(Command::Filter),
            "remove" => Some(Command::Remove),
            "wait" => Some(Command::Wait),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Command::Key => "key",
            Command::Enter => "enter",
            Command::Leave => "leave",
            Command::Filter => "filter",
            Command::Remove => "remove",
            Command::Wait => "wait",
        }
    }
}

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Global key press
    Key(String),
    /// Pointer crossed a card boundary
    Pointer { card: String, event: PointerEvent },
    /// Gallery filter changed
    Filter(CategoryFilter),
    /// Card element removed
    Remove(String),
    /// Pause before routing the next event
    Wait(Duration),
}

/// Errors for malformed input lines
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("`{0}` requires an argument")]
    MissingArgument(&'static str),

    #[error("unexpected trailing input: {0}")]
    TrailingInput(String),

    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error(transparent)]
    Category(#[from] CategoryError),
}

impl InputEvent {
    /// Parse one line, `None` for blank lines and comments
    pub fn parse_line(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let command = Command::parse(command)
            .ok_or_else(|| ParseError::UnknownCommand(command.to_string()))?;

        let arg = parts
            .next()
            .ok_or(ParseError::MissingArgument(command.name()))?;
        let rest: Vec<&str> = parts.collect();
        if !rest.is_empty() {
            return Err(ParseError::TrailingInput(rest.join(" ")));
        }

        let event = match command {
            Command::Key => InputEvent::Key(arg.to_string()),
            Command::Enter => InputEvent::Pointer {
                card: arg.to_string(),
                event: PointerEvent::Enter,
            },
            Command::Leave => InputEvent::Pointer {
                card: arg.to_string(),
                event: PointerEvent::Leave,
            },
            Command::Filter => InputEvent::Filter(arg.parse()?),
            Command::Remove => InputEvent::Remove(arg.to_string()),
            Command::Wait => {
                let ms: u64 = arg
                    .parse()
                    .map_err(|_| ParseError::InvalidDuration(arg.to_string()))?;
                InputEvent::Wait(Duration::from_millis(ms))
            }
        };

        Ok(Some(event))
    }
}
