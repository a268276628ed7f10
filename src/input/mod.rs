//! Input module for the shell's event stream
//!
//! Parses line-oriented key and pointer events and reads them on a
//! dedicated thread.

mod event;
mod listener;

pub use event::{InputEvent, ParseError};
pub use listener::{InputListener, ListenerError};
