//! Key-sequence detection for the celebration overlay
//!
//! The detector consumes key identifiers in arrival order and opens a
//! time-bounded activation window on every full match of its pattern.

mod detector;

pub use detector::{Activation, KeySequenceDetector, Pattern, PatternError, KONAMI_CODE};
