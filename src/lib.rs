//! Interaction core of the portfolio page
//!
//! Two independent event-driven state machines and the shell that hosts
//! them:
//! - [`sequence`]: key-sequence detector with a timed activation window
//! - [`hover`]: per-card hover feedback with ramp and fade timers
//! - [`shell`]: routes the input stream to the components and tears them
//!   down on every exit path

pub mod config;
pub mod events;
pub mod gallery;
pub mod hover;
pub mod input;
pub mod lifecycle;
pub mod sequence;
pub mod shell;
pub mod timer;
