//! Linear key-sequence matcher with a timed activation window
//!
//! Matching is strict: any key that does not continue the current run
//! resets the cursor to the start, even when that key would begin a new
//! run. Patterns with repeated prefixes therefore never backtrack.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use crate::events::ShellEvent;
use crate::timer::Deadline;

/// Ordered, non-empty sequence of key identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    keys: Vec<String>,
}

impl Pattern {
    /// Build a pattern, rejecting an empty key list
    pub fn new<I, S>(keys: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(PatternError::Empty);
        }
        Ok(Self { keys })
    }

    /// The classic up-up-down-down code
    pub fn konami() -> Self {
        Self {
            keys: KONAMI_CODE.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

/// Key identifiers of the default pattern, as reported by the browser
pub const KONAMI_CODE: [&str; 10] = [
    "ArrowUp",
    "ArrowUp",
    "ArrowDown",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
    "ArrowLeft",
    "ArrowRight",
    "b",
    "a",
];

/// Errors raised when building a detector
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("key pattern must contain at least one key")]
    Empty,
}

/// Marker returned by `observe` for every full match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation;

/// Recognises a fixed key pattern and keeps the celebration window
pub struct KeySequenceDetector {
    pattern: Pattern,
    /// Number of pattern keys matched by the current run
    cursor: usize,
    /// How long an activation keeps the overlay up
    window_duration: Duration,
    /// Open activation window, if any
    window: Option<Deadline>,
    /// Channel for emitting overlay events
    event_tx: broadcast::Sender<ShellEvent>,
}

impl KeySequenceDetector {
    /// Create a new detector
    pub fn new(
        pattern: Pattern,
        window_duration: Duration,
        event_tx: broadcast::Sender<ShellEvent>,
    ) -> Self {
        Self {
            pattern,
            cursor: 0,
            window_duration,
            window: None,
            event_tx,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the overlay is currently shown
    pub fn is_active(&self) -> bool {
        self.window.is_some()
    }

    pub fn deadline(&self) -> Option<Deadline> {
        self.window
    }

    /// Feed one key press, in arrival order
    pub fn observe(&mut self, key: &str) -> Option<Activation> {
        if self.pattern.keys[self.cursor] == key {
            self.cursor += 1;
        } else {
            if self.cursor > 0 {
                debug!(key, matched = self.cursor, "key sequence broken");
            }
            self.cursor = 0;
        }

        if self.cursor < self.pattern.len() {
            return None;
        }

        self.cursor = 0;
        self.open_window();
        Some(Activation)
    }

    /// Close the window if its deadline has passed
    ///
    /// Returns true when the overlay was hidden.
    pub fn expire_window(&mut self) -> bool {
        match self.window {
            Some(deadline) if deadline.elapsed() => {
                debug!("activation window elapsed");
                self.close_window();
                true
            }
            _ => false,
        }
    }

    /// Force-clear the window, e.g. when the hosting view goes away
    ///
    /// Returns true when the overlay was hidden.
    pub fn clear_window(&mut self) -> bool {
        if self.window.is_none() {
            return false;
        }
        debug!("activation window cleared");
        self.close_window();
        true
    }

    /// Run the detector, processing key presses until the channel closes
    pub async fn run(&mut self, mut key_rx: mpsc::Receiver<String>) {
        info!(pattern_len = self.pattern.len(), "key sequence detector started");

        loop {
            tokio::select! {
                biased;

                key = key_rx.recv() => match key {
                    Some(key) => {
                        self.observe(&key);
                    }
                    None => break,
                },

                _ = self.window_elapsed() => {
                    self.expire_window();
                }
            }
        }

        self.clear_window();
        info!("key sequence detector stopped");
    }

    /// Resolve when the open window's deadline passes, never if none is open
    async fn window_elapsed(&self) {
        match self.window {
            Some(deadline) => deadline.wait().await,
            None => std::future::pending().await,
        }
    }

    fn open_window(&mut self) {
        let replaced = self.window.is_some();
        self.window = Some(Deadline::after(self.window_duration));

        info!(
            window_ms = self.window_duration.as_millis() as u64,
            replaced,
            "key sequence activated"
        );

        let _ = self.event_tx.send(ShellEvent::OverlayShown {
            window_ms: self.window_duration.as_millis() as u64,
        });
    }

    fn close_window(&mut self) {
        self.window = None;
        let _ = self.event_tx.send(ShellEvent::OverlayHidden);
    }
}
