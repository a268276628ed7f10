//! Line-oriented input listener
//!
//! Reads input events from stdin (or any buffered reader) on a dedicated
//! thread and forwards them, in order, to the shell's routing loop.

use std::io::{self, BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::event::InputEvent;

/// Input listener that turns lines into `InputEvent`s
pub struct InputListener {
    event_tx: mpsc::Sender<InputEvent>,
    running: Arc<AtomicBool>,
}

impl InputListener {
    /// Create a new input listener
    pub fn new(event_tx: mpsc::Sender<InputEvent>) -> Self {
        Self {
            event_tx,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start listening on stdin
    pub fn start(&self) -> Result<(), ListenerError> {
        self.start_with(BufReader::new(io::stdin()))
    }

    /// Start listening on `reader`
    ///
    /// The listener thread runs until the reader is exhausted, the receiving
    /// side closes or `stop()` is called. The event channel closes when the
    /// thread exits.
    pub fn start_with<R>(&self, reader: R) -> Result<(), ListenerError>
    where
        R: BufRead + Send + 'static,
    {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ListenerError::AlreadyRunning);
        }

        let event_tx = self.event_tx.clone();
        let running = Arc::clone(&self.running);

        thread::Builder::new()
            .name("input-listener".to_string())
            .spawn(move || {
                info!("input listener thread started");

                if let Err(e) = read_events(reader, event_tx, &running) {
                    error!(error = %e, "input listener error");
                }

                running.store(false, Ordering::SeqCst);
                info!("input listener thread stopped");
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                ListenerError::ThreadSpawn(e.to_string())
            })?;

        Ok(())
    }

    /// Stop the listener after the line currently being read
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the listener is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Errors that can occur in the input listener
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("input listener is already running")]
    AlreadyRunning,

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),

    #[error("failed to read input: {0}")]
    Read(#[from] io::Error),
}

/// Read lines until EOF, forwarding every parsed event
fn read_events<R: BufRead>(
    reader: R,
    event_tx: mpsc::Sender<InputEvent>,
    running: &AtomicBool,
) -> Result<(), ListenerError> {
    for (index, line) in reader.lines().enumerate() {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let line = line?;
        match InputEvent::parse_line(&line) {
            Ok(Some(event)) => {
                debug!(?event, "input event");
                // Not in an async context, block until the router has room
                if event_tx.blocking_send(event).is_err() {
                    warn!("failed to send input event - channel closed?");
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(line = index + 1, error = %e, "skipping malformed input line");
            }
        }
    }

    debug!("input exhausted");
    Ok(())
}
