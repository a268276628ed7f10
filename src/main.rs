//! portfolio-shell: interaction core of the portfolio page
//!
//! Hosts the two stateful pieces of the page behind a line-oriented event
//! stream on stdin:
//! - A key-sequence detector that opens a timed celebration overlay
//! - One hover feedback controller per project card
//!
//! Presentation signals are written to stdout as JSON lines. Logs go to
//! stderr.

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use portfolio_interactions::config::Config;
use portfolio_interactions::events::ShellEvent;
use portfolio_interactions::hover::TracingDevice;
use portfolio_interactions::input::InputListener;
use portfolio_interactions::lifecycle::ShutdownSignal;
use portfolio_interactions::shell::Shell;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging, stdout is reserved for events
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "portfolio-shell starting"
    );

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;
    info!(
        pattern_len = config.sequence.pattern.len(),
        window_ms = config.sequence.window_ms,
        audio_denied = config.audio_denied,
        "configuration loaded"
    );

    // Create shutdown signal handler
    let shutdown = ShutdownSignal::new();

    // Input listener -> router
    let (input_tx, mut input_rx) = mpsc::channel(32);
    // Components -> stdout printer
    let (event_tx, event_rx) = broadcast::channel::<ShellEvent>(64);

    let printer = tokio::spawn(print_events(event_rx));

    let audio_denied = config.audio_denied;
    let mut shell = Shell::start(&config, event_tx, |project| {
        TracingDevice::new(project.id.clone(), audio_denied)
    })
    .context("failed to start shell")?;

    // Start the input listener (runs on dedicated thread)
    let listener = InputListener::new(input_tx);
    listener.start().context("failed to start input listener")?;

    let shutdown_requested = async {
        match shutdown.wait().await {
            Ok(reason) => reason,
            Err(e) => {
                error!(error = %e, "failed to register signal handlers");
                warn!("continuing without signal handling - close stdin to stop");
                std::future::pending().await
            }
        }
    };
    tokio::pin!(shutdown_requested);

    info!("shell initialized, entering main loop");

    // Main event loop
    loop {
        tokio::select! {
            event = input_rx.recv() => match event {
                Some(event) => shell.dispatch(event).await,
                None => {
                    info!("input stream ended");
                    break;
                }
            },

            reason = &mut shutdown_requested => {
                info!(%reason, "shutdown signal received");
                break;
            }
        }
    }

    // Cleanup
    info!("shutting down...");

    listener.stop();
    shell.shutdown().await;

    if let Err(e) = printer.await {
        error!(error = %e, "event printer failed");
    }

    info!("portfolio-shell stopped");

    Ok(())
}

/// Write every event to stdout as one JSON object per line
async fn print_events(mut event_rx: broadcast::Receiver<ShellEvent>) {
    let mut stdout = tokio::io::stdout();

    loop {
        match event_rx.recv().await {
            Ok(event) => {
                debug!(%event, "shell event");
                let mut line = match serde_json::to_string(&event) {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(error = %e, "failed to encode event");
                        continue;
                    }
                };
                line.push('\n');

                if let Err(e) = stdout.write_all(line.as_bytes()).await {
                    warn!(error = %e, "stdout closed, no longer printing events");
                    break;
                }
                let _ = stdout.flush().await;
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "event printer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                break;
            }
        }
    }
}
