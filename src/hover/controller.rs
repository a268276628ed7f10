//! Hover-driven feedback controller
//!
//! While the pointer stays over a card the playback rate ramps up on a
//! repeating timer. On leave the volume fades to its floor and the device
//! is released. The ramp and fade timers live inside the phase that uses
//! them, so at most one of them exists at any time.

use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::HoverConfig;
use crate::events::ShellEvent;
use crate::timer::{RepeatingTimer, TimerKind};

use super::device::AudioDevice;

/// Pointer notifications for a bound element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Enter,
    Leave,
}

/// Observable state of a hover controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverState {
    /// Pointer outside, device released
    Idle,
    /// Pointer inside, rate escalating
    Ramping,
    /// Pointer left, volume decaying
    Fading,
    /// Torn down, ignores further events
    Disposed,
}

impl std::fmt::Display for HoverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HoverState::Idle => write!(f, "Idle"),
            HoverState::Ramping => write!(f, "Ramping"),
            HoverState::Fading => write!(f, "Fading"),
            HoverState::Disposed => write!(f, "Disposed"),
        }
    }
}

enum Phase {
    Idle,
    Ramping { intensity: f64, timer: RepeatingTimer },
    Fading { decay: f64, timer: RepeatingTimer },
    Disposed,
}

/// Drives one device from the pointer events of one element
pub struct HoverIntensityController<D: AudioDevice> {
    card: String,
    device: D,
    settings: HoverConfig,
    phase: Phase,
    /// Device started and not yet stopped
    held: bool,
    /// Last start attempt failed, ramping continues without sound
    silent: bool,
    /// When the current hover session began
    session_started_at: Option<Instant>,
    /// Channel for emitting hover events
    event_tx: broadcast::Sender<ShellEvent>,
}

impl<D: AudioDevice> HoverIntensityController<D> {
    /// Create a controller bound to `card` and its device
    pub fn new(
        card: impl Into<String>,
        device: D,
        settings: HoverConfig,
        event_tx: broadcast::Sender<ShellEvent>,
    ) -> Self {
        Self {
            card: card.into(),
            device,
            settings,
            phase: Phase::Idle,
            held: false,
            silent: false,
            session_started_at: None,
            event_tx,
        }
    }

    pub fn state(&self) -> HoverState {
        match self.phase {
            Phase::Idle => HoverState::Idle,
            Phase::Ramping { .. } => HoverState::Ramping,
            Phase::Fading { .. } => HoverState::Fading,
            Phase::Disposed => HoverState::Disposed,
        }
    }

    /// Current ramp intensity, only while ramping
    pub fn intensity(&self) -> Option<f64> {
        match self.phase {
            Phase::Ramping { intensity, .. } => Some(intensity),
            _ => None,
        }
    }

    /// Volume the controller last pushed to the device
    pub fn volume(&self) -> f64 {
        match self.phase {
            Phase::Fading { decay, .. } => decay,
            _ => self.settings.base_volume,
        }
    }

    /// Number of timers currently scheduled, never more than one
    pub fn live_timers(&self) -> usize {
        match self.phase {
            Phase::Ramping { .. } | Phase::Fading { .. } => 1,
            Phase::Idle | Phase::Disposed => 0,
        }
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self.phase, Phase::Disposed)
    }

    /// Pointer entered the element
    pub fn on_enter(&mut self) {
        if self.is_disposed() {
            debug!(card = %self.card, "pointer enter after dispose ignored");
            return;
        }

        let previous = self.state();
        self.cancel_timer();

        self.device.set_volume(self.settings.base_volume);
        self.device.set_rate(self.settings.baseline_rate);

        if self.held {
            self.device.rewind();
        } else {
            match self.device.start() {
                Ok(()) => {
                    self.held = true;
                    self.silent = false;
                }
                Err(e) => {
                    warn!(card = %self.card, error = %e, "audio device failed to start, continuing silently");
                    self.silent = true;
                    let _ = self.event_tx.send(ShellEvent::DeviceUnavailable {
                        card: self.card.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        self.phase = Phase::Ramping {
            intensity: self.settings.baseline_rate,
            timer: RepeatingTimer::start(TimerKind::Ramp, self.settings.ramp_period()),
        };
        self.session_started_at = Some(Instant::now());

        debug!(card = %self.card, from = %previous, silent = self.silent, "hover ramp started");
        let _ = self.event_tx.send(ShellEvent::HoverStarted {
            card: self.card.clone(),
        });
    }

    /// Pointer left the element
    pub fn on_leave(&mut self) {
        if !matches!(self.phase, Phase::Ramping { .. }) {
            debug!(card = %self.card, state = %self.state(), "pointer leave ignored");
            return;
        }

        self.cancel_timer();
        self.phase = Phase::Fading {
            decay: self.settings.base_volume,
            timer: RepeatingTimer::start(TimerKind::Fade, self.settings.fade_period()),
        };

        debug!(card = %self.card, "hover fade started");
    }

    /// Advance the live timer by one tick
    pub fn on_tick(&mut self) {
        let fade_done = match &mut self.phase {
            Phase::Ramping { intensity, .. } => {
                *intensity = (*intensity + self.settings.rate_step).min(self.settings.rate_ceiling());
                self.device.set_rate(*intensity);
                false
            }
            Phase::Fading { decay, .. } => {
                if *decay > self.settings.volume_floor {
                    *decay = (*decay - self.settings.volume_step).max(self.settings.volume_floor);
                    self.device.set_volume(*decay);
                    false
                } else {
                    true
                }
            }
            Phase::Idle | Phase::Disposed => false,
        };

        if fade_done {
            self.finish_fade();
        }
    }

    /// Tear down timers and release the device; later events are ignored
    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }

        self.cancel_timer();
        self.device.stop();
        self.held = false;
        self.session_started_at = None;
        self.phase = Phase::Disposed;

        info!(card = %self.card, "hover controller disposed");
    }

    /// Wait for the live timer's next tick, forever if none is scheduled
    pub async fn next_tick(&mut self) -> TimerKind {
        match &mut self.phase {
            Phase::Ramping { timer, .. } | Phase::Fading { timer, .. } => timer.tick().await,
            Phase::Idle | Phase::Disposed => std::future::pending().await,
        }
    }

    /// Run the controller until the pointer channel closes, then dispose
    pub async fn run(&mut self, mut pointer_rx: mpsc::Receiver<PointerEvent>) {
        debug!(card = %self.card, "hover controller started");

        loop {
            tokio::select! {
                biased;

                event = pointer_rx.recv() => match event {
                    Some(PointerEvent::Enter) => self.on_enter(),
                    Some(PointerEvent::Leave) => self.on_leave(),
                    None => break,
                },

                _ = self.next_tick() => self.on_tick(),
            }
        }

        self.dispose();
    }

    /// Single exit point for the live timer, leaves the phase Idle
    fn cancel_timer(&mut self) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Ramping { timer, .. } | Phase::Fading { timer, .. } => timer.cancel(),
            Phase::Idle => {}
            Phase::Disposed => self.phase = Phase::Disposed,
        }
    }

    fn finish_fade(&mut self) {
        self.cancel_timer();
        self.device.stop();
        self.held = false;
        self.device.set_volume(self.settings.base_volume);

        let duration_ms = self
            .session_started_at
            .take()
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        info!(card = %self.card, duration_ms, "hover feedback released");
        let _ = self.event_tx.send(ShellEvent::HoverReleased {
            card: self.card.clone(),
            duration_ms,
        });
    }
}

impl<D: AudioDevice> Drop for HoverIntensityController<D> {
    fn drop(&mut self) {
        self.dispose();
    }
}
