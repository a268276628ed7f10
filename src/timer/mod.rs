//! Cancellable timers driven by the tokio clock
//!
//! Timers are owned values and dropping one cancels it. Components keep a
//! timer inside the state variant that needs it, so leaving that state
//! releases the timer on every path.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::trace;

/// What a repeating timer is driving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Hover intensity escalation
    Ramp,
    /// Post-hover volume decay
    Fade,
}

impl std::fmt::Display for TimerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerKind::Ramp => write!(f, "ramp"),
            TimerKind::Fade => write!(f, "fade"),
        }
    }
}

/// A repeating timer whose first tick fires one period after it starts
#[derive(Debug)]
pub struct RepeatingTimer {
    kind: TimerKind,
    interval: Interval,
}

impl RepeatingTimer {
    /// Schedule a new repeating timer
    ///
    /// `period` must be non-zero. Missed ticks are delayed rather than
    /// delivered in a burst.
    pub fn start(kind: TimerKind, period: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        trace!(%kind, ?period, "timer scheduled");

        Self { kind, interval }
    }

    /// Wait for the next tick
    pub async fn tick(&mut self) -> TimerKind {
        self.interval.tick().await;
        self.kind
    }

    /// Cancel the timer explicitly
    pub fn cancel(self) {
        trace!(kind = %self.kind, "timer cancelled");
    }
}

/// A one-shot deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// A deadline `duration` from now
    pub fn after(duration: Duration) -> Self {
        Self {
            at: Instant::now() + duration,
        }
    }

    pub fn instant(&self) -> Instant {
        self.at
    }

    /// Check if the deadline has passed
    pub fn elapsed(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Time left until the deadline, zero once it has passed
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Sleep until the deadline
    pub async fn wait(&self) {
        time::sleep_until(self.at).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready};

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_waits_one_period() {
        let mut timer = RepeatingTimer::start(TimerKind::Ramp, Duration::from_millis(300));

        let mut tick = tokio_test::task::spawn(timer.tick());
        assert_pending!(tick.poll());

        time::advance(Duration::from_millis(299)).await;
        assert_pending!(tick.poll());

        time::advance(Duration::from_millis(1)).await;
        assert_eq!(assert_ready!(tick.poll()), TimerKind::Ramp);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_repeat_every_period() {
        let start = Instant::now();
        let mut timer = RepeatingTimer::start(TimerKind::Fade, Duration::from_millis(50));

        for n in 1..=4u32 {
            assert_eq!(timer.tick().await, TimerKind::Fade);
            assert_eq!(start.elapsed(), Duration::from_millis(50) * n);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline() {
        let deadline = Deadline::after(Duration::from_secs(5));
        assert!(!deadline.elapsed());
        assert_eq!(deadline.remaining(), Duration::from_secs(5));

        time::advance(Duration::from_secs(2)).await;
        assert!(!deadline.elapsed());
        assert_eq!(deadline.remaining(), Duration::from_secs(3));

        deadline.wait().await;
        assert!(deadline.elapsed());
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }
}
