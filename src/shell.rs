//! Hosting shell for the interaction components
//!
//! Owns one key-sequence detector and one hover controller per project
//! card, each running in its own task, and routes input events to them in
//! arrival order. Closing a component's channel disposes it.

use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::events::ShellEvent;
use crate::gallery::{Catalog, Project};
use crate::hover::{AudioDevice, HoverIntensityController, PointerEvent};
use crate::input::InputEvent;
use crate::sequence::{KeySequenceDetector, Pattern, PatternError};

/// Capacity of each component's input channel
const CHANNEL_CAPACITY: usize = 32;

pub struct Shell {
    catalog: Catalog,
    key_tx: mpsc::Sender<String>,
    /// Pointer channel of every mounted card
    cards: HashMap<String, mpsc::Sender<PointerEvent>>,
    tasks: JoinSet<()>,
    event_tx: broadcast::Sender<ShellEvent>,
}

impl Shell {
    /// Spawn the detector and a controller for every catalogue card
    ///
    /// `make_device` is called once per card; the controller owns the
    /// device it returns.
    pub fn start<D, F>(
        config: &Config,
        event_tx: broadcast::Sender<ShellEvent>,
        mut make_device: F,
    ) -> Result<Self, PatternError>
    where
        D: AudioDevice + Send + 'static,
        F: FnMut(&Project) -> D,
    {
        let pattern = Pattern::new(config.sequence.pattern.iter().cloned())?;
        let mut tasks = JoinSet::new();

        let (key_tx, key_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let mut detector =
            KeySequenceDetector::new(pattern, config.sequence.window(), event_tx.clone());
        tasks.spawn(async move {
            detector.run(key_rx).await;
        });

        let catalog = config.catalog();
        let mut cards = HashMap::new();
        for project in catalog.projects() {
            let (pointer_tx, pointer_rx) = mpsc::channel(CHANNEL_CAPACITY);
            let mut controller = HoverIntensityController::new(
                project.id.clone(),
                make_device(project),
                config.hover.clone(),
                event_tx.clone(),
            );
            tasks.spawn(async move {
                controller.run(pointer_rx).await;
            });

            if cards.insert(project.id.clone(), pointer_tx).is_some() {
                warn!(card = %project.id, "duplicate card id, earlier controller replaced");
            }
        }

        info!(cards = cards.len(), "shell started");

        Ok(Self {
            catalog,
            key_tx,
            cards,
            tasks,
            event_tx,
        })
    }

    /// Ids of the cards that still have a controller
    pub fn mounted_cards(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.cards.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Route one input event
    pub async fn dispatch(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key(key) => {
                if self.key_tx.send(key).await.is_err() {
                    warn!("key sequence detector stopped, key dropped");
                }
            }

            InputEvent::Pointer { card, event } => match self.cards.get(&card) {
                Some(pointer_tx) => {
                    if pointer_tx.send(event).await.is_err() {
                        warn!(%card, "hover controller stopped, pointer event dropped");
                    }
                }
                None => warn!(%card, ?event, "pointer event for unknown card"),
            },

            InputEvent::Filter(filter) => {
                let visible: Vec<String> = self
                    .catalog
                    .filter(filter)
                    .into_iter()
                    .map(|p| p.id.clone())
                    .collect();
                info!(
                    %filter,
                    description = filter.description(),
                    visible = visible.len(),
                    "projects filtered"
                );
                let _ = self.event_tx.send(ShellEvent::ProjectsFiltered {
                    filter: filter.to_string(),
                    description: filter.description().to_string(),
                    visible,
                });
            }

            InputEvent::Remove(card) => match self.cards.remove(&card) {
                // Dropping the sender ends the controller task, which disposes it
                Some(_) => info!(%card, "card removed"),
                None => warn!(%card, "remove for unknown card"),
            },

            InputEvent::Wait(duration) => {
                tokio::time::sleep(duration).await;
            }
        }
    }

    /// Close every component channel and wait for the components to finish
    pub async fn shutdown(self) {
        let Self {
            key_tx,
            cards,
            mut tasks,
            ..
        } = self;

        drop(key_tx);
        drop(cards);

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "component task failed");
            }
        }

        info!("shell stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::gallery::{Category, CategoryFilter};
    use crate::hover::testing::RecordingDevice;
    use crate::sequence::KONAMI_CODE;

    fn start_shell() -> (Shell, broadcast::Receiver<ShellEvent>, HashMap<String, RecordingDevice>) {
        let (event_tx, event_rx) = broadcast::channel(256);
        let mut devices = HashMap::new();
        let shell = Shell::start(&Config::default(), event_tx, |project| {
            let device = RecordingDevice::new();
            devices.insert(project.id.clone(), device.clone());
            device
        })
        .unwrap();
        (shell, event_rx, devices)
    }

    fn pointer(card: &str, event: PointerEvent) -> InputEvent {
        InputEvent::Pointer {
            card: card.to_string(),
            event,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_mounts_every_card() {
        let (shell, _, devices) = start_shell();
        assert_eq!(
            shell.mounted_cards(),
            vec!["drone-surveillance", "event-scheduler", "nerf", "playlistify"]
        );
        assert_eq!(devices.len(), 4);
        shell.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_pattern_fails_at_start() {
        let mut config = Config::default();
        config.sequence.pattern.clear();
        let (event_tx, _) = broadcast::channel(8);
        let result = Shell::start(&config, event_tx, |_| RecordingDevice::new());
        assert!(matches!(result, Err(PatternError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_sequence_shows_and_hides_overlay() {
        let (mut shell, mut rx, _) = start_shell();

        for key in KONAMI_CODE {
            shell.dispatch(InputEvent::Key(key.to_string())).await;
        }
        assert_eq!(rx.recv().await.unwrap(), ShellEvent::OverlayShown { window_ms: 5000 });

        let shown_at = tokio::time::Instant::now();
        assert_eq!(rx.recv().await.unwrap(), ShellEvent::OverlayHidden);
        assert_eq!(shown_at.elapsed(), Duration::from_secs(5));

        shell.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_hover_session_through_shell() {
        let (mut shell, mut rx, devices) = start_shell();

        shell.dispatch(pointer("nerf", PointerEvent::Enter)).await;
        shell.dispatch(InputEvent::Wait(Duration::from_millis(650))).await;
        shell.dispatch(pointer("nerf", PointerEvent::Leave)).await;
        shell.dispatch(InputEvent::Wait(Duration::from_millis(200))).await;

        let log = devices["nerf"].log();
        assert_eq!(log.starts, 1);
        assert_eq!(log.stops, 1);
        assert!(!log.playing);
        assert_eq!(devices["playlistify"].log().starts, 0);

        assert_eq!(
            rx.recv().await.unwrap(),
            ShellEvent::HoverStarted {
                card: "nerf".to_string()
            }
        );
        assert!(matches!(
            rx.recv().await.unwrap(),
            ShellEvent::HoverReleased { ref card, .. } if card == "nerf"
        ));

        shell.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_emits_visible_cards() {
        let (mut shell, mut rx, _) = start_shell();

        shell
            .dispatch(InputEvent::Filter(CategoryFilter::Only(Category::Turbo)))
            .await;
        assert_eq!(
            rx.recv().await.unwrap(),
            ShellEvent::ProjectsFiltered {
                filter: "Turbo".to_string(),
                description: "Research & ML".to_string(),
                visible: vec!["drone-surveillance".to_string(), "nerf".to_string()],
            }
        );

        shell.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_disposes_card() {
        let (mut shell, _, devices) = start_shell();

        shell.dispatch(pointer("playlistify", PointerEvent::Enter)).await;
        shell.dispatch(InputEvent::Remove("playlistify".to_string())).await;
        assert!(!shell.mounted_cards().contains(&"playlistify"));

        // Events for the removed card are dropped
        shell.dispatch(pointer("playlistify", PointerEvent::Enter)).await;
        shell.dispatch(InputEvent::Wait(Duration::from_millis(10))).await;

        let log = devices["playlistify"].log();
        assert_eq!(log.starts, 1);
        assert_eq!(log.stops, 1);
        assert!(!log.playing);

        shell.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_clears_overlay_and_releases_devices() {
        let (mut shell, mut rx, devices) = start_shell();

        for key in KONAMI_CODE {
            shell.dispatch(InputEvent::Key(key.to_string())).await;
        }
        shell.dispatch(pointer("event-scheduler", PointerEvent::Enter)).await;
        shell.shutdown().await;

        let events: Vec<ShellEvent> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert!(events.contains(&ShellEvent::OverlayShown { window_ms: 5000 }));
        assert!(events.contains(&ShellEvent::OverlayHidden));

        for device in devices.values() {
            let log = device.log();
            assert!(!log.playing);
            assert_eq!(log.stops, 1);
        }
    }
}
