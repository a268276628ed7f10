//! Events module for presentation signals
//!
//! Provides structured event types for the celebration overlay, hover
//! feedback sessions and project filtering. The shell forwards every event
//! to the presentation layer as one JSON object per line.

use serde::{Deserialize, Serialize};

/// Events emitted by the interaction components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShellEvent {
    /// Key pattern matched, overlay should be shown
    OverlayShown {
        /// How long the overlay stays up, in milliseconds
        window_ms: u64,
    },

    /// Activation window ended (elapsed or force-cleared)
    OverlayHidden,

    /// Pointer entered a card, ramp started
    HoverStarted {
        card: String,
    },

    /// Fade finished and the card's device was released
    HoverReleased {
        card: String,
        /// Time from pointer enter to device release, in milliseconds
        duration_ms: u64,
    },

    /// The card's device refused to start, feedback continues silently
    DeviceUnavailable {
        card: String,
        reason: String,
    },

    /// Project list filtered by category
    ProjectsFiltered {
        filter: String,
        description: String,
        visible: Vec<String>,
    },
}

impl std::fmt::Display for ShellEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShellEvent::OverlayShown { window_ms } => {
                write!(f, "OVERLAY_SHOWN ({}ms)", window_ms)
            }
            ShellEvent::OverlayHidden => write!(f, "OVERLAY_HIDDEN"),
            ShellEvent::HoverStarted { card } => write!(f, "HOVER_STARTED [{}]", card),
            ShellEvent::HoverReleased { card, duration_ms } => {
                write!(f, "HOVER_RELEASED [{}] ({}ms)", card, duration_ms)
            }
            ShellEvent::DeviceUnavailable { card, reason } => {
                write!(f, "DEVICE_UNAVAILABLE [{}]: {}", card, reason)
            }
            ShellEvent::ProjectsFiltered {
                filter,
                description,
                visible,
            } => {
                write!(
                    f,
                    "PROJECTS_FILTERED {} - {} ({} visible)",
                    filter,
                    description,
                    visible.len()
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = ShellEvent::HoverReleased {
            card: "playlistify".to_string(),
            duration_ms: 1500,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("hover_released"));
        assert!(json.contains("playlistify"));
        assert!(json.contains("1500"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"overlay_hidden"}"#;
        let event: ShellEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, ShellEvent::OverlayHidden);
    }

    #[test]
    fn test_display() {
        let event = ShellEvent::OverlayShown { window_ms: 5000 };
        assert_eq!(event.to_string(), "OVERLAY_SHOWN (5000ms)");

        let event = ShellEvent::ProjectsFiltered {
            filter: "Targa".to_string(),
            description: "Backend Systems".to_string(),
            visible: vec!["event-scheduler".to_string()],
        };
        assert_eq!(
            event.to_string(),
            "PROJECTS_FILTERED Targa - Backend Systems (1 visible)"
        );
    }
}
