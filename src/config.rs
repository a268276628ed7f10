//! Configuration loading and management

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::gallery::{Catalog, Project};
use crate::sequence::Pattern;

/// Environment variable naming an optional JSON configuration file
pub const CONFIG_PATH_ENV: &str = "PORTFOLIO_CONFIG";

/// Environment variable forcing every card's device to refuse playback
pub const AUDIO_DENIED_ENV: &str = "PORTFOLIO_AUDIO_DENIED";

/// Shell configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Key-sequence easter egg
    pub sequence: SequenceConfig,

    /// Hover feedback timings and levels
    pub hover: HoverConfig,

    /// Simulate a device denied by the environment
    pub audio_denied: bool,

    /// Project cards, the built-in catalogue when absent
    pub projects: Option<Vec<Project>>,
}

/// Key pattern and activation window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Key identifiers to match, compared case-sensitively
    pub pattern: Vec<String>,

    /// How long the overlay stays up after a match
    pub window_ms: u64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            pattern: Pattern::konami().keys().to_vec(),
            window_ms: 5000,
        }
    }
}

impl SequenceConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

/// Ramp and fade parameters for a hover controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    /// Playback rate at the start of every hover
    pub baseline_rate: f64,
    /// Rate added on every ramp tick
    pub rate_step: f64,
    /// Ceiling as a multiple of the baseline rate
    pub ceiling_factor: f64,
    pub ramp_period_ms: u64,

    /// Device volume while hovering, restored after each fade
    pub base_volume: f64,
    /// Volume removed on every fade tick
    pub volume_step: f64,
    /// Volume at which the fade stops the device
    pub volume_floor: f64,
    pub fade_period_ms: u64,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            baseline_rate: 1.0,
            rate_step: 0.05,
            ceiling_factor: 2.0,
            ramp_period_ms: 300,
            base_volume: 0.3,
            volume_step: 0.1,
            volume_floor: 0.1,
            fade_period_ms: 50,
        }
    }
}

impl HoverConfig {
    pub fn ramp_period(&self) -> Duration {
        Duration::from_millis(self.ramp_period_ms)
    }

    pub fn fade_period(&self) -> Duration {
        Duration::from_millis(self.fade_period_ms)
    }

    /// Highest rate a ramp can reach
    pub fn rate_ceiling(&self) -> f64 {
        self.baseline_rate * self.ceiling_factor
    }
}

/// Invalid configuration values
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("key pattern must contain at least one key")]
    EmptyPattern,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("invalid hover setting: {0}")]
    InvalidHover(String),
}

impl Config {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(&PathBuf::from(path))?,
            None => Self::default(),
        };

        if let Ok(value) = std::env::var(AUDIO_DENIED_ENV) {
            config.audio_denied = matches!(value.as_str(), "1" | "true" | "yes");
        }

        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file, missing fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Project cards the shell binds controllers to
    pub fn catalog(&self) -> Catalog {
        self.projects.clone().map(Catalog::new).unwrap_or_default()
    }

    /// Reject values the components cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sequence.pattern.is_empty() {
            return Err(ConfigError::EmptyPattern);
        }
        if self.sequence.window_ms == 0 {
            return Err(ConfigError::ZeroDuration("sequence.window_ms"));
        }

        let hover = &self.hover;
        let levels = [
            hover.baseline_rate,
            hover.rate_step,
            hover.ceiling_factor,
            hover.base_volume,
            hover.volume_step,
            hover.volume_floor,
        ];
        if levels.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::InvalidHover(
                "hover levels must be finite numbers".to_string(),
            ));
        }
        // The ceiling scales with the baseline, so it must stay above it
        if hover.baseline_rate <= 0.0 {
            return Err(ConfigError::InvalidHover(
                "baseline_rate must be greater than zero".to_string(),
            ));
        }
        if hover.ramp_period_ms == 0 {
            return Err(ConfigError::ZeroDuration("hover.ramp_period_ms"));
        }
        if hover.fade_period_ms == 0 {
            return Err(ConfigError::ZeroDuration("hover.fade_period_ms"));
        }
        if hover.rate_step < 0.0 || hover.ceiling_factor < 1.0 {
            return Err(ConfigError::InvalidHover(
                "ramp must not decrease the rate".to_string(),
            ));
        }
        // A zero step would keep the fade timer alive forever
        if hover.volume_step <= 0.0 {
            return Err(ConfigError::InvalidHover(
                "volume_step must be greater than zero".to_string(),
            ));
        }
        if !(0.0 <= hover.volume_floor
            && hover.volume_floor <= hover.base_volume
            && hover.base_volume <= 1.0)
        {
            return Err(ConfigError::InvalidHover(
                "expected 0 <= volume_floor <= base_volume <= 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sequence.pattern, crate::sequence::KONAMI_CODE);
        assert_eq!(config.sequence.window(), Duration::from_secs(5));
        assert_eq!(config.hover.ramp_period(), Duration::from_millis(300));
        assert_eq!(config.hover.fade_period(), Duration::from_millis(50));
        assert_eq!(config.hover.rate_ceiling(), 2.0);
        assert!(!config.audio_denied);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(
            r#"{"sequence":{"pattern":["x","y"]},"hover":{"ramp_period_ms":100}}"#,
        )
        .unwrap();
        assert_eq!(config.sequence.pattern, vec!["x", "y"]);
        assert_eq!(config.sequence.window_ms, 5000);
        assert_eq!(config.hover.ramp_period_ms, 100);
        assert_eq!(config.hover.fade_period_ms, 50);
    }

    #[test]
    fn test_projects_override_catalog() {
        let config = Config::from_json(
            r##"{"projects":[{"id":"p1","title":"P1","description":"d","category":"Targa","link":"#"}]}"##,
        )
        .unwrap();
        let catalog = config.catalog();
        assert_eq!(catalog.projects().len(), 1);
        assert!(catalog.get("p1").unwrap().technologies.is_empty());

        assert_eq!(Config::default().catalog(), Catalog::default());
    }

    #[test]
    fn test_invalid_json() {
        assert!(Config::from_json("{not json").is_err());
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let config = Config::from_json(r#"{"sequence":{"pattern":[]}}"#).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyPattern)));
    }

    #[test]
    fn test_zero_periods_rejected() {
        let mut config = Config::default();
        config.hover.fade_period_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroDuration(_))));

        let mut config = Config::default();
        config.sequence.window_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroDuration(_))));
    }

    #[test]
    fn test_volume_range_rejected() {
        let mut config = Config::default();
        config.hover.volume_floor = 0.5;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidHover(_))));

        let mut config = Config::default();
        config.hover.volume_step = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidHover(_))));
    }

    #[test]
    fn test_non_positive_baseline_rejected() {
        let config = Config::from_json(r#"{"hover":{"baseline_rate":-1.0}}"#).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidHover(_))));

        let mut config = Config::default();
        config.hover.baseline_rate = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidHover(_))));

        let mut config = Config::default();
        config.hover.rate_step = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidHover(_))));

        let mut config = Config::default();
        config.hover.baseline_rate = f64::INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidHover(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::from_file(Path::new("/nonexistent/portfolio.json"));
        assert!(result.is_err());
    }
}
