//! Audio-capable device driven by a hover controller
//!
//! The real playback device lives outside this crate. The shell binds each
//! card to a `TracingDevice`, which records every command in the log.

use tracing::debug;

/// Playback controls a hover controller needs
pub trait AudioDevice {
    /// Begin playback from the start of the clip
    fn start(&mut self) -> Result<(), DeviceError>;

    /// Seek back to the start of the clip without interrupting playback
    fn rewind(&mut self);

    /// Set the playback rate, 1.0 being normal speed
    fn set_rate(&mut self, rate: f64);

    /// Set the output volume in `0.0..=1.0`
    fn set_volume(&mut self, volume: f64);

    /// Pause playback and release the device
    fn stop(&mut self);
}

/// Errors that can occur when starting playback
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("playback denied by the environment: {0}")]
    Denied(String),

    #[error("audio device unavailable: {0}")]
    Unavailable(String),
}

/// Device stand-in that logs commands instead of producing sound
#[derive(Debug)]
pub struct TracingDevice {
    name: String,
    /// Refuse every `start`, like a browser blocking autoplay
    denied: bool,
    playing: bool,
    rate: f64,
    volume: f64,
}

impl TracingDevice {
    pub fn new(name: impl Into<String>, denied: bool) -> Self {
        Self {
            name: name.into(),
            denied,
            playing: false,
            rate: 1.0,
            volume: 1.0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }
}

impl AudioDevice for TracingDevice {
    fn start(&mut self) -> Result<(), DeviceError> {
        if self.denied {
            return Err(DeviceError::Denied(
                "playback requires a prior user gesture".to_string(),
            ));
        }
        self.playing = true;
        debug!(device = %self.name, "playback started");
        Ok(())
    }

    fn rewind(&mut self) {
        debug!(device = %self.name, "playback rewound");
    }

    fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
        debug!(device = %self.name, rate, "playback rate set");
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
        debug!(device = %self.name, volume, "volume set");
    }

    fn stop(&mut self) {
        if self.playing {
            debug!(device = %self.name, "playback stopped");
        }
        self.playing = false;
    }
}

#[cfg(test)]
pub mod testing {
    //! Recording device for controller tests

    use std::sync::{Arc, Mutex};

    use super::{AudioDevice, DeviceError};

    /// Everything a `RecordingDevice` was asked to do
    #[derive(Debug, Default, Clone)]
    pub struct DeviceLog {
        pub starts: usize,
        pub rewinds: usize,
        pub stops: usize,
        pub rates: Vec<f64>,
        pub volumes: Vec<f64>,
        pub playing: bool,
    }

    /// Device whose log stays readable after it moves into a controller
    #[derive(Debug, Clone, Default)]
    pub struct RecordingDevice {
        log: Arc<Mutex<DeviceLog>>,
        fail_start: bool,
    }

    impl RecordingDevice {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                fail_start: true,
                ..Self::default()
            }
        }

        pub fn log(&self) -> DeviceLog {
            self.log.lock().unwrap().clone()
        }
    }

    impl AudioDevice for RecordingDevice {
        fn start(&mut self) -> Result<(), DeviceError> {
            let mut log = self.log.lock().unwrap();
            log.starts += 1;
            if self.fail_start {
                return Err(DeviceError::Unavailable("no output device".to_string()));
            }
            log.playing = true;
            Ok(())
        }

        fn rewind(&mut self) {
            self.log.lock().unwrap().rewinds += 1;
        }

        fn set_rate(&mut self, rate: f64) {
            self.log.lock().unwrap().rates.push(rate);
        }

        fn set_volume(&mut self, volume: f64) {
            self.log.lock().unwrap().volumes.push(volume);
        }

        fn stop(&mut self) {
            let mut log = self.log.lock().unwrap();
            log.stops += 1;
            log.playing = false;
        }
    }
}
