//! Hover feedback for project cards
//!
//! Each card owns one controller and one audio device. The controller ramps
//! the playback rate while the pointer stays over the card and fades the
//! volume out once it leaves.

mod controller;
mod device;

pub use controller::{HoverIntensityController, HoverState, PointerEvent};
pub use device::{AudioDevice, DeviceError, TracingDevice};

#[cfg(test)]
pub use device::testing;
