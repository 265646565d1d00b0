//! Backend hook contract.
//!
//! A backend is the vendor-specific half of a camera. [`CameraDevice`]
//! owns one and calls these hooks only after its own precondition checks
//! have passed, so implementations never need to track lifecycle state.
//!
//! [`CameraDevice`]: super::CameraDevice

use crate::error::BackendError;
use crate::frame::{FrameBuffer, Pixel};
use std::fmt;

/// Hooks implemented by a concrete camera driver.
///
/// Hooks run on the caller's thread, except `handle_capture_one`, which also
/// runs on the capture worker during continuous capture. The device never
/// calls two hooks at the same time.
pub trait CameraBackend: Send + 'static {
    /// Pixel element type this camera produces.
    type Pixel: Pixel;

    /// Opens and prepares the hardware. Called at most once successfully.
    fn handle_initialize(&mut self) -> Result<(), BackendError>;

    /// Sets the sensor gain in percent.
    fn handle_set_gain(&mut self, gain: i32) -> Result<(), BackendError>;

    /// Sets the exposure time in seconds.
    fn handle_set_exposure(&mut self, exposure: f64) -> Result<(), BackendError>;

    /// Sets the frame rate in Hz.
    fn handle_set_rate(&mut self, frame_rate: f64) -> Result<(), BackendError>;

    /// Captures a single frame. Blocking.
    fn handle_capture_one(&mut self) -> Result<FrameBuffer<Self::Pixel>, BackendError>;
}

/// A configurable camera parameter and its new value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parameter {
    /// Gain in percent.
    Gain(i32),
    /// Exposure time in seconds.
    Exposure(f64),
    /// Frame rate in Hz.
    FrameRate(f64),
}

impl Parameter {
    /// Forwards this parameter to the matching backend hook.
    pub(crate) fn apply<B: CameraBackend>(self, backend: &mut B) -> Result<(), BackendError> {
        match self {
            Self::Gain(gain) => backend.handle_set_gain(gain),
            Self::Exposure(exposure) => backend.handle_set_exposure(exposure),
            Self::FrameRate(rate) => backend.handle_set_rate(rate),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gain(gain) => write!(f, "gain={gain}%"),
            Self::Exposure(exposure) => write!(f, "exposure={exposure}s"),
            Self::FrameRate(rate) => write!(f, "rate={rate}Hz"),
        }
    }
}
