//! Camera lifecycle and backend contract.
//!
//! This module provides the device state machine that drives any backend
//! through initialization, configuration, single-shot capture and
//! continuous capture, plus the hook trait backends implement.

mod backend;
mod config;
mod device;
mod stats;
mod synthetic;

pub use backend::{CameraBackend, Parameter};
pub use config::{CaptureConfig, ConfigError, FileConfig, OutputConfig, MAX_FRAME_RATE_HZ};
pub use device::CameraDevice;
pub use stats::DeviceStats;
pub use synthetic::SyntheticCamera;
