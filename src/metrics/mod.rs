//! Prometheus metrics exporter for camera monitoring.
//!
//! # Metrics Exposed
//!
//! ## Lifecycle
//! - `camera_interface_initialized` - Initialization status (1=initialized)
//! - `camera_interface_running` - Continuous capture status (1=running)
//! - `camera_interface_sessions_total` - Continuous-capture sessions started
//!
//! ## Capture
//! - `camera_interface_frames_total` - Frames delivered to the frame callback
//! - `camera_interface_capture_errors_total` - Capture errors that ended a session
//! - `camera_interface_single_captures_total` - Successful single-shot captures
//! - `camera_interface_parameter_changes_total` - Parameters accepted by the backend
//!
//! # Example
//!
//! ```no_run
//! use camera_interface::capture::{CameraDevice, CaptureConfig, SyntheticCamera};
//! use camera_interface::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let device = CameraDevice::new(SyntheticCamera::<u8>::new(CaptureConfig::default()));
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! registry.update(&MetricsSnapshot::from_device(&device));
//! println!("{}", registry.encode().expect("Failed to encode metrics"));
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, ServerError, SnapshotSource};
