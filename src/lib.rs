//! Camera Interface Library
//!
//! A hardware-agnostic camera abstraction. Any camera driver that implements
//! the [`CameraBackend`] hooks can be driven through the same lifecycle:
//! initialize, configure, capture single frames, or stream frames from a
//! background worker to a callback.
//!
//! # Architecture
//!
//! ```text
//! caller → CameraDevice → precondition checks → CameraBackend hook
//!                 ↓
//!          capture worker → on_frame(FrameBuffer) / on_error(CameraError)
//! ```
//!
//! # Design Principles
//!
//! - **Ordering is enforced, not documented**: hooks are never reached out of
//!   lifecycle order
//! - **No exceptions across the boundary**: every operation returns a `Result`
//! - **One frame, one owner**: frames are moved, never shared between threads
//! - **No retry**: a failed capture ends the session and is reported once
//!
//! # Example
//!
//! ```no_run
//! use camera_interface::{CameraDevice, CaptureConfig, SyntheticCamera};
//!
//! let device = CameraDevice::new(SyntheticCamera::<u8>::new(CaptureConfig::default()));
//!
//! device
//!     .initialize(
//!         |frame| println!("frame {:?} at {:?}", frame.dimensions(), frame.timestamp()),
//!         |err| eprintln!("capture stopped: {err}"),
//!     )
//!     .unwrap();
//!
//! device.set_gain(10).unwrap();
//! let still = device.capture_one().unwrap();
//! assert_eq!(still.dimensions(), (640, 480));
//!
//! device.start_capture().unwrap();
//! std::thread::sleep(std::time::Duration::from_millis(100));
//! device.stop_capture().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod error;
pub mod frame;
pub mod metrics;

// Re-export commonly used types at crate root
pub use capture::{CameraBackend, CameraDevice, CaptureConfig, Parameter, SyntheticCamera};
pub use error::{BackendError, CameraError, Result};
pub use frame::{FrameBuffer, Pixel};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
