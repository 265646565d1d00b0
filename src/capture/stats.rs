//! Per-device activity counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by a [`CameraDevice`](super::CameraDevice) as it runs.
///
/// Read them at any time from any thread; they feed the metrics exporter.
#[derive(Debug, Default)]
pub struct DeviceStats {
    sessions_started: AtomicU64,
    frames_delivered: AtomicU64,
    capture_errors: AtomicU64,
    single_captures: AtomicU64,
    parameter_changes: AtomicU64,
}

impl DeviceStats {
    /// Continuous-capture sessions started.
    pub fn sessions_started(&self) -> u64 {
        self.sessions_started.load(Ordering::Relaxed)
    }

    /// Frames handed to the frame callback.
    pub fn frames_delivered(&self) -> u64 {
        self.frames_delivered.load(Ordering::Relaxed)
    }

    /// Capture failures reported through the error callback.
    pub fn capture_errors(&self) -> u64 {
        self.capture_errors.load(Ordering::Relaxed)
    }

    /// Successful single-shot captures.
    pub fn single_captures(&self) -> u64 {
        self.single_captures.load(Ordering::Relaxed)
    }

    /// Parameters accepted by the backend.
    pub fn parameter_changes(&self) -> u64 {
        self.parameter_changes.load(Ordering::Relaxed)
    }

    pub(crate) fn record_session(&self) {
        self.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_frame(&self) -> u64 {
        self.frames_delivered.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn record_error(&self) {
        self.capture_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_single_capture(&self) {
        self.single_captures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_parameter(&self) {
        self.parameter_changes.fetch_add(1, Ordering::Relaxed);
    }
}
