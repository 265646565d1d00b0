//! Metrics collection and registry.

use crate::capture::DeviceStats;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of device state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Whether the device has been initialized.
    pub initialized: bool,
    /// Whether continuous capture is running.
    pub running: bool,
    /// Continuous-capture sessions started.
    pub sessions_started: u64,
    /// Frames delivered to the frame callback.
    pub frames_delivered: u64,
    /// Capture errors that ended a session.
    pub capture_errors: u64,
    /// Successful single-shot captures.
    pub single_captures: u64,
    /// Parameters accepted by the backend.
    pub parameter_changes: u64,
}

/// Prometheus metrics registry for camera monitoring.
pub struct MetricsRegistry {
    registry: Registry,

    // Lifecycle metrics
    initialized: IntGauge,
    running: IntGauge,
    sessions_total: IntCounter,

    // Capture metrics
    frames_total: IntCounter,
    capture_errors_total: IntCounter,
    single_captures_total: IntCounter,
    parameter_changes_total: IntCounter,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all camera metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let initialized = IntGauge::new(
            "camera_interface_initialized",
            "Device initialization status (1=initialized, 0=not initialized)",
        )?;
        let running = IntGauge::new(
            "camera_interface_running",
            "Continuous capture status (1=running, 0=stopped)",
        )?;
        let sessions_total = IntCounter::new(
            "camera_interface_sessions_total",
            "Total continuous-capture sessions started",
        )?;
        let frames_total = IntCounter::new(
            "camera_interface_frames_total",
            "Total frames delivered to the frame callback",
        )?;
        let capture_errors_total = IntCounter::new(
            "camera_interface_capture_errors_total",
            "Total capture errors that ended a session",
        )?;
        let single_captures_total = IntCounter::new(
            "camera_interface_single_captures_total",
            "Total successful single-shot captures",
        )?;
        let parameter_changes_total = IntCounter::new(
            "camera_interface_parameter_changes_total",
            "Total parameters accepted by the backend",
        )?;

        registry.register(Box::new(initialized.clone()))?;
        registry.register(Box::new(running.clone()))?;
        registry.register(Box::new(sessions_total.clone()))?;
        registry.register(Box::new(frames_total.clone()))?;
        registry.register(Box::new(capture_errors_total.clone()))?;
        registry.register(Box::new(single_captures_total.clone()))?;
        registry.register(Box::new(parameter_changes_total.clone()))?;

        Ok(Self {
            registry,
            initialized,
            running,
            sessions_total,
            frames_total,
            capture_errors_total,
            single_captures_total,
            parameter_changes_total,
        })
    }

    /// Updates all metrics from a snapshot of device state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.initialized.set(i64::from(snapshot.initialized));
        self.running.set(i64::from(snapshot.running));

        // Counters only move forward, so add the difference.
        advance(&self.sessions_total, snapshot.sessions_started);
        advance(&self.frames_total, snapshot.frames_delivered);
        advance(&self.capture_errors_total, snapshot.capture_errors);
        advance(&self.single_captures_total, snapshot.single_captures);
        advance(&self.parameter_changes_total, snapshot.parameter_changes);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

impl MetricsSnapshot {
    /// Creates a snapshot from a device's counters and state flags.
    pub fn from_stats(stats: &DeviceStats, initialized: bool, running: bool) -> Self {
        Self {
            initialized,
            running,
            sessions_started: stats.sessions_started(),
            frames_delivered: stats.frames_delivered(),
            capture_errors: stats.capture_errors(),
            single_captures: stats.single_captures(),
            parameter_changes: stats.parameter_changes(),
        }
    }

    /// Creates a snapshot of a device.
    pub fn from_device<B: crate::capture::CameraBackend>(
        device: &crate::capture::CameraDevice<B>,
    ) -> Self {
        Self::from_stats(device.stats(), device.is_initialized(), device.is_running())
    }
}
