//! Error types shared by the device state machine and frame buffers.

use thiserror::Error;

/// Opaque error message reported by a camera backend.
///
/// Backends build these from plain strings, or convert a [`CameraError`]
/// (for example a failed [`FrameBuffer::assign`](crate::FrameBuffer::assign))
/// with `?`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BackendError(String);

impl BackendError {
    /// Creates a backend error carrying the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Returns the message reported by the backend.
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BackendError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for BackendError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<CameraError> for BackendError {
    fn from(err: CameraError) -> Self {
        Self(err.to_string())
    }
}

/// Errors returned by camera and frame buffer operations.
#[derive(Debug, Error)]
pub enum CameraError {
    /// An operation was called before a successful `initialize`.
    #[error("camera has not been properly initialized")]
    NotInitialized,
    /// Configuration or single-shot capture was attempted while running.
    #[error("camera is currently running; stop capture first")]
    DeviceBusy,
    /// Frame data did not match the buffer's dimensions.
    #[error("mismatch between input data and frame buffer size: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Element count the buffer requires.
        expected: usize,
        /// Element count that was supplied.
        actual: usize,
    },
    /// A backend hook reported an error.
    #[error("backend failure: {0}")]
    BackendFailure(#[from] BackendError),
    /// The capture worker panicked in a hook or callback.
    #[error("capture worker panicked")]
    WorkerPanicked,
    /// The capture worker thread could not be spawned.
    #[error("failed to spawn capture worker: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Result type for camera operations.
pub type Result<T> = std::result::Result<T, CameraError>;
