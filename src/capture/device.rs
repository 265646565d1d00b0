//! Camera lifecycle state machine.
//!
//! [`CameraDevice`] wraps a [`CameraBackend`] and enforces the ordering rules
//! every camera shares, whatever the vendor:
//!
//! - nothing but `initialize` reaches the backend before initialization
//!   succeeds;
//! - parameters and single-shot captures are refused while continuous
//!   capture is running;
//! - at most one capture worker exists at a time, and `stop_capture` does not
//!   return until it has exited.
//!
//! # Continuous capture
//!
//! `start_capture` spawns a worker thread that calls the backend's capture
//! hook in a loop, handing each frame to the frame callback. The `running`
//! flag is the only cancellation signal: `stop_capture` clears it and joins
//! the worker, which exits before starting its next iteration. A capture
//! failure clears the flag, is passed to the error callback and ends the
//! session; the device does not retry.
//!
//! Callbacks run on the worker, strictly one at a time. From inside a
//! callback only `stop_capture`, `is_running` and `is_initialized` are
//! meaningful: `stop_capture` clears the flag and returns immediately, the
//! other operations are refused with [`CameraError::DeviceBusy`].

use super::backend::{CameraBackend, Parameter};
use super::stats::DeviceStats;
use crate::error::{CameraError, Result};
use crate::frame::{FrameBuffer, Pixel};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};

/// Name given to capture worker threads.
const WORKER_THREAD_NAME: &str = "camera-capture";

type FrameCallback<P> = Box<dyn FnMut(FrameBuffer<P>) + Send>;
type ErrorCallback = Box<dyn FnMut(CameraError) + Send>;

struct Callbacks<P: Pixel> {
    on_frame: FrameCallback<P>,
    on_error: ErrorCallback,
}

impl<P: Pixel> Default for Callbacks<P> {
    fn default() -> Self {
        Self {
            on_frame: Box::new(|_| {}),
            on_error: Box::new(|_| {}),
        }
    }
}

/// State shared between the device and its capture worker.
struct Shared<B: CameraBackend> {
    initialized: AtomicBool,
    running: AtomicBool,
    backend: Mutex<B>,
    callbacks: Mutex<Callbacks<B::Pixel>>,
    worker_thread: Mutex<Option<ThreadId>>,
    stats: DeviceStats,
}

/// Lifecycle state only touched under the control lock.
#[derive(Default)]
struct Control {
    worker: Option<JoinHandle<()>>,
}

/// A camera driven through the uniform lifecycle contract.
///
/// All methods take `&self`; the device is `Send + Sync` and can be shared
/// behind an `Arc`. Lifecycle transitions are serialized internally.
///
/// Dropping the device stops continuous capture and joins the worker.
pub struct CameraDevice<B: CameraBackend> {
    shared: Arc<Shared<B>>,
    control: Mutex<Control>,
}

impl<B: CameraBackend> CameraDevice<B> {
    /// Wraps a backend. The device starts uninitialized and stopped.
    pub fn new(backend: B) -> Self {
        Self {
            shared: Arc::new(Shared {
                initialized: AtomicBool::new(false),
                running: AtomicBool::new(false),
                backend: Mutex::new(backend),
                callbacks: Mutex::new(Callbacks::default()),
                worker_thread: Mutex::new(None),
                stats: DeviceStats::default(),
            }),
            control: Mutex::new(Control::default()),
        }
    }

    /// Initializes the camera.
    ///
    /// `on_frame` receives every frame produced by continuous capture and
    /// `on_error` receives the error that ends a capture session. Both run on
    /// the capture worker.
    ///
    /// Calling this on an initialized device succeeds without doing anything.
    /// If the backend's initialization hook fails, the device stays
    /// uninitialized but keeps the callbacks; a later call replaces them.
    pub fn initialize<F, E>(&self, on_frame: F, on_error: E) -> Result<()>
    where
        F: FnMut(FrameBuffer<B::Pixel>) + Send + 'static,
        E: FnMut(CameraError) + Send + 'static,
    {
        if self.on_worker_thread() {
            return Ok(());
        }
        let _control = lock(&self.control);
        if self.is_initialized() {
            tracing::debug!("Camera already initialized");
            return Ok(());
        }

        *lock(&self.shared.callbacks) = Callbacks {
            on_frame: Box::new(on_frame),
            on_error: Box::new(on_error),
        };

        let result = lock(&self.shared.backend).handle_initialize();
        if let Err(err) = result {
            tracing::warn!(error = %err, "Camera initialization failed");
            return Err(err.into());
        }

        self.shared.initialized.store(true, Ordering::Release);
        tracing::info!("Camera initialized");
        Ok(())
    }

    /// Sets a camera parameter.
    ///
    /// Fails with [`CameraError::NotInitialized`] before initialization and
    /// [`CameraError::DeviceBusy`] during continuous capture; otherwise
    /// returns the backend's verdict.
    pub fn set_parameter(&self, parameter: Parameter) -> Result<()> {
        let _control = self.idle_control()?;

        let result = parameter.apply(&mut *lock(&self.shared.backend));
        match result {
            Ok(()) => {
                self.shared.stats.record_parameter();
                tracing::debug!(%parameter, "Camera parameter set");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%parameter, error = %err, "Camera rejected parameter");
                Err(err.into())
            }
        }
    }

    /// Sets the gain in percent.
    pub fn set_gain(&self, gain: i32) -> Result<()> {
        self.set_parameter(Parameter::Gain(gain))
    }

    /// Sets the exposure time in seconds.
    pub fn set_exposure(&self, exposure: f64) -> Result<()> {
        self.set_parameter(Parameter::Exposure(exposure))
    }

    /// Sets the frame rate in Hz.
    pub fn set_rate(&self, frame_rate: f64) -> Result<()> {
        self.set_parameter(Parameter::FrameRate(frame_rate))
    }

    /// Captures one frame on the calling thread. Blocking.
    pub fn capture_one(&self) -> Result<FrameBuffer<B::Pixel>> {
        let _control = self.idle_control()?;

        let frame = lock(&self.shared.backend).handle_capture_one()?;
        self.shared.stats.record_single_capture();
        tracing::debug!(
            width = frame.width(),
            height = frame.height(),
            "Single frame captured"
        );
        Ok(frame)
    }

    /// Starts continuous capture on a background worker. Non-blocking.
    ///
    /// Succeeds without spawning anything if capture is already running.
    /// Reports [`CameraError::WorkerPanicked`] once if the previous session's
    /// worker panicked; the next call starts normally.
    pub fn start_capture(&self) -> Result<()> {
        if self.on_worker_thread() {
            return Err(CameraError::DeviceBusy);
        }
        let mut control = lock(&self.control);
        if !self.is_initialized() {
            return Err(CameraError::NotInitialized);
        }
        if self.is_running() {
            tracing::debug!("Continuous capture already running");
            return Ok(());
        }

        // A session that ended on a capture error leaves a finished worker.
        reap_worker(&mut control)?;

        self.shared.running.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_owned())
            .spawn(move || capture_loop(&shared));

        match spawned {
            Ok(handle) => {
                control.worker = Some(handle);
                self.shared.stats.record_session();
                tracing::info!(
                    session = self.shared.stats.sessions_started(),
                    "Continuous capture started"
                );
                Ok(())
            }
            Err(err) => {
                self.shared.running.store(false, Ordering::Release);
                tracing::error!(error = %err, "Failed to spawn capture worker");
                Err(CameraError::Spawn(err))
            }
        }
    }

    /// Stops continuous capture and waits for the worker to exit.
    ///
    /// Blocks for as long as the backend's in-flight capture takes; there is
    /// no timeout. When called from inside a callback it only clears the
    /// running flag, and the worker exits once the callback returns.
    pub fn stop_capture(&self) -> Result<()> {
        if self.on_worker_thread() {
            self.shared.running.store(false, Ordering::Release);
            tracing::debug!("Capture stop requested from callback");
            return Ok(());
        }
        let mut control = lock(&self.control);
        if !self.is_initialized() {
            return Err(CameraError::NotInitialized);
        }

        let was_running = self.shared.running.swap(false, Ordering::AcqRel);
        reap_worker(&mut control)?;
        if was_running {
            tracing::info!(
                frames = self.shared.stats.frames_delivered(),
                "Continuous capture stopped"
            );
        }
        Ok(())
    }

    /// Returns true once initialization has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.shared.initialized.load(Ordering::Acquire)
    }

    /// Returns true while continuous capture is running.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Returns the device's activity counters.
    pub fn stats(&self) -> &DeviceStats {
        &self.shared.stats
    }

    /// Runs `f` with shared access to the backend.
    ///
    /// Waits for any in-flight backend call to finish first.
    pub fn inspect_backend<R>(&self, f: impl FnOnce(&B) -> R) -> R {
        f(&lock(&self.shared.backend))
    }

    /// Takes the control lock after checking that configuration and
    /// single-shot capture are allowed.
    fn idle_control(&self) -> Result<MutexGuard<'_, Control>> {
        if self.on_worker_thread() {
            return Err(CameraError::DeviceBusy);
        }
        let control = lock(&self.control);
        if !self.is_initialized() {
            return Err(CameraError::NotInitialized);
        }
        if self.is_running() {
            return Err(CameraError::DeviceBusy);
        }
        Ok(control)
    }

    fn on_worker_thread(&self) -> bool {
        *lock(&self.shared.worker_thread) == Some(thread::current().id())
    }
}

impl<B: CameraBackend> Drop for CameraDevice<B> {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        let control = self
            .control
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = control.worker.take() {
            // The last handle can be dropped from a callback.
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                tracing::warn!("Capture worker panicked before device was dropped");
            }
        }
    }
}

/// Body of the capture worker.
fn capture_loop<B: CameraBackend>(shared: &Shared<B>) {
    *lock(&shared.worker_thread) = Some(thread::current().id());
    let _guard = ClearOnPanic(&shared.running);
    tracing::debug!("Capture worker started");

    while shared.running.load(Ordering::Acquire) {
        let captured = lock(&shared.backend).handle_capture_one();
        match captured {
            Ok(frame) => {
                let delivered = shared.stats.record_frame();
                tracing::trace!(delivered, "Delivering frame");
                let mut callbacks = lock(&shared.callbacks);
                (callbacks.on_frame)(frame);
            }
            Err(err) => {
                shared.stats.record_error();
                // Cleared before the callback so it already sees the session as stopped.
                shared.running.store(false, Ordering::Release);
                tracing::warn!(error = %err, "Capture failed, continuous capture stopped");
                let mut callbacks = lock(&shared.callbacks);
                (callbacks.on_error)(CameraError::BackendFailure(err));
                break;
            }
        }
    }

    tracing::debug!("Capture worker exited");
}

/// Joins a finished or stopping worker, if there is one.
fn reap_worker(control: &mut Control) -> Result<()> {
    let Some(handle) = control.worker.take() else {
        return Ok(());
    };
    handle.join().map_err(|_| {
        tracing::error!("Capture worker panicked");
        CameraError::WorkerPanicked
    })
}

/// Clears the running flag if the worker unwinds.
struct ClearOnPanic<'a>(&'a AtomicBool);

impl Drop for ClearOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.store(false, Ordering::Release);
        }
    }
}

/// Locks a mutex, recovering the data if a callback panicked while holding it.
fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
