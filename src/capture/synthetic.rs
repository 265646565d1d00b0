//! Synthetic camera backend.
//!
//! Generates deterministic frames without any hardware, for the command-line
//! demo and for tests. Frames are NOT meaningful images, only data of the
//! right shape.

use super::backend::CameraBackend;
use super::config::CaptureConfig;
use crate::error::BackendError;
use crate::frame::{FrameBuffer, Pixel};
use std::marker::PhantomData;
use std::time::{Duration, Instant};

/// Backend producing gradient frames of a configured size.
///
/// When pacing is on, consecutive captures are spaced at the configured
/// frame rate, like a real sensor blocking on its next exposure.
#[derive(Debug)]
pub struct SyntheticCamera<P: Pixel = u8> {
    config: CaptureConfig,
    open: bool,
    sequence: u64,
    fail_after: Option<u64>,
    pace: bool,
    last_capture: Option<Instant>,
    _pixel: PhantomData<P>,
}

impl<P: Pixel> SyntheticCamera<P> {
    /// Creates a paced synthetic camera with the given configuration.
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            open: false,
            sequence: 0,
            fail_after: None,
            pace: true,
            last_capture: None,
            _pixel: PhantomData,
        }
    }

    /// Makes every capture after the first `frames` fail.
    pub fn fail_after(mut self, frames: u64) -> Self {
        self.fail_after = Some(frames);
        self
    }

    /// Enables or disables frame-rate pacing.
    pub fn with_pacing(mut self, pace: bool) -> Self {
        self.pace = pace;
        self
    }

    /// Returns the configuration as last set through the hooks.
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Returns the number of frames produced so far.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns true once the initialization hook has succeeded.
    pub fn is_open(&self) -> bool {
        self.open
    }

    fn wait_for_next_frame(&mut self) {
        if let Some(last) = self.last_capture {
            let interval = Duration::from_secs_f64(1.0 / self.config.frame_rate_hz);
            let elapsed = last.elapsed();
            if elapsed < interval {
                std::thread::sleep(interval - elapsed);
            }
        }
        self.last_capture = Some(Instant::now());
    }
}

impl<P: Pixel> CameraBackend for SyntheticCamera<P> {
    type Pixel = P;

    fn handle_initialize(&mut self) -> Result<(), BackendError> {
        self.config
            .validate()
            .map_err(|e| BackendError::new(format!("invalid configuration: {e}")))?;
        if self.config.bit_depth as usize != P::BYTE_WIDTH * 8 {
            return Err(BackendError::new(format!(
                "configured bit depth {} does not match {}-byte pixels",
                self.config.bit_depth,
                P::BYTE_WIDTH
            )));
        }
        self.open = true;
        self.sequence = 0;
        tracing::info!(
            width = self.config.width,
            height = self.config.height,
            bit_depth = self.config.bit_depth,
            "SyntheticCamera opened"
        );
        Ok(())
    }

    fn handle_set_gain(&mut self, gain: i32) -> Result<(), BackendError> {
        if !(0..=100).contains(&gain) {
            return Err(format!("gain {gain}% out of range 0-100").into());
        }
        self.config.gain = gain;
        Ok(())
    }

    fn handle_set_exposure(&mut self, exposure: f64) -> Result<(), BackendError> {
        if !(exposure > 0.0) {
            return Err(format!("exposure {exposure}s must be positive").into());
        }
        self.config.exposure_s = exposure;
        Ok(())
    }

    fn handle_set_rate(&mut self, frame_rate: f64) -> Result<(), BackendError> {
        if !(frame_rate > 0.0 && frame_rate <= super::config::MAX_FRAME_RATE_HZ) {
            return Err(format!("frame rate {frame_rate}Hz out of range").into());
        }
        self.config.frame_rate_hz = frame_rate;
        Ok(())
    }

    fn handle_capture_one(&mut self) -> Result<FrameBuffer<P>, BackendError> {
        if let Some(limit) = self.fail_after {
            if self.sequence >= limit {
                return Err(format!("synthetic failure after {limit} frames").into());
            }
        }
        if self.pace {
            self.wait_for_next_frame();
        }

        let (width, height) = (self.config.width, self.config.height);
        let sequence = self.sequence;
        let pixels = (0..height).flat_map(|y| {
            (0..width).map(move |x| {
                // Diagonal gradient shifted by one step per frame.
                let level = (u64::from(x) + u64::from(y) + sequence) % 256;
                P::from_intensity(level as u8)
            })
        });

        let mut frame = FrameBuffer::new(width, height);
        frame.assign_iter(pixels)?;
        self.sequence += 1;
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> CaptureConfig {
        CaptureConfig::with_dimensions(4, 2)
    }

    #[test]
    fn test_synthetic_frames() {
        let mut camera = SyntheticCamera::<u8>::new(small_config()).with_pacing(false);
        camera.handle_initialize().unwrap();
        assert!(camera.is_open());

        let frame = camera.handle_capture_one().unwrap();
        assert_eq!(frame.dimensions(), (4, 2));
        assert_eq!(frame.data(), &[0, 1, 2, 3, 1, 2, 3, 4]);

        let frame = camera.handle_capture_one().unwrap();
        assert_eq!(frame.pixel_at(0, 0), Some(1));
        assert_eq!(camera.sequence(), 2);
    }

    #[test]
    fn test_fail_after() {
        let mut camera = SyntheticCamera::<u8>::new(small_config())
            .with_pacing(false)
            .fail_after(1);
        camera.handle_initialize().unwrap();

        assert!(camera.handle_capture_one().is_ok());
        let err = camera.handle_capture_one().unwrap_err();
        assert_eq!(err.message(), "synthetic failure after 1 frames");
    }

    #[test]
    fn test_bit_depth_must_match_pixel_type() {
        let mut camera = SyntheticCamera::<u16>::new(small_config());
        assert!(camera.handle_initialize().is_err());

        let mut config = small_config();
        config.bit_depth = 16;
        let mut camera = SyntheticCamera::<u16>::new(config);
        assert!(camera.handle_initialize().is_ok());
    }

    #[test]
    fn test_parameter_ranges() {
        let mut camera = SyntheticCamera::<u8>::new(small_config());

        camera.handle_set_gain(50).unwrap();
        camera.handle_set_exposure(0.5).unwrap();
        camera.handle_set_rate(60.0).unwrap();
        assert_eq!(camera.config().gain, 50);
        assert_eq!(camera.config().exposure_s, 0.5);
        assert_eq!(camera.config().frame_rate_hz, 60.0);

        assert!(camera.handle_set_gain(-1).is_err());
        assert!(camera.handle_set_exposure(0.0).is_err());
        assert!(camera.handle_set_rate(500.0).is_err());
        assert_eq!(camera.config().gain, 50);
    }
}
