//! Frame buffer holding one captured image.

use super::Pixel;
use crate::error::{CameraError, Result};
use chrono::{DateTime, Utc};

/// A single captured frame: pixel data, dimensions and capture time.
///
/// The dimensions are fixed at construction. Every `assign*` method checks
/// the input against `width * height` before touching the stored pixels, so
/// a rejected assignment leaves the buffer exactly as it was. A successful
/// assignment refreshes the capture timestamp.
#[derive(Clone)]
pub struct FrameBuffer<P: Pixel = u8> {
    width: u32,
    height: u32,
    pixels: Vec<P>,
    captured_at: Option<DateTime<Utc>>,
}

impl<P: Pixel> FrameBuffer<P> {
    /// Creates an empty buffer with the given dimensions.
    ///
    /// Nothing is allocated until pixel data is assigned.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: Vec::new(),
            captured_at: None,
        }
    }

    /// Creates a buffer and fills it with `pixels` in one step.
    pub fn with_pixels(width: u32, height: u32, pixels: Vec<P>) -> Result<Self> {
        let mut frame = Self::new(width, height);
        frame.assign_vec(pixels)?;
        Ok(frame)
    }

    /// Copies `declared_count` pixels from `data` into the buffer.
    ///
    /// Fails with [`CameraError::SizeMismatch`] if `declared_count` is not
    /// `width * height`, or if `data` is shorter than `declared_count`.
    pub fn assign(&mut self, data: &[P], declared_count: usize) -> Result<()> {
        self.check_len(declared_count, self.pixel_count())?;
        let pixels = data.get(..declared_count).ok_or(CameraError::SizeMismatch {
            expected: declared_count,
            actual: data.len(),
        })?;
        self.replace(pixels.to_vec());
        Ok(())
    }

    /// Assigns untyped bytes, decoded in native byte order.
    ///
    /// The byte count must equal `width * height * P::BYTE_WIDTH`.
    pub fn assign_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.check_len(bytes.len(), self.byte_len())?;
        self.replace(P::decode_ne(bytes));
        Ok(())
    }

    /// Assigns a typed pixel slice.
    pub fn assign_slice(&mut self, pixels: &[P]) -> Result<()> {
        self.assign(pixels, pixels.len())
    }

    /// Assigns an owned pixel vector without copying it.
    pub fn assign_vec(&mut self, pixels: Vec<P>) -> Result<()> {
        self.check_len(pixels.len(), self.pixel_count())?;
        self.replace(pixels);
        Ok(())
    }

    /// Assigns pixels from any iterable container.
    pub fn assign_iter<I>(&mut self, pixels: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
    {
        self.assign_vec(pixels.into_iter().collect())
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns when the pixel data was last assigned, if ever.
    #[inline]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.captured_at
    }

    /// Returns a read-only view of the pixel data.
    #[inline]
    pub fn data(&self) -> &[P] {
        &self.pixels
    }

    /// Consumes the frame and returns its pixel data.
    pub fn into_pixels(self) -> Vec<P> {
        self.pixels
    }

    /// Returns the pixel at `(x, y)`, or `None` if out of bounds or unpopulated.
    pub fn pixel_at(&self, x: u32, y: u32) -> Option<P> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        self.pixels.get(index).copied()
    }

    /// Returns the total number of pixels (width * height).
    ///
    /// Saturates at `usize::MAX` on targets too small to hold the product.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// Returns the size of one pixel element in bytes.
    #[inline]
    pub fn pixel_width(&self) -> usize {
        P::BYTE_WIDTH
    }

    /// Returns true once pixel data has been assigned.
    pub fn is_populated(&self) -> bool {
        self.captured_at.is_some()
    }

    fn byte_len(&self) -> usize {
        self.pixel_count().saturating_mul(P::BYTE_WIDTH)
    }

    fn check_len(&self, actual: usize, expected: usize) -> Result<()> {
        if actual != expected {
            return Err(CameraError::SizeMismatch { expected, actual });
        }
        Ok(())
    }

    fn replace(&mut self, pixels: Vec<P>) {
        self.pixels = pixels;
        self.captured_at = Some(Utc::now());
    }
}

impl<P: Pixel> std::fmt::Debug for FrameBuffer<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixel_width", &P::BYTE_WIDTH)
            .field("pixels", &self.pixels.len())
            .field("captured_at", &self.captured_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ARRAY_8: [u8; 9] = [0, 1, 2, 3, 4, 5, 6, 7, 8];
    const ARRAY_16: [u16; 9] = [11, 12, 13, 14, 15, 16, 17, 18, 19];

    #[test]
    fn test_new_buffer_dimensions() {
        let buffer_8 = FrameBuffer::<u8>::new(640, 480);
        let buffer_16 = FrameBuffer::<u16>::new(2048, 1024);

        assert_eq!(buffer_8.dimensions(), (640, 480));
        assert_eq!(buffer_16.dimensions(), (2048, 1024));
        assert_eq!(buffer_8.pixel_width(), 1);
        assert_eq!(buffer_16.pixel_width(), 2);
        assert!(buffer_8.data().is_empty());
        assert!(buffer_8.timestamp().is_none());
    }

    #[test]
    fn test_assign_matching_count() {
        let mut buffer = FrameBuffer::<u8>::new(3, 3);
        buffer.assign(&ARRAY_8, 9).unwrap();

        assert_eq!(buffer.data(), &ARRAY_8);
        assert!(buffer.is_populated());
    }

    #[test]
    fn test_assign_short_input_keeps_prior_contents() {
        let mut buffer = FrameBuffer::<u8>::new(3, 3);
        buffer.assign_slice(&ARRAY_8).unwrap();
        let stamp = buffer.timestamp();

        let err = buffer.assign_slice(&ARRAY_8[..8]).unwrap_err();

        assert!(matches!(
            err,
            CameraError::SizeMismatch {
                expected: 9,
                actual: 8
            }
        ));
        assert_eq!(buffer.data(), &ARRAY_8);
        assert_eq!(buffer.timestamp(), stamp);
    }

    #[test]
    fn test_assign_zero_declared_count() {
        let mut buffer = FrameBuffer::<u8>::new(3, 3);
        let err = buffer.assign(&ARRAY_8, 0).unwrap_err();

        assert_eq!(
            err.to_string(),
            "mismatch between input data and frame buffer size: expected 9, got 0"
        );
        assert!(!buffer.is_populated());
    }

    #[test]
    fn test_assign_declared_count_exceeds_data() {
        let mut buffer = FrameBuffer::<u8>::new(3, 3);
        let err = buffer.assign(&ARRAY_8[..4], 9).unwrap_err();

        assert!(matches!(
            err,
            CameraError::SizeMismatch {
                expected: 9,
                actual: 4
            }
        ));
    }

    #[test]
    fn test_every_input_shape_8_bit() {
        let mut buffer = FrameBuffer::<u8>::new(3, 3);

        buffer.assign_bytes(&ARRAY_8).unwrap();
        assert_eq!(buffer.data(), &ARRAY_8);

        buffer.assign_bytes(b"\x00\x01\x02\x03\x04\x05\x06\x07\x08").unwrap();
        assert_eq!(buffer.data(), &ARRAY_8);

        buffer.assign_slice(&ARRAY_8).unwrap();
        assert_eq!(buffer.data(), &ARRAY_8);

        buffer.assign_vec(ARRAY_8.to_vec()).unwrap();
        assert_eq!(buffer.data(), &ARRAY_8);

        buffer.assign_iter(ARRAY_8.iter().copied()).unwrap();
        assert_eq!(buffer.data(), &ARRAY_8);
    }

    #[test]
    fn test_every_input_shape_16_bit() {
        let bytes: Vec<u8> = ARRAY_16.iter().flat_map(|v| v.to_ne_bytes()).collect();
        let mut buffer = FrameBuffer::<u16>::new(3, 3);

        buffer.assign_bytes(&bytes).unwrap();
        assert_eq!(buffer.data(), &ARRAY_16);

        buffer.assign_slice(&ARRAY_16).unwrap();
        assert_eq!(buffer.data(), &ARRAY_16);

        buffer.assign_vec(ARRAY_16.to_vec()).unwrap();
        assert_eq!(buffer.data(), &ARRAY_16);

        buffer.assign_iter(ARRAY_16).unwrap();
        assert_eq!(buffer.data(), &ARRAY_16);
    }

    #[test]
    fn test_bytes_use_pixel_width() {
        let mut buffer = FrameBuffer::<u16>::new(3, 3);

        // 9 bytes is 9 elements of u8 but only 4.5 of u16.
        let err = buffer.assign_bytes(&ARRAY_8).unwrap_err();
        assert!(matches!(
            err,
            CameraError::SizeMismatch {
                expected: 18,
                actual: 9
            }
        ));
    }

    #[test]
    fn test_assign_refreshes_timestamp() {
        let mut buffer = FrameBuffer::<u8>::new(3, 3);
        let before = Utc::now();
        buffer.assign_slice(&ARRAY_8).unwrap();
        let first = buffer.timestamp().unwrap();
        assert!(first >= before);

        buffer.assign_slice(&ARRAY_8).unwrap();
        assert!(buffer.timestamp().unwrap() >= first);
    }

    #[test]
    fn test_huge_dimensions_reject_without_allocating() {
        let mut buffer = FrameBuffer::<u16>::new(u32::MAX, u32::MAX);
        assert!(buffer.data().is_empty());

        let err = buffer.assign_slice(&ARRAY_16[..8]).unwrap_err();
        assert!(matches!(err, CameraError::SizeMismatch { actual: 8, .. }));

        let err = buffer.assign_bytes(&ARRAY_8).unwrap_err();
        assert!(matches!(err, CameraError::SizeMismatch { actual: 9, .. }));
        assert!(!buffer.is_populated());
    }

    #[test]
    fn test_pixel_at() {
        let frame = FrameBuffer::with_pixels(3, 3, ARRAY_8.to_vec()).unwrap();

        assert_eq!(frame.pixel_at(0, 0), Some(0));
        assert_eq!(frame.pixel_at(2, 1), Some(5));
        assert_eq!(frame.pixel_at(3, 0), None);
        assert_eq!(frame.pixel_at(0, 3), None);
    }

    proptest! {
        #[test]
        fn prop_assign_accepts_only_exact_count(
            width in 1u32..16,
            height in 1u32..16,
            len in 0usize..300,
        ) {
            let mut buffer = FrameBuffer::<u16>::new(width, height);
            let prior: Vec<u16> = (0..buffer.pixel_count() as u16).collect();
            buffer.assign_slice(&prior).unwrap();

            let input: Vec<u16> = (0..len).map(|i| (i as u16).wrapping_mul(7)).collect();
            let result = buffer.assign_slice(&input);

            if len == (width * height) as usize {
                prop_assert!(result.is_ok());
                prop_assert_eq!(buffer.data(), input.as_slice());
            } else {
                prop_assert!(
                    matches!(result, Err(CameraError::SizeMismatch { .. })),
                    "expected size mismatch"
                );
                prop_assert_eq!(buffer.data(), prior.as_slice());
            }
        }
    }
}
