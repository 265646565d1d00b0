//! Pixel element types a frame buffer can hold.

use std::fmt::Debug;

/// A single pixel element stored in a [`FrameBuffer`](super::FrameBuffer).
///
/// Untyped byte input is decoded in native byte order, `BYTE_WIDTH` bytes
/// per element.
pub trait Pixel: Copy + Default + Debug + PartialEq + Send + 'static {
    /// Size of one pixel element in bytes.
    const BYTE_WIDTH: usize;

    /// Decodes a byte slice into pixels.
    ///
    /// The caller guarantees `bytes.len()` is a multiple of `BYTE_WIDTH`;
    /// trailing bytes are ignored otherwise.
    fn decode_ne(bytes: &[u8]) -> Vec<Self>;

    /// Converts an 8-bit intensity into this pixel type.
    fn from_intensity(value: u8) -> Self;
}

macro_rules! impl_pixel {
    ($($ty:ty),*) => {
        $(
            impl Pixel for $ty {
                const BYTE_WIDTH: usize = std::mem::size_of::<$ty>();

                fn decode_ne(bytes: &[u8]) -> Vec<Self> {
                    bytes
                        .chunks_exact(Self::BYTE_WIDTH)
                        .map(|chunk| {
                            let mut raw = [0u8; std::mem::size_of::<$ty>()];
                            raw.copy_from_slice(chunk);
                            <$ty>::from_ne_bytes(raw)
                        })
                        .collect()
                }

                fn from_intensity(value: u8) -> Self {
                    <$ty>::from(value)
                }
            }
        )*
    };
}

impl_pixel!(u8, u16, u32, f32);
