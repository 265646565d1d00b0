//! Captured frame storage.
//!
//! A [`FrameBuffer`] owns the pixels of exactly one frame. It is created by a
//! backend, then moved to whoever asked for the frame: the caller of a
//! single-shot capture, or the frame callback in continuous mode.

mod buffer;
mod pixel;

pub use buffer::FrameBuffer;
pub use pixel::Pixel;
