//! GIF output backend for the pictor canvas engine.
//!
//! Consumes RGBA8 frames (e.g. `Canvas2dContext::get_image_data`) and
//! produces single images or animations via the `gif` crate's NeuQuant
//! quantization. All failures are synchronous and local to the call.

use gif::{DisposalMethod, Encoder, Frame, Repeat};
use thiserror::Error;

/// Errors from GIF encoding operations.
#[derive(Debug, Error)]
pub enum GifError {
    /// Frame buffer length does not match width * height * 4.
    #[error("frame buffer length {actual} does not match {width}x{height} RGBA ({expected})")]
    FrameSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    /// `finish()` was called before any frame was added.
    #[error("cannot finish a GIF with zero frames")]
    NoFrames,
    /// The underlying encoder failed.
    #[error("GIF encoding error: {0}")]
    Encoding(String),
}

impl From<gif::EncodingError> for GifError {
    fn from(err: gif::EncodingError) -> Self {
        GifError::Encoding(err.to_string())
    }
}

/// Options for the animation encoder.
#[derive(Debug, Clone, Copy)]
pub struct GifEncoderOptions {
    /// Loop count: 0 = infinite loop, positive = finite loops.
    pub repeat: u16,
    /// NeuQuant quantization speed (1-30, lower = slower but better).
    pub quality: u8,
}

impl Default for GifEncoderOptions {
    fn default() -> Self {
        Self {
            repeat: 0,
            quality: 10,
        }
    }
}

/// Per-frame options.
#[derive(Debug, Clone, Copy)]
pub struct FrameOptions {
    /// Frame delay in hundredths of a second.
    pub delay: u16,
    /// Disposal method keyword ("any", "keep", "background", "previous").
    pub disposal: Disposal,
    /// Left offset of the frame within the canvas.
    pub left: u16,
    /// Top offset of the frame within the canvas.
    pub top: u16,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            delay: 10,
            disposal: Disposal::Keep,
            left: 0,
            top: 0,
        }
    }
}

/// Frame disposal behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposal {
    Any,
    #[default]
    Keep,
    Background,
    Previous,
}

impl From<Disposal> for DisposalMethod {
    fn from(d: Disposal) -> Self {
        match d {
            Disposal::Any => DisposalMethod::Any,
            Disposal::Keep => DisposalMethod::Keep,
            Disposal::Background => DisposalMethod::Background,
            Disposal::Previous => DisposalMethod::Previous,
        }
    }
}

/// Streaming animation encoder.
///
/// Frames accumulate until `finish()`, which returns the encoded bytes
/// and resets the frame count so the encoder can be reused.
pub struct GifAnimationEncoder {
    width: u32,
    height: u32,
    options: GifEncoderOptions,
    frames: Vec<(Vec<u8>, u32, u32, FrameOptions)>,
}

impl GifAnimationEncoder {
    /// Create an encoder for the given canvas size.
    pub fn new(width: u32, height: u32, options: GifEncoderOptions) -> Self {
        Self {
            width,
            height,
            options,
            frames: Vec::new(),
        }
    }

    /// Number of frames added since the last `finish()`.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Add an RGBA8 frame.
    ///
    /// Errors synchronously when the buffer length does not match
    /// `width * height * 4`.
    pub fn add_frame(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
        options: FrameOptions,
    ) -> Result<(), GifError> {
        let expected = (width as usize) * (height as usize) * 4;
        if rgba.len() != expected {
            return Err(GifError::FrameSizeMismatch {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        self.frames.push((rgba.to_vec(), width, height, options));
        Ok(())
    }

    /// Encode the accumulated frames and reset the frame count.
    ///
    /// Errors when no frames were added.
    pub fn finish(&mut self) -> Result<Vec<u8>, GifError> {
        if self.frames.is_empty() {
            return Err(GifError::NoFrames);
        }
        let frames = std::mem::take(&mut self.frames);

        let mut out = Vec::new();
        {
            let mut encoder = Encoder::new(&mut out, self.width as u16, self.height as u16, &[])?;
            encoder.set_repeat(if self.options.repeat == 0 {
                Repeat::Infinite
            } else {
                Repeat::Finite(self.options.repeat)
            })?;

            for (mut rgba, width, height, opts) in frames {
                let mut frame = Frame::from_rgba_speed(
                    width as u16,
                    height as u16,
                    &mut rgba,
                    self.options.quality.clamp(1, 30) as i32,
                );
                frame.delay = opts.delay;
                frame.dispose = opts.disposal.into();
                frame.left = opts.left;
                frame.top = opts.top;
                encoder.write_frame(&frame)?;
            }
        }
        Ok(out)
    }
}

/// Encode a single RGBA8 image as a non-animated GIF.
pub fn encode_gif(
    rgba: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, GifError> {
    let mut encoder = GifAnimationEncoder::new(
        width,
        height,
        GifEncoderOptions {
            repeat: 1,
            quality,
        },
    );
    encoder.add_frame(rgba, width, height, FrameOptions::default())?;
    encoder.finish()
}
