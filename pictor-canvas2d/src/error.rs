//! Error types for pictor-canvas2d.

use thiserror::Error;

/// Result type alias using CanvasError.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in Canvas 2D operations.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Invalid canvas dimensions (must be positive and within limits).
    #[error("Invalid dimensions: width={width}, height={height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Failed to parse CSS font string.
    #[error("Failed to parse font string: {0}")]
    FontParseError(String),

    /// Failed to parse color value.
    #[error("Failed to parse color: {0}")]
    ColorParseError(String),

    /// PNG encoding or decoding error.
    #[error("PNG error: {0}")]
    PngError(String),

    /// Invalid gradient stop offset (must be 0.0-1.0).
    #[error("Invalid gradient stop offset: {0} (must be 0.0-1.0)")]
    InvalidGradientStop(f64),

    /// Invalid argument passed to a canvas operation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failed to decode an image source.
    #[error("Failed to decode image: {0}")]
    ImageDecodeError(String),

    /// Path operation error.
    #[error("Path error: {0}")]
    PathError(String),

    /// Text rendering error.
    #[error("Text rendering error: {0}")]
    TextError(String),

    /// File IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<png::EncodingError> for CanvasError {
    fn from(err: png::EncodingError) -> Self {
        CanvasError::PngError(err.to_string())
    }
}

impl From<png::DecodingError> for CanvasError {
    fn from(err: png::DecodingError) -> Self {
        CanvasError::PngError(err.to_string())
    }
}
