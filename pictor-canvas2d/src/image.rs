//! Image decoding and the drawable image object.
//!
//! `CanvasImage` owns a decoded RGBA8 pixel buffer. Loading a new source
//! atomically replaces the buffer; a failed load clears it. Either way the
//! image ends in a settled state (`complete()` is true) — there is no
//! asynchronous loading in this model.

use crate::error::{CanvasError, CanvasResult};
use crate::geometry::CanvasImageDataRef;
use base64::Engine as _;
use std::io::Cursor;
// Leading `::` disambiguates the image crate from this module.
use ::image::ImageDecoder as _;
use std::path::Path;

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, Default)]
pub struct DecodedImage {
    /// Non-premultiplied RGBA pixel data.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Supported image source formats, detected by content sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SniffedFormat {
    Png,
    Jpeg,
    Svg,
    Unknown,
}

/// Identify a buffer by its magic bytes. A declared MIME type that
/// disagrees with the content loses to the sniffed format.
fn sniff(bytes: &[u8]) -> SniffedFormat {
    if bytes.len() >= 8 && bytes[..8] == [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A] {
        return SniffedFormat::Png;
    }
    if bytes.len() >= 3 && bytes[..3] == [0xFF, 0xD8, 0xFF] {
        return SniffedFormat::Jpeg;
    }
    if looks_like_svg(bytes) {
        return SniffedFormat::Svg;
    }
    SniffedFormat::Unknown
}

/// Scan the head of the buffer for an `<svg` root element, skipping
/// whitespace, the XML declaration, and comments.
fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    let Ok(text) = std::str::from_utf8(head) else {
        return false;
    };
    let mut rest = text.trim_start();
    loop {
        if let Some(stripped) = rest.strip_prefix("<?") {
            match stripped.find("?>") {
                Some(end) => rest = stripped[end + 2..].trim_start(),
                None => return false,
            }
            continue;
        }
        if let Some(stripped) = rest.strip_prefix("<!--") {
            match stripped.find("-->") {
                Some(end) => rest = stripped[end + 3..].trim_start(),
                None => return false,
            }
            continue;
        }
        if let Some(stripped) = rest.strip_prefix("<!") {
            match stripped.find('>') {
                Some(end) => rest = stripped[end + 1..].trim_start(),
                None => return false,
            }
            continue;
        }
        break;
    }
    rest.starts_with("<svg")
}

/// Decode an encoded image buffer into RGBA8 pixels.
///
/// Empty or too-small buffers decode as a zero-sized image rather than an
/// error. JPEG decoding honors EXIF orientation.
pub fn decode(bytes: &[u8]) -> CanvasResult<DecodedImage> {
    if bytes.len() < 8 {
        return Ok(DecodedImage::default());
    }

    match sniff(bytes) {
        SniffedFormat::Png => decode_png(bytes),
        SniffedFormat::Jpeg => decode_jpeg(bytes),
        SniffedFormat::Svg => Err(CanvasError::ImageDecodeError(
            "SVG sources require an external vector decoder".to_string(),
        )),
        SniffedFormat::Unknown => Err(CanvasError::ImageDecodeError(
            "unrecognized image format".to_string(),
        )),
    }
}

fn decode_png(bytes: &[u8]) -> CanvasResult<DecodedImage> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());

    let data = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|px| [px[0], px[0], px[0], px[1]])
            .collect(),
        png::ColorType::Indexed => {
            return Err(CanvasError::PngError(
                "indexed color was not expanded".to_string(),
            ))
        }
    };

    Ok(DecodedImage {
        data,
        width: info.width,
        height: info.height,
    })
}

fn decode_jpeg(bytes: &[u8]) -> CanvasResult<DecodedImage> {
    let mut decoder = ::image::codecs::jpeg::JpegDecoder::new(Cursor::new(bytes))
        .map_err(|e| CanvasError::ImageDecodeError(e.to_string()))?;
    let orientation = decoder.orientation().ok();
    let mut decoded = ::image::DynamicImage::from_decoder(decoder)
        .map_err(|e| CanvasError::ImageDecodeError(e.to_string()))?;
    if let Some(orientation) = orientation {
        decoded.apply_orientation(orientation);
    }
    let rgba = decoded.to_rgba8();
    Ok(DecodedImage {
        width: rgba.width(),
        height: rgba.height(),
        data: rgba.into_raw(),
    })
}

/// Decode a `data:` URL payload, sniffing the content regardless of the
/// declared MIME type.
pub fn decode_data_url(url: &str) -> CanvasResult<DecodedImage> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| CanvasError::InvalidArgument("not a data URL".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| CanvasError::InvalidArgument("malformed data URL".to_string()))?;

    let bytes = if header.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| CanvasError::ImageDecodeError(format!("invalid base64 payload: {e}")))?
    } else {
        payload.as_bytes().to_vec()
    };

    decode(&bytes)
}

/// A drawable image owning its decoded pixel buffer.
#[derive(Debug, Clone, Default)]
pub struct CanvasImage {
    pixels: Option<DecodedImage>,
    src: Option<String>,
}

impl CanvasImage {
    /// Create an empty (settled, pixel-less) image.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from an encoded buffer, atomically replacing the pixels.
    ///
    /// On failure the previous pixels are cleared and the error is
    /// returned; the image still reads as settled.
    pub fn load(&mut self, bytes: &[u8]) -> CanvasResult<()> {
        match decode(bytes) {
            Ok(decoded) => {
                self.pixels = Some(decoded);
                self.src = None;
                Ok(())
            }
            Err(e) => {
                self.pixels = None;
                self.src = None;
                Err(e)
            }
        }
    }

    /// Load from a `data:` URL.
    pub fn load_data_url(&mut self, url: &str) -> CanvasResult<()> {
        match decode_data_url(url) {
            Ok(decoded) => {
                self.pixels = Some(decoded);
                self.src = Some(url.to_string());
                Ok(())
            }
            Err(e) => {
                self.pixels = None;
                self.src = None;
                Err(e)
            }
        }
    }

    /// Load from a file path. A nonexistent path is a synchronous error.
    pub fn load_from_path(&mut self, path: impl AsRef<Path>) -> CanvasResult<()> {
        let bytes = std::fs::read(path.as_ref())?;
        let result = self.load(&bytes);
        if result.is_ok() {
            self.src = Some(path.as_ref().to_string_lossy().into_owned());
        }
        result
    }

    /// Whether the image is settled. Always true in this synchronous
    /// model — even after a failed load.
    pub fn complete(&self) -> bool {
        true
    }

    /// The source string of the last successful load, if any.
    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    /// Natural width of the decoded image (0 when pixel-less).
    pub fn width(&self) -> u32 {
        self.pixels.as_ref().map(|p| p.width).unwrap_or(0)
    }

    /// Natural height of the decoded image (0 when pixel-less).
    pub fn height(&self) -> u32 {
        self.pixels.as_ref().map(|p| p.height).unwrap_or(0)
    }

    /// Borrow the decoded pixels as an image-data reference.
    pub fn as_image_data(&self) -> Option<CanvasImageDataRef<'_>> {
        self.pixels.as_ref().map(|p| CanvasImageDataRef {
            data: &p.data,
            width: p.width,
            height: p.height,
        })
    }
}
