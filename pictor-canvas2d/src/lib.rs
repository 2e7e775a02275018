//! Pure Rust Canvas 2D rendering engine using tiny-skia and cosmic-text.
//!
//! This crate provides a Canvas 2D API implementation that can be used
//! without a browser or JavaScript runtime. It uses:
//! - `tiny-skia` for 2D rasterization
//! - `cosmic-text` for text shaping, measurement, and rendering
//! - `fontdb` for font database management (can be shared with other crates)
//! - an internal path geometry engine for boolean operations, stroke
//!   outlining, and SVG serialization on `Path2D`
//!
//! Contexts come in two flavors: a raster context draws into a pixel
//! buffer immediately, while a recording context defers drawing into a
//! replayable command list (used for SVG export) and only rasterizes when
//! pixels are actually read back.
//!
//! # Example
//!
//! ```rust,ignore
//! use pictor_canvas2d::Canvas2dContext;
//!
//! let mut ctx = Canvas2dContext::new(400, 300)?;
//! ctx.set_fill_style("#ff0000");
//! ctx.fill_rect(&RectParams { x: 10.0, y: 10.0, width: 100.0, height: 50.0 });
//! let png_data = ctx.to_png(None)?;
//! ```

mod arc;
mod context;
mod dom_matrix;
mod drawing_state;
mod error;
mod filter;
mod font_config;
mod font_parser;
mod geometry;
mod gradient;
mod image;
mod path2d;
mod pathops;
mod pattern;
mod pattern_cache;
mod style;
mod surface;
mod svg_export;
mod text;

// Re-export public API
pub use context::Canvas2dContext;
pub use dom_matrix::DOMMatrix;
pub use drawing_state::{ClipState, DrawingState};
pub use error::{CanvasError, CanvasResult};
pub use filter::{FilterChain, FilterOp};
pub use font_config::{FontConfig, GenericFamilyMap, ResolvedFontConfig};
pub use font_parser::ParsedFont;
pub use geometry::{
    ArcParams, ArcToParams, CanvasColor, CanvasImageDataRef, ConicGradientParams, CornerRadius,
    CubicBezierParams, DirtyRect, EllipseParams, ImageCropParams, QuadraticBezierParams,
    RadialGradientParams, RectParams, RoundRectParams,
};
pub use gradient::{CanvasGradient, GradientStop};
pub use image::{decode, decode_data_url, CanvasImage, DecodedImage};
pub use path2d::Path2D;
pub use pathops::{PathOp, StrokeOptions};
pub use pattern::{CanvasPattern, Repetition};
pub use style::{
    CanvasFillRule, FillStyle, FontKerning, FontStretch, FontVariantCaps, ImageSmoothingQuality,
    LineCap, LineJoin, TextAlign, TextBaseline, TextDirection, TextRendering,
};
pub use text::TextMetrics;
