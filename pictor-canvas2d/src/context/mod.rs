//! Canvas 2D rendering context implementation.

mod drawing;
mod image_ops;
mod path_ops;
mod text_rendering;
mod transform;

use crate::drawing_state::DrawingState;
use crate::error::{CanvasError, CanvasResult};
use crate::filter::FilterChain;
use crate::font_config::{font_config_to_fontdb, FontConfig, ResolvedFontConfig};
use crate::geometry::{CanvasColor, ConicGradientParams, RadialGradientParams};
use crate::gradient::{CanvasGradient, GradientType};
use crate::pattern::{CanvasPattern, Repetition};
use crate::style::{
    FillStyle, FontKerning, FontVariantCaps, ImageSmoothingQuality, LineCap, LineJoin,
    TextDirection, TextRendering,
};
use crate::surface::{Surface, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use cosmic_text::{FontSystem, SwashCache};
use std::sync::Arc;

/// Maximum canvas dimension (same as Chrome).
const MAX_DIMENSION: u32 = 32767;

/// Canvas 2D rendering context.
pub struct Canvas2dContext {
    /// Pixel or recording target.
    pub(crate) surface: Surface,
    /// Font system for text rendering.
    pub(crate) font_system: FontSystem,
    /// Swash cache for glyph rasterization.
    pub(crate) swash_cache: SwashCache,
    /// Current drawing state.
    pub(crate) state: DrawingState,
    /// Stack of saved drawing states.
    state_stack: Vec<DrawingState>,
    /// Current path builder (device-space coordinates).
    pub(crate) path_builder: tiny_skia::PathBuilder,
    /// Current path position (for tracking subpath start).
    pub(crate) current_x: f32,
    pub(crate) current_y: f32,
    /// Subpath start position (for closePath).
    pub(crate) subpath_start_x: f32,
    pub(crate) subpath_start_y: f32,
    /// Whether the path has a current point (for arc/ellipse line_to vs move_to).
    pub(crate) has_current_point: bool,
    /// Whether font hinting is enabled for text rendering.
    pub(crate) hinting_enabled: bool,
}

impl Canvas2dContext {
    /// Create a new raster (immediately materialized) context.
    ///
    /// Uses `FontConfig::default()` which loads system fonts and sets up
    /// standard generic family mappings (sans-serif, serif, monospace).
    pub fn new(width: u32, height: u32) -> CanvasResult<Self> {
        let config = FontConfig::default();
        let db = font_config_to_fontdb(&config);
        Self::new_internal(width, height, db, config.hinting_enabled, false)
    }

    /// Create a new deferred recording context, used for SVG export.
    ///
    /// The surface records drawing commands and only rasterizes when a
    /// pixel read-back forces a promotion.
    pub fn new_recording(width: u32, height: u32) -> CanvasResult<Self> {
        let config = FontConfig::default();
        let db = font_config_to_fontdb(&config);
        Self::new_internal(width, height, db, config.hinting_enabled, true)
    }

    /// Create a new context with the specified font configuration.
    pub fn with_config(width: u32, height: u32, config: FontConfig) -> CanvasResult<Self> {
        let db = font_config_to_fontdb(&config);
        Self::new_internal(width, height, db, config.hinting_enabled, false)
    }

    /// Create a new context using a pre-resolved font configuration.
    ///
    /// This clones the cached font database from the [`ResolvedFontConfig`]
    /// rather than rebuilding it from scratch, avoiding repeated system
    /// font scanning when creating multiple contexts.
    pub fn with_resolved(
        width: u32,
        height: u32,
        resolved: &ResolvedFontConfig,
    ) -> CanvasResult<Self> {
        Self::new_internal(
            width,
            height,
            resolved.fontdb.clone(),
            resolved.hinting_enabled,
            false,
        )
    }

    fn new_internal(
        width: u32,
        height: u32,
        font_db: fontdb::Database,
        hinting_enabled: bool,
        recording: bool,
    ) -> CanvasResult<Self> {
        // Validate dimensions
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(CanvasError::InvalidDimensions { width, height });
        }

        let surface = if recording {
            Surface::new_recording(width, height)
        } else {
            Surface::new_raster(width, height)
        }
        .ok_or(CanvasError::InvalidDimensions { width, height })?;

        // Create font system from the provided (already-configured) fontdb
        let font_system = FontSystem::new_with_locale_and_db("en".to_string(), font_db);

        Ok(Self {
            surface,
            font_system,
            swash_cache: SwashCache::new(),
            state: DrawingState::default(),
            state_stack: Vec::new(),
            path_builder: tiny_skia::PathBuilder::new(),
            current_x: 0.0,
            current_y: 0.0,
            subpath_start_x: 0.0,
            subpath_start_y: 0.0,
            has_current_point: false,
            hinting_enabled,
        })
    }

    /// Get canvas width.
    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    /// Get canvas height.
    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    /// Resize the canvas width, constructing a fresh backing buffer.
    ///
    /// Zero falls back to the default width rather than erroring. The
    /// drawing state resets along with the pixels.
    pub fn set_width(&mut self, width: u32) {
        let width = if width == 0 || width > MAX_DIMENSION {
            DEFAULT_WIDTH
        } else {
            width
        };
        let height = self.surface.height();
        if self.surface.resize(width, height) {
            self.reset_state_only();
        }
    }

    /// Resize the canvas height, constructing a fresh backing buffer.
    ///
    /// Zero falls back to the default height rather than erroring. The
    /// drawing state resets along with the pixels.
    pub fn set_height(&mut self, height: u32) {
        let height = if height == 0 || height > MAX_DIMENSION {
            DEFAULT_HEIGHT
        } else {
            height
        };
        let width = self.surface.width();
        if self.surface.resize(width, height) {
            self.reset_state_only();
        }
    }

    /// Whether this context records commands instead of rasterizing
    /// immediately.
    pub fn is_recording(&self) -> bool {
        self.surface.is_recording()
    }

    /// Number of unbalanced `save()` calls.
    pub(crate) fn saved_depth(&self) -> usize {
        self.state_stack.len()
    }

    /// Export the recorded scene as an SVG document.
    ///
    /// Only available on recording contexts.
    pub fn get_content(&self) -> CanvasResult<String> {
        match self.surface.ops() {
            Some(ops) => Ok(crate::svg_export::render_svg_document(
                ops,
                self.surface.width(),
                self.surface.height(),
            )),
            None => Err(CanvasError::InvalidArgument(
                "SVG content is only available on recording contexts".to_string(),
            )),
        }
    }

    /// Save the current drawing state.
    pub fn save(&mut self) {
        log::debug!(target: "canvas", "save");
        self.state_stack.push(self.state.clone());
    }

    /// Restore the previously saved drawing state.
    pub fn restore(&mut self) {
        log::debug!(target: "canvas", "restore");
        if let Some(state) = self.state_stack.pop() {
            self.state = state;
        }
    }

    /// Reset the rendering context to its default state.
    ///
    /// Clears the canvas to transparent, resets all drawing state
    /// (including any pending saves, so a following `restore()` is a
    /// no-op), and discards the in-progress path. Canvas dimensions are
    /// unaffected. Calling this twice in a row is equivalent to once.
    pub fn reset(&mut self) {
        self.surface.clear_all();
        self.reset_state_only();
    }

    fn reset_state_only(&mut self) {
        self.state = DrawingState::default();
        self.state_stack.clear();
        self.path_builder = tiny_skia::PathBuilder::new();
        self.current_x = 0.0;
        self.current_y = 0.0;
        self.subpath_start_x = 0.0;
        self.subpath_start_y = 0.0;
        self.has_current_point = false;
    }

    // --- Style setters ---

    /// Set the fill style from a CSS color string.
    ///
    /// Per spec: a syntactically invalid color string is ignored and the
    /// previous style kept. Returns true if the value was accepted.
    pub fn set_fill_style(&mut self, style: &str) -> bool {
        match parse_color(style) {
            Ok(color) => {
                self.state.fill_style = FillStyle::Color(color);
                true
            }
            Err(_) => false,
        }
    }

    /// Set the fill style from a CanvasColor.
    pub fn set_fill_style_color(&mut self, color: CanvasColor) {
        self.state.fill_style = FillStyle::Color(color.into());
    }

    /// Set the stroke style from a CSS color string.
    ///
    /// Per spec: a syntactically invalid color string is ignored and the
    /// previous style kept. Returns true if the value was accepted.
    pub fn set_stroke_style(&mut self, style: &str) -> bool {
        match parse_color(style) {
            Ok(color) => {
                self.state.stroke_style = FillStyle::Color(color);
                true
            }
            Err(_) => false,
        }
    }

    /// Set the stroke style from a CanvasColor.
    pub fn set_stroke_style_color(&mut self, color: CanvasColor) {
        self.state.stroke_style = FillStyle::Color(color.into());
    }

    /// Set the line width.
    /// Per spec: ignore non-finite or values <= 0.
    pub fn set_line_width(&mut self, width: f32) {
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
        }
    }

    /// Get the current line width.
    pub fn line_width(&self) -> f32 {
        self.state.line_width
    }

    /// Set the line cap style.
    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = cap;
    }

    /// Set the line join style.
    pub fn set_line_join(&mut self, join: LineJoin) {
        self.state.line_join = join;
    }

    /// Set the miter limit.
    /// Per spec: ignore non-finite or values <= 0.
    pub fn set_miter_limit(&mut self, limit: f32) {
        if limit.is_finite() && limit > 0.0 {
            self.state.miter_limit = limit;
        }
    }

    /// Set the global alpha (opacity).
    /// Per spec: ignore non-finite or values outside [0.0, 1.0].
    pub fn set_global_alpha(&mut self, alpha: f32) {
        if alpha.is_finite() && (0.0..=1.0).contains(&alpha) {
            self.state.global_alpha = alpha;
        }
    }

    /// Get the current global alpha.
    pub fn global_alpha(&self) -> f32 {
        self.state.global_alpha
    }

    /// Set the global composite operation (blend mode).
    /// Per spec: ignore invalid values, preserve previous mode.
    /// Returns true if the value was accepted.
    pub fn set_global_composite_operation(&mut self, op: &str) -> bool {
        let mode = match op {
            "source-over" => tiny_skia::BlendMode::SourceOver,
            "source-in" => tiny_skia::BlendMode::SourceIn,
            "source-out" => tiny_skia::BlendMode::SourceOut,
            "source-atop" => tiny_skia::BlendMode::SourceAtop,
            "destination-over" => tiny_skia::BlendMode::DestinationOver,
            "destination-in" => tiny_skia::BlendMode::DestinationIn,
            "destination-out" => tiny_skia::BlendMode::DestinationOut,
            "destination-atop" => tiny_skia::BlendMode::DestinationAtop,
            "lighter" => tiny_skia::BlendMode::Plus,
            "copy" => tiny_skia::BlendMode::Source,
            "xor" => tiny_skia::BlendMode::Xor,
            "multiply" => tiny_skia::BlendMode::Multiply,
            "screen" => tiny_skia::BlendMode::Screen,
            "overlay" => tiny_skia::BlendMode::Overlay,
            "darken" => tiny_skia::BlendMode::Darken,
            "lighten" => tiny_skia::BlendMode::Lighten,
            "color-dodge" => tiny_skia::BlendMode::ColorDodge,
            "color-burn" => tiny_skia::BlendMode::ColorBurn,
            "hard-light" => tiny_skia::BlendMode::HardLight,
            "soft-light" => tiny_skia::BlendMode::SoftLight,
            "difference" => tiny_skia::BlendMode::Difference,
            "exclusion" => tiny_skia::BlendMode::Exclusion,
            "hue" => tiny_skia::BlendMode::Hue,
            "saturation" => tiny_skia::BlendMode::Saturation,
            "color" => tiny_skia::BlendMode::Color,
            "luminosity" => tiny_skia::BlendMode::Luminosity,
            _ => return false,
        };
        self.state.global_composite_operation = mode;
        true
    }

    /// Set the line dash pattern.
    /// Per spec: ignore if any value is non-finite or negative.
    /// Duplicate odd-length arrays to make them even.
    pub fn set_line_dash(&mut self, mut segments: Vec<f32>) {
        // Reject if any value is non-finite or negative
        if segments.iter().any(|&v| !v.is_finite() || v < 0.0) {
            return;
        }
        // Duplicate odd-length arrays per spec
        if segments.len() % 2 != 0 {
            let copy = segments.clone();
            segments.extend(copy);
        }
        self.state.line_dash = segments;
    }

    /// Get the current line dash pattern.
    pub fn get_line_dash(&self) -> &[f32] {
        &self.state.line_dash
    }

    /// Set the line dash offset.
    /// Per spec: ignore non-finite values.
    pub fn set_line_dash_offset(&mut self, offset: f32) {
        if offset.is_finite() {
            self.state.line_dash_offset = offset;
        }
    }

    // --- Shadows ---

    /// Set the shadow color from a CSS color string.
    /// Invalid strings are ignored. Returns true if accepted.
    pub fn set_shadow_color(&mut self, color: &str) -> bool {
        match parse_color(color) {
            Ok(color) => {
                self.state.shadow_color = color;
                true
            }
            Err(_) => false,
        }
    }

    /// Set the shadow blur radius.
    /// Per spec: ignore non-finite or negative values.
    pub fn set_shadow_blur(&mut self, blur: f32) {
        if blur.is_finite() && blur >= 0.0 {
            self.state.shadow_blur = blur;
        }
    }

    /// Set the shadow X offset. Non-finite values are ignored.
    pub fn set_shadow_offset_x(&mut self, offset: f32) {
        if offset.is_finite() {
            self.state.shadow_offset_x = offset;
        }
    }

    /// Set the shadow Y offset. Non-finite values are ignored.
    pub fn set_shadow_offset_y(&mut self, offset: f32) {
        if offset.is_finite() {
            self.state.shadow_offset_y = offset;
        }
    }

    // --- Filter ---

    /// Set the filter chain from a CSS filter string.
    /// Invalid strings are ignored. Returns true if accepted.
    pub fn set_filter(&mut self, filter: &str) -> bool {
        match FilterChain::parse(filter) {
            Some(chain) => {
                self.state.filter = chain;
                true
            }
            None => false,
        }
    }

    /// Get the current filter string (`"none"` when inactive).
    pub fn filter(&self) -> &str {
        self.state.filter.as_str()
    }

    // --- Text styling state ---

    /// Set the text direction. Unknown keywords are ignored.
    pub fn set_direction(&mut self, direction: &str) -> bool {
        match TextDirection::parse(direction) {
            Some(d) => {
                self.state.direction = d;
                true
            }
            None => false,
        }
    }

    /// Get the current text direction.
    pub fn direction(&self) -> TextDirection {
        self.state.direction
    }

    /// Set the font kerning mode. Unknown keywords are ignored.
    pub fn set_font_kerning(&mut self, kerning: &str) -> bool {
        match FontKerning::parse(kerning) {
            Some(k) => {
                self.state.font_kerning = k;
                true
            }
            None => false,
        }
    }

    /// Get the current font kerning mode.
    pub fn font_kerning(&self) -> FontKerning {
        self.state.font_kerning
    }

    /// Set the font variant caps mode. Unknown keywords are ignored.
    pub fn set_font_variant_caps(&mut self, caps: &str) -> bool {
        match FontVariantCaps::parse(caps) {
            Some(c) => {
                self.state.font_variant_caps = c;
                true
            }
            None => false,
        }
    }

    /// Get the current font variant caps mode.
    pub fn font_variant_caps(&self) -> FontVariantCaps {
        self.state.font_variant_caps
    }

    /// Set the text rendering hint. Unknown keywords are ignored.
    pub fn set_text_rendering(&mut self, rendering: &str) -> bool {
        match TextRendering::parse(rendering) {
            Some(r) => {
                self.state.text_rendering = r;
                true
            }
            None => false,
        }
    }

    /// Get the current text rendering hint.
    pub fn text_rendering(&self) -> TextRendering {
        self.state.text_rendering
    }

    /// Set the shaping language tag.
    pub fn set_lang(&mut self, lang: &str) {
        if !lang.is_empty() {
            self.state.lang = lang.to_string();
        }
    }

    /// Get the shaping language tag.
    pub fn lang(&self) -> &str {
        &self.state.lang
    }

    // --- Image smoothing ---

    /// Set whether image smoothing is enabled.
    pub fn set_image_smoothing_enabled(&mut self, enabled: bool) {
        self.state.image_smoothing_enabled = enabled;
    }

    /// Get whether image smoothing is enabled.
    pub fn get_image_smoothing_enabled(&self) -> bool {
        self.state.image_smoothing_enabled
    }

    /// Set the image smoothing quality.
    pub fn set_image_smoothing_quality(&mut self, quality: ImageSmoothingQuality) {
        self.state.image_smoothing_quality = quality;
    }

    /// Get the image smoothing quality.
    pub fn get_image_smoothing_quality(&self) -> ImageSmoothingQuality {
        self.state.image_smoothing_quality
    }

    /// Get the filter quality for image rendering based on smoothing settings.
    pub(crate) fn get_image_filter_quality(&self) -> tiny_skia::FilterQuality {
        if self.state.image_smoothing_enabled {
            self.state.image_smoothing_quality.into()
        } else {
            tiny_skia::FilterQuality::Nearest
        }
    }

    // --- Gradients ---

    /// Create a linear gradient.
    pub fn create_linear_gradient(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> CanvasGradient {
        CanvasGradient::new_linear(x0, y0, x1, y1)
    }

    /// Create a radial gradient.
    pub fn create_radial_gradient(&self, params: &RadialGradientParams) -> CanvasGradient {
        CanvasGradient::new_radial(params)
    }

    /// Create a conic gradient.
    pub fn create_conic_gradient(&self, params: &ConicGradientParams) -> CanvasGradient {
        CanvasGradient::new_conic(params)
    }

    /// Set the fill style to a gradient.
    pub fn set_fill_style_gradient(&mut self, gradient: CanvasGradient) {
        self.state.fill_style = gradient_fill_style(gradient);
    }

    /// Set the stroke style to a gradient.
    pub fn set_stroke_style_gradient(&mut self, gradient: CanvasGradient) {
        self.state.stroke_style = gradient_fill_style(gradient);
    }

    // --- Patterns ---

    /// Create a pattern from RGBA pixel data.
    ///
    /// # Arguments
    /// * `data` - RGBA pixel data (4 bytes per pixel, non-premultiplied)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `repetition` - Repetition mode string: "repeat", "repeat-x", "repeat-y", or "no-repeat"
    pub fn create_pattern(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        repetition: &str,
    ) -> CanvasResult<Arc<CanvasPattern>> {
        let rep = repetition.parse::<Repetition>()?;
        let pattern = CanvasPattern::new(data, width, height, rep)?;
        Ok(Arc::new(pattern))
    }

    /// Set the fill style to a pattern.
    pub fn set_fill_style_pattern(&mut self, pattern: Arc<CanvasPattern>) {
        self.state.fill_style = FillStyle::Pattern(pattern);
    }

    /// Set the stroke style to a pattern.
    pub fn set_stroke_style_pattern(&mut self, pattern: Arc<CanvasPattern>) {
        self.state.stroke_style = FillStyle::Pattern(pattern);
    }
}

fn gradient_fill_style(gradient: CanvasGradient) -> FillStyle {
    match gradient.gradient_type {
        GradientType::Linear { .. } => FillStyle::LinearGradient(gradient),
        GradientType::Radial(_) => FillStyle::RadialGradient(gradient),
        GradientType::Conic(_) => FillStyle::ConicGradient(gradient),
    }
}

/// Parse a CSS color string into a tiny_skia::Color.
///
/// Colors quantize to 8-bit components at parse time (round half up), so
/// an HSLA color and its precomputed RGBA equivalent produce identical
/// pixels.
pub(crate) fn parse_color(s: &str) -> CanvasResult<tiny_skia::Color> {
    let parsed = csscolorparser::parse(s)
        .map_err(|e| CanvasError::ColorParseError(format!("{}: {}", s, e)))?;

    let [r, g, b, a] = parsed.to_rgba8();
    Ok(tiny_skia::Color::from_rgba8(r, g, b, a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::RectParams;
    use crate::style::CanvasFillRule;

    #[test]
    fn test_new_context_defaults() {
        let ctx = Canvas2dContext::new(200, 150).unwrap();
        assert_eq!(ctx.width(), 200);
        assert_eq!(ctx.height(), 150);
        assert_eq!(ctx.state.line_width, 1.0);
        assert_eq!(ctx.state.global_alpha, 1.0);
        assert_eq!(ctx.state.miter_limit, 10.0);
        assert!(ctx.state.line_dash.is_empty());
        assert_eq!(ctx.state.line_dash_offset, 0.0);
        assert!(ctx.state.image_smoothing_enabled);
        assert!(ctx.state.clip.is_none());
        assert_eq!(ctx.filter(), "none");
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(
            Canvas2dContext::new(0, 100),
            Err(CanvasError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            Canvas2dContext::new(100, 0),
            Err(CanvasError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_fill_style_invalid_string_is_ignored() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        assert!(ctx.set_fill_style("#ff0000"));
        assert!(!ctx.set_fill_style("definitely-not-a-color"));
        // Previous value survives the rejected assignment.
        match ctx.state.fill_style {
            FillStyle::Color(c) => assert_eq!(c.to_color_u8().red(), 255),
            ref other => panic!("unexpected style {:?}", other),
        }
    }

    #[test]
    fn test_line_width_ignore_invalid() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        ctx.set_line_width(5.0);
        assert_eq!(ctx.state.line_width, 5.0);

        ctx.set_line_width(-1.0);
        ctx.set_line_width(0.0);
        ctx.set_line_width(f32::NAN);
        ctx.set_line_width(f32::INFINITY);
        assert_eq!(ctx.state.line_width, 5.0);

        ctx.set_line_width(3.0);
        assert_eq!(ctx.state.line_width, 3.0);
    }

    #[test]
    fn test_line_dash_rules() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        ctx.set_line_dash(vec![5.0, 10.0]);
        assert_eq!(ctx.get_line_dash(), &[5.0, 10.0]);

        // Odd-length arrays are duplicated per spec
        ctx.set_line_dash(vec![5.0, 10.0, 15.0]);
        assert_eq!(ctx.get_line_dash(), &[5.0, 10.0, 15.0, 5.0, 10.0, 15.0]);

        // NaN/negative values cause the entire call to be ignored
        ctx.set_line_dash(vec![5.0, f32::NAN]);
        ctx.set_line_dash(vec![5.0, -1.0]);
        assert_eq!(ctx.get_line_dash(), &[5.0, 10.0, 15.0, 5.0, 10.0, 15.0]);

        // Empty array is valid (clears dash)
        ctx.set_line_dash(vec![]);
        assert!(ctx.get_line_dash().is_empty());
    }

    #[test]
    fn test_global_alpha_ignore_invalid() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        ctx.set_global_alpha(0.5);
        ctx.set_global_alpha(2.0);
        ctx.set_global_alpha(-0.5);
        ctx.set_global_alpha(f32::NAN);
        assert_eq!(ctx.state.global_alpha, 0.5);
        ctx.set_global_alpha(0.0);
        assert_eq!(ctx.state.global_alpha, 0.0);
        ctx.set_global_alpha(1.0);
        assert_eq!(ctx.state.global_alpha, 1.0);
    }

    #[test]
    fn test_global_composite_operation_ignore_invalid() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        assert!(ctx.set_global_composite_operation("multiply"));
        assert_eq!(
            ctx.state.global_composite_operation,
            tiny_skia::BlendMode::Multiply
        );
        assert!(!ctx.set_global_composite_operation("invalid-mode"));
        assert!(!ctx.set_global_composite_operation(""));
        assert_eq!(
            ctx.state.global_composite_operation,
            tiny_skia::BlendMode::Multiply
        );
    }

    #[test]
    fn test_enumerated_text_setters_ignore_invalid() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        assert!(ctx.set_direction("rtl"));
        assert!(!ctx.set_direction("sideways"));
        assert_eq!(ctx.direction(), TextDirection::Rtl);

        assert!(ctx.set_font_kerning("none"));
        assert!(!ctx.set_font_kerning("off"));
        assert_eq!(ctx.font_kerning(), FontKerning::None);

        assert!(ctx.set_font_variant_caps("small-caps"));
        assert!(!ctx.set_font_variant_caps("shouty"));
        assert_eq!(ctx.font_variant_caps(), FontVariantCaps::SmallCaps);

        assert!(ctx.set_text_rendering("geometricPrecision"));
        assert!(!ctx.set_text_rendering("fast"));
        assert_eq!(ctx.text_rendering(), TextRendering::GeometricPrecision);
    }

    #[test]
    fn test_filter_set_and_ignore_invalid() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        assert_eq!(ctx.filter(), "none");
        assert!(ctx.set_filter("grayscale(100%) blur(2px)"));
        assert_eq!(ctx.filter(), "grayscale(100%) blur(2px)");
        assert!(!ctx.set_filter("sparkle(11)"));
        assert_eq!(ctx.filter(), "grayscale(100%) blur(2px)");
        assert!(ctx.set_filter("none"));
        assert_eq!(ctx.filter(), "none");
    }

    #[test]
    fn test_save_restore_full_symmetry() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();

        ctx.set_fill_style("#112233");
        ctx.set_line_width(5.0);
        ctx.set_global_alpha(0.7);
        ctx.set_shadow_color("#ff0000");
        ctx.set_shadow_blur(4.0);
        ctx.set_shadow_offset_x(1.0);
        ctx.set_shadow_offset_y(2.0);
        ctx.set_direction("rtl");
        ctx.set_lang("de");
        ctx.set_text_rendering("optimizeSpeed");
        ctx.set_font("bold 14px Arial").unwrap();
        ctx.save();

        ctx.set_fill_style("#445566");
        ctx.set_line_width(9.0);
        ctx.set_global_alpha(0.2);
        ctx.set_shadow_color("#00ff00");
        ctx.set_shadow_blur(8.0);
        ctx.set_shadow_offset_x(5.0);
        ctx.set_shadow_offset_y(6.0);
        ctx.set_direction("ltr");
        ctx.set_lang("fr");
        ctx.set_text_rendering("optimizeLegibility");
        ctx.set_font("10px serif").unwrap();

        ctx.restore();

        assert_eq!(ctx.state.line_width, 5.0);
        assert_eq!(ctx.state.global_alpha, 0.7);
        assert_eq!(ctx.state.shadow_blur, 4.0);
        assert_eq!(ctx.state.shadow_offset_x, 1.0);
        assert_eq!(ctx.state.shadow_offset_y, 2.0);
        assert_eq!(ctx.direction(), TextDirection::Rtl);
        assert_eq!(ctx.lang(), "de");
        assert_eq!(ctx.text_rendering(), TextRendering::OptimizeSpeed);
        assert_eq!(ctx.state.font.size_px, 14.0);
        match ctx.state.fill_style {
            FillStyle::Color(c) => assert_eq!(c.to_color_u8().red(), 0x11),
            ref other => panic!("unexpected style {:?}", other),
        }
        assert_eq!(ctx.state.shadow_color.to_color_u8().red(), 255);
    }

    #[test]
    fn test_restore_on_root_frame_is_noop() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        ctx.set_line_width(5.0);
        ctx.restore();
        assert_eq!(ctx.state.line_width, 5.0);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        ctx.set_fill_style("#ff0000");
        ctx.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        });
        ctx.set_line_width(5.0);
        ctx.save();
        ctx.set_line_width(9.0);

        ctx.reset();
        assert_eq!(ctx.state.line_width, 1.0);
        // Pending saves were discarded: restore is a no-op.
        ctx.restore();
        assert_eq!(ctx.state.line_width, 1.0);
        let data = ctx.get_image_data(0, 0, 100, 100);
        assert!(data.iter().all(|&b| b == 0));

        // A second reset leaves the same default state, without error.
        ctx.reset();
        assert_eq!(ctx.state.line_width, 1.0);
        assert_eq!(ctx.state.clip.as_ref().map(|_| ()), None);
    }

    #[test]
    fn test_reset_preserves_dimensions() {
        let mut ctx = Canvas2dContext::new(123, 77).unwrap();
        ctx.reset();
        assert_eq!(ctx.width(), 123);
        assert_eq!(ctx.height(), 77);
    }

    #[test]
    fn test_resize_zero_falls_back_to_default() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        ctx.set_width(0);
        assert_eq!(ctx.width(), DEFAULT_WIDTH);
        ctx.set_height(0);
        assert_eq!(ctx.height(), DEFAULT_HEIGHT);
    }

    #[test]
    fn test_resize_clears_content_and_state() {
        let mut ctx = Canvas2dContext::new(50, 50).unwrap();
        ctx.set_fill_style("#ff0000");
        ctx.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 50.0,
            height: 50.0,
        });
        ctx.set_line_width(7.0);
        ctx.set_width(60);
        assert_eq!(ctx.width(), 60);
        assert_eq!(ctx.state.line_width, 1.0);
        let data = ctx.get_image_data(0, 0, 60, 50);
        assert!(data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_clip_fill_rule_tracked_in_state() {
        let mut ctx = Canvas2dContext::new(64, 64).unwrap();
        ctx.begin_path();
        ctx.rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
        });
        ctx.clip_with_rule(CanvasFillRule::EvenOdd);
        assert_eq!(ctx.state.clip.as_ref().unwrap().rule, CanvasFillRule::EvenOdd);

        ctx.save();
        ctx.begin_path();
        ctx.rect(&RectParams {
            x: 10.0,
            y: 10.0,
            width: 20.0,
            height: 20.0,
        });
        ctx.clip_with_rule(CanvasFillRule::NonZero);
        ctx.restore();
        assert_eq!(ctx.state.clip.as_ref().unwrap().rule, CanvasFillRule::EvenOdd);

        ctx.reset();
        assert!(ctx.state.clip.is_none());
    }

    #[test]
    fn test_hsla_matches_precomputed_rgba() {
        // hsla(252, 0%, 35%, 0.926) is the same pixel value as
        // rgba(89, 89, 89, 0.926) since round(0.35 * 255) = 89.
        let mut a = Canvas2dContext::new(4, 4).unwrap();
        assert!(a.set_fill_style("hsla(252,0%,35%,0.926)"));
        a.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 4.0,
            height: 4.0,
        });

        let mut b = Canvas2dContext::new(4, 4).unwrap();
        assert!(b.set_fill_style("rgba(89,89,89,0.926)"));
        b.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 4.0,
            height: 4.0,
        });

        assert_eq!(
            a.get_image_data(0, 0, 4, 4),
            b.get_image_data(0, 0, 4, 4)
        );
    }
}
