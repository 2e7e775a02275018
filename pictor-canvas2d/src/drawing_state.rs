//! Drawing state that can be saved and restored.

use crate::filter::FilterChain;
use crate::font_parser::ParsedFont;
use crate::style::{
    CanvasFillRule, FillStyle, FontKerning, FontVariantCaps, ImageSmoothingQuality, LineCap,
    LineJoin, TextAlign, TextBaseline, TextDirection, TextRendering,
};
use tiny_skia::Transform;

/// The active clip region: a device-space resolvable path plus the rule
/// and the transform it was captured under.
///
/// Nested `clip()` calls intersect geometrically, so after the first
/// intersection the stored path already represents the cumulative region.
#[derive(Debug, Clone)]
pub struct ClipState {
    /// Clip path geometry.
    pub path: tiny_skia::Path,
    /// Fill rule used to interpret the clip path.
    pub rule: CanvasFillRule,
    /// Transform that was active when the clip path was captured. Used to
    /// map the path into device space at mask creation time.
    pub transform: Transform,
}

/// Drawing state that can be saved and restored.
#[derive(Debug, Clone)]
pub struct DrawingState {
    /// Current fill style.
    pub fill_style: FillStyle,
    /// Current stroke style.
    pub stroke_style: FillStyle,
    /// Current line width.
    pub line_width: f32,
    /// Current line cap style.
    pub line_cap: LineCap,
    /// Current line join style.
    pub line_join: LineJoin,
    /// Current miter limit.
    pub miter_limit: f32,
    /// Current line dash pattern.
    pub line_dash: Vec<f32>,
    /// Current line dash offset.
    pub line_dash_offset: f32,
    /// Current font specification.
    pub font: ParsedFont,
    /// Current text alignment.
    pub text_align: TextAlign,
    /// Current text baseline.
    pub text_baseline: TextBaseline,
    /// Current text direction.
    pub direction: TextDirection,
    /// Letter spacing for text rendering (in pixels).
    pub letter_spacing: f32,
    /// Word spacing for text rendering (in pixels).
    pub word_spacing: f32,
    /// Font kerning control.
    pub font_kerning: FontKerning,
    /// Font variant caps control.
    pub font_variant_caps: FontVariantCaps,
    /// Text rendering quality hint.
    pub text_rendering: TextRendering,
    /// BCP 47 language tag used for shaping.
    pub lang: String,
    /// Current global alpha.
    pub global_alpha: f32,
    /// Current global composite operation (blend mode).
    pub global_composite_operation: tiny_skia::BlendMode,
    /// Current transform matrix.
    pub transform: Transform,
    /// Accumulated clip region (if any).
    pub clip: Option<ClipState>,
    /// Shadow color (default transparent, which disables shadows).
    pub shadow_color: tiny_skia::Color,
    /// Shadow blur radius.
    pub shadow_blur: f32,
    /// Shadow X offset.
    pub shadow_offset_x: f32,
    /// Shadow Y offset.
    pub shadow_offset_y: f32,
    /// Post-processing filter chain applied per draw.
    pub filter: FilterChain,
    /// Whether image smoothing is enabled.
    pub image_smoothing_enabled: bool,
    /// Image smoothing quality level.
    pub image_smoothing_quality: ImageSmoothingQuality,
}

impl Default for DrawingState {
    fn default() -> Self {
        Self {
            fill_style: FillStyle::default(),
            stroke_style: FillStyle::default(),
            line_width: 1.0,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            miter_limit: 10.0,
            line_dash: Vec::new(),
            line_dash_offset: 0.0,
            font: ParsedFont::default(),
            text_align: TextAlign::default(),
            text_baseline: TextBaseline::default(),
            direction: TextDirection::default(),
            letter_spacing: 0.0,
            word_spacing: 0.0,
            font_kerning: FontKerning::default(),
            font_variant_caps: FontVariantCaps::default(),
            text_rendering: TextRendering::default(),
            lang: "en".to_string(),
            global_alpha: 1.0,
            global_composite_operation: tiny_skia::BlendMode::SourceOver,
            transform: Transform::identity(),
            clip: None,
            shadow_color: tiny_skia::Color::TRANSPARENT,
            shadow_blur: 0.0,
            shadow_offset_x: 0.0,
            shadow_offset_y: 0.0,
            filter: FilterChain::default(),
            image_smoothing_enabled: true,
            image_smoothing_quality: ImageSmoothingQuality::default(),
        }
    }
}

impl DrawingState {
    /// Whether any shadow would actually be painted.
    pub fn has_visible_shadow(&self) -> bool {
        self.shadow_color.alpha() > 0.0
            && (self.shadow_blur > 0.0 || self.shadow_offset_x != 0.0 || self.shadow_offset_y != 0.0)
    }
}
