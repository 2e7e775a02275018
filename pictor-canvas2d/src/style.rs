//! Style types and enums for Canvas 2D operations.

use crate::gradient::CanvasGradient;
use crate::pattern::CanvasPattern;
use std::sync::Arc;

/// Fill style for Canvas 2D operations.
#[derive(Debug, Clone)]
pub enum FillStyle {
    /// Solid color fill.
    Color(tiny_skia::Color),
    /// Linear gradient fill.
    LinearGradient(CanvasGradient),
    /// Radial gradient fill.
    RadialGradient(CanvasGradient),
    /// Conic gradient fill.
    ConicGradient(CanvasGradient),
    /// Pattern fill backed by snapshotted source pixels.
    Pattern(Arc<CanvasPattern>),
}

impl Default for FillStyle {
    fn default() -> Self {
        // Default is opaque black
        FillStyle::Color(tiny_skia::Color::BLACK)
    }
}

/// Line cap style for stroke operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    /// Flat edge at the endpoint.
    #[default]
    Butt,
    /// Rounded edge extending past the endpoint.
    Round,
    /// Square edge extending past the endpoint.
    Square,
}

impl From<LineCap> for tiny_skia::LineCap {
    fn from(cap: LineCap) -> Self {
        match cap {
            LineCap::Butt => tiny_skia::LineCap::Butt,
            LineCap::Round => tiny_skia::LineCap::Round,
            LineCap::Square => tiny_skia::LineCap::Square,
        }
    }
}

/// Line join style for stroke operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    /// Sharp corner.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Beveled corner.
    Bevel,
}

impl From<LineJoin> for tiny_skia::LineJoin {
    fn from(join: LineJoin) -> Self {
        match join {
            LineJoin::Miter => tiny_skia::LineJoin::Miter,
            LineJoin::Round => tiny_skia::LineJoin::Round,
            LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
        }
    }
}

/// Text alignment for text rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Align text to the left of the anchor point.
    Left,
    /// Align text to the right of the anchor point.
    Right,
    /// Center text on the anchor point.
    Center,
    /// Align text to the start (left for LTR, right for RTL).
    #[default]
    Start,
    /// Align text to the end (right for LTR, left for RTL).
    End,
}

/// Text baseline for text rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    /// Top of the em square.
    Top,
    /// Hanging baseline.
    Hanging,
    /// Middle of the em square.
    Middle,
    /// Alphabetic baseline.
    #[default]
    Alphabetic,
    /// Ideographic baseline.
    Ideographic,
    /// Bottom of the em square.
    Bottom,
}

/// Text direction for text rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextDirection {
    /// Left-to-right.
    #[default]
    Ltr,
    /// Right-to-left.
    Rtl,
}

impl TextDirection {
    /// Parse a direction keyword. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ltr" | "inherit" => Some(TextDirection::Ltr),
            "rtl" => Some(TextDirection::Rtl),
            _ => None,
        }
    }
}

/// Fill rule for path operations.
///
/// Determines how the interior of a path is calculated when filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanvasFillRule {
    /// Non-zero winding rule (default).
    #[default]
    NonZero,
    /// Even-odd rule.
    EvenOdd,
}

impl CanvasFillRule {
    /// The canonical keyword for this rule.
    pub fn as_str(&self) -> &'static str {
        match self {
            CanvasFillRule::NonZero => "nonzero",
            CanvasFillRule::EvenOdd => "evenodd",
        }
    }
}

impl From<CanvasFillRule> for tiny_skia::FillRule {
    fn from(rule: CanvasFillRule) -> Self {
        match rule {
            CanvasFillRule::NonZero => tiny_skia::FillRule::Winding,
            CanvasFillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
        }
    }
}

/// Image smoothing quality levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageSmoothingQuality {
    /// Low quality (fastest).
    Low,
    /// Medium quality (balanced).
    #[default]
    Medium,
    /// High quality (slowest).
    High,
}

impl From<ImageSmoothingQuality> for tiny_skia::FilterQuality {
    fn from(quality: ImageSmoothingQuality) -> Self {
        match quality {
            ImageSmoothingQuality::Low => tiny_skia::FilterQuality::Bilinear,
            ImageSmoothingQuality::Medium => tiny_skia::FilterQuality::Bilinear,
            ImageSmoothingQuality::High => tiny_skia::FilterQuality::Bicubic,
        }
    }
}

/// Font stretch (width) keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStretch {
    UltraCondensed,
    ExtraCondensed,
    Condensed,
    SemiCondensed,
    #[default]
    Normal,
    SemiExpanded,
    Expanded,
    ExtraExpanded,
    UltraExpanded,
}

impl FontStretch {
    /// Parse a stretch keyword. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ultra-condensed" => Some(FontStretch::UltraCondensed),
            "extra-condensed" => Some(FontStretch::ExtraCondensed),
            "condensed" => Some(FontStretch::Condensed),
            "semi-condensed" => Some(FontStretch::SemiCondensed),
            "normal" => Some(FontStretch::Normal),
            "semi-expanded" => Some(FontStretch::SemiExpanded),
            "expanded" => Some(FontStretch::Expanded),
            "extra-expanded" => Some(FontStretch::ExtraExpanded),
            "ultra-expanded" => Some(FontStretch::UltraExpanded),
            _ => None,
        }
    }
}

impl From<FontStretch> for cosmic_text::Stretch {
    fn from(stretch: FontStretch) -> Self {
        match stretch {
            FontStretch::UltraCondensed => cosmic_text::Stretch::UltraCondensed,
            FontStretch::ExtraCondensed => cosmic_text::Stretch::ExtraCondensed,
            FontStretch::Condensed => cosmic_text::Stretch::Condensed,
            FontStretch::SemiCondensed => cosmic_text::Stretch::SemiCondensed,
            FontStretch::Normal => cosmic_text::Stretch::Normal,
            FontStretch::SemiExpanded => cosmic_text::Stretch::SemiExpanded,
            FontStretch::Expanded => cosmic_text::Stretch::Expanded,
            FontStretch::ExtraExpanded => cosmic_text::Stretch::ExtraExpanded,
            FontStretch::UltraExpanded => cosmic_text::Stretch::UltraExpanded,
        }
    }
}

/// Font kerning control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontKerning {
    /// Kerning as specified by the font (default).
    #[default]
    Auto,
    /// Kerning applied.
    Normal,
    /// Kerning disabled.
    None,
}

impl FontKerning {
    /// Parse a kerning keyword. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(FontKerning::Auto),
            "normal" => Some(FontKerning::Normal),
            "none" => Some(FontKerning::None),
            _ => None,
        }
    }
}

/// Font variant caps control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontVariantCaps {
    #[default]
    Normal,
    SmallCaps,
    AllSmallCaps,
    PetiteCaps,
    AllPetiteCaps,
    Unicase,
    TitlingCaps,
}

impl FontVariantCaps {
    /// Parse a variant-caps keyword. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(FontVariantCaps::Normal),
            "small-caps" => Some(FontVariantCaps::SmallCaps),
            "all-small-caps" => Some(FontVariantCaps::AllSmallCaps),
            "petite-caps" => Some(FontVariantCaps::PetiteCaps),
            "all-petite-caps" => Some(FontVariantCaps::AllPetiteCaps),
            "unicase" => Some(FontVariantCaps::Unicase),
            "titling-caps" => Some(FontVariantCaps::TitlingCaps),
            _ => None,
        }
    }
}

/// Text rendering quality hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextRendering {
    #[default]
    Auto,
    OptimizeSpeed,
    OptimizeLegibility,
    GeometricPrecision,
}

impl TextRendering {
    /// Parse a text-rendering keyword. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(TextRendering::Auto),
            "optimizeSpeed" => Some(TextRendering::OptimizeSpeed),
            "optimizeLegibility" => Some(TextRendering::OptimizeLegibility),
            "geometricPrecision" => Some(TextRendering::GeometricPrecision),
            _ => None,
        }
    }
}
