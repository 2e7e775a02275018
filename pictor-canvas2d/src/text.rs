//! Text measurement helpers using cosmic-text.

use crate::error::CanvasResult;
use crate::font_parser::ParsedFont;
use crate::style::{TextAlign, TextBaseline, TextDirection};
use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};

/// Text metrics returned by measureText().
#[derive(Debug, Clone, Default)]
pub struct TextMetrics {
    /// Advance width of the text in pixels.
    pub width: f32,
    /// Distance from baseline to top of the ink bounding box.
    pub actual_bounding_box_ascent: f32,
    /// Distance from baseline to bottom of the ink bounding box.
    pub actual_bounding_box_descent: f32,
    /// Font ascent.
    pub font_bounding_box_ascent: f32,
    /// Font descent.
    pub font_bounding_box_descent: f32,
    /// Distance from alignment point to left of the bounding box.
    pub actual_bounding_box_left: f32,
    /// Distance from alignment point to right of the bounding box.
    pub actual_bounding_box_right: f32,
}

/// Resolve a CSS family name against the loaded font database, falling
/// back to the generic sans-serif family when nothing matches.
pub(crate) fn resolve_family<'a>(font_system: &FontSystem, name: &'a str) -> Family<'a> {
    match name {
        "sans-serif" => return Family::SansSerif,
        "serif" => return Family::Serif,
        "monospace" => return Family::Monospace,
        "cursive" => return Family::Cursive,
        "fantasy" => return Family::Fantasy,
        _ => {}
    }

    let db = font_system.db();
    let known = db.faces().any(|face| {
        face.families
            .iter()
            .any(|(fam, _lang)| fam.eq_ignore_ascii_case(name))
    });
    if known {
        Family::Name(name)
    } else {
        Family::SansSerif
    }
}

/// Normalize text for single-line canvas rendering: embedded line breaks
/// behave as plain spaces.
pub(crate) fn normalize_text(text: &str) -> String {
    text.replace(['\n', '\r', '\t'], " ")
}

/// Measure text using cosmic-text.
///
/// Direction does not change the total advance width; it only affects how
/// start/end alignment map to left/right at draw time.
pub fn measure_text(
    font_system: &mut FontSystem,
    text: &str,
    font: &ParsedFont,
    letter_spacing: f32,
) -> CanvasResult<TextMetrics> {
    let text = normalize_text(text);
    let metrics = Metrics::new(font.size_px, font.size_px * 1.2);
    let mut buffer = Buffer::new(font_system, metrics);

    let family = font
        .families
        .first()
        .map(|f| resolve_family(font_system, f))
        .unwrap_or(Family::SansSerif);

    let attrs = Attrs::new()
        .family(family)
        .weight(font.weight)
        .style(font.style)
        .stretch(font.stretch.into())
        .letter_spacing(letter_spacing);

    buffer.set_text(font_system, &text, &attrs, Shaping::Advanced, None);
    buffer.shape_until_scroll(font_system, false);

    let mut width: f32 = 0.0;
    let mut ascent: f32 = 0.0;
    let mut descent: f32 = 0.0;
    for run in buffer.layout_runs() {
        width = width.max(run.line_w);
        ascent = ascent.max(run.line_y - run.line_top);
        descent = descent.max((run.line_top + run.line_height) - run.line_y);
    }
    if ascent == 0.0 && descent == 0.0 {
        ascent = font.size_px * 0.8;
        descent = font.size_px * 0.2;
    }

    Ok(TextMetrics {
        width,
        actual_bounding_box_ascent: ascent,
        actual_bounding_box_descent: descent,
        font_bounding_box_ascent: ascent,
        font_bounding_box_descent: descent,
        actual_bounding_box_left: 0.0,
        actual_bounding_box_right: width,
    })
}

/// Calculate X offset for text alignment.
///
/// `start`/`end` resolve through the text direction.
pub fn calculate_text_x_offset(width: f32, align: TextAlign, direction: TextDirection) -> f32 {
    let resolved = match (align, direction) {
        (TextAlign::Start, TextDirection::Ltr) => TextAlign::Left,
        (TextAlign::Start, TextDirection::Rtl) => TextAlign::Right,
        (TextAlign::End, TextDirection::Ltr) => TextAlign::Right,
        (TextAlign::End, TextDirection::Rtl) => TextAlign::Left,
        (other, _) => other,
    };
    match resolved {
        TextAlign::Left | TextAlign::Start => 0.0,
        TextAlign::Right | TextAlign::End => -width,
        TextAlign::Center => -width / 2.0,
    }
}

/// Calculate Y offset for text baseline from measured ascent/descent.
pub fn calculate_text_y_offset(ascent: f32, descent: f32, baseline: TextBaseline) -> f32 {
    match baseline {
        TextBaseline::Top => ascent,
        TextBaseline::Hanging => ascent * 0.8,
        TextBaseline::Middle => ascent / 2.0 - descent / 2.0,
        TextBaseline::Alphabetic => 0.0,
        TextBaseline::Ideographic => -descent * 0.5,
        TextBaseline::Bottom => -descent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text_treats_breaks_as_spaces() {
        assert_eq!(normalize_text("a\nb"), "a b");
        assert_eq!(normalize_text("a\r\tb"), "a  b");
    }

    #[test]
    fn test_x_offset_alignment() {
        let ltr = TextDirection::Ltr;
        assert_eq!(calculate_text_x_offset(100.0, TextAlign::Left, ltr), 0.0);
        assert_eq!(calculate_text_x_offset(100.0, TextAlign::Right, ltr), -100.0);
        assert_eq!(calculate_text_x_offset(100.0, TextAlign::Center, ltr), -50.0);
        assert_eq!(calculate_text_x_offset(100.0, TextAlign::Start, ltr), 0.0);
        assert_eq!(calculate_text_x_offset(100.0, TextAlign::End, ltr), -100.0);
    }

    #[test]
    fn test_x_offset_direction_swaps_start_end() {
        let rtl = TextDirection::Rtl;
        assert_eq!(calculate_text_x_offset(100.0, TextAlign::Start, rtl), -100.0);
        assert_eq!(calculate_text_x_offset(100.0, TextAlign::End, rtl), 0.0);
        // Physical left/right are unaffected by direction.
        assert_eq!(calculate_text_x_offset(100.0, TextAlign::Left, rtl), 0.0);
    }

    #[test]
    fn test_y_offset_baselines() {
        let ascent = 8.0;
        let descent = 2.0;
        assert_eq!(
            calculate_text_y_offset(ascent, descent, TextBaseline::Top),
            8.0
        );
        assert_eq!(
            calculate_text_y_offset(ascent, descent, TextBaseline::Alphabetic),
            0.0
        );
        assert_eq!(
            calculate_text_y_offset(ascent, descent, TextBaseline::Bottom),
            -2.0
        );
        assert_eq!(
            calculate_text_y_offset(ascent, descent, TextBaseline::Middle),
            3.0
        );
    }
}
