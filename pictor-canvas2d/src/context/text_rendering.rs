//! Text rendering operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::error::CanvasResult;
use crate::font_parser::parse_font;
use crate::style::{CanvasFillRule, FontStretch, TextAlign, TextBaseline};
use crate::text::TextMetrics;
use cosmic_text::{Attrs, Buffer, CacheKeyFlags, Command, Family, Metrics, Shaping};
use tiny_skia::Transform;

impl Canvas2dContext {
    /// Set the font from a CSS font string.
    pub fn set_font(&mut self, font: &str) -> CanvasResult<()> {
        self.state.font = parse_font(font)?;
        Ok(())
    }

    /// Set the text alignment.
    pub fn set_text_align(&mut self, align: TextAlign) {
        self.state.text_align = align;
    }

    /// Set the text baseline.
    pub fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.state.text_baseline = baseline;
    }

    /// Set the font stretch (width).
    pub fn set_font_stretch(&mut self, stretch: FontStretch) {
        self.state.font.stretch = stretch;
    }

    /// Get the current font stretch.
    pub fn get_font_stretch(&self) -> FontStretch {
        self.state.font.stretch
    }

    /// Set the letter spacing for text rendering (in pixels).
    pub fn set_letter_spacing(&mut self, spacing: f32) {
        if spacing.is_finite() {
            self.state.letter_spacing = spacing;
        }
    }

    /// Get the current letter spacing (in pixels).
    pub fn get_letter_spacing(&self) -> f32 {
        self.state.letter_spacing
    }

    /// Set the word spacing for text rendering (in pixels).
    pub fn set_word_spacing(&mut self, spacing: f32) {
        if spacing.is_finite() {
            self.state.word_spacing = spacing;
        }
    }

    /// Get the current word spacing (in pixels).
    pub fn get_word_spacing(&self) -> f32 {
        self.state.word_spacing
    }

    /// Measure text and return metrics.
    ///
    /// Embedded line breaks measure as plain spaces, and the total
    /// advance width is direction-independent.
    pub fn measure_text(&mut self, text: &str) -> CanvasResult<TextMetrics> {
        let mut metrics = crate::text::measure_text(
            &mut self.font_system,
            text,
            &self.state.font,
            self.state.letter_spacing,
        )?;
        if self.state.word_spacing != 0.0 {
            let spaces = text.chars().filter(|c| *c == ' ').count() as f32;
            metrics.width += spaces * self.state.word_spacing;
            metrics.actual_bounding_box_right = metrics.width;
        }
        Ok(metrics)
    }

    /// Fill text at the specified position.
    pub fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        log::debug!(target: "canvas", "fillText \"{}\" {} {}", text, x, y);
        self.render_text_impl(text, x, y, None, true);
    }

    /// Fill text at the specified position with a maximum width.
    ///
    /// If the text width exceeds max_width, the text is horizontally scaled to fit.
    /// If max_width is <= 0, NaN, or the text would be scaled below 0.1%, nothing is rendered.
    pub fn fill_text_max_width(&mut self, text: &str, x: f32, y: f32, max_width: f32) {
        self.render_text_impl(text, x, y, Some(max_width), true);
    }

    /// Stroke text at the specified position.
    pub fn stroke_text(&mut self, text: &str, x: f32, y: f32) {
        log::debug!(target: "canvas", "strokeText \"{}\" {} {}", text, x, y);
        self.render_text_impl(text, x, y, None, false);
    }

    /// Stroke text at the specified position with a maximum width.
    pub fn stroke_text_max_width(&mut self, text: &str, x: f32, y: f32, max_width: f32) {
        self.render_text_impl(text, x, y, Some(max_width), false);
    }

    /// Internal text rendering using vector glyph paths.
    fn render_text_impl(&mut self, text: &str, x: f32, y: f32, max_width: Option<f32>, fill: bool) {
        // Handle max_width edge cases: if <= 0 or NaN, don't render
        if let Some(mw) = max_width {
            if mw <= 0.0 || mw.is_nan() {
                return;
            }
        }

        let text = crate::text::normalize_text(text);
        let font = &self.state.font;
        let metrics = Metrics::new(font.size_px, font.size_px * 1.2);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);

        let family = font
            .families
            .first()
            .map(|f| crate::text::resolve_family(&self.font_system, f))
            .unwrap_or(Family::SansSerif);

        let mut attrs = Attrs::new()
            .family(family)
            .weight(font.weight)
            .style(font.style)
            .stretch(font.stretch.into())
            .letter_spacing(self.state.letter_spacing);
        if !self.hinting_enabled {
            attrs = attrs.cache_key_flags(CacheKeyFlags::DISABLE_HINTING);
        }

        buffer.set_text(&mut self.font_system, &text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(&mut self.font_system, false);

        // Get text dimensions for alignment
        let mut text_width: f32 = 0.0;
        let mut text_ascent: f32 = 0.0;
        let mut text_descent: f32 = 0.0;
        for run in buffer.layout_runs() {
            text_width = text_width.max(run.line_w);
            text_ascent = text_ascent.max(run.line_y - run.line_top);
            text_descent = text_descent.max((run.line_top + run.line_height) - run.line_y);
        }
        if text_ascent == 0.0 && text_descent == 0.0 {
            text_ascent = font.size_px * 0.8;
            text_descent = font.size_px * 0.2;
        }

        // Calculate horizontal scale factor for maxWidth
        let scale_x = if let Some(mw) = max_width {
            if mw.is_infinite() || text_width <= mw {
                1.0
            } else {
                let scale = mw / text_width;
                // Don't render if scale would be too small (< 0.1%)
                if scale < 0.001 {
                    return;
                }
                scale
            }
        } else {
            1.0
        };

        // Alignment offset uses the ORIGINAL text width; the scale
        // transform around the anchor handles maxWidth placement.
        let x_offset =
            crate::text::calculate_text_x_offset(text_width, self.state.text_align, self.state.direction);
        let y_offset =
            crate::text::calculate_text_y_offset(text_ascent, text_descent, self.state.text_baseline);

        let base_x = x + x_offset;
        let base_y = y + y_offset;

        let transform = self.state.transform;
        let scale_transform = if scale_x != 1.0 {
            // Scale around the x anchor point (keeping y unchanged)
            Transform::from_translate(x, 0.0)
                .pre_scale(scale_x, 1.0)
                .pre_translate(-x, 0.0)
                .post_concat(transform)
        } else {
            transform
        };

        // Collect glyph outline paths first; rendering borrows the
        // context mutably per submitted op.
        let mut glyph_paths: Vec<(tiny_skia::Path, Transform)> = Vec::new();
        for run in buffer.layout_runs() {
            for glyph in run.glyphs.iter() {
                let physical_glyph = glyph.physical((base_x, base_y), 1.0);
                let glyph_x = base_x + glyph.x + glyph.font_size * glyph.x_offset;
                let glyph_y = base_y + glyph.y - glyph.font_size * glyph.y_offset;

                if let Some(commands) = self
                    .swash_cache
                    .get_outline_commands(&mut self.font_system, physical_glyph.cache_key)
                {
                    // Font outlines have Y pointing up, screen has Y
                    // pointing down, so Y negates during path building.
                    let mut path_builder = tiny_skia::PathBuilder::new();
                    for cmd in commands {
                        match cmd {
                            Command::MoveTo(p) => path_builder.move_to(p.x, -p.y),
                            Command::LineTo(p) => path_builder.line_to(p.x, -p.y),
                            Command::QuadTo(ctrl, end) => {
                                path_builder.quad_to(ctrl.x, -ctrl.y, end.x, -end.y)
                            }
                            Command::CurveTo(c1, c2, end) => {
                                path_builder.cubic_to(c1.x, -c1.y, c2.x, -c2.y, end.x, -end.y)
                            }
                            Command::Close => path_builder.close(),
                        }
                    }

                    if let Some(path) = path_builder.finish() {
                        let glyph_transform = Transform::from_translate(glyph_x, glyph_y)
                            .post_concat(scale_transform);
                        glyph_paths.push((path, glyph_transform));
                    }
                }
            }
        }

        for (path, glyph_transform) in glyph_paths {
            if fill {
                self.submit_fill(path, CanvasFillRule::NonZero, glyph_transform);
            } else {
                self.submit_stroke(path, glyph_transform, 1.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_font_updates_state() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        ctx.set_font("bold 14px Arial").unwrap();
        assert_eq!(ctx.state.font.size_px, 14.0);
        assert_eq!(ctx.state.font.weight, cosmic_text::Weight::BOLD);
    }

    #[test]
    fn test_font_stretch_via_font_setter() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        ctx.set_font("condensed 12px Arial").unwrap();
        assert_eq!(ctx.get_font_stretch(), FontStretch::Condensed);

        // Setting font without stretch resets to Normal
        ctx.set_font("12px Arial").unwrap();
        assert_eq!(ctx.get_font_stretch(), FontStretch::Normal);
    }

    #[test]
    fn test_font_stretch_save_restore() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        ctx.set_font_stretch(FontStretch::SemiExpanded);
        ctx.save();
        ctx.set_font_stretch(FontStretch::ExtraCondensed);
        ctx.restore();
        assert_eq!(ctx.get_font_stretch(), FontStretch::SemiExpanded);
    }

    #[test]
    fn test_spacing_setters_ignore_non_finite() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        ctx.set_letter_spacing(2.0);
        ctx.set_letter_spacing(f32::NAN);
        assert_eq!(ctx.get_letter_spacing(), 2.0);

        ctx.set_word_spacing(3.0);
        ctx.set_word_spacing(f32::INFINITY);
        assert_eq!(ctx.get_word_spacing(), 3.0);
    }

    #[test]
    fn test_measure_text_line_break_equals_space() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        let broken = ctx.measure_text("ab\ncd").unwrap();
        let spaced = ctx.measure_text("ab cd").unwrap();
        assert!((broken.width - spaced.width).abs() < 0.01);
    }

    #[test]
    fn test_measure_text_direction_independent_width() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        let ltr = ctx.measure_text("hello world").unwrap();
        assert!(ctx.set_direction("rtl"));
        let rtl = ctx.measure_text("hello world").unwrap();
        assert!((ltr.width - rtl.width).abs() < 0.01);
    }

    #[test]
    fn test_measure_text_word_spacing_adds_per_space() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        let base = ctx.measure_text("a b c").unwrap();
        ctx.set_word_spacing(10.0);
        let spaced = ctx.measure_text("a b c").unwrap();
        assert!((spaced.width - base.width - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_fill_text_max_width_edge_cases_render_nothing() {
        let mut ctx = Canvas2dContext::new(50, 50).unwrap();
        ctx.set_fill_style("#ff0000");
        ctx.fill_text_max_width("hello", 10.0, 25.0, 0.0);
        ctx.fill_text_max_width("hello", 10.0, 25.0, -5.0);
        ctx.fill_text_max_width("hello", 10.0, 25.0, f32::NAN);
        let data = ctx.get_image_data(0, 0, 50, 50);
        assert!(data.iter().all(|&b| b == 0));
    }
}
