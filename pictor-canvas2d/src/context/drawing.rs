//! Fill, stroke, clip, and paint plumbing for Canvas2dContext.

use super::Canvas2dContext;
use crate::drawing_state::ClipState;
use crate::filter::{FilterChain, FilterOp};
use crate::geometry::RectParams;
use crate::path2d::Path2D;
use crate::pathops::{self, PathOp};
use crate::style::{CanvasFillRule, FillStyle};
use crate::surface::{PaintSpec, RecordedOp, StrokeSpec};
use tiny_skia::Transform;

impl Canvas2dContext {
    // --- Clipping ---

    /// Intersect the clip region with the current path using the
    /// non-zero winding rule.
    pub fn clip(&mut self) {
        log::debug!(target: "canvas", "clip");
        self.clip_with_rule(CanvasFillRule::NonZero);
    }

    /// Intersect the clip region with the current path using the given
    /// fill rule.
    pub fn clip_with_rule(&mut self, fill_rule: CanvasFillRule) {
        log::debug!(target: "canvas", "clip_with_rule {:?}", fill_rule);
        let path =
            std::mem::replace(&mut self.path_builder, tiny_skia::PathBuilder::new()).finish();

        if let Some(path) = path {
            // Inline path coordinates are pre-transformed to device space
            self.intersect_clip(path, fill_rule, Transform::identity());
        }
    }

    /// Intersect the clip region with a Path2D using the non-zero rule.
    pub fn clip_path2d(&mut self, path: &mut Path2D) {
        self.clip_path2d_with_rule(path, CanvasFillRule::NonZero);
    }

    /// Intersect the clip region with a Path2D using the given fill rule.
    ///
    /// The path is interpreted under the transform active at the time of
    /// this call; the current path is untouched.
    pub fn clip_path2d_with_rule(&mut self, path: &mut Path2D, fill_rule: CanvasFillRule) {
        let transform = self.state.transform;
        if let Some(p) = path.get_path() {
            let p = p.clone();
            self.intersect_clip(p, fill_rule, transform);
        }
    }

    /// Replace the active clip with the intersection of itself and a new
    /// clip region.
    ///
    /// The intersection is computed geometrically so the stored clip is
    /// always a single cumulative region. Re-deriving masks from it after
    /// any number of surface promotions reproduces the same coverage.
    fn intersect_clip(
        &mut self,
        path: tiny_skia::Path,
        rule: CanvasFillRule,
        transform: Transform,
    ) {
        let incoming = device_poly(&path, transform);

        let combined = match self.state.clip.take() {
            None => {
                self.state.clip = Some(ClipState {
                    path,
                    rule,
                    transform,
                });
                return;
            }
            Some(existing) => {
                let current = device_poly(&existing.path, existing.transform);
                pathops::boolean_op(&current, existing.rule, &incoming, rule, PathOp::Intersect)
            }
        };

        let clip_path = pathops::poly_to_path(&combined).unwrap_or_else(empty_clip_path);
        self.state.clip = Some(ClipState {
            path: clip_path,
            rule: CanvasFillRule::NonZero,
            transform: Transform::identity(),
        });
    }

    // --- Drawing operations ---

    /// Fill the current path using the non-zero winding rule.
    pub fn fill(&mut self) {
        log::debug!(target: "canvas", "fill");
        self.fill_with_rule(CanvasFillRule::NonZero);
    }

    /// Fill the current path with the specified fill rule.
    pub fn fill_with_rule(&mut self, fill_rule: CanvasFillRule) {
        log::debug!(target: "canvas", "fill_with_rule {:?}", fill_rule);
        // Clone the path builder so we don't consume it - stroke() may follow
        let path = self.path_builder.clone().finish();

        if let Some(path) = path {
            // Path coordinates are already in device space (pre-transformed)
            self.submit_fill(path, fill_rule, Transform::identity());
        }
    }

    /// Stroke the current path.
    pub fn stroke(&mut self) {
        log::debug!(target: "canvas", "stroke");
        // Clone the path builder so we don't consume it - fill() may have been called or may follow
        let path = self.path_builder.clone().finish();

        if let Some(path) = path {
            // Scale line width and dash pattern by the average axis scale of the CTM,
            // since path coordinates are pre-transformed but stroke width is in user space
            let t = &self.state.transform;
            let scale =
                ((t.sx * t.sx + t.ky * t.ky).sqrt() + (t.kx * t.kx + t.sy * t.sy).sqrt()) / 2.0;
            self.submit_stroke(path, Transform::identity(), scale);
        }
    }

    // --- Path2D operations ---

    /// Fill a Path2D object using the non-zero winding rule.
    pub fn fill_path2d(&mut self, path: &mut Path2D) {
        self.fill_path2d_with_rule(path, CanvasFillRule::NonZero);
    }

    /// Fill a Path2D object with the specified fill rule.
    ///
    /// The current path is not touched.
    pub fn fill_path2d_with_rule(&mut self, path: &mut Path2D, fill_rule: CanvasFillRule) {
        let transform = self.state.transform;
        if let Some(p) = path.get_path() {
            let p = p.clone();
            self.submit_fill(p, fill_rule, transform);
        }
    }

    /// Stroke a Path2D object. The current path is not touched.
    pub fn stroke_path2d(&mut self, path: &mut Path2D) {
        let transform = self.state.transform;
        if let Some(p) = path.get_path() {
            let p = p.clone();
            self.submit_stroke(p, transform, 1.0);
        }
    }

    // --- Hit testing ---

    /// Check whether a point (in user space) falls inside the current
    /// path under the non-zero rule.
    pub fn is_point_in_path(&self, x: f32, y: f32) -> bool {
        self.is_point_in_path_with_rule(x, y, CanvasFillRule::NonZero)
    }

    /// Check whether a point (in user space) falls inside the current
    /// path under the given rule.
    pub fn is_point_in_path_with_rule(&self, x: f32, y: f32, rule: CanvasFillRule) -> bool {
        let Some(path) = self.path_builder.clone().finish() else {
            return false;
        };
        // The current path is stored in device space.
        let (dx, dy) = self.transform_point(x, y);
        pathops::point_in_path(&path, dx as f64, dy as f64, rule)
    }

    /// Check whether a point falls inside an explicit Path2D, tested in
    /// the path's own coordinate space. The current path is untouched.
    pub fn is_point_in_path_path2d(
        &self,
        path: &Path2D,
        x: f32,
        y: f32,
        rule: Option<CanvasFillRule>,
    ) -> bool {
        path.is_point_in_path(x as f64, y as f64, rule.or(Some(CanvasFillRule::NonZero)))
    }

    /// Check whether a point falls in the stroke of the current path
    /// under the current stroke parameters.
    pub fn is_point_in_stroke(&self, x: f32, y: f32) -> bool {
        let Some(path) = self.path_builder.clone().finish() else {
            return false;
        };
        let (dx, dy) = self.transform_point(x, y);
        pathops::point_in_stroke(&path, dx as f64, dy as f64, &self.stroke_options())
    }

    /// Check whether a point falls in the stroke of an explicit Path2D.
    pub fn is_point_in_stroke_path2d(&self, path: &Path2D, x: f32, y: f32) -> bool {
        path.is_point_in_stroke(x as f64, y as f64, &self.stroke_options())
    }

    fn stroke_options(&self) -> pathops::StrokeOptions {
        pathops::StrokeOptions {
            width: self.state.line_width,
            miter_limit: self.state.miter_limit,
            cap: self.state.line_cap,
            join: self.state.line_join,
        }
    }

    // --- Rectangle conveniences (independent of the current path) ---

    /// Fill a rectangle. Does not consult or modify the current path.
    pub fn fill_rect(&mut self, params: &RectParams) {
        log::debug!(target: "canvas", "fillRect {} {} {} {}", params.x, params.y, params.width, params.height);
        if let Some(path) = self.device_rect_path(params) {
            self.submit_fill(path, CanvasFillRule::NonZero, Transform::identity());
        }
    }

    /// Stroke a rectangle. Does not consult or modify the current path.
    pub fn stroke_rect(&mut self, params: &RectParams) {
        log::debug!(target: "canvas", "strokeRect {} {} {} {}", params.x, params.y, params.width, params.height);
        if let Some(path) = self.device_rect_path(params) {
            let t = &self.state.transform;
            let scale =
                ((t.sx * t.sx + t.ky * t.ky).sqrt() + (t.kx * t.kx + t.sy * t.sy).sqrt()) / 2.0;
            self.submit_stroke(path, Transform::identity(), scale);
        }
    }

    /// Clear a rectangle (set pixels to transparent).
    ///
    /// Clearing the full canvas under an identity transform with no
    /// active clip and no unbalanced `save()` takes a whole-surface reset
    /// fast path; any of those conditions suppresses it and the clear
    /// runs as an ordinary clipped/transformed operation.
    pub fn clear_rect(&mut self, params: &RectParams) {
        log::debug!(target: "canvas", "clearRect {} {} {} {}", params.x, params.y, params.width, params.height);

        if self.covers_full_surface(params)
            && self.state.transform == Transform::identity()
            && self.state.clip.is_none()
            && self.saved_depth() == 0
        {
            self.surface.clear_all();
            return;
        }

        if let Some(path) = self.device_rect_path(params) {
            let op = RecordedOp::FillPath {
                path,
                paint: PaintSpec {
                    style: FillStyle::Color(tiny_skia::Color::TRANSPARENT),
                    global_alpha: 1.0,
                    blend: tiny_skia::BlendMode::Clear,
                    anti_alias: true,
                    shader_transform: Transform::identity(),
                },
                rule: tiny_skia::FillRule::Winding,
                transform: Transform::identity(),
                clip: self.state.clip.clone(),
                filter: FilterChain::default(),
            };
            self.surface.draw(op);
        }
    }

    fn covers_full_surface(&self, params: &RectParams) -> bool {
        params.x <= 0.0
            && params.y <= 0.0
            && params.x + params.width >= self.surface.width() as f32
            && params.y + params.height >= self.surface.height() as f32
    }

    /// Build the device-space path of a rectangle under the CTM.
    fn device_rect_path(&self, params: &RectParams) -> Option<tiny_skia::Path> {
        let (x0, y0) = self.transform_point(params.x, params.y);
        let (x1, y1) = self.transform_point(params.x + params.width, params.y);
        let (x2, y2) = self.transform_point(params.x + params.width, params.y + params.height);
        let (x3, y3) = self.transform_point(params.x, params.y + params.height);

        let mut pb = tiny_skia::PathBuilder::new();
        pb.move_to(x0, y0);
        pb.line_to(x1, y1);
        pb.line_to(x2, y2);
        pb.line_to(x3, y3);
        pb.close();
        pb.finish()
    }

    // --- Draw submission ---

    /// Submit a fill op (plus a shadow pass when shadows are visible).
    pub(crate) fn submit_fill(
        &mut self,
        path: tiny_skia::Path,
        rule: CanvasFillRule,
        transform: Transform,
    ) {
        let style = self.state.fill_style.clone();

        if self.state.has_visible_shadow() {
            let op = RecordedOp::FillPath {
                path: path.clone(),
                paint: self.shadow_paint_spec(),
                rule: rule.into(),
                transform: self.shadow_transform(transform),
                clip: self.state.clip.clone(),
                filter: self.shadow_filter(),
            };
            self.surface.draw(op);
        }

        let op = RecordedOp::FillPath {
            path,
            paint: self.paint_spec(style),
            rule: rule.into(),
            transform,
            clip: self.state.clip.clone(),
            filter: self.state.filter.clone(),
        };
        self.surface.draw(op);
    }

    /// Submit a stroke op (plus a shadow pass when shadows are visible).
    ///
    /// `scale` adjusts the user-space line width/dash for pre-transformed
    /// device-space paths.
    pub(crate) fn submit_stroke(
        &mut self,
        path: tiny_skia::Path,
        transform: Transform,
        scale: f32,
    ) {
        let style = self.state.stroke_style.clone();
        let stroke = self.stroke_spec(scale);

        if self.state.has_visible_shadow() {
            let op = RecordedOp::StrokePath {
                path: path.clone(),
                paint: self.shadow_paint_spec(),
                stroke: stroke.clone(),
                transform: self.shadow_transform(transform),
                clip: self.state.clip.clone(),
                filter: self.shadow_filter(),
            };
            self.surface.draw(op);
        }

        let op = RecordedOp::StrokePath {
            path,
            paint: self.paint_spec(style),
            stroke,
            transform,
            clip: self.state.clip.clone(),
            filter: self.state.filter.clone(),
        };
        self.surface.draw(op);
    }

    pub(crate) fn paint_spec(&self, style: FillStyle) -> PaintSpec {
        PaintSpec {
            style,
            global_alpha: self.state.global_alpha,
            blend: self.state.global_composite_operation,
            anti_alias: true,
            shader_transform: self.state.transform,
        }
    }

    fn stroke_spec(&self, scale: f32) -> StrokeSpec {
        StrokeSpec {
            width: self.state.line_width * scale,
            cap: self.state.line_cap.into(),
            join: self.state.line_join.into(),
            miter_limit: self.state.miter_limit,
            dash: self.state.line_dash.iter().map(|d| d * scale).collect(),
            dash_offset: self.state.line_dash_offset * scale,
        }
    }

    fn shadow_paint_spec(&self) -> PaintSpec {
        PaintSpec {
            style: FillStyle::Color(self.state.shadow_color),
            global_alpha: self.state.global_alpha,
            blend: self.state.global_composite_operation,
            anti_alias: true,
            shader_transform: self.state.transform,
        }
    }

    /// Shadow offsets apply in device space, unaffected by the CTM.
    fn shadow_transform(&self, base: Transform) -> Transform {
        base.post_translate(self.state.shadow_offset_x, self.state.shadow_offset_y)
    }

    fn shadow_filter(&self) -> FilterChain {
        if self.state.shadow_blur > 0.0 {
            // Canvas shadowBlur b corresponds to a Gaussian sigma of b/2.
            FilterChain::from_ops(vec![FilterOp::Blur(self.state.shadow_blur / 2.0)])
        } else {
            FilterChain::default()
        }
    }
}

/// Flatten a path and map it into device space.
fn device_poly(path: &tiny_skia::Path, transform: Transform) -> pathops::PolyPath {
    let mut poly = pathops::flatten_path(path, pathops::FLATTEN_TOLERANCE);
    if transform != Transform::identity() {
        for contour in &mut poly.contours {
            for point in &mut contour.points {
                let (x, y) = (point.0, point.1);
                point.0 = transform.sx as f64 * x + transform.kx as f64 * y + transform.tx as f64;
                point.1 = transform.ky as f64 * x + transform.sy as f64 * y + transform.ty as f64;
            }
        }
    }
    poly
}

/// Near-degenerate path used when a clip intersection comes out empty;
/// its mask covers no pixel, so everything is clipped away.
fn empty_clip_path() -> tiny_skia::Path {
    let mut pb = tiny_skia::PathBuilder::new();
    pb.move_to(0.0, 0.0);
    pb.line_to(1e-4, 0.0);
    pb.line_to(0.0, 1e-4);
    pb.close();
    pb.finish().expect("sliver clip path finishes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom_matrix::DOMMatrix;

    fn red(ctx: &mut Canvas2dContext) {
        assert!(ctx.set_fill_style("#ff0000"));
    }

    fn alpha_at(ctx: &mut Canvas2dContext, x: i32, y: i32) -> u8 {
        ctx.get_image_data(x, y, 1, 1)[3]
    }

    #[test]
    fn test_fill_rect_ignores_current_path() {
        let mut ctx = Canvas2dContext::new(50, 50).unwrap();
        red(&mut ctx);
        ctx.begin_path();
        ctx.move_to(0.0, 0.0);
        ctx.line_to(10.0, 10.0);
        ctx.fill_rect(&RectParams {
            x: 20.0,
            y: 20.0,
            width: 10.0,
            height: 10.0,
        });
        // The in-progress path is still the two-point line, not the rect.
        assert!(!ctx.is_point_in_path(25.0, 25.0));
        assert_eq!(alpha_at(&mut ctx, 25, 25), 255);
    }

    #[test]
    fn test_clip_restricts_fill() {
        let mut ctx = Canvas2dContext::new(40, 40).unwrap();
        red(&mut ctx);
        ctx.begin_path();
        ctx.rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 40.0,
        });
        ctx.clip();
        ctx.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 40.0,
            height: 40.0,
        });
        assert_eq!(alpha_at(&mut ctx, 10, 20), 255);
        assert_eq!(alpha_at(&mut ctx, 30, 20), 0);
    }

    #[test]
    fn test_nested_clips_intersect() {
        let mut ctx = Canvas2dContext::new(40, 40).unwrap();
        red(&mut ctx);
        ctx.begin_path();
        ctx.rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 30.0,
            height: 40.0,
        });
        ctx.clip();
        ctx.begin_path();
        ctx.rect(&RectParams {
            x: 10.0,
            y: 0.0,
            width: 30.0,
            height: 40.0,
        });
        ctx.clip();
        ctx.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 40.0,
            height: 40.0,
        });
        // Only the 10..30 overlap band passes both clips.
        assert_eq!(alpha_at(&mut ctx, 5, 20), 0);
        assert_eq!(alpha_at(&mut ctx, 20, 20), 255);
        assert_eq!(alpha_at(&mut ctx, 35, 20), 0);
    }

    #[test]
    fn test_nested_clips_match_single_intersected_clip() {
        // clip(A); clip(B) must fill the same region as clip(A ∩ B).
        let draw_nested = || {
            let mut ctx = Canvas2dContext::new(40, 40).unwrap();
            ctx.set_fill_style("#00ff00");
            ctx.begin_path();
            ctx.rect(&RectParams {
                x: 5.0,
                y: 5.0,
                width: 20.0,
                height: 20.0,
            });
            ctx.clip();
            ctx.begin_path();
            ctx.rect(&RectParams {
                x: 15.0,
                y: 10.0,
                width: 20.0,
                height: 20.0,
            });
            ctx.clip();
            ctx.fill_rect(&RectParams {
                x: 0.0,
                y: 0.0,
                width: 40.0,
                height: 40.0,
            });
            ctx.get_image_data(0, 0, 40, 40)
        };
        let draw_single = || {
            let mut ctx = Canvas2dContext::new(40, 40).unwrap();
            ctx.set_fill_style("#00ff00");
            let mut a = Path2D::new();
            a.rect(&RectParams {
                x: 5.0,
                y: 5.0,
                width: 20.0,
                height: 20.0,
            });
            let mut b = Path2D::new();
            b.rect(&RectParams {
                x: 15.0,
                y: 10.0,
                width: 20.0,
                height: 20.0,
            });
            let mut intersected = a.op(&b, PathOp::Intersect);
            ctx.clip_path2d(&mut intersected);
            ctx.fill_rect(&RectParams {
                x: 0.0,
                y: 0.0,
                width: 40.0,
                height: 40.0,
            });
            ctx.get_image_data(0, 0, 40, 40)
        };
        assert_eq!(draw_nested(), draw_single());
    }

    #[test]
    fn test_disjoint_clips_block_everything() {
        let mut ctx = Canvas2dContext::new(40, 40).unwrap();
        red(&mut ctx);
        ctx.begin_path();
        ctx.rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        });
        ctx.clip();
        ctx.begin_path();
        ctx.rect(&RectParams {
            x: 20.0,
            y: 20.0,
            width: 10.0,
            height: 10.0,
        });
        ctx.clip();
        ctx.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 40.0,
            height: 40.0,
        });
        let data = ctx.get_image_data(0, 0, 40, 40);
        assert!(data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_clear_rect_fast_path_and_suppression() {
        // Fast path: full-canvas clear with default state.
        let mut ctx = Canvas2dContext::new(20, 20).unwrap();
        red(&mut ctx);
        ctx.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
        });
        ctx.clear_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
        });
        assert!(ctx.get_image_data(0, 0, 20, 20).iter().all(|&b| b == 0));

        // Suppressed by a pending save: still clears the full rect, but
        // as an ordinary operation that leaves the save stack intact.
        let mut ctx = Canvas2dContext::new(20, 20).unwrap();
        red(&mut ctx);
        ctx.set_line_width(7.0);
        ctx.save();
        ctx.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
        });
        ctx.clear_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
        });
        assert!(ctx.get_image_data(0, 0, 20, 20).iter().all(|&b| b == 0));
        ctx.set_line_width(3.0);
        ctx.restore();
        assert_eq!(ctx.state.line_width, 7.0);

        // Suppressed by a clip: pixels outside the clip survive.
        let mut ctx = Canvas2dContext::new(20, 20).unwrap();
        red(&mut ctx);
        ctx.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
        });
        ctx.begin_path();
        ctx.rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 20.0,
        });
        ctx.clip();
        ctx.clear_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
        });
        assert_eq!(alpha_at(&mut ctx, 5, 10), 0);
        assert_eq!(alpha_at(&mut ctx, 15, 10), 255);
    }

    #[test]
    fn test_clear_rect_with_transform_clears_transformed_region() {
        let mut ctx = Canvas2dContext::new(20, 20).unwrap();
        red(&mut ctx);
        ctx.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
        });
        ctx.set_transform(DOMMatrix::new(1.0, 0.0, 0.0, 1.0, 10.0, 0.0));
        ctx.clear_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
        });
        // Only x >= 10 was cleared.
        assert_eq!(alpha_at(&mut ctx, 5, 10), 255);
        assert_eq!(alpha_at(&mut ctx, 15, 10), 0);
    }

    #[test]
    fn test_current_path_survives_save_restore() {
        let mut ctx = Canvas2dContext::new(50, 50).unwrap();
        red(&mut ctx);
        ctx.begin_path();
        ctx.rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
        });
        ctx.save();
        ctx.restore();
        // The in-progress path is not part of the saved state.
        assert!(ctx.is_point_in_path(10.0, 10.0));
        ctx.fill();
        assert_eq!(alpha_at(&mut ctx, 10, 10), 255);
    }

    #[test]
    fn test_rect_hit_test_boundary() {
        let mut ctx = Canvas2dContext::new(200, 200).unwrap();
        ctx.begin_path();
        ctx.rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        });
        assert!(!ctx.is_point_in_path(50.0, -1.0));
        assert!(ctx.is_point_in_path(50.0, 0.0));
        assert!(ctx.is_point_in_path(50.0, 1.0));
    }

    #[test]
    fn test_fill_and_stroke_share_current_path() {
        let mut ctx = Canvas2dContext::new(50, 50).unwrap();
        red(&mut ctx);
        assert!(ctx.set_stroke_style("#0000ff"));
        ctx.set_line_width(2.0);
        ctx.begin_path();
        ctx.rect(&RectParams {
            x: 10.0,
            y: 10.0,
            width: 30.0,
            height: 30.0,
        });
        ctx.fill();
        ctx.stroke();
        // Interior red, border blue.
        let interior = ctx.get_image_data(25, 25, 1, 1);
        assert_eq!(interior[0], 255);
        let edge = ctx.get_image_data(25, 10, 1, 1);
        assert!(edge[2] > 200);
    }

    #[test]
    fn test_shadow_pass_paints_offset_silhouette() {
        let mut ctx = Canvas2dContext::new(60, 60).unwrap();
        red(&mut ctx);
        assert!(ctx.set_shadow_color("#000000"));
        ctx.set_shadow_offset_x(15.0);
        ctx.set_shadow_offset_y(0.0);
        ctx.fill_rect(&RectParams {
            x: 10.0,
            y: 10.0,
            width: 10.0,
            height: 10.0,
        });
        // Shape itself.
        assert_eq!(alpha_at(&mut ctx, 15, 15), 255);
        // Offset shadow to the right of the shape.
        assert!(alpha_at(&mut ctx, 32, 15) > 0);
    }

    #[test]
    fn test_filter_grayscale_applies_to_fill() {
        let mut ctx = Canvas2dContext::new(20, 20).unwrap();
        red(&mut ctx);
        assert!(ctx.set_filter("grayscale(100%)"));
        ctx.fill_rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
        });
        let data = ctx.get_image_data(10, 10, 1, 1);
        assert_eq!(data[0], data[1]);
        assert_eq!(data[1], data[2]);
        assert!(data[0] > 0);
    }
}
