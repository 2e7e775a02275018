//! Path building operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::geometry::{
    ArcParams, ArcToParams, CubicBezierParams, EllipseParams, QuadraticBezierParams, RectParams,
    RoundRectParams,
};
use tiny_skia::{PathSegment, Transform};

impl Canvas2dContext {
    /// Begin a new path.
    pub fn begin_path(&mut self) {
        log::debug!(target: "canvas", "beginPath");
        self.path_builder = tiny_skia::PathBuilder::new();
        self.has_current_point = false;
    }

    /// Transform a point by the current transformation matrix.
    /// Path coordinates are transformed when they are added to the path.
    pub(crate) fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        Self::map_point_with_transform(&self.state.transform, x, y)
    }

    pub(crate) fn map_point_with_transform(transform: &Transform, x: f32, y: f32) -> (f32, f32) {
        (
            transform.sx * x + transform.kx * y + transform.tx,
            transform.ky * x + transform.sy * y + transform.ty,
        )
    }

    /// Append all segments from a finished path to the current path builder,
    /// transforming each point by the given transform.
    ///
    /// Used by arc/arc_to/ellipse/round_rect to merge temp-built paths into
    /// the main path with pre-transformation applied.
    pub(crate) fn append_transformed_path(
        &mut self,
        path: &tiny_skia::Path,
        transform: Transform,
        connect_first_move: bool,
        skip_first_move: bool,
    ) {
        let mut saw_first_move = false;

        for segment in path.segments() {
            match segment {
                PathSegment::MoveTo(p) => {
                    let (x, y) = Self::map_point_with_transform(&transform, p.x, p.y);

                    if !saw_first_move {
                        saw_first_move = true;
                        if skip_first_move {
                            if !self.has_current_point {
                                self.path_builder.move_to(x, y);
                                self.subpath_start_x = x;
                                self.subpath_start_y = y;
                                self.current_x = x;
                                self.current_y = y;
                                self.has_current_point = true;
                            }
                            continue;
                        }

                        if connect_first_move && self.has_current_point {
                            self.path_builder.line_to(x, y);
                        } else {
                            self.path_builder.move_to(x, y);
                            self.subpath_start_x = x;
                            self.subpath_start_y = y;
                        }
                    } else {
                        self.path_builder.move_to(x, y);
                        self.subpath_start_x = x;
                        self.subpath_start_y = y;
                    }

                    self.current_x = x;
                    self.current_y = y;
                    self.has_current_point = true;
                }
                PathSegment::LineTo(p) => {
                    let (x, y) = Self::map_point_with_transform(&transform, p.x, p.y);
                    self.path_builder.line_to(x, y);
                    self.current_x = x;
                    self.current_y = y;
                    self.has_current_point = true;
                }
                PathSegment::QuadTo(ctrl, p) => {
                    let (cx, cy) = Self::map_point_with_transform(&transform, ctrl.x, ctrl.y);
                    let (x, y) = Self::map_point_with_transform(&transform, p.x, p.y);
                    self.path_builder.quad_to(cx, cy, x, y);
                    self.current_x = x;
                    self.current_y = y;
                    self.has_current_point = true;
                }
                PathSegment::CubicTo(ctrl1, ctrl2, p) => {
                    let (c1x, c1y) = Self::map_point_with_transform(&transform, ctrl1.x, ctrl1.y);
                    let (c2x, c2y) = Self::map_point_with_transform(&transform, ctrl2.x, ctrl2.y);
                    let (x, y) = Self::map_point_with_transform(&transform, p.x, p.y);
                    self.path_builder.cubic_to(c1x, c1y, c2x, c2y, x, y);
                    self.current_x = x;
                    self.current_y = y;
                    self.has_current_point = true;
                }
                PathSegment::Close => {
                    self.path_builder.close();
                    self.current_x = self.subpath_start_x;
                    self.current_y = self.subpath_start_y;
                    self.has_current_point = true;
                }
            }
        }
    }

    /// Move to a point without drawing.
    pub fn move_to(&mut self, x: f32, y: f32) {
        log::debug!(target: "canvas", "moveTo {} {}", x, y);
        let (tx, ty) = self.transform_point(x, y);
        self.path_builder.move_to(tx, ty);
        self.current_x = tx;
        self.current_y = ty;
        self.subpath_start_x = tx;
        self.subpath_start_y = ty;
        self.has_current_point = true;
    }

    /// Draw a line to a point.
    pub fn line_to(&mut self, x: f32, y: f32) {
        log::debug!(target: "canvas", "lineTo {} {}", x, y);
        let (tx, ty) = self.transform_point(x, y);
        self.path_builder.line_to(tx, ty);
        self.current_x = tx;
        self.current_y = ty;
        self.has_current_point = true;
    }

    /// Close the current subpath.
    pub fn close_path(&mut self) {
        log::debug!(target: "canvas", "closePath");
        self.path_builder.close();
        self.current_x = self.subpath_start_x;
        self.current_y = self.subpath_start_y;
    }

    /// Add a cubic bezier curve.
    pub fn bezier_curve_to(&mut self, params: &CubicBezierParams) {
        let (tcp1x, tcp1y) = self.transform_point(params.cp1x, params.cp1y);
        let (tcp2x, tcp2y) = self.transform_point(params.cp2x, params.cp2y);
        let (tx, ty) = self.transform_point(params.x, params.y);
        self.path_builder
            .cubic_to(tcp1x, tcp1y, tcp2x, tcp2y, tx, ty);
        self.current_x = tx;
        self.current_y = ty;
        self.has_current_point = true;
    }

    /// Add a quadratic bezier curve.
    pub fn quadratic_curve_to(&mut self, params: &QuadraticBezierParams) {
        let (tcpx, tcpy) = self.transform_point(params.cpx, params.cpy);
        let (tx, ty) = self.transform_point(params.x, params.y);
        self.path_builder.quad_to(tcpx, tcpy, tx, ty);
        self.current_x = tx;
        self.current_y = ty;
        self.has_current_point = true;
    }

    /// Add a rectangle to the path.
    pub fn rect(&mut self, params: &RectParams) {
        log::debug!(target: "canvas", "rect {} {} {} {}", params.x, params.y, params.width, params.height);
        // Transform all four corners
        let (x0, y0) = self.transform_point(params.x, params.y);
        let (x1, y1) = self.transform_point(params.x + params.width, params.y);
        let (x2, y2) = self.transform_point(params.x + params.width, params.y + params.height);
        let (x3, y3) = self.transform_point(params.x, params.y + params.height);

        self.path_builder.move_to(x0, y0);
        self.path_builder.line_to(x1, y1);
        self.path_builder.line_to(x2, y2);
        self.path_builder.line_to(x3, y3);
        self.path_builder.close();

        self.current_x = x0;
        self.current_y = y0;
        self.subpath_start_x = x0;
        self.subpath_start_y = y0;
        self.has_current_point = true;
    }

    /// Add a rounded rectangle to the path.
    ///
    /// Built in user space (negative dimensions normalized, radii clamped
    /// and scaled), then transformed point-by-point to device space so
    /// rotation and non-uniform scale are handled correctly.
    pub fn round_rect(&mut self, params: &RoundRectParams) {
        let mut temp = crate::path2d::Path2D::new();
        temp.round_rect(params);
        if let Some(path) = temp.get_path() {
            let path = path.clone();
            self.append_transformed_path(&path, self.state.transform, false, false);
        }
    }

    /// Add an arc to the path.
    pub fn arc(&mut self, params: &ArcParams) {
        let mut arc_builder = tiny_skia::PathBuilder::new();
        crate::arc::arc(&mut arc_builder, params, false);

        if let Some(path) = arc_builder.finish() {
            self.append_transformed_path(&path, self.state.transform, true, false);
        }
    }

    /// Add an arcTo segment to the path.
    pub fn arc_to(&mut self, params: &ArcToParams) {
        if !self.has_current_point {
            self.move_to(params.x1, params.y1);
            return;
        }

        let transform = self.state.transform;
        let Some(inverse) = transform.invert() else {
            // Non-invertible transform: transform control points and approximate radius
            let (tx1, ty1) = self.transform_point(params.x1, params.y1);
            let (tx2, ty2) = self.transform_point(params.x2, params.y2);
            let t = &self.state.transform;
            let scale_x = (t.sx * t.sx + t.ky * t.ky).sqrt();
            let scale_y = (t.kx * t.kx + t.sy * t.sy).sqrt();
            let scaled_radius = params.radius * (scale_x + scale_y) / 2.0;

            crate::arc::arc_to(
                &mut self.path_builder,
                self.current_x,
                self.current_y,
                &ArcToParams {
                    x1: tx1,
                    y1: ty1,
                    x2: tx2,
                    y2: ty2,
                    radius: scaled_radius,
                },
            );
            return;
        };

        // current_x/current_y are in device space; map back to user space for arc_to
        let (local_x0, local_y0) =
            Self::map_point_with_transform(&inverse, self.current_x, self.current_y);
        let mut arc_builder = tiny_skia::PathBuilder::new();
        arc_builder.move_to(local_x0, local_y0);
        crate::arc::arc_to(&mut arc_builder, local_x0, local_y0, params);

        if let Some(path) = arc_builder.finish() {
            self.append_transformed_path(&path, transform, false, true);
        }
    }

    /// Add an ellipse to the path.
    pub fn ellipse(&mut self, params: &EllipseParams) {
        let mut ellipse_builder = tiny_skia::PathBuilder::new();
        crate::arc::ellipse(&mut ellipse_builder, params, false);

        if let Some(path) = ellipse_builder.finish() {
            self.append_transformed_path(
                &path,
                self.state.transform,
                self.has_current_point,
                false,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom_matrix::DOMMatrix;
    use crate::geometry::CornerRadius;

    #[test]
    fn test_rect_respects_transform() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        ctx.set_transform(DOMMatrix::new(1.0, 0.0, 0.0, 1.0, 10.0, 20.0));
        ctx.begin_path();
        ctx.rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 30.0,
            height: 30.0,
        });
        // Hit testing takes user-space coordinates.
        assert!(ctx.is_point_in_path(15.0, 15.0));
        // Device-space path landed at the translated position.
        let path = ctx.path_builder.clone().finish().unwrap();
        assert_eq!(path.bounds().left(), 10.0);
        assert_eq!(path.bounds().top(), 20.0);
    }

    #[test]
    fn test_arc_connects_to_existing_path_with_line() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        ctx.begin_path();
        ctx.move_to(0.0, 50.0);
        ctx.arc(&ArcParams {
            x: 50.0,
            y: 50.0,
            radius: 20.0,
            start_angle: 0.0,
            end_angle: std::f32::consts::PI,
            anticlockwise: false,
        });
        let path = ctx.path_builder.clone().finish().unwrap();
        let has_line = path
            .segments()
            .any(|s| matches!(s, PathSegment::LineTo(_)));
        assert!(has_line);
    }

    #[test]
    fn test_arc_to_without_current_point_moves() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        ctx.begin_path();
        ctx.arc_to(&ArcToParams {
            x1: 30.0,
            y1: 10.0,
            x2: 30.0,
            y2: 30.0,
            radius: 12.0,
        });
        assert!(ctx.has_current_point);
        assert_eq!((ctx.current_x, ctx.current_y), (30.0, 10.0));
    }

    #[test]
    fn test_arc_to_with_non_invertible_transform() {
        // A degenerate transform collapses the path at render time, but
        // path building must not panic.
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        ctx.begin_path();
        ctx.move_to(10.0, 10.0);
        ctx.set_transform(DOMMatrix::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0));

        ctx.arc_to(&ArcToParams {
            x1: 30.0,
            y1: 10.0,
            x2: 30.0,
            y2: 30.0,
            radius: 12.0,
        });

        assert!(ctx.has_current_point);
    }

    #[test]
    fn test_round_rect_under_rotation() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        ctx.rotate(std::f32::consts::FRAC_PI_4);
        ctx.begin_path();
        ctx.round_rect(&RoundRectParams {
            x: 10.0,
            y: 10.0,
            width: 40.0,
            height: 20.0,
            radii: [CornerRadius::uniform(5.0); 4],
        });
        assert!(ctx.path_builder.clone().finish().is_some());
    }

    #[test]
    fn test_begin_path_clears_current_point() {
        let mut ctx = Canvas2dContext::new(100, 100).unwrap();
        ctx.move_to(10.0, 10.0);
        assert!(ctx.has_current_point);
        ctx.begin_path();
        assert!(!ctx.has_current_point);
    }
}
