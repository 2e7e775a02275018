//! Path2D implementation for reusable path objects.
//!
//! Path2D allows creating path objects that can be reused across multiple
//! fill, stroke, or clip operations. Builder calls mutate the path being
//! built; the geometric operators (`op`, `simplify`, `as_winding`,
//! `stroke`, `trim`, `dash`) are value operations returning new paths.

use crate::dom_matrix::DOMMatrix;
use crate::error::{CanvasError, CanvasResult};
use crate::geometry::{
    ArcParams, ArcToParams, CubicBezierParams, EllipseParams, QuadraticBezierParams, RectParams,
    RoundRectParams,
};
use crate::pathops::{self, PathOp, StrokeOptions};
use crate::style::CanvasFillRule;
use tiny_skia::{PathBuilder, PathSegment};

/// A reusable path object that can be used with fill, stroke, and clip
/// operations.
#[derive(Debug, Clone)]
pub struct Path2D {
    /// The underlying path builder for constructing the path.
    builder: PathBuilder,
    /// Cached finished path (invalidated when path is modified).
    path: Option<tiny_skia::Path>,
    /// Fill rule tag carried by the path.
    fill_rule: CanvasFillRule,
    /// Current position for tracking subpath.
    current_x: f32,
    current_y: f32,
    /// Subpath start for closePath.
    subpath_start_x: f32,
    subpath_start_y: f32,
    /// Whether the path has a current point (for arc line_to vs move_to).
    has_current_point: bool,
}

impl Default for Path2D {
    fn default() -> Self {
        Self::new()
    }
}

impl Path2D {
    /// Create an empty path.
    pub fn new() -> Self {
        Self {
            builder: PathBuilder::new(),
            path: None,
            fill_rule: CanvasFillRule::NonZero,
            current_x: 0.0,
            current_y: 0.0,
            subpath_start_x: 0.0,
            subpath_start_y: 0.0,
            has_current_point: false,
        }
    }

    /// Create a copy of another Path2D.
    pub fn from_path(other: &Path2D) -> Self {
        other.clone()
    }

    /// Create a Path2D from SVG path data string.
    ///
    /// Supports all SVG path commands (M, L, H, V, Q, T, C, S, A, Z).
    /// Arc commands are automatically converted to cubic Bezier curves.
    pub fn from_svg_path_data(path_data: &str) -> CanvasResult<Self> {
        let mut path = Path2D::new();

        for segment in svgtypes::SimplifyingPathParser::from(path_data) {
            let segment = segment.map_err(|e| {
                CanvasError::InvalidArgument(format!("Invalid SVG path data: {:?}", e))
            })?;

            match segment {
                svgtypes::SimplePathSegment::MoveTo { x, y } => {
                    path.move_to(x as f32, y as f32);
                }
                svgtypes::SimplePathSegment::LineTo { x, y } => {
                    path.line_to(x as f32, y as f32);
                }
                svgtypes::SimplePathSegment::Quadratic { x1, y1, x, y } => {
                    path.quadratic_curve_to(&QuadraticBezierParams {
                        cpx: x1 as f32,
                        cpy: y1 as f32,
                        x: x as f32,
                        y: y as f32,
                    });
                }
                svgtypes::SimplePathSegment::CurveTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    x,
                    y,
                } => {
                    path.bezier_curve_to(&CubicBezierParams {
                        cp1x: x1 as f32,
                        cp1y: y1 as f32,
                        cp2x: x2 as f32,
                        cp2y: y2 as f32,
                        x: x as f32,
                        y: y as f32,
                    });
                }
                svgtypes::SimplePathSegment::ClosePath => {
                    path.close_path();
                }
            }
        }

        Ok(path)
    }

    /// Invalidate the cached path (called when path is modified).
    fn invalidate(&mut self) {
        self.path = None;
    }

    /// Append another path, optionally transformed.
    pub fn add_path(&mut self, other: &Path2D, matrix: Option<DOMMatrix>) {
        self.invalidate();
        let Some(src) = other.snapshot() else {
            return;
        };
        let map = |p: tiny_skia::Point| -> (f32, f32) {
            match matrix {
                Some(m) => {
                    let (x, y) = m.transform_point(p.x as f64, p.y as f64);
                    (x as f32, y as f32)
                }
                None => (p.x, p.y),
            }
        };
        for segment in src.segments() {
            match segment {
                PathSegment::MoveTo(p) => {
                    let (x, y) = map(p);
                    self.move_to(x, y);
                }
                PathSegment::LineTo(p) => {
                    let (x, y) = map(p);
                    self.line_to(x, y);
                }
                PathSegment::QuadTo(c, p) => {
                    let (cx, cy) = map(c);
                    let (x, y) = map(p);
                    self.quadratic_curve_to(&QuadraticBezierParams {
                        cpx: cx,
                        cpy: cy,
                        x,
                        y,
                    });
                }
                PathSegment::CubicTo(c1, c2, p) => {
                    let (c1x, c1y) = map(c1);
                    let (c2x, c2y) = map(c2);
                    let (x, y) = map(p);
                    self.bezier_curve_to(&CubicBezierParams {
                        cp1x: c1x,
                        cp1y: c1y,
                        cp2x: c2x,
                        cp2y: c2y,
                        x,
                        y,
                    });
                }
                PathSegment::Close => self.close_path(),
            }
        }
    }

    /// Move to a point without drawing.
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.invalidate();
        self.builder.move_to(x, y);
        self.current_x = x;
        self.current_y = y;
        self.subpath_start_x = x;
        self.subpath_start_y = y;
        self.has_current_point = true;
    }

    /// Draw a line to a point.
    pub fn line_to(&mut self, x: f32, y: f32) {
        self.invalidate();
        self.builder.line_to(x, y);
        self.current_x = x;
        self.current_y = y;
        self.has_current_point = true;
    }

    /// Close the current subpath.
    pub fn close_path(&mut self) {
        self.invalidate();
        self.builder.close();
        self.current_x = self.subpath_start_x;
        self.current_y = self.subpath_start_y;
    }

    /// Add a cubic bezier curve.
    pub fn bezier_curve_to(&mut self, params: &CubicBezierParams) {
        self.invalidate();
        self.builder.cubic_to(
            params.cp1x,
            params.cp1y,
            params.cp2x,
            params.cp2y,
            params.x,
            params.y,
        );
        self.current_x = params.x;
        self.current_y = params.y;
        self.has_current_point = true;
    }

    /// Add a quadratic bezier curve.
    pub fn quadratic_curve_to(&mut self, params: &QuadraticBezierParams) {
        self.invalidate();
        self.builder
            .quad_to(params.cpx, params.cpy, params.x, params.y);
        self.current_x = params.x;
        self.current_y = params.y;
        self.has_current_point = true;
    }

    /// Add a rectangle to the path.
    pub fn rect(&mut self, params: &RectParams) {
        self.invalidate();
        self.move_to(params.x, params.y);
        self.line_to(params.x + params.width, params.y);
        self.line_to(params.x + params.width, params.y + params.height);
        self.line_to(params.x, params.y + params.height);
        self.close_path();
    }

    /// Add a rounded rectangle to the path.
    ///
    /// Negative width/height rectangles are normalized before the radii
    /// are applied; oversized radii are scaled down uniformly.
    pub fn round_rect(&mut self, params: &RoundRectParams) {
        use crate::geometry::CornerRadius;

        self.invalidate();

        // Handle negative dimensions by adjusting position
        let (x, width) = if params.width < 0.0 {
            (params.x + params.width, -params.width)
        } else {
            (params.x, params.width)
        };
        let (y, height) = if params.height < 0.0 {
            (params.y + params.height, -params.height)
        } else {
            (params.y, params.height)
        };

        let clamp = |r: CornerRadius| CornerRadius {
            x: r.x.max(0.0),
            y: r.y.max(0.0),
        };
        let [mut tl, mut tr, mut br, mut bl] = params.radii.map(clamp);

        // Scale radii uniformly if they exceed the rectangle dimensions
        let top = (tl.x + tr.x).max(1e-10);
        let bottom = (bl.x + br.x).max(1e-10);
        let left = (tl.y + bl.y).max(1e-10);
        let right = (tr.y + br.y).max(1e-10);
        let scale = (width / top)
            .min(width / bottom)
            .min(height / left)
            .min(height / right)
            .min(1.0);

        if scale < 1.0 {
            for r in [&mut tl, &mut tr, &mut br, &mut bl] {
                r.x *= scale;
                r.y *= scale;
            }
        }

        // Kappa for quarter-ellipse cubic Bezier approximation
        const K: f32 = 0.552_284_8;

        self.builder.move_to(x + tl.x, y);
        self.builder.line_to(x + width - tr.x, y);
        if tr.x > 0.0 || tr.y > 0.0 {
            self.builder.cubic_to(
                x + width - tr.x + tr.x * K,
                y,
                x + width,
                y + tr.y - tr.y * K,
                x + width,
                y + tr.y,
            );
        }
        self.builder.line_to(x + width, y + height - br.y);
        if br.x > 0.0 || br.y > 0.0 {
            self.builder.cubic_to(
                x + width,
                y + height - br.y + br.y * K,
                x + width - br.x + br.x * K,
                y + height,
                x + width - br.x,
                y + height,
            );
        }
        self.builder.line_to(x + bl.x, y + height);
        if bl.x > 0.0 || bl.y > 0.0 {
            self.builder.cubic_to(
                x + bl.x - bl.x * K,
                y + height,
                x,
                y + height - bl.y + bl.y * K,
                x,
                y + height - bl.y,
            );
        }
        self.builder.line_to(x, y + tl.y);
        if tl.x > 0.0 || tl.y > 0.0 {
            self.builder
                .cubic_to(x, y + tl.y - tl.y * K, x + tl.x - tl.x * K, y, x + tl.x, y);
        }
        self.builder.close();

        self.subpath_start_x = x + tl.x;
        self.subpath_start_y = y;
        self.current_x = x + tl.x;
        self.current_y = y;
        self.has_current_point = true;
    }

    /// Add an arc to the path.
    pub fn arc(&mut self, params: &ArcParams) {
        self.invalidate();
        crate::arc::arc(&mut self.builder, params, self.has_current_point);
        self.has_current_point = true;
    }

    /// Add an arcTo segment to the path.
    pub fn arc_to(&mut self, params: &ArcToParams) {
        self.invalidate();
        if !self.has_current_point {
            self.move_to(params.x1, params.y1);
            return;
        }
        crate::arc::arc_to(
            &mut self.builder,
            self.current_x,
            self.current_y,
            params,
        );
    }

    /// Add an ellipse to the path.
    pub fn ellipse(&mut self, params: &EllipseParams) {
        self.invalidate();
        crate::arc::ellipse(&mut self.builder, params, self.has_current_point);
        self.has_current_point = true;
    }

    /// Transform every point of the path in place.
    pub fn transform(&mut self, matrix: &DOMMatrix) {
        let Some(src) = self.snapshot() else {
            return;
        };
        let map = |p: tiny_skia::Point| -> (f32, f32) {
            let (x, y) = matrix.transform_point(p.x as f64, p.y as f64);
            (x as f32, y as f32)
        };
        let mut builder = PathBuilder::new();
        for segment in src.segments() {
            match segment {
                PathSegment::MoveTo(p) => {
                    let (x, y) = map(p);
                    builder.move_to(x, y);
                }
                PathSegment::LineTo(p) => {
                    let (x, y) = map(p);
                    builder.line_to(x, y);
                }
                PathSegment::QuadTo(c, p) => {
                    let (cx, cy) = map(c);
                    let (x, y) = map(p);
                    builder.quad_to(cx, cy, x, y);
                }
                PathSegment::CubicTo(c1, c2, p) => {
                    let (c1x, c1y) = map(c1);
                    let (c2x, c2y) = map(c2);
                    let (x, y) = map(p);
                    builder.cubic_to(c1x, c1y, c2x, c2y, x, y);
                }
                PathSegment::Close => builder.close(),
            }
        }
        self.builder = builder;
        self.invalidate();
        let (cx, cy) = matrix.transform_point(self.current_x as f64, self.current_y as f64);
        let (sx, sy) =
            matrix.transform_point(self.subpath_start_x as f64, self.subpath_start_y as f64);
        self.current_x = cx as f32;
        self.current_y = cy as f32;
        self.subpath_start_x = sx as f32;
        self.subpath_start_y = sy as f32;
    }

    // --- Fill rule tag ---

    /// Set the fill rule carried by this path.
    pub fn set_fill_type(&mut self, rule: CanvasFillRule) {
        self.fill_rule = rule;
    }

    /// The fill rule carried by this path.
    pub fn fill_type(&self) -> CanvasFillRule {
        self.fill_rule
    }

    /// The fill rule as its canonical keyword (`"nonzero"`/`"evenodd"`).
    pub fn fill_type_string(&self) -> &'static str {
        self.fill_rule.as_str()
    }

    // --- Value operations ---

    /// Combine with another path under a boolean operator, producing a
    /// new path. Degenerate inputs produce an empty path.
    pub fn op(&self, other: &Path2D, op: PathOp) -> Path2D {
        let a = self.flattened();
        let b = other.flattened();
        let result = pathops::boolean_op(&a, self.fill_rule, &b, other.fill_rule, op);
        Path2D::from_poly(&result)
    }

    /// Remove self-intersections and redundant overlap while preserving
    /// the covered region.
    pub fn simplify(&self) -> Path2D {
        let result = pathops::resolve_region(&self.flattened(), self.fill_rule);
        Path2D::from_poly(&result)
    }

    /// Convert to an equivalent nonzero-filled path with identical
    /// coverage. On an already nonzero path with no self-overlap this is
    /// a no-op on rendered output.
    pub fn as_winding(&self) -> Path2D {
        match self.fill_rule {
            CanvasFillRule::NonZero => {
                let mut out = self.clone();
                out.fill_rule = CanvasFillRule::NonZero;
                out
            }
            CanvasFillRule::EvenOdd => {
                let result = pathops::resolve_region(&self.flattened(), CanvasFillRule::EvenOdd);
                Path2D::from_poly(&result)
            }
        }
    }

    /// Convert the stroked outline of this path into a fill path.
    pub fn stroke(&self, options: &StrokeOptions) -> Path2D {
        let result = pathops::stroke_path(&self.flattened(), options);
        Path2D::from_poly(&result)
    }

    /// Keep only the `[start, end]` fraction range of each contour's arc
    /// length (the complement when `inverted`).
    pub fn trim(&self, start: f64, end: f64, inverted: bool) -> Path2D {
        let result = pathops::trim_path(&self.flattened(), start, end, inverted);
        let mut out = Path2D::from_poly(&result);
        out.fill_rule = self.fill_rule;
        out
    }

    /// Rewrite the path as disconnected dash segments.
    pub fn dash(&self, on: f64, off: f64, phase: f64) -> Path2D {
        let result = pathops::dash_path(&self.flattened(), on, off, phase);
        let mut out = Path2D::from_poly(&result);
        out.fill_rule = self.fill_rule;
        out
    }

    // --- Queries ---

    /// Tight bounds `[left, top, right, bottom]` of the actual geometry;
    /// `[0, 0, 0, 0]` for an empty path.
    pub fn compute_tight_bounds(&self) -> [f64; 4] {
        pathops::compute_tight_bounds(self.snapshot().as_ref())
    }

    /// Control-point bounds `(left, top, right, bottom)`.
    pub fn get_bounds(&self) -> (f64, f64, f64, f64) {
        match self.snapshot() {
            Some(path) => {
                let b = path.bounds();
                (
                    b.left() as f64,
                    b.top() as f64,
                    b.right() as f64,
                    b.bottom() as f64,
                )
            }
            None => (0.0, 0.0, 0.0, 0.0),
        }
    }

    /// Serialize to an SVG path `d` attribute string.
    pub fn to_svg_string(&self) -> String {
        pathops::path_to_svg_string(self.snapshot().as_ref())
    }

    /// Hit test a point against the path interior.
    pub fn is_point_in_path(&self, x: f64, y: f64, rule: Option<CanvasFillRule>) -> bool {
        let rule = rule.unwrap_or(self.fill_rule);
        match self.snapshot() {
            Some(path) => pathops::point_in_path(&path, x, y, rule),
            None => false,
        }
    }

    /// Hit test a point against the stroked outline of the path.
    pub fn is_point_in_stroke(&self, x: f64, y: f64, options: &StrokeOptions) -> bool {
        match self.snapshot() {
            Some(path) => pathops::point_in_stroke(&path, x, y, options),
            None => false,
        }
    }

    /// Structural-geometric equality: identical segment lists and fill
    /// rule. An empty path never equals a non-empty one.
    pub fn equals(&self, other: &Path2D) -> bool {
        if self.fill_rule != other.fill_rule {
            return false;
        }
        match (self.snapshot(), other.snapshot()) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a.segments().collect::<Vec<_>>() == b.segments().collect::<Vec<_>>()
            }
            _ => false,
        }
    }

    // --- Internal ---

    /// Get the finished path for rendering.
    /// Returns None if the path is empty.
    pub(crate) fn get_path(&mut self) -> Option<&tiny_skia::Path> {
        if self.path.is_none() {
            // Clone the builder to finish it without consuming it
            let builder_clone = self.builder.clone();
            self.path = builder_clone.finish();
        }
        self.path.as_ref()
    }

    /// Finished path without touching the cache (for value operations on
    /// shared references).
    pub(crate) fn snapshot(&self) -> Option<tiny_skia::Path> {
        match &self.path {
            Some(path) => Some(path.clone()),
            None => self.builder.clone().finish(),
        }
    }

    fn flattened(&self) -> pathops::PolyPath {
        match self.snapshot() {
            Some(path) => pathops::flatten_path(&path, pathops::FLATTEN_TOLERANCE),
            None => pathops::PolyPath::default(),
        }
    }

    /// Rebuild a Path2D from polyline contours (nonzero result).
    fn from_poly(poly: &pathops::PolyPath) -> Path2D {
        let mut out = Path2D::new();
        for contour in &poly.contours {
            if contour.points.len() < 2 {
                continue;
            }
            let (x0, y0) = contour.points[0];
            out.move_to(x0 as f32, y0 as f32);
            for &(x, y) in &contour.points[1..] {
                out.line_to(x as f32, y as f32);
            }
            if contour.closed {
                out.close_path();
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{LineCap, LineJoin};

    fn rect_path() -> Path2D {
        let mut path = Path2D::new();
        path.rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        });
        path
    }

    #[test]
    fn test_empty_path_returns_none() {
        let mut path = Path2D::new();
        assert!(path.get_path().is_none());
    }

    #[test]
    fn test_rect_to_svg_string() {
        let path = rect_path();
        assert_eq!(path.to_svg_string(), "M0 0L100 0L100 100L0 100L0 0Z");
    }

    #[test]
    fn test_transform_interleaved_with_rects() {
        let mut p = Path2D::new();
        p.transform(&DOMMatrix::new(1.0, 0.2, 0.8, 1.0, 0.0, 0.0));
        p.rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        });
        p.transform(&DOMMatrix::identity());
        p.rect(&RectParams {
            x: 220.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        });
        assert_eq!(
            p.to_svg_string(),
            "M0 0L100 0L100 100L0 100L0 0ZM220 0L320 0L320 100L220 100L220 0Z"
        );
    }

    #[test]
    fn test_stroke_miter_rect_exact_svg() {
        let stroked = rect_path().stroke(&StrokeOptions {
            width: 20.0,
            join: LineJoin::Miter,
            ..Default::default()
        });
        assert_eq!(
            stroked.to_svg_string(),
            "M-10 -10L110 -10L110 110L-10 110L-10 -10ZM10 10L10 90L90 90L90 10L10 10Z"
        );
    }

    #[test]
    fn test_stroke_bevel_rect_exact_svg() {
        let stroked = rect_path().stroke(&StrokeOptions {
            width: 20.0,
            join: LineJoin::Bevel,
            ..Default::default()
        });
        assert_eq!(
            stroked.to_svg_string(),
            "M0 -10L100 -10L110 0L110 100L100 110L0 110L-10 100L-10 0L0 -10ZM10 10L10 90L90 90L90 10L10 10Z"
        );
    }

    #[test]
    fn test_stroke_does_not_mutate_original() {
        let path = rect_path();
        let before = path.to_svg_string();
        let _ = path.stroke(&StrokeOptions {
            width: 20.0,
            ..Default::default()
        });
        assert_eq!(path.to_svg_string(), before);
    }

    #[test]
    fn test_compute_tight_bounds_empty_and_arc() {
        let p = Path2D::new();
        assert_eq!(p.compute_tight_bounds(), [0.0, 0.0, 0.0, 0.0]);

        let mut p = Path2D::new();
        p.arc(&ArcParams {
            x: 50.0,
            y: 45.0,
            radius: 25.0,
            start_angle: 0.0,
            end_angle: 2.0 * std::f32::consts::PI,
            anticlockwise: false,
        });
        let b = p.compute_tight_bounds();
        assert!((b[0] - 25.0).abs() < 0.05);
        assert!((b[1] - 20.0).abs() < 0.05);
        assert!((b[2] - 75.0).abs() < 0.05);
        assert!((b[3] - 70.0).abs() < 0.05);
    }

    #[test]
    fn test_is_point_in_path_boundary() {
        let path = rect_path();
        assert!(!path.is_point_in_path(50.0, -1.0, None));
        assert!(path.is_point_in_path(50.0, 0.0, None));
        assert!(path.is_point_in_path(50.0, 1.0, None));
    }

    #[test]
    fn test_union_of_disjoint_paths_covers_both() {
        let mut a = Path2D::new();
        a.rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        });
        let mut b = Path2D::new();
        b.rect(&RectParams {
            x: 20.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        });
        let union = a.op(&b, PathOp::Union);
        for (x, y, expect) in [
            (5.0, 5.0, true),
            (25.0, 5.0, true),
            (15.0, 5.0, false),
            (-5.0, 5.0, false),
        ] {
            assert_eq!(union.is_point_in_path(x, y, None), expect, "({}, {})", x, y);
            // Union of disjoint shapes agrees with either operand.
            assert_eq!(
                union.is_point_in_path(x, y, None),
                a.is_point_in_path(x, y, None) || b.is_point_in_path(x, y, None)
            );
        }
    }

    #[test]
    fn test_as_winding_on_winding_path_is_noop() {
        let path = rect_path();
        let converted = path.as_winding();
        assert_eq!(converted.fill_type(), CanvasFillRule::NonZero);
        assert_eq!(converted.to_svg_string(), path.to_svg_string());
    }

    #[test]
    fn test_as_winding_resolves_even_odd_hole() {
        let mut path = Path2D::new();
        path.rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        });
        path.rect(&RectParams {
            x: 25.0,
            y: 25.0,
            width: 50.0,
            height: 50.0,
        });
        path.set_fill_type(CanvasFillRule::EvenOdd);

        let winding = path.as_winding();
        assert_eq!(winding.fill_type(), CanvasFillRule::NonZero);
        // Same coverage under the new rule: ring filled, hole empty.
        assert!(winding.is_point_in_path(10.0, 10.0, None));
        assert!(!winding.is_point_in_path(50.0, 50.0, None));
    }

    #[test]
    fn test_set_fill_type_roundtrip() {
        let mut path = rect_path();
        assert_eq!(path.fill_type_string(), "nonzero");
        path.set_fill_type(CanvasFillRule::EvenOdd);
        assert_eq!(path.fill_type_string(), "evenodd");
        assert_eq!(path.as_winding().fill_type_string(), "nonzero");
    }

    #[test]
    fn test_equals_structural() {
        let a = rect_path();
        let mut b = Path2D::new();
        b.move_to(0.0, 0.0);
        b.line_to(100.0, 0.0);
        b.line_to(100.0, 100.0);
        b.line_to(0.0, 100.0);
        b.close_path();
        assert!(a.equals(&b));

        let empty = Path2D::new();
        assert!(!a.equals(&empty));
        assert!(empty.equals(&Path2D::new()));
    }

    #[test]
    fn test_svg_roundtrip_canonical() {
        let source = "M10 10L50 50L10 50Z";
        let path = Path2D::from_svg_path_data(source).unwrap();
        let serialized = path.to_svg_string();
        let reparsed = Path2D::from_svg_path_data(&serialized).unwrap();
        assert_eq!(reparsed.to_svg_string(), serialized);
    }

    #[test]
    fn test_svg_invalid_input_is_error() {
        assert!(Path2D::from_svg_path_data("not valid path data").is_err());
    }

    #[test]
    fn test_trim_keeps_fraction() {
        let trimmed = rect_path().trim(0.25, 1.0, false);
        let svg = trimmed.to_svg_string();
        // The top edge (first quarter of the perimeter) is gone.
        assert!(svg.starts_with("M100 0"));
        assert!(!trimmed.is_point_in_path(50.0, -0.5, None));
    }

    #[test]
    fn test_dash_splits_contours() {
        let mut line = Path2D::new();
        line.move_to(0.0, 0.0);
        line.line_to(100.0, 0.0);
        let dashed = line.dash(10.0, 10.0, 0.0);
        let svg = dashed.to_svg_string();
        assert_eq!(svg.matches('M').count(), 5);
    }

    #[test]
    fn test_add_path_with_matrix() {
        let mut base = Path2D::new();
        let mut other = Path2D::new();
        other.rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        });
        base.add_path(&other, Some(DOMMatrix::new(1.0, 0.0, 0.0, 1.0, 100.0, 0.0)));
        assert_eq!(
            base.to_svg_string(),
            "M100 0L110 0L110 10L100 10L100 0Z"
        );
    }

    #[test]
    fn test_op_with_empty_operand_degrades_gracefully() {
        let empty = Path2D::new();
        let rect = rect_path();
        let intersection = rect.op(&empty, PathOp::Intersect);
        assert_eq!(intersection.to_svg_string(), "");
        let union = rect.op(&empty, PathOp::Union);
        assert!(union.is_point_in_path(50.0, 50.0, None));
    }

    #[test]
    fn test_simplify_removes_overlap() {
        let mut path = Path2D::new();
        path.rect(&RectParams {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
        });
        path.rect(&RectParams {
            x: 10.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
        });
        let simplified = path.simplify();
        // One merged contour covering the union of the two rects.
        assert_eq!(simplified.to_svg_string().matches('M').count(), 1);
        assert!(simplified.is_point_in_path(15.0, 10.0, None));
        assert!(simplified.is_point_in_path(25.0, 10.0, None));
        assert!(!simplified.is_point_in_path(35.0, 10.0, None));
    }

    #[test]
    fn test_round_rect_negative_dimensions_normalized() {
        let mut path = Path2D::new();
        path.round_rect(&RoundRectParams {
            x: 100.0,
            y: 50.0,
            width: -100.0,
            height: -50.0,
            radii: RoundRectParams::broadcast_radii(&[5.0]),
        });
        let b = path.compute_tight_bounds();
        assert!((b[0] - 0.0).abs() < 1e-4);
        assert!((b[1] - 0.0).abs() < 1e-4);
        assert!((b[2] - 100.0).abs() < 1e-4);
        assert!((b[3] - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_is_point_in_stroke() {
        let path = rect_path();
        let opts = StrokeOptions {
            width: 10.0,
            cap: LineCap::Butt,
            ..Default::default()
        };
        assert!(path.is_point_in_stroke(50.0, 2.0, &opts));
        assert!(!path.is_point_in_stroke(50.0, 50.0, &opts));
    }
}
