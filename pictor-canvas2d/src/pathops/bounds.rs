//! Tight bounds computation from path verbs.
//!
//! Control-point bounds overestimate curves; this walks the segments and
//! accumulates exact curve extents via kurbo's bounding boxes.

use kurbo::{CubicBez, Line, ParamCurveExtrema, Point, QuadBez, Rect};
use tiny_skia::PathSegment;

/// Tight geometry bounds `[left, top, right, bottom]`, or `[0, 0, 0, 0]`
/// for an empty path.
pub(crate) fn compute_tight_bounds(path: Option<&tiny_skia::Path>) -> [f64; 4] {
    let Some(path) = path else {
        return [0.0; 4];
    };

    let pt = |p: tiny_skia::Point| Point::new(p.x as f64, p.y as f64);
    let mut bounds: Option<Rect> = None;
    let mut last = Point::ZERO;
    let mut subpath_start = Point::ZERO;

    let mut add = |rect: Rect, bounds: &mut Option<Rect>| {
        *bounds = Some(match bounds {
            None => rect,
            Some(acc) => acc.union(rect),
        });
    };

    for segment in path.segments() {
        match segment {
            PathSegment::MoveTo(p) => {
                last = pt(p);
                subpath_start = last;
            }
            PathSegment::LineTo(p) => {
                let p = pt(p);
                add(Line::new(last, p).bounding_box(), &mut bounds);
                last = p;
            }
            PathSegment::QuadTo(c, p) => {
                let p = pt(p);
                add(QuadBez::new(last, pt(c), p).bounding_box(), &mut bounds);
                last = p;
            }
            PathSegment::CubicTo(c1, c2, p) => {
                let p = pt(p);
                add(
                    CubicBez::new(last, pt(c1), pt(c2), p).bounding_box(),
                    &mut bounds,
                );
                last = p;
            }
            PathSegment::Close => {
                add(Line::new(last, subpath_start).bounding_box(), &mut bounds);
                last = subpath_start;
            }
        }
    }

    match bounds {
        Some(rect) => [rect.x0, rect.y0, rect.x1, rect.y1],
        None => [0.0; 4],
    }
}
