//! Point-in-path hit testing.
//!
//! Uses the same winding semantics as rasterization. Points on the
//! boundary count as inside, matching canvas hit-test behavior for the
//! top-left edges of a rectangle.

use super::flatten::{flatten_path, PolyPath};
use super::stroke::{stroke_path, StrokeOptions};
use super::FLATTEN_TOLERANCE;
use crate::style::CanvasFillRule;

const BOUNDARY_EPS: f64 = 1e-6;

fn cross(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ax * by - ay * bx
}

/// Distance-based check for a point lying on a segment.
fn on_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> bool {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    if len_sq < BOUNDARY_EPS * BOUNDARY_EPS {
        return (p.0 - a.0).abs() < BOUNDARY_EPS && (p.1 - a.1).abs() < BOUNDARY_EPS;
    }
    let t = ((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq;
    if !(-BOUNDARY_EPS..=1.0 + BOUNDARY_EPS).contains(&t) {
        return false;
    }
    let proj = (a.0 + dx * t, a.1 + dy * t);
    let dist_sq = (p.0 - proj.0).powi(2) + (p.1 - proj.1).powi(2);
    dist_sq < BOUNDARY_EPS * BOUNDARY_EPS
}

/// Hit test a polyline path under a fill rule. Contours are treated as
/// implicitly closed, matching fill semantics.
pub(crate) fn point_in_poly(poly: &PolyPath, x: f64, y: f64, rule: CanvasFillRule) -> bool {
    let p = (x, y);
    let mut wind = 0i32;

    for contour in &poly.contours {
        let n = contour.points.len();
        if n < 2 {
            continue;
        }
        for i in 0..n {
            let a = contour.points[i];
            let b = contour.points[(i + 1) % n];
            if on_segment(p, a, b) {
                return true;
            }
            if a.1 <= y {
                if b.1 > y && cross(b.0 - a.0, b.1 - a.1, x - a.0, y - a.1) > 0.0 {
                    wind += 1;
                }
            } else if b.1 <= y && cross(b.0 - a.0, b.1 - a.1, x - a.0, y - a.1) < 0.0 {
                wind -= 1;
            }
        }
    }

    match rule {
        CanvasFillRule::NonZero => wind != 0,
        CanvasFillRule::EvenOdd => wind % 2 != 0,
    }
}

/// Hit test the interior of a tiny-skia path.
pub(crate) fn point_in_path(
    path: &tiny_skia::Path,
    x: f64,
    y: f64,
    rule: CanvasFillRule,
) -> bool {
    let poly = flatten_path(path, FLATTEN_TOLERANCE);
    point_in_poly(&poly, x, y, rule)
}

/// Hit test the painted area of a stroked path.
pub(crate) fn point_in_stroke(
    path: &tiny_skia::Path,
    x: f64,
    y: f64,
    opts: &StrokeOptions,
) -> bool {
    let poly = flatten_path(path, FLATTEN_TOLERANCE);
    let outline = stroke_path(&poly, opts);
    point_in_poly(&outline, x, y, CanvasFillRule::NonZero)
}
