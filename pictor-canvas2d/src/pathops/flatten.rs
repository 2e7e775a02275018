//! Curve flattening from tiny-skia paths to polyline contours.

use kurbo::{PathEl, Point};
use tiny_skia::PathSegment;

/// A single polyline contour.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Contour {
    /// Contour points in order.
    pub points: Vec<(f64, f64)>,
    /// Whether the contour was explicitly closed.
    pub closed: bool,
}

impl Contour {
    /// Signed area (shoelace). Positive when the contour winds
    /// counterclockwise in plain math convention.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            let (x1, y1) = self.points[i];
            let (x2, y2) = self.points[(i + 1) % n];
            sum += x1 * y2 - x2 * y1;
        }
        sum / 2.0
    }
}

/// A path reduced to polyline contours.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PolyPath {
    pub contours: Vec<Contour>,
}

impl PolyPath {
    /// Bounding box over all contour points, or None when empty.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for contour in &self.contours {
            for &(x, y) in &contour.points {
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((l, t, r, b)) => (l.min(x), t.min(y), r.max(x), b.max(y)),
                });
            }
        }
        bounds
    }
}

/// Convert a tiny-skia path to kurbo path elements.
pub(crate) fn path_elements(path: &tiny_skia::Path) -> Vec<PathEl> {
    let pt = |p: tiny_skia::Point| Point::new(p.x as f64, p.y as f64);
    path.segments()
        .map(|segment| match segment {
            PathSegment::MoveTo(p) => PathEl::MoveTo(pt(p)),
            PathSegment::LineTo(p) => PathEl::LineTo(pt(p)),
            PathSegment::QuadTo(c, p) => PathEl::QuadTo(pt(c), pt(p)),
            PathSegment::CubicTo(c1, c2, p) => PathEl::CurveTo(pt(c1), pt(c2), pt(p)),
            PathSegment::Close => PathEl::ClosePath,
        })
        .collect()
}

/// Flatten a tiny-skia path into polyline contours at the given tolerance.
pub(crate) fn flatten_path(path: &tiny_skia::Path, tolerance: f64) -> PolyPath {
    let elements = path_elements(path);

    let mut contours: Vec<Contour> = Vec::new();
    let mut current: Option<Contour> = None;

    kurbo::flatten(elements, tolerance, |el| match el {
        PathEl::MoveTo(p) => {
            if let Some(contour) = current.take() {
                if contour.points.len() >= 2 {
                    contours.push(contour);
                }
            }
            current = Some(Contour {
                points: vec![(p.x, p.y)],
                closed: false,
            });
        }
        PathEl::LineTo(p) => {
            if let Some(contour) = current.as_mut() {
                // Skip zero-length segments produced by flattening.
                if contour.points.last() != Some(&(p.x, p.y)) {
                    contour.points.push((p.x, p.y));
                }
            }
        }
        PathEl::ClosePath => {
            if let Some(mut contour) = current.take() {
                // Drop an explicit closing point that duplicates the start.
                if contour.points.len() > 1 && contour.points.last() == contour.points.first() {
                    contour.points.pop();
                }
                contour.closed = true;
                if contour.points.len() >= 2 {
                    contours.push(contour);
                }
            }
        }
        _ => unreachable!("flatten emits only move/line/close"),
    });

    if let Some(contour) = current.take() {
        if contour.points.len() >= 2 {
            contours.push(contour);
        }
    }

    PolyPath { contours }
}

/// Rebuild a tiny-skia path from polyline contours.
pub(crate) fn poly_to_path(poly: &PolyPath) -> Option<tiny_skia::Path> {
    let mut builder = tiny_skia::PathBuilder::new();
    for contour in &poly.contours {
        if contour.points.len() < 2 {
            continue;
        }
        let (x0, y0) = contour.points[0];
        builder.move_to(x0 as f32, y0 as f32);
        for &(x, y) in &contour.points[1..] {
            builder.line_to(x as f32, y as f32);
        }
        if contour.closed {
            builder.close();
        }
    }
    builder.finish()
}
