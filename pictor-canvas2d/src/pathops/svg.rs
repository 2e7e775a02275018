//! SVG path-data serialization.
//!
//! Output is pinned by golden comparisons, so formatting must be exactly
//! reproducible: coordinates are rounded to f32 and printed as the
//! shortest decimal that round-trips, and a closed contour whose last
//! point differs from its start gets an explicit closing line before `Z`.

use std::fmt::Write as _;
use tiny_skia::PathSegment;

/// Format a coordinate: f32 precision, shortest round-tripping decimal.
fn fmt(v: f32) -> String {
    // Negative zero prints as plain zero.
    let v = if v == 0.0 { 0.0 } else { v };
    format!("{}", v)
}

/// Serialize a path to an SVG `d` attribute string.
pub(crate) fn path_to_svg_string(path: Option<&tiny_skia::Path>) -> String {
    let Some(path) = path else {
        return String::new();
    };

    let mut d = String::new();
    let mut subpath_start: Option<tiny_skia::Point> = None;
    let mut current: Option<tiny_skia::Point> = None;

    for segment in path.segments() {
        match segment {
            PathSegment::MoveTo(p) => {
                let _ = write!(d, "M{} {}", fmt(p.x), fmt(p.y));
                subpath_start = Some(p);
                current = Some(p);
            }
            PathSegment::LineTo(p) => {
                let _ = write!(d, "L{} {}", fmt(p.x), fmt(p.y));
                current = Some(p);
            }
            PathSegment::QuadTo(c, p) => {
                let _ = write!(d, "Q{} {} {} {}", fmt(c.x), fmt(c.y), fmt(p.x), fmt(p.y));
                current = Some(p);
            }
            PathSegment::CubicTo(c1, c2, p) => {
                let _ = write!(
                    d,
                    "C{} {} {} {} {} {}",
                    fmt(c1.x),
                    fmt(c1.y),
                    fmt(c2.x),
                    fmt(c2.y),
                    fmt(p.x),
                    fmt(p.y)
                );
                current = Some(p);
            }
            PathSegment::Close => {
                if let (Some(start), Some(last)) = (subpath_start, current) {
                    if start != last {
                        let _ = write!(d, "L{} {}", fmt(start.x), fmt(start.y));
                    }
                    current = Some(start);
                }
                d.push('Z');
            }
        }
    }

    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_serializes_empty() {
        assert_eq!(path_to_svg_string(None), "");
    }

    #[test]
    fn test_rect_serialization_with_explicit_close_edge() {
        let mut pb = tiny_skia::PathBuilder::new();
        pb.move_to(0.0, 0.0);
        pb.line_to(100.0, 0.0);
        pb.line_to(100.0, 100.0);
        pb.line_to(0.0, 100.0);
        pb.close();
        let path = pb.finish().unwrap();
        assert_eq!(
            path_to_svg_string(Some(&path)),
            "M0 0L100 0L100 100L0 100L0 0Z"
        );
    }

    #[test]
    fn test_negative_and_fractional_coordinates() {
        let mut pb = tiny_skia::PathBuilder::new();
        pb.move_to(-10.0, -10.0);
        pb.line_to(7.5, 92.5);
        let path = pb.finish().unwrap();
        assert_eq!(path_to_svg_string(Some(&path)), "M-10 -10L7.5 92.5");
    }

    #[test]
    fn test_curve_verbs_preserved() {
        let mut pb = tiny_skia::PathBuilder::new();
        pb.move_to(0.0, 0.0);
        pb.quad_to(50.0, 50.0, 100.0, 0.0);
        pb.cubic_to(150.0, 50.0, 200.0, 50.0, 250.0, 0.0);
        let path = pb.finish().unwrap();
        assert_eq!(
            path_to_svg_string(Some(&path)),
            "M0 0Q50 50 100 0C150 50 200 50 250 0"
        );
    }

    #[test]
    fn test_close_after_returning_to_start_adds_no_edge() {
        let mut pb = tiny_skia::PathBuilder::new();
        pb.move_to(0.0, 0.0);
        pb.line_to(10.0, 0.0);
        pb.line_to(0.0, 0.0);
        pb.close();
        let path = pb.finish().unwrap();
        assert_eq!(path_to_svg_string(Some(&path)), "M0 0L10 0L0 0Z");
    }

    #[test]
    fn test_multiple_subpaths() {
        let mut pb = tiny_skia::PathBuilder::new();
        pb.move_to(0.0, 0.0);
        pb.line_to(10.0, 0.0);
        pb.line_to(10.0, 10.0);
        pb.close();
        pb.move_to(20.0, 0.0);
        pb.line_to(30.0, 0.0);
        pb.line_to(30.0, 10.0);
        pb.close();
        let path = pb.finish().unwrap();
        assert_eq!(
            path_to_svg_string(Some(&path)),
            "M0 0L10 0L10 10L0 0ZM20 0L30 0L30 10L20 0Z"
        );
    }

    #[test]
    fn test_negative_zero_normalized() {
        let mut pb = tiny_skia::PathBuilder::new();
        pb.move_to(-0.0, 0.0);
        pb.line_to(1.0, 1.0);
        let path = pb.finish().unwrap();
        assert_eq!(path_to_svg_string(Some(&path)), "M0 0L1 1");
    }
}
