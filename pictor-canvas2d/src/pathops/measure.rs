//! Arc-length measurement: trimming and dashing of polyline contours.

use super::flatten::{Contour, PolyPath};

const EPS: f64 = 1e-9;

fn dist(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt()
}

fn lerp(a: (f64, f64), b: (f64, f64), t: f64) -> (f64, f64) {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

/// The walkable point sequence of a contour (closing edge appended for
/// closed contours) and its total length.
fn walk_points(contour: &Contour) -> (Vec<(f64, f64)>, f64) {
    let mut points = contour.points.clone();
    if contour.closed {
        if let Some(&first) = points.first() {
            points.push(first);
        }
    }
    let mut total = 0.0;
    for pair in points.windows(2) {
        total += dist(pair[0], pair[1]);
    }
    (points, total)
}

/// Extract the sub-polyline covering the arc-length range `[from, to]`.
fn slice_by_length(points: &[(f64, f64)], from: f64, to: f64) -> Option<Contour> {
    if to - from < EPS {
        return None;
    }
    let mut out: Vec<(f64, f64)> = Vec::new();
    let mut walked = 0.0;

    for pair in points.windows(2) {
        let seg_len = dist(pair[0], pair[1]);
        if seg_len < EPS {
            continue;
        }
        let seg_start = walked;
        let seg_end = walked + seg_len;
        walked = seg_end;

        if seg_end < from || seg_start > to {
            continue;
        }
        let t0 = ((from - seg_start) / seg_len).clamp(0.0, 1.0);
        let t1 = ((to - seg_start) / seg_len).clamp(0.0, 1.0);
        let a = lerp(pair[0], pair[1], t0);
        let b = lerp(pair[0], pair[1], t1);
        if out.is_empty() {
            out.push(a);
        }
        if dist(*out.last().expect("non-empty"), b) > EPS {
            out.push(b);
        }
    }

    if out.len() < 2 {
        None
    } else {
        Some(Contour {
            points: out,
            closed: false,
        })
    }
}

/// Keep the fraction range `[start, end]` of each contour's arc length.
///
/// Fractions are clamped to [0, 1]; `inverted` keeps the complement
/// instead. Contours are measured independently.
pub(crate) fn trim_path(poly: &PolyPath, start: f64, end: f64, inverted: bool) -> PolyPath {
    let start = start.clamp(0.0, 1.0);
    let end = end.clamp(0.0, 1.0);
    let mut contours = Vec::new();

    for contour in &poly.contours {
        let (points, total) = walk_points(contour);
        if total < EPS || points.len() < 2 {
            continue;
        }
        if inverted {
            if let Some(head) = slice_by_length(&points, 0.0, start * total) {
                contours.push(head);
            }
            if let Some(tail) = slice_by_length(&points, end * total, total) {
                contours.push(tail);
            }
        } else if let Some(kept) = slice_by_length(&points, start * total, end * total) {
            contours.push(kept);
        }
    }

    PolyPath { contours }
}

/// Rewrite the path as disconnected dash segments with the given on/off
/// lengths, starting `phase` length units into the pattern.
pub(crate) fn dash_path(poly: &PolyPath, on: f64, off: f64, phase: f64) -> PolyPath {
    let period = on + off;
    if on < EPS || period < EPS {
        return poly.clone();
    }
    let phase_len = phase.rem_euclid(period);

    let mut contours = Vec::new();
    for contour in &poly.contours {
        let (points, total) = walk_points(contour);
        if total < EPS || points.len() < 2 {
            continue;
        }

        // Position of the first dash start, shifted back by the phase.
        let mut cursor = -phase_len;
        while cursor < total {
            let dash_start = cursor.max(0.0);
            let dash_end = (cursor + on).min(total);
            if dash_end > dash_start + EPS {
                if let Some(segment) = slice_by_length(&points, dash_start, dash_end) {
                    contours.push(segment);
                }
            }
            cursor += period;
        }
    }

    PolyPath { contours }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_poly() -> PolyPath {
        PolyPath {
            contours: vec![Contour {
                points: vec![(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)],
                closed: true,
            }],
        }
    }

    #[test]
    fn test_trim_drops_leading_fraction() {
        // Keeping [0.25, 1] of the rect perimeter removes exactly the top
        // edge, leaving a U shape of the remaining three sides.
        let out = trim_path(&rect_poly(), 0.25, 1.0, false);
        assert_eq!(out.contours.len(), 1);
        let contour = &out.contours[0];
        assert!(!contour.closed);
        assert_eq!(contour.points.first(), Some(&(100.0, 0.0)));
        assert_eq!(contour.points.last(), Some(&(0.0, 0.0)));
        let length: f64 = contour
            .points
            .windows(2)
            .map(|p| dist(p[0], p[1]))
            .sum();
        assert!((length - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_trim_inverted_keeps_complement() {
        let out = trim_path(&rect_poly(), 0.25, 0.75, true);
        assert_eq!(out.contours.len(), 2);
        let total: f64 = out
            .contours
            .iter()
            .map(|c| c.points.windows(2).map(|p| dist(p[0], p[1])).sum::<f64>())
            .sum();
        assert!((total - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_trim_empty_range_is_empty() {
        let out = trim_path(&rect_poly(), 0.5, 0.5, false);
        assert!(out.contours.is_empty());
    }

    #[test]
    fn test_dash_counts_and_lengths() {
        let line = PolyPath {
            contours: vec![Contour {
                points: vec![(0.0, 0.0), (100.0, 0.0)],
                closed: false,
            }],
        };
        let out = dash_path(&line, 10.0, 10.0, 0.0);
        assert_eq!(out.contours.len(), 5);
        for contour in &out.contours {
            let len: f64 = contour.points.windows(2).map(|p| dist(p[0], p[1])).sum();
            assert!((len - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_dash_phase_shifts_pattern() {
        let line = PolyPath {
            contours: vec![Contour {
                points: vec![(0.0, 0.0), (100.0, 0.0)],
                closed: false,
            }],
        };
        // Phase 0.5 of a 20-unit period starts mid-gap, so the first dash
        // begins at zero but is clipped short.
        let out = dash_path(&line, 10.0, 10.0, 0.5);
        assert!(!out.contours.is_empty());
        let first = &out.contours[0];
        assert_eq!(first.points.first(), Some(&(0.0, 0.0)));
    }

    #[test]
    fn test_dash_zero_on_length_is_identity() {
        let out = dash_path(&rect_poly(), 0.0, 5.0, 0.0);
        assert_eq!(out, rect_poly());
    }
}
