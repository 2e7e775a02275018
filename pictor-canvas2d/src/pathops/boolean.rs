//! Planar boolean operations on polyline contours.
//!
//! The algorithm is an overlay: every edge of both operands is subdivided
//! at every intersection, each sub-edge is classified by evaluating the
//! combined inside-predicate just left and just right of it, and the edges
//! where the predicate changes are stitched back into closed contours with
//! the filled region on their left. Because every kept edge keeps a fixed
//! orientation, the winding function of the result does not depend on how
//! edges are grouped into loops.

use super::flatten::{Contour, PolyPath};
use super::PathOp;
use crate::style::CanvasFillRule;
use std::collections::HashMap;

const EPS: f64 = 1e-9;
/// Quantization grid for vertex identity while stitching.
const GRID: f64 = 1e6;

#[derive(Debug, Clone, Copy)]
struct Edge {
    a: (f64, f64),
    b: (f64, f64),
}

fn quantize(p: (f64, f64)) -> (i64, i64) {
    ((p.0 * GRID).round() as i64, (p.1 * GRID).round() as i64)
}

fn sub(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    (a.0 - b.0, a.1 - b.1)
}

fn cross(a: (f64, f64), b: (f64, f64)) -> f64 {
    a.0 * b.1 - a.1 * b.0
}

fn dot(a: (f64, f64), b: (f64, f64)) -> f64 {
    a.0 * b.0 + a.1 * b.1
}

fn lerp(a: (f64, f64), b: (f64, f64), t: f64) -> (f64, f64) {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

/// Collect the closed edge list of a poly path (open contours are closed
/// implicitly, matching fill semantics).
fn edges_of(poly: &PolyPath) -> Vec<Edge> {
    let mut edges = Vec::new();
    for contour in &poly.contours {
        let n = contour.points.len();
        if n < 2 {
            continue;
        }
        for i in 0..n {
            let a = contour.points[i];
            let b = contour.points[(i + 1) % n];
            if (a.0 - b.0).abs() > EPS || (a.1 - b.1).abs() > EPS {
                edges.push(Edge { a, b });
            }
        }
    }
    edges
}

/// Winding number of `p` with respect to an edge set.
fn winding(edges: &[Edge], p: (f64, f64)) -> i32 {
    let mut wind = 0;
    for edge in edges {
        let (x1, y1) = edge.a;
        let (x2, y2) = edge.b;
        if y1 <= p.1 {
            if y2 > p.1 && cross(sub((x2, y2), (x1, y1)), sub(p, (x1, y1))) > 0.0 {
                wind += 1;
            }
        } else if y2 <= p.1 && cross(sub((x2, y2), (x1, y1)), sub(p, (x1, y1))) < 0.0 {
            wind -= 1;
        }
    }
    wind
}

fn filled(wind: i32, rule: CanvasFillRule) -> bool {
    match rule {
        CanvasFillRule::NonZero => wind != 0,
        CanvasFillRule::EvenOdd => wind % 2 != 0,
    }
}

/// Intersection parameters of segment `a` with segment `b`, as `t` values
/// along `a`. Collinear overlap contributes the projected endpoints.
fn split_params(a: &Edge, b: &Edge) -> Vec<f64> {
    let d1 = sub(a.b, a.a);
    let d2 = sub(b.b, b.a);
    let denom = cross(d1, d2);
    let offset = sub(b.a, a.a);
    let len1_sq = dot(d1, d1);
    if len1_sq < EPS * EPS {
        return Vec::new();
    }

    if denom.abs() > EPS {
        let t = cross(offset, d2) / denom;
        let u = cross(offset, d1) / denom;
        if (-EPS..=1.0 + EPS).contains(&t) && (-EPS..=1.0 + EPS).contains(&u) {
            return vec![t.clamp(0.0, 1.0)];
        }
        return Vec::new();
    }

    // Parallel; collinear overlap splits at the other segment's endpoints.
    if cross(offset, d1).abs() > EPS * len1_sq.sqrt().max(1.0) {
        return Vec::new();
    }
    let mut out = Vec::new();
    for p in [b.a, b.b] {
        let t = dot(sub(p, a.a), d1) / len1_sq;
        if (EPS..=1.0 - EPS).contains(&t) {
            out.push(t);
        }
    }
    out
}

/// Subdivide every edge at every pairwise intersection.
fn subdivide(all: &[(Edge, usize)]) -> Vec<(Edge, usize)> {
    let mut out = Vec::new();
    for (i, (edge, src)) in all.iter().enumerate() {
        let mut ts = vec![0.0, 1.0];
        for (j, (other, _)) in all.iter().enumerate() {
            if i == j {
                continue;
            }
            ts.extend(split_params(edge, other));
        }
        ts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        ts.dedup_by(|a, b| (*a - *b).abs() < 1e-12);
        for pair in ts.windows(2) {
            let pa = lerp(edge.a, edge.b, pair[0]);
            let pb = lerp(edge.a, edge.b, pair[1]);
            if quantize(pa) != quantize(pb) {
                out.push((Edge { a: pa, b: pb }, *src));
            }
        }
    }
    out
}

/// Overlay of one or two operands under a combined inside-predicate.
///
/// `operands` are `(poly, fill_rule)` pairs; `pred` maps per-operand
/// filled flags to the result's filled flag. Degenerate input produces an
/// empty result rather than an error.
fn overlay(
    operands: &[(&PolyPath, CanvasFillRule)],
    pred: impl Fn(&[bool]) -> bool,
) -> PolyPath {
    let edge_sets: Vec<Vec<Edge>> = operands.iter().map(|(p, _)| edges_of(p)).collect();
    let mut tagged: Vec<(Edge, usize)> = Vec::new();
    for (idx, set) in edge_sets.iter().enumerate() {
        tagged.extend(set.iter().map(|e| (*e, idx)));
    }
    if tagged.is_empty() {
        return PolyPath::default();
    }

    // Probe offset scaled to the overall extent.
    let mut diag: f64 = 1.0;
    for (edge, _) in &tagged {
        diag = diag.max(edge.a.0.abs().max(edge.a.1.abs()));
    }
    let delta = diag.max(1.0) * 1e-7;

    let pieces = subdivide(&tagged);

    // Coincident sub-edges collapse to one representative; classification
    // below only consults the original edge sets, so duplicates would just
    // emit the same boundary twice.
    let mut seen: HashMap<((i64, i64), (i64, i64)), ()> = HashMap::new();
    let mut kept: Vec<Edge> = Vec::new();

    for (edge, _src) in &pieces {
        let qa = quantize(edge.a);
        let qb = quantize(edge.b);
        let key = if qa <= qb { (qa, qb) } else { (qb, qa) };
        if seen.contains_key(&key) {
            continue;
        }
        seen.insert(key, ());

        let mid = lerp(edge.a, edge.b, 0.5);
        let d = sub(edge.b, edge.a);
        let len = dot(d, d).sqrt();
        if len < EPS {
            continue;
        }
        let nl = (-d.1 / len, d.0 / len);
        let left = (mid.0 + nl.0 * delta, mid.1 + nl.1 * delta);
        let right = (mid.0 - nl.0 * delta, mid.1 - nl.1 * delta);

        let inside_at = |p: (f64, f64)| -> bool {
            let flags: Vec<bool> = edge_sets
                .iter()
                .zip(operands.iter())
                .map(|(set, (_, rule))| filled(winding(set, p), *rule))
                .collect();
            pred(&flags)
        };

        let inside_left = inside_at(left);
        let inside_right = inside_at(right);
        if inside_left == inside_right {
            continue;
        }
        // Orient with the filled region on the left.
        if inside_left {
            kept.push(*edge);
        } else {
            kept.push(Edge {
                a: edge.b,
                b: edge.a,
            });
        }
    }

    stitch(kept)
}

/// Stitch directed edges into closed contours. Every kept vertex has
/// balanced in/out degree, so a greedy walk that prefers the straightest
/// continuation always terminates with closed loops.
fn stitch(edges: Vec<Edge>) -> PolyPath {
    let mut by_start: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, edge) in edges.iter().enumerate() {
        by_start.entry(quantize(edge.a)).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut contours = Vec::new();

    for start in 0..edges.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut points = vec![edges[start].a];
        let mut current = edges[start];
        let start_key = quantize(edges[start].a);

        loop {
            let end_key = quantize(current.b);
            if end_key == start_key {
                break;
            }
            points.push(current.b);

            let dir = sub(current.b, current.a);
            let candidates = by_start.get(&end_key);
            let next = candidates.and_then(|list| {
                list.iter()
                    .filter(|&&i| !used[i])
                    .min_by(|&&i, &&j| {
                        let turn = |k: usize| {
                            let d = sub(edges[k].b, edges[k].a);
                            // Straightest continuation first.
                            -dot(dir, d) / (dot(d, d).sqrt().max(EPS))
                        };
                        turn(i)
                            .partial_cmp(&turn(j))
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .copied()
            });

            match next {
                Some(i) => {
                    used[i] = true;
                    current = edges[i];
                }
                // Dangling chain from numeric noise; drop it.
                None => {
                    points.clear();
                    break;
                }
            }
        }

        if points.len() >= 3 {
            contours.push(Contour {
                points: collapse_collinear(points),
                closed: true,
            });
        }
    }

    contours.retain(|c| c.points.len() >= 3 && c.signed_area().abs() > EPS);
    PolyPath { contours }
}

/// Remove interior points of straight runs (subdivision leftovers).
fn collapse_collinear(points: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    let n = points.len();
    if n < 3 {
        return points;
    }
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let here = points[i];
        let next = points[(i + 1) % n];
        let d1 = sub(here, prev);
        let d2 = sub(next, here);
        let is_straight = cross(d1, d2).abs() < 1e-7 && dot(d1, d2) > 0.0;
        if !is_straight {
            out.push(here);
        }
    }
    if out.len() < 3 { points } else { out }
}

/// Combine two paths under a boolean operator. Both operands carry their
/// own fill rule; the result is a nonzero-wound region.
pub(crate) fn boolean_op(
    a: &PolyPath,
    a_rule: CanvasFillRule,
    b: &PolyPath,
    b_rule: CanvasFillRule,
    op: PathOp,
) -> PolyPath {
    let pred = move |flags: &[bool]| -> bool {
        let (fa, fb) = (flags[0], flags[1]);
        match op {
            PathOp::Union => fa || fb,
            PathOp::Intersect => fa && fb,
            PathOp::Difference => fa && !fb,
            PathOp::ReverseDifference => !fa && fb,
            PathOp::Xor => fa ^ fb,
        }
    };
    overlay(&[(a, a_rule), (b, b_rule)], pred)
}

/// Re-express the region covered by a single path (under its fill rule)
/// as self-intersection-free nonzero contours. This is both `simplify`
/// and the even-odd to winding conversion.
pub(crate) fn resolve_region(poly: &PolyPath, rule: CanvasFillRule) -> PolyPath {
    overlay(&[(poly, rule)], |flags| flags[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathops::hit::point_in_poly;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> PolyPath {
        PolyPath {
            contours: vec![Contour {
                points: vec![(x, y), (x + w, y), (x + w, y + h), (x, y + h)],
                closed: true,
            }],
        }
    }

    fn contains(poly: &PolyPath, x: f64, y: f64) -> bool {
        point_in_poly(poly, x, y, CanvasFillRule::NonZero)
    }

    #[test]
    fn test_union_of_disjoint_rects_keeps_both() {
        let out = boolean_op(
            &rect(0.0, 0.0, 10.0, 10.0),
            CanvasFillRule::NonZero,
            &rect(20.0, 0.0, 10.0, 10.0),
            CanvasFillRule::NonZero,
            PathOp::Union,
        );
        assert_eq!(out.contours.len(), 2);
        assert!(contains(&out, 5.0, 5.0));
        assert!(contains(&out, 25.0, 5.0));
        assert!(!contains(&out, 15.0, 5.0));
    }

    #[test]
    fn test_intersect_overlapping_rects() {
        let out = boolean_op(
            &rect(0.0, 0.0, 10.0, 10.0),
            CanvasFillRule::NonZero,
            &rect(5.0, 5.0, 10.0, 10.0),
            CanvasFillRule::NonZero,
            PathOp::Intersect,
        );
        assert!(contains(&out, 7.0, 7.0));
        assert!(!contains(&out, 2.0, 2.0));
        assert!(!contains(&out, 12.0, 12.0));
        let (l, t, r, b) = out.bounds().unwrap();
        assert!((l - 5.0).abs() < 1e-6);
        assert!((t - 5.0).abs() < 1e-6);
        assert!((r - 10.0).abs() < 1e-6);
        assert!((b - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_intersect_disjoint_is_empty() {
        let out = boolean_op(
            &rect(0.0, 0.0, 10.0, 10.0),
            CanvasFillRule::NonZero,
            &rect(20.0, 20.0, 5.0, 5.0),
            CanvasFillRule::NonZero,
            PathOp::Intersect,
        );
        assert!(out.contours.is_empty());
    }

    #[test]
    fn test_difference_cuts_hole_region() {
        let out = boolean_op(
            &rect(0.0, 0.0, 20.0, 20.0),
            CanvasFillRule::NonZero,
            &rect(5.0, 5.0, 10.0, 10.0),
            CanvasFillRule::NonZero,
            PathOp::Difference,
        );
        assert!(contains(&out, 2.0, 2.0));
        assert!(!contains(&out, 10.0, 10.0));
    }

    #[test]
    fn test_reverse_difference_swaps_operands() {
        let out = boolean_op(
            &rect(0.0, 0.0, 10.0, 10.0),
            CanvasFillRule::NonZero,
            &rect(5.0, 0.0, 10.0, 10.0),
            CanvasFillRule::NonZero,
            PathOp::ReverseDifference,
        );
        assert!(!contains(&out, 2.0, 5.0));
        assert!(contains(&out, 12.0, 5.0));
        assert!(!contains(&out, 7.0, 5.0));
    }

    #[test]
    fn test_xor_excludes_overlap() {
        let out = boolean_op(
            &rect(0.0, 0.0, 10.0, 10.0),
            CanvasFillRule::NonZero,
            &rect(5.0, 0.0, 10.0, 10.0),
            CanvasFillRule::NonZero,
            PathOp::Xor,
        );
        assert!(contains(&out, 2.0, 5.0));
        assert!(contains(&out, 12.0, 5.0));
        assert!(!contains(&out, 7.0, 5.0));
    }

    #[test]
    fn test_empty_operand_degrades_gracefully() {
        let empty = PolyPath::default();
        let out = boolean_op(
            &empty,
            CanvasFillRule::NonZero,
            &rect(0.0, 0.0, 10.0, 10.0),
            CanvasFillRule::NonZero,
            PathOp::Union,
        );
        assert!(contains(&out, 5.0, 5.0));

        let none = boolean_op(
            &empty,
            CanvasFillRule::NonZero,
            &empty,
            CanvasFillRule::NonZero,
            PathOp::Intersect,
        );
        assert!(none.contours.is_empty());
    }

    #[test]
    fn test_resolve_region_evenodd_hole() {
        // Two nested same-direction rects: nonzero fills both, even-odd
        // leaves the inner as a hole.
        let poly = PolyPath {
            contours: vec![
                rect(0.0, 0.0, 20.0, 20.0).contours.remove(0),
                rect(5.0, 5.0, 10.0, 10.0).contours.remove(0),
            ],
        };
        let winding = resolve_region(&poly, CanvasFillRule::EvenOdd);
        assert!(contains(&winding, 2.0, 2.0));
        assert!(!contains(&winding, 10.0, 10.0));
        // Conversion resolved the hole geometrically: two contours with
        // opposite orientation.
        assert_eq!(winding.contours.len(), 2);
        let a0 = winding.contours[0].signed_area();
        let a1 = winding.contours[1].signed_area();
        assert!(a0 * a1 < 0.0);
    }

    #[test]
    fn test_resolve_region_winding_is_noop_on_simple_rect() {
        let out = resolve_region(&rect(0.0, 0.0, 10.0, 10.0), CanvasFillRule::NonZero);
        assert_eq!(out.contours.len(), 1);
        assert!(contains(&out, 5.0, 5.0));
        assert!(!contains(&out, 15.0, 5.0));
    }

    #[test]
    fn test_union_of_touching_triangles() {
        // The two triangles overlap in a diamond and share a collinear base.
        let tri1 = PolyPath {
            contours: vec![Contour {
                points: vec![(0.0, 20.0), (10.0, 10.0), (20.0, 20.0)],
                closed: true,
            }],
        };
        let tri2 = PolyPath {
            contours: vec![Contour {
                points: vec![(10.0, 20.0), (20.0, 10.0), (30.0, 20.0)],
                closed: true,
            }],
        };
        let out = boolean_op(
            &tri1,
            CanvasFillRule::NonZero,
            &tri2,
            CanvasFillRule::NonZero,
            PathOp::Union,
        );
        assert!(contains(&out, 10.0, 15.0));
        assert!(contains(&out, 20.0, 15.0));
        assert!(contains(&out, 15.0, 17.0));
        assert!(!contains(&out, 15.0, 12.0));
        assert!(!contains(&out, 1.0, 11.0));
    }
}
