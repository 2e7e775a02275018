//! Stroke outline to fill conversion on polyline contours.
//!
//! A closed contour becomes two rings: the boundary offset to one side in
//! travel order, and the boundary offset to the other side in reverse
//! order, which makes the band between them a nonzero-filled region. Both
//! rings start at the contour's first vertex so the output is stable for
//! a given input.

use super::flatten::{Contour, PolyPath};
use crate::style::{LineCap, LineJoin};
use std::f64::consts::PI;

const EPS: f64 = 1e-9;
/// Angular step for round joins and caps.
const ROUND_STEP: f64 = PI / 8.0;

/// Options controlling stroke outline conversion.
#[derive(Debug, Clone, Copy)]
pub struct StrokeOptions {
    /// Stroke width.
    pub width: f32,
    /// Miter limit ratio; joins exceeding it fall back to bevel.
    pub miter_limit: f32,
    /// End cap shape for open contours.
    pub cap: LineCap,
    /// Corner join shape.
    pub join: LineJoin,
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self {
            width: 1.0,
            miter_limit: 4.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
        }
    }
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

fn norm(a: (f64, f64)) -> f64 {
    dot(a, a).sqrt()
}

fn unit(a: (f64, f64)) -> Option<(f64, f64)> {
    let len = norm(a);
    if len < EPS {
        None
    } else {
        Some((a.0 / len, a.1 / len))
    }
}

/// Normal pointing to the right of travel.
fn normal_right(d: (f64, f64)) -> (f64, f64) {
    (d.1, -d.0)
}

/// Intersection of two offset lines `p1 + t*d1` and `p2 + s*d2`.
fn line_intersection(
    p1: (f64, f64),
    d1: (f64, f64),
    p2: (f64, f64),
    d2: (f64, f64),
) -> Option<(f64, f64)> {
    let denom = cross(d1, d2);
    if denom.abs() < EPS {
        return None;
    }
    let t = cross(sub(p2, p1), d2) / denom;
    Some((p1.0 + d1.0 * t, p1.1 + d1.1 * t))
}

/// Append an arc around `center` from `from` to `to` (both on the circle),
/// sweeping in the direction given by `clockwise`.
fn push_arc(
    out: &mut Vec<(f64, f64)>,
    center: (f64, f64),
    from: (f64, f64),
    to: (f64, f64),
    radius: f64,
    clockwise: bool,
) {
    let a0 = (from.1 - center.1).atan2(from.0 - center.0);
    let mut a1 = (to.1 - center.1).atan2(to.0 - center.0);
    if clockwise {
        while a1 > a0 {
            a1 -= 2.0 * PI;
        }
    } else {
        while a1 < a0 {
            a1 += 2.0 * PI;
        }
    }
    let sweep = a1 - a0;
    let steps = ((sweep.abs() / ROUND_STEP).ceil() as usize).max(1);
    for i in 0..=steps {
        let a = a0 + sweep * (i as f64) / (steps as f64);
        out.push((center.0 + radius * a.cos(), center.1 + radius * a.sin()));
    }
}

/// Join geometry at a vertex between two edges, offset on the right side.
///
/// Returns the corner points in travel order. Diverging corners (the turn
/// opens away from the offset side) get the configured join; converging
/// corners collapse to the offset-line intersection.
fn join_points(
    v: (f64, f64),
    d_in: (f64, f64),
    d_out: (f64, f64),
    hw: f64,
    join: LineJoin,
    miter_limit: f64,
) -> Vec<(f64, f64)> {
    let n_in = normal_right(d_in);
    let n_out = normal_right(d_out);
    let p_in = (v.0 + n_in.0 * hw, v.1 + n_in.1 * hw);
    let p_out = (v.0 + n_out.0 * hw, v.1 + n_out.1 * hw);

    let turn = cross(d_in, d_out);
    if turn.abs() < EPS && dot(d_in, d_out) > 0.0 {
        return vec![p_in];
    }

    if turn < 0.0 {
        // Converging side: the sharp inner corner.
        if let Some(p) = line_intersection(p_in, d_in, p_out, d_out) {
            return vec![p];
        }
        return vec![p_in, p_out];
    }

    match join {
        LineJoin::Miter => {
            // Miter length ratio is 1/sin(theta/2) for the angle between
            // the edges.
            let cos_theta = dot(d_in, (-d_out.0, -d_out.1)).clamp(-1.0, 1.0);
            let half = ((1.0 - cos_theta) / 2.0).sqrt().max(EPS);
            if 1.0 / half > miter_limit {
                return vec![p_in, p_out];
            }
            if let Some(p) = line_intersection(p_in, d_in, p_out, d_out) {
                return vec![p];
            }
            vec![p_in, p_out]
        }
        LineJoin::Bevel => vec![p_in, p_out],
        LineJoin::Round => {
            let mut out = Vec::new();
            push_arc(&mut out, v, p_in, p_out, hw, false);
            if out.len() < 2 {
                out = vec![p_in, p_out];
            }
            out
        }
    }
}

/// Offset ring for a closed polygon, on the right of travel, with joins.
///
/// The ring starts at the first vertex's final corner point so a
/// rectangle's ring begins exactly at the first edge's offset start.
fn closed_ring(points: &[(f64, f64)], hw: f64, join: LineJoin, miter_limit: f64) -> Vec<(f64, f64)> {
    let n = points.len();
    let mut dirs = Vec::with_capacity(n);
    for i in 0..n {
        match unit(sub(points[(i + 1) % n], points[i])) {
            Some(d) => dirs.push(d),
            None => return Vec::new(),
        }
    }

    let join_at = |i: usize| -> Vec<(f64, f64)> {
        let d_in = dirs[(i + n - 1) % n];
        let d_out = dirs[i];
        join_points(points[i], d_in, d_out, hw, join, miter_limit)
    };

    let first = join_at(0);
    let mut ring = Vec::new();
    ring.push(*first.last().expect("join emits at least one point"));
    for i in 1..n {
        ring.extend(join_at(i));
    }
    ring.extend(first[..first.len() - 1].iter().copied());
    ring
}

/// Outline of an open polyline: down the right side, around the end cap,
/// back along the other side, closed through the start cap.
fn open_outline(points: &[(f64, f64)], hw: f64, opts: &StrokeOptions) -> Vec<(f64, f64)> {
    let n = points.len();
    let mut dirs = Vec::with_capacity(n - 1);
    for i in 0..n - 1 {
        match unit(sub(points[i + 1], points[i])) {
            Some(d) => dirs.push(d),
            None => return Vec::new(),
        }
    }

    let miter_limit = opts.miter_limit as f64;
    let mut outline = Vec::new();

    let side_pass = |outline: &mut Vec<(f64, f64)>, pts: &[(f64, f64)], dirs: &[(f64, f64)]| {
        let m = pts.len();
        let n0 = normal_right(dirs[0]);
        outline.push((pts[0].0 + n0.0 * hw, pts[0].1 + n0.1 * hw));
        for i in 1..m - 1 {
            outline.extend(join_points(
                pts[i],
                dirs[i - 1],
                dirs[i],
                hw,
                opts.join,
                miter_limit,
            ));
        }
        let nl = normal_right(dirs[m - 2]);
        outline.push((pts[m - 1].0 + nl.0 * hw, pts[m - 1].1 + nl.1 * hw));
    };

    // Right side, start to end.
    side_pass(&mut outline, points, &dirs);

    // End cap.
    let end = points[n - 1];
    let d_end = dirs[n - 2];
    let nr = normal_right(d_end);
    let cap_from = (end.0 + nr.0 * hw, end.1 + nr.1 * hw);
    let cap_to = (end.0 - nr.0 * hw, end.1 - nr.1 * hw);
    match opts.cap {
        LineCap::Butt => {}
        LineCap::Square => {
            outline.push((cap_from.0 + d_end.0 * hw, cap_from.1 + d_end.1 * hw));
            outline.push((cap_to.0 + d_end.0 * hw, cap_to.1 + d_end.1 * hw));
        }
        LineCap::Round => {
            push_arc(&mut outline, end, cap_from, cap_to, hw, false);
        }
    }

    // Left side, end back to start (right side of the reversed walk).
    let rev_pts: Vec<(f64, f64)> = points.iter().rev().copied().collect();
    let rev_dirs: Vec<(f64, f64)> = dirs.iter().rev().map(|d| (-d.0, -d.1)).collect();
    side_pass(&mut outline, &rev_pts, &rev_dirs);

    // Start cap.
    let start = points[0];
    let d0 = dirs[0];
    let n0 = normal_right(d0);
    let cap_from = (start.0 - n0.0 * hw, start.1 - n0.1 * hw);
    let cap_to = (start.0 + n0.0 * hw, start.1 + n0.1 * hw);
    match opts.cap {
        LineCap::Butt => {}
        LineCap::Square => {
            outline.push((cap_from.0 - d0.0 * hw, cap_from.1 - d0.1 * hw));
            outline.push((cap_to.0 - d0.0 * hw, cap_to.1 - d0.1 * hw));
        }
        LineCap::Round => {
            push_arc(&mut outline, start, cap_from, cap_to, hw, false);
        }
    }

    outline
}

fn dedupe(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut out: Vec<(f64, f64)> = Vec::with_capacity(points.len());
    for &p in points {
        if out
            .last()
            .map(|&q| (q.0 - p.0).abs() < EPS && (q.1 - p.1).abs() < EPS)
            .unwrap_or(false)
        {
            continue;
        }
        out.push(p);
    }
    out
}

/// Convert a polyline path to the fill outline of its stroke.
pub(crate) fn stroke_path(poly: &PolyPath, opts: &StrokeOptions) -> PolyPath {
    let hw = (opts.width as f64 / 2.0).abs();
    if hw < EPS {
        return PolyPath::default();
    }
    let miter_limit = opts.miter_limit as f64;

    let mut contours = Vec::new();
    for contour in &poly.contours {
        let mut points = dedupe(&contour.points);
        if contour.closed && points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() < 2 {
            continue;
        }

        if contour.closed {
            let ring_a = closed_ring(&points, hw, opts.join, miter_limit);
            // The other side of the band: reverse traversal keeping the
            // first vertex first.
            let mut reversed = points.clone();
            reversed.reverse();
            reversed.rotate_right(1);
            let ring_b = closed_ring(&reversed, hw, opts.join, miter_limit);
            for ring in [ring_a, ring_b] {
                let ring = dedupe(&ring);
                if ring.len() >= 3 {
                    contours.push(Contour {
                        points: ring,
                        closed: true,
                    });
                }
            }
        } else {
            let outline = dedupe(&open_outline(&points, hw, opts));
            if outline.len() >= 3 {
                contours.push(Contour {
                    points: outline,
                    closed: true,
                });
            }
        }
    }

    PolyPath { contours }
}
