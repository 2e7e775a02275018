//! Arc operations using bezier curve approximation.
//!
//! tiny-skia does not support arc primitives directly, so we approximate
//! arcs using cubic bezier curves.

use crate::geometry::{ArcParams, ArcToParams, EllipseParams};
use std::f32::consts::PI;
use tiny_skia::PathBuilder;

/// Add a circular arc to the path using bezier curve approximation.
///
/// When `has_current_point` is true the arc start is connected to the
/// existing path with a line; otherwise a new subpath begins at the start.
pub fn arc(path: &mut PathBuilder, params: &ArcParams, has_current_point: bool) {
    ellipse(path, &EllipseParams::from(params), has_current_point);
}

/// Add an elliptical arc to the path using bezier curve approximation.
pub fn ellipse(path: &mut PathBuilder, params: &EllipseParams, has_current_point: bool) {
    let EllipseParams {
        x,
        y,
        radius_x,
        radius_y,
        rotation,
        start_angle,
        end_angle,
        anticlockwise,
    } = *params;

    if radius_x <= 0.0 || radius_y <= 0.0 {
        return;
    }

    // Normalize the sweep so that end >= start and the span caps at a full
    // turn, matching canvas arc semantics.
    let full_turn = 2.0 * PI;
    let mut sweep = end_angle - start_angle;
    if anticlockwise {
        if sweep <= -full_turn {
            sweep = -full_turn;
        } else {
            sweep = sweep.rem_euclid(full_turn);
            if sweep > 0.0 {
                sweep -= full_turn;
            }
            if sweep == 0.0 && end_angle != start_angle {
                sweep = -full_turn;
            }
        }
    } else if sweep >= full_turn {
        sweep = full_turn;
    } else {
        sweep = sweep.rem_euclid(full_turn);
        if sweep == 0.0 && end_angle != start_angle {
            sweep = full_turn;
        }
    }

    let num_segments = ((sweep.abs() / (PI / 2.0)).ceil() as usize).max(1);
    let segment_angle = sweep / num_segments as f32;

    // Precompute rotation matrix
    let cos_rot = rotation.cos();
    let sin_rot = rotation.sin();

    let point_at = |angle: f32| -> (f32, f32) {
        let px = radius_x * angle.cos();
        let py = radius_y * angle.sin();
        (
            x + px * cos_rot - py * sin_rot,
            y + px * sin_rot + py * cos_rot,
        )
    };

    let (start_x, start_y) = point_at(start_angle);
    if has_current_point {
        path.line_to(start_x, start_y);
    } else {
        path.move_to(start_x, start_y);
    }

    for i in 0..num_segments {
        let angle1 = start_angle + i as f32 * segment_angle;
        let angle2 = start_angle + (i + 1) as f32 * segment_angle;
        arc_segment(
            path, x, y, radius_x, radius_y, cos_rot, sin_rot, angle1, angle2,
        );
    }
}

/// Add a single arc segment as a cubic bezier curve.
#[allow(clippy::too_many_arguments)]
fn arc_segment(
    path: &mut PathBuilder,
    cx: f32,
    cy: f32,
    rx: f32,
    ry: f32,
    cos_rot: f32,
    sin_rot: f32,
    angle1: f32,
    angle2: f32,
) {
    // Calculate bezier control point factor
    let angle_diff = angle2 - angle1;
    let k = 4.0 / 3.0 * (angle_diff / 4.0).tan();

    // Points on the unit circle
    let x1 = angle1.cos();
    let y1 = angle1.sin();
    let x2 = angle2.cos();
    let y2 = angle2.sin();

    // Control points on the unit circle
    let cp1x = x1 - k * y1;
    let cp1y = y1 + k * x1;
    let cp2x = x2 + k * y2;
    let cp2y = y2 - k * x2;

    // Transform points
    let transform_point = |px: f32, py: f32| -> (f32, f32) {
        let tx = rx * px;
        let ty = ry * py;
        (
            cx + tx * cos_rot - ty * sin_rot,
            cy + tx * sin_rot + ty * cos_rot,
        )
    };

    let (ctrl1_x, ctrl1_y) = transform_point(cp1x, cp1y);
    let (ctrl2_x, ctrl2_y) = transform_point(cp2x, cp2y);
    let (end_x, end_y) = transform_point(x2, y2);

    path.cubic_to(ctrl1_x, ctrl1_y, ctrl2_x, ctrl2_y, end_x, end_y);
}

/// Add an arc connecting two points with a given radius (arcTo operation).
///
/// `(x0, y0)` is the current point from the last path operation.
pub fn arc_to(path: &mut PathBuilder, x0: f32, y0: f32, params: &ArcToParams) {
    let ArcToParams {
        x1,
        y1,
        x2,
        y2,
        radius,
    } = *params;

    if radius <= 0.0 {
        path.line_to(x1, y1);
        return;
    }

    // Vectors from corner to adjacent points
    let v1x = x0 - x1;
    let v1y = y0 - y1;
    let v2x = x2 - x1;
    let v2y = y2 - y1;

    // Normalize vectors
    let len1 = (v1x * v1x + v1y * v1y).sqrt();
    let len2 = (v2x * v2x + v2y * v2y).sqrt();

    if len1 < 1e-6 || len2 < 1e-6 {
        path.line_to(x1, y1);
        return;
    }

    let v1x = v1x / len1;
    let v1y = v1y / len1;
    let v2x = v2x / len2;
    let v2y = v2y / len2;

    // Calculate angle between vectors
    let cross = v1x * v2y - v1y * v2x;
    let dot = v1x * v2x + v1y * v2y;
    let angle = cross.atan2(dot);

    if angle.abs() < 1e-6 {
        // Collinear points degenerate to a line through the corner
        path.line_to(x1, y1);
        return;
    }

    // Calculate tangent points
    let tan_half = (angle / 2.0).tan().abs();
    let seg_len = radius / tan_half;

    let start_x = x1 + v1x * seg_len;
    let start_y = y1 + v1y * seg_len;
    let end_x = x1 + v2x * seg_len;
    let end_y = y1 + v2y * seg_len;

    // Calculate arc center
    let sign = if cross < 0.0 { -1.0 } else { 1.0 };
    let nx = -v1y * sign;
    let ny = v1x * sign;
    let cx = start_x + nx * radius;
    let cy = start_y + ny * radius;

    // Calculate start and end angles
    let start_angle = (start_y - cy).atan2(start_x - cx);
    let end_angle = (end_y - cy).atan2(end_x - cx);

    // Line to arc start
    path.line_to(start_x, start_y);

    arc(
        path,
        &ArcParams {
            x: cx,
            y: cy,
            radius,
            start_angle,
            end_angle,
            anticlockwise: cross > 0.0,
        },
        true,
    );
}
