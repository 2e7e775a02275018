//! SVG document export for recording surfaces.
//!
//! Serializes the recorded draw commands into a standalone SVG document.
//! Solid colors, gradients, stroke attributes, and clip paths are
//! expressed natively; raster commands (image draws, direct pixel writes)
//! are represented as placeholders rather than embedded bitmaps.

use crate::gradient::{CanvasGradient, GradientType};
use crate::pathops;
use crate::style::FillStyle;
use crate::surface::{PaintSpec, RecordedOp, StrokeSpec};
use std::fmt::Write as _;
use tiny_skia::Transform;

/// Render recorded commands into an SVG document string.
pub(crate) fn render_svg_document(ops: &[RecordedOp], width: u32, height: u32) -> String {
    let mut defs = String::new();
    let mut body = String::new();
    let mut def_counter: u64 = 0;

    for op in ops {
        match op {
            RecordedOp::FillPath {
                path,
                paint,
                rule,
                transform,
                clip,
                ..
            } => {
                let d = pathops::path_to_svg_string(Some(path));
                if d.is_empty() {
                    continue;
                }
                let clip_attr = write_clip(&mut defs, &mut def_counter, clip);
                let fill = fill_attrs(&mut defs, &mut def_counter, paint);
                let rule = match rule {
                    tiny_skia::FillRule::Winding => "nonzero",
                    tiny_skia::FillRule::EvenOdd => "evenodd",
                };
                let _ = write!(
                    body,
                    "<path d=\"{d}\"{}{clip_attr}{fill} fill-rule=\"{rule}\"/>",
                    transform_attr(transform)
                );
            }
            RecordedOp::StrokePath {
                path,
                paint,
                stroke,
                transform,
                clip,
                ..
            } => {
                let d = pathops::path_to_svg_string(Some(path));
                if d.is_empty() {
                    continue;
                }
                let clip_attr = write_clip(&mut defs, &mut def_counter, clip);
                let stroke_attrs = stroke_attrs(&mut defs, &mut def_counter, paint, stroke);
                let _ = write!(
                    body,
                    "<path d=\"{d}\"{}{clip_attr} fill=\"none\"{stroke_attrs}/>",
                    transform_attr(transform)
                );
            }
            RecordedOp::DrawPixmap {
                pixmap, transform, ..
            } => {
                // Placeholder: raster content is not embedded.
                let _ = write!(
                    body,
                    "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\"{} fill=\"none\" stroke=\"#ff00ff\"/>",
                    pixmap.width(),
                    pixmap.height(),
                    transform_attr(transform)
                );
            }
            RecordedOp::PutImageData {
                width: w,
                height: h,
                dx,
                dy,
                ..
            } => {
                let _ = write!(
                    body,
                    "<rect x=\"{dx}\" y=\"{dy}\" width=\"{w}\" height=\"{h}\" fill=\"none\" stroke=\"#ff00ff\"/>"
                );
            }
        }
    }

    let mut svg = String::new();
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );
    if !defs.is_empty() {
        svg.push_str("<defs>");
        svg.push_str(&defs);
        svg.push_str("</defs>");
    }
    svg.push_str(&body);
    svg.push_str("</svg>");
    svg
}

fn fmt_f32(v: f32) -> String {
    let v = if v == 0.0 { 0.0 } else { v };
    format!("{}", v)
}

fn transform_attr(transform: &Transform) -> String {
    if *transform == Transform::identity() {
        return String::new();
    }
    format!(
        " transform=\"matrix({} {} {} {} {} {})\"",
        fmt_f32(transform.sx),
        fmt_f32(transform.ky),
        fmt_f32(transform.kx),
        fmt_f32(transform.sy),
        fmt_f32(transform.tx),
        fmt_f32(transform.ty),
    )
}

fn color_hex(color: tiny_skia::Color) -> (String, f32) {
    let c = color.to_color_u8();
    (
        format!("#{:02x}{:02x}{:02x}", c.red(), c.green(), c.blue()),
        c.alpha() as f32 / 255.0,
    )
}

fn write_clip(
    defs: &mut String,
    counter: &mut u64,
    clip: &Option<crate::drawing_state::ClipState>,
) -> String {
    let Some(clip) = clip else {
        return String::new();
    };
    *counter += 1;
    let id = format!("clip{}", counter);
    let d = pathops::path_to_svg_string(Some(&clip.path));
    let _ = write!(
        defs,
        "<clipPath id=\"{id}\" clipPathUnits=\"userSpaceOnUse\"><path d=\"{d}\"{} clip-rule=\"{}\"/></clipPath>",
        transform_attr(&clip.transform),
        clip.rule.as_str()
    );
    format!(" clip-path=\"url(#{id})\"")
}

/// Emit a linear-gradient def and return its paint server reference.
fn write_gradient(defs: &mut String, counter: &mut u64, gradient: &CanvasGradient) -> Option<String> {
    let GradientType::Linear { x0, y0, x1, y1 } = gradient.gradient_type else {
        return None;
    };
    *counter += 1;
    let id = format!("grad{}", counter);
    let _ = write!(
        defs,
        "<linearGradient id=\"{id}\" gradientUnits=\"userSpaceOnUse\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\">",
        fmt_f32(x0),
        fmt_f32(y0),
        fmt_f32(x1),
        fmt_f32(y1)
    );
    for stop in gradient.resolved_stops() {
        let (rgb, alpha) = color_hex(stop.color);
        let _ = write!(
            defs,
            "<stop offset=\"{}\" stop-color=\"{rgb}\" stop-opacity=\"{}\"/>",
            stop.offset, alpha
        );
    }
    defs.push_str("</linearGradient>");
    Some(format!("url(#{id})"))
}

fn fill_attrs(defs: &mut String, counter: &mut u64, paint: &PaintSpec) -> String {
    let mut out = String::new();
    match &paint.style {
        FillStyle::Color(color) => {
            let (rgb, alpha) = color_hex(*color);
            let _ = write!(out, " fill=\"{rgb}\"");
            let alpha = alpha * paint.global_alpha;
            if alpha < 1.0 {
                let _ = write!(out, " fill-opacity=\"{}\"", fmt_f32(alpha));
            }
        }
        FillStyle::LinearGradient(gradient)
        | FillStyle::RadialGradient(gradient)
        | FillStyle::ConicGradient(gradient) => {
            match write_gradient(defs, counter, gradient) {
                Some(server) => {
                    let _ = write!(out, " fill=\"{server}\"");
                }
                // Non-linear gradients fall back to the first stop color.
                None => {
                    let color = gradient
                        .resolved_stops()
                        .first()
                        .map(|s| s.color)
                        .unwrap_or(tiny_skia::Color::BLACK);
                    let (rgb, _) = color_hex(color);
                    let _ = write!(out, " fill=\"{rgb}\"");
                }
            }
        }
        FillStyle::Pattern(_) => {
            out.push_str(" fill=\"#000000\"");
        }
    }
    out
}

fn stroke_attrs(
    defs: &mut String,
    counter: &mut u64,
    paint: &PaintSpec,
    stroke: &StrokeSpec,
) -> String {
    let mut out = String::new();
    match &paint.style {
        FillStyle::Color(color) => {
            let (rgb, alpha) = color_hex(*color);
            let _ = write!(out, " stroke=\"{rgb}\"");
            let alpha = alpha * paint.global_alpha;
            if alpha < 1.0 {
                let _ = write!(out, " stroke-opacity=\"{}\"", fmt_f32(alpha));
            }
        }
        FillStyle::LinearGradient(gradient)
        | FillStyle::RadialGradient(gradient)
        | FillStyle::ConicGradient(gradient) => match write_gradient(defs, counter, gradient) {
            Some(server) => {
                let _ = write!(out, " stroke=\"{server}\"");
            }
            None => {
                out.push_str(" stroke=\"#000000\"");
            }
        },
        FillStyle::Pattern(_) => out.push_str(" stroke=\"#000000\""),
    }

    let _ = write!(out, " stroke-width=\"{}\"", fmt_f32(stroke.width));
    let cap = match stroke.cap {
        tiny_skia::LineCap::Butt => "butt",
        tiny_skia::LineCap::Round => "round",
        tiny_skia::LineCap::Square => "square",
    };
    let join = match stroke.join {
        tiny_skia::LineJoin::Miter => "miter",
        tiny_skia::LineJoin::MiterClip => "miter-clip",
        tiny_skia::LineJoin::Round => "round",
        tiny_skia::LineJoin::Bevel => "bevel",
    };
    let _ = write!(out, " stroke-linecap=\"{cap}\" stroke-linejoin=\"{join}\"");
    if stroke.join == tiny_skia::LineJoin::Miter {
        let _ = write!(out, " stroke-miterlimit=\"{}\"", fmt_f32(stroke.miter_limit));
    }
    if !stroke.dash.is_empty() {
        let dashes: Vec<String> = stroke.dash.iter().map(|v| fmt_f32(*v)).collect();
        let _ = write!(out, " stroke-dasharray=\"{}\"", dashes.join(","));
        if stroke.dash_offset != 0.0 {
            let _ = write!(out, " stroke-dashoffset=\"{}\"", fmt_f32(stroke.dash_offset));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterChain;

    fn rect_path() -> tiny_skia::Path {
        let mut pb = tiny_skia::PathBuilder::new();
        pb.move_to(10.0, 20.0);
        pb.line_to(30.0, 20.0);
        pb.line_to(30.0, 40.0);
        pb.line_to(10.0, 40.0);
        pb.close();
        pb.finish().unwrap()
    }

    fn red_fill() -> RecordedOp {
        RecordedOp::FillPath {
            path: rect_path(),
            paint: PaintSpec {
                style: FillStyle::Color(tiny_skia::Color::from_rgba8(255, 0, 0, 255)),
                global_alpha: 1.0,
                blend: tiny_skia::BlendMode::SourceOver,
                anti_alias: true,
                shader_transform: Transform::identity(),
            },
            rule: tiny_skia::FillRule::Winding,
            transform: Transform::identity(),
            clip: None,
            filter: FilterChain::default(),
        }
    }

    #[test]
    fn test_document_structure() {
        let svg = render_svg_document(&[red_fill()], 100, 80);
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("width=\"100\""));
        assert!(svg.contains("viewBox=\"0 0 100 80\""));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_fill_path_serialization() {
        let svg = render_svg_document(&[red_fill()], 100, 80);
        assert!(svg.contains("fill=\"#ff0000\""));
        assert!(svg.contains("M10 20L30 20L30 40L10 40L10 20Z"));
        assert!(svg.contains("fill-rule=\"nonzero\""));
    }

    #[test]
    fn test_stroke_attributes() {
        let op = RecordedOp::StrokePath {
            path: rect_path(),
            paint: PaintSpec {
                style: FillStyle::Color(tiny_skia::Color::BLACK),
                global_alpha: 1.0,
                blend: tiny_skia::BlendMode::SourceOver,
                anti_alias: true,
                shader_transform: Transform::identity(),
            },
            stroke: StrokeSpec {
                width: 2.5,
                cap: tiny_skia::LineCap::Round,
                join: tiny_skia::LineJoin::Bevel,
                miter_limit: 10.0,
                dash: vec![4.0, 2.0],
                dash_offset: 1.0,
            },
            transform: Transform::identity(),
            clip: None,
            filter: FilterChain::default(),
        };
        let svg = render_svg_document(&[op], 50, 50);
        assert!(svg.contains("fill=\"none\""));
        assert!(svg.contains("stroke-width=\"2.5\""));
        assert!(svg.contains("stroke-linecap=\"round\""));
        assert!(svg.contains("stroke-linejoin=\"bevel\""));
        assert!(svg.contains("stroke-dasharray=\"4,2\""));
        assert!(svg.contains("stroke-dashoffset=\"1\""));
    }

    #[test]
    fn test_clip_emits_def() {
        use crate::drawing_state::ClipState;
        use crate::style::CanvasFillRule;
        let mut op = red_fill();
        if let RecordedOp::FillPath { clip, .. } = &mut op {
            *clip = Some(ClipState {
                path: rect_path(),
                rule: CanvasFillRule::EvenOdd,
                transform: Transform::identity(),
            });
        }
        let svg = render_svg_document(&[op], 100, 80);
        assert!(svg.contains("<clipPath id=\"clip1\""));
        assert!(svg.contains("clip-rule=\"evenodd\""));
        assert!(svg.contains("clip-path=\"url(#clip1)\""));
    }

    #[test]
    fn test_linear_gradient_def() {
        let mut gradient = CanvasGradient::new_linear(0.0, 0.0, 100.0, 0.0);
        gradient
            .add_color_stop(0.0, tiny_skia::Color::from_rgba8(255, 0, 0, 255))
            .unwrap();
        gradient
            .add_color_stop(1.0, tiny_skia::Color::from_rgba8(0, 0, 255, 255))
            .unwrap();
        let mut op = red_fill();
        if let RecordedOp::FillPath { paint, .. } = &mut op {
            paint.style = FillStyle::LinearGradient(gradient);
        }
        let svg = render_svg_document(&[op], 100, 80);
        assert!(svg.contains("<linearGradient id=\"grad1\""));
        assert!(svg.contains("fill=\"url(#grad1)\""));
        assert!(svg.contains("stop-color=\"#ff0000\""));
    }
}
