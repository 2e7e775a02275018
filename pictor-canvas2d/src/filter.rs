//! CSS filter chain parsing and application.
//!
//! Filters operate on unpremultiplied channel values to avoid precision
//! loss on semi-transparent pixels, and are applied as a post-process over
//! the pixels a drawing operation produced.

use std::f32::consts::PI;
use tiny_skia::{Pixmap, PremultipliedColorU8};

/// One parsed filter function.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// Gaussian-like blur with the given standard deviation in pixels.
    Blur(f32),
    Brightness(f32),
    Contrast(f32),
    Grayscale(f32),
    /// Hue rotation in radians.
    HueRotate(f32),
    Invert(f32),
    Opacity(f32),
    Saturate(f32),
    Sepia(f32),
    /// Drop shadow: offset x/y, blur sigma, color.
    DropShadow {
        dx: f32,
        dy: f32,
        blur: f32,
        color: tiny_skia::Color,
    },
}

/// A space-separated composition of filter functions. The default
/// (`"none"`) is the empty chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    ops: Vec<FilterOp>,
    /// The source string the chain was parsed from, echoed by the getter.
    canonical: String,
}

impl FilterChain {
    /// Build a chain directly from ops (used internally for shadows).
    pub(crate) fn from_ops(ops: Vec<FilterOp>) -> FilterChain {
        FilterChain {
            canonical: String::new(),
            ops,
        }
    }

    /// Parse a CSS filter string. Returns `None` for syntactically
    /// invalid input so callers can leave the previous value in place.
    pub fn parse(s: &str) -> Option<FilterChain> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "none" {
            return Some(FilterChain {
                ops: Vec::new(),
                canonical: "none".to_string(),
            });
        }

        let mut ops = Vec::new();
        let mut rest = trimmed;
        while !rest.is_empty() {
            let open = rest.find('(')?;
            let close = rest.find(')')?;
            if close < open {
                return None;
            }
            let name = rest[..open].trim();
            let arg = rest[open + 1..close].trim();
            ops.push(parse_function(name, arg)?);
            rest = rest[close + 1..].trim_start();
        }

        Some(FilterChain {
            ops,
            canonical: trimmed.to_string(),
        })
    }

    /// Whether this chain performs no work.
    pub fn is_none(&self) -> bool {
        self.ops.is_empty()
    }

    /// The canonical string value (`"none"` for the empty chain).
    pub fn as_str(&self) -> &str {
        if self.ops.is_empty() {
            "none"
        } else {
            &self.canonical
        }
    }

    /// Apply the chain to a pixmap in sequence.
    pub fn apply(&self, pixmap: &mut Pixmap) {
        for op in &self.ops {
            match *op {
                FilterOp::Blur(sigma) => blur_pixmap(pixmap, sigma),
                FilterOp::Brightness(v) => {
                    apply_color_filter(pixmap, |c, a| (scale_color(c, v), a));
                }
                FilterOp::Contrast(v) => {
                    apply_color_filter(pixmap, |c, a| (apply_contrast(c, v), a));
                }
                FilterOp::Grayscale(v) => {
                    apply_color_filter(pixmap, |c, a| (grayscale(c, v.clamp(0.0, 1.0)), a));
                }
                FilterOp::HueRotate(rad) => {
                    apply_color_filter(pixmap, |c, a| (hue_rotate(c, rad), a));
                }
                FilterOp::Invert(v) => {
                    let v = v.clamp(0.0, 1.0);
                    apply_color_filter(pixmap, move |c, a| {
                        (
                            [
                                c[0] + (1.0 - 2.0 * c[0]) * v,
                                c[1] + (1.0 - 2.0 * c[1]) * v,
                                c[2] + (1.0 - 2.0 * c[2]) * v,
                            ],
                            a,
                        )
                    });
                }
                FilterOp::Opacity(v) => {
                    let v = v.clamp(0.0, 1.0);
                    apply_color_filter(pixmap, move |c, a| (c, a * v));
                }
                FilterOp::Saturate(v) => {
                    apply_color_filter(pixmap, |c, a| (saturate(c, v), a));
                }
                FilterOp::Sepia(v) => {
                    apply_color_filter(pixmap, |c, a| (sepia(c, v.clamp(0.0, 1.0)), a));
                }
                FilterOp::DropShadow { dx, dy, blur, color } => {
                    drop_shadow(pixmap, dx, dy, blur, color);
                }
            }
        }
    }
}

fn parse_function(name: &str, arg: &str) -> Option<FilterOp> {
    match name {
        "blur" => Some(FilterOp::Blur(parse_length(arg)?.max(0.0))),
        "brightness" => Some(FilterOp::Brightness(parse_factor(arg)?.max(0.0))),
        "contrast" => Some(FilterOp::Contrast(parse_factor(arg)?.max(0.0))),
        "grayscale" => Some(FilterOp::Grayscale(parse_factor(arg)?)),
        "hue-rotate" => Some(FilterOp::HueRotate(parse_angle(arg)?)),
        "invert" => Some(FilterOp::Invert(parse_factor(arg)?)),
        "opacity" => Some(FilterOp::Opacity(parse_factor(arg)?)),
        "saturate" => Some(FilterOp::Saturate(parse_factor(arg)?.max(0.0))),
        "sepia" => Some(FilterOp::Sepia(parse_factor(arg)?)),
        "drop-shadow" => parse_drop_shadow(arg),
        _ => None,
    }
}

/// Number or percentage, normalized to a factor (100% -> 1.0).
fn parse_factor(s: &str) -> Option<f32> {
    let s = s.trim();
    if s.is_empty() {
        return Some(1.0);
    }
    if let Some(pct) = s.strip_suffix('%') {
        return pct.trim().parse::<f32>().ok().map(|v| v / 100.0);
    }
    s.parse::<f32>().ok()
}

/// Pixel length (bare numbers and `px` accepted).
fn parse_length(s: &str) -> Option<f32> {
    let s = s.trim();
    let s = s.strip_suffix("px").unwrap_or(s);
    s.trim().parse::<f32>().ok()
}

/// Angle in deg/rad/grad/turn, normalized to radians.
fn parse_angle(s: &str) -> Option<f32> {
    let s = s.trim();
    if let Some(v) = s.strip_suffix("deg") {
        return v.trim().parse::<f32>().ok().map(|d| d * PI / 180.0);
    }
    if let Some(v) = s.strip_suffix("grad") {
        return v.trim().parse::<f32>().ok().map(|g| g * PI / 200.0);
    }
    if let Some(v) = s.strip_suffix("rad") {
        return v.trim().parse::<f32>().ok();
    }
    if let Some(v) = s.strip_suffix("turn") {
        return v.trim().parse::<f32>().ok().map(|t| t * 2.0 * PI);
    }
    s.parse::<f32>().ok().map(|d| d * PI / 180.0)
}

fn parse_drop_shadow(arg: &str) -> Option<FilterOp> {
    let mut lengths: Vec<f32> = Vec::new();
    let mut color = tiny_skia::Color::BLACK;
    for token in arg.split_whitespace() {
        if let Some(v) = parse_length(token) {
            if token
                .chars()
                .next()
                .map(|c| c.is_ascii_digit() || c == '-' || c == '.')
                .unwrap_or(false)
            {
                lengths.push(v);
                continue;
            }
        }
        let parsed = csscolorparser::parse(token).ok()?;
        let [r, g, b, a] = parsed.to_rgba8();
        color = tiny_skia::Color::from_rgba8(r, g, b, a);
    }
    if lengths.len() < 2 || lengths.len() > 3 {
        return None;
    }
    Some(FilterOp::DropShadow {
        dx: lengths[0],
        dy: lengths[1],
        blur: lengths.get(2).copied().unwrap_or(0.0).max(0.0),
        color,
    })
}

/// Apply a per-pixel color transform on unpremultiplied values.
pub(crate) fn apply_color_filter<F>(pixmap: &mut Pixmap, f: F)
where
    F: Fn([f32; 3], f32) -> ([f32; 3], f32),
{
    for px in pixmap.pixels_mut() {
        let alpha = px.alpha() as f32 / 255.0;
        let base = if alpha > 0.0 {
            [
                (px.red() as f32 / 255.0) / alpha,
                (px.green() as f32 / 255.0) / alpha,
                (px.blue() as f32 / 255.0) / alpha,
            ]
        } else {
            [0.0, 0.0, 0.0]
        };
        let (mut color, mut new_alpha) = f(base, alpha);
        new_alpha = new_alpha.clamp(0.0, 1.0);
        for ch in color.iter_mut() {
            *ch = ch.clamp(0.0, 1.0);
        }

        let r = (color[0] * new_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
        let g = (color[1] * new_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
        let b = (color[2] * new_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
        let a = (new_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
        *px = PremultipliedColorU8::from_rgba(r, g, b, a)
            .unwrap_or(PremultipliedColorU8::TRANSPARENT);
    }
}

fn scale_color(color: [f32; 3], factor: f32) -> [f32; 3] {
    [color[0] * factor, color[1] * factor, color[2] * factor]
}

fn apply_contrast(color: [f32; 3], factor: f32) -> [f32; 3] {
    [
        (color[0] - 0.5) * factor + 0.5,
        (color[1] - 0.5) * factor + 0.5,
        (color[2] - 0.5) * factor + 0.5,
    ]
}

fn grayscale(color: [f32; 3], amount: f32) -> [f32; 3] {
    let gray = color[0] * 0.2126 + color[1] * 0.7152 + color[2] * 0.0722;
    [
        color[0] + (gray - color[0]) * amount,
        color[1] + (gray - color[1]) * amount,
        color[2] + (gray - color[2]) * amount,
    ]
}

fn sepia(color: [f32; 3], amount: f32) -> [f32; 3] {
    let sepia_r = color[0] * 0.393 + color[1] * 0.769 + color[2] * 0.189;
    let sepia_g = color[0] * 0.349 + color[1] * 0.686 + color[2] * 0.168;
    let sepia_b = color[0] * 0.272 + color[1] * 0.534 + color[2] * 0.131;
    [
        color[0] + (sepia_r - color[0]) * amount,
        color[1] + (sepia_g - color[1]) * amount,
        color[2] + (sepia_b - color[2]) * amount,
    ]
}

fn saturate(color: [f32; 3], factor: f32) -> [f32; 3] {
    let (rw, gw, bw) = (0.213, 0.715, 0.072);
    [
        (rw + (1.0 - rw) * factor) * color[0]
            + (gw - gw * factor) * color[1]
            + (bw - bw * factor) * color[2],
        (rw - rw * factor) * color[0]
            + (gw + (1.0 - gw) * factor) * color[1]
            + (bw - bw * factor) * color[2],
        (rw - rw * factor) * color[0]
            + (gw - gw * factor) * color[1]
            + (bw + (1.0 - bw) * factor) * color[2],
    ]
}

fn hue_rotate(color: [f32; 3], rad: f32) -> [f32; 3] {
    let cos = rad.cos();
    let sin = rad.sin();
    // SVG feColorMatrix hueRotate coefficients.
    let m = [
        0.213 + cos * 0.787 - sin * 0.213,
        0.715 - cos * 0.715 - sin * 0.715,
        0.072 - cos * 0.072 + sin * 0.928,
        0.213 - cos * 0.213 + sin * 0.143,
        0.715 + cos * 0.285 + sin * 0.140,
        0.072 - cos * 0.072 - sin * 0.283,
        0.213 - cos * 0.213 - sin * 0.787,
        0.715 - cos * 0.715 + sin * 0.715,
        0.072 + cos * 0.928 + sin * 0.072,
    ];
    [
        m[0] * color[0] + m[1] * color[1] + m[2] * color[2],
        m[3] * color[0] + m[4] * color[1] + m[5] * color[2],
        m[6] * color[0] + m[7] * color[1] + m[8] * color[2],
    ]
}

/// Blur via three box passes per axis, a close approximation of a
/// Gaussian with the given standard deviation.
pub(crate) fn blur_pixmap(pixmap: &mut Pixmap, sigma: f32) {
    if sigma <= 0.0 {
        return;
    }
    let radius = ((sigma * 3.0_f32.sqrt()) as usize).max(1);
    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;

    let mut channels: Vec<[f32; 4]> = pixmap
        .pixels()
        .iter()
        .map(|p| {
            [
                p.red() as f32,
                p.green() as f32,
                p.blue() as f32,
                p.alpha() as f32,
            ]
        })
        .collect();

    let mut scratch = channels.clone();
    for _ in 0..3 {
        box_blur_axis(&channels, &mut scratch, width, height, radius, true);
        box_blur_axis(&scratch, &mut channels, width, height, radius, false);
    }

    for (px, c) in pixmap.pixels_mut().iter_mut().zip(channels.iter()) {
        let a = c[3].round().clamp(0.0, 255.0) as u8;
        let r = c[0].round().clamp(0.0, c[3].max(0.0)) as u8;
        let g = c[1].round().clamp(0.0, c[3].max(0.0)) as u8;
        let b = c[2].round().clamp(0.0, c[3].max(0.0)) as u8;
        *px = PremultipliedColorU8::from_rgba(r, g, b, a)
            .unwrap_or(PremultipliedColorU8::TRANSPARENT);
    }
}

fn box_blur_axis(
    src: &[[f32; 4]],
    dst: &mut [[f32; 4]],
    width: usize,
    height: usize,
    radius: usize,
    horizontal: bool,
) {
    let (lines, line_len) = if horizontal {
        (height, width)
    } else {
        (width, height)
    };
    let index = |line: usize, i: usize| -> usize {
        if horizontal {
            line * width + i
        } else {
            i * width + line
        }
    };
    let window = (2 * radius + 1) as f32;

    for line in 0..lines {
        let mut acc = [0.0f32; 4];
        for i in 0..line_len.min(radius + 1) {
            for ch in 0..4 {
                acc[ch] += src[index(line, i)][ch];
            }
        }
        // Edge pixels reuse the boundary value for out-of-range taps.
        for ch in 0..4 {
            acc[ch] += src[index(line, 0)][ch] * radius as f32;
        }

        for i in 0..line_len {
            for ch in 0..4 {
                dst[index(line, i)][ch] = acc[ch] / window;
            }
            let add = index(line, (i + radius + 1).min(line_len - 1));
            let remove = index(line, i.saturating_sub(radius));
            for ch in 0..4 {
                acc[ch] += src[add][ch] - src[remove][ch];
            }
        }
    }
}

/// Composite a blurred, tinted silhouette of the pixmap under itself.
fn drop_shadow(pixmap: &mut Pixmap, dx: f32, dy: f32, blur: f32, color: tiny_skia::Color) {
    let mut shadow = match Pixmap::new(pixmap.width(), pixmap.height()) {
        Some(p) => p,
        None => return,
    };

    // Silhouette: shadow color carried by the source alpha.
    let sc = color.to_color_u8();
    let sa = sc.alpha() as f32 / 255.0;
    for (dst, src) in shadow.pixels_mut().iter_mut().zip(pixmap.pixels().iter()) {
        let a = (src.alpha() as f32 / 255.0) * sa;
        let r = (sc.red() as f32 / 255.0 * a * 255.0).round() as u8;
        let g = (sc.green() as f32 / 255.0 * a * 255.0).round() as u8;
        let b = (sc.blue() as f32 / 255.0 * a * 255.0).round() as u8;
        *dst = PremultipliedColorU8::from_rgba(r, g, b, (a * 255.0).round() as u8)
            .unwrap_or(PremultipliedColorU8::TRANSPARENT);
    }
    blur_pixmap(&mut shadow, blur);

    // Shadow first, then the original content over it.
    let mut composed = match Pixmap::new(pixmap.width(), pixmap.height()) {
        Some(p) => p,
        None => return,
    };
    composed.draw_pixmap(
        dx.round() as i32,
        dy.round() as i32,
        shadow.as_ref(),
        &tiny_skia::PixmapPaint::default(),
        tiny_skia::Transform::identity(),
        None,
    );
    composed.draw_pixmap(
        0,
        0,
        pixmap.as_ref(),
        &tiny_skia::PixmapPaint::default(),
        tiny_skia::Transform::identity(),
        None,
    );
    *pixmap = composed;
}
