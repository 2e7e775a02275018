//! Gradient types for Canvas 2D operations.

use crate::error::{CanvasError, CanvasResult};
use crate::geometry::{ConicGradientParams, RadialGradientParams};

/// A color stop in a gradient.
#[derive(Debug, Clone)]
pub struct GradientStop {
    /// Offset position (0.0 to 1.0).
    pub offset: f64,
    /// Color at this stop.
    pub color: tiny_skia::Color,
}

/// Canvas gradient (linear, radial, or conic).
#[derive(Debug, Clone)]
pub struct CanvasGradient {
    /// Gradient type and geometry.
    pub gradient_type: GradientType,
    /// Color stops, kept sorted by offset.
    pub stops: Vec<GradientStop>,
}

/// Type of gradient.
#[derive(Debug, Clone)]
pub enum GradientType {
    /// Linear gradient from (x0, y0) to (x1, y1).
    Linear { x0: f32, y0: f32, x1: f32, y1: f32 },
    /// Radial gradient from inner circle to outer circle.
    Radial(RadialGradientParams),
    /// Conic gradient sweeping clockwise around a center.
    Conic(ConicGradientParams),
}

impl CanvasGradient {
    /// Create a new linear gradient.
    pub fn new_linear(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            gradient_type: GradientType::Linear { x0, y0, x1, y1 },
            stops: Vec::new(),
        }
    }

    /// Create a new radial gradient.
    pub fn new_radial(params: &RadialGradientParams) -> Self {
        Self {
            gradient_type: GradientType::Radial(*params),
            stops: Vec::new(),
        }
    }

    /// Create a new conic gradient.
    pub fn new_conic(params: &ConicGradientParams) -> Self {
        Self {
            gradient_type: GradientType::Conic(*params),
            stops: Vec::new(),
        }
    }

    /// Add a color stop to the gradient.
    ///
    /// Offsets outside [0, 1] or non-finite offsets are rejected.
    pub fn add_color_stop(&mut self, offset: f64, color: tiny_skia::Color) -> CanvasResult<()> {
        if !offset.is_finite() || !(0.0..=1.0).contains(&offset) {
            return Err(CanvasError::InvalidGradientStop(offset));
        }
        self.stops.push(GradientStop { offset, color });
        // Keep stops sorted by offset (stable, so equal offsets keep
        // insertion order and the later stop wins at the shared position)
        self.stops.sort_by(|a, b| {
            a.offset
                .partial_cmp(&b.offset)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(())
    }

    /// Resolve the stop list into a strictly monotonic sequence.
    ///
    /// Offsets are clamped to [0, 1]; runs of equal offsets collapse so the
    /// last-added stop at a position wins, which keeps the interpolation
    /// well defined for backends that reject duplicate offsets.
    pub fn resolved_stops(&self) -> Vec<GradientStop> {
        let mut out: Vec<GradientStop> = Vec::with_capacity(self.stops.len());
        for stop in &self.stops {
            let offset = stop.offset.clamp(0.0, 1.0);
            match out.last_mut() {
                Some(last) if last.offset == offset => {
                    last.color = stop.color;
                }
                _ => out.push(GradientStop {
                    offset,
                    color: stop.color,
                }),
            }
        }
        out
    }

    /// Sample the gradient color at a normalized position `t` in [0, 1].
    ///
    /// Used by the conic shader, which resolves colors per pixel.
    pub fn sample(&self, t: f32) -> tiny_skia::Color {
        let stops = self.resolved_stops();
        if stops.is_empty() {
            return tiny_skia::Color::TRANSPARENT;
        }
        let t = t.clamp(0.0, 1.0) as f64;
        if t <= stops[0].offset {
            return stops[0].color;
        }
        if t >= stops[stops.len() - 1].offset {
            return stops[stops.len() - 1].color;
        }
        for pair in stops.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            if t >= lo.offset && t <= hi.offset {
                let span = hi.offset - lo.offset;
                let f = if span == 0.0 {
                    1.0
                } else {
                    (t - lo.offset) / span
                };
                return lerp_color(lo.color, hi.color, f as f32);
            }
        }
        stops[stops.len() - 1].color
    }
}

fn lerp_color(a: tiny_skia::Color, b: tiny_skia::Color, t: f32) -> tiny_skia::Color {
    let lerp = |x: f32, y: f32| x + (y - x) * t;
    tiny_skia::Color::from_rgba(
        lerp(a.red(), b.red()).clamp(0.0, 1.0),
        lerp(a.green(), b.green()).clamp(0.0, 1.0),
        lerp(a.blue(), b.blue()).clamp(0.0, 1.0),
        lerp(a.alpha(), b.alpha()).clamp(0.0, 1.0),
    )
    .unwrap_or(tiny_skia::Color::TRANSPARENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(r: u8, g: u8, b: u8) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(r, g, b, 255)
    }

    #[test]
    fn test_stops_stay_sorted() {
        let mut g = CanvasGradient::new_linear(0.0, 0.0, 100.0, 0.0);
        g.add_color_stop(1.0, rgb(0, 0, 255)).unwrap();
        g.add_color_stop(0.0, rgb(255, 0, 0)).unwrap();
        g.add_color_stop(0.5, rgb(0, 255, 0)).unwrap();
        let offsets: Vec<f64> = g.stops.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_invalid_stop_offsets_rejected() {
        let mut g = CanvasGradient::new_linear(0.0, 0.0, 100.0, 0.0);
        assert!(g.add_color_stop(-0.1, rgb(0, 0, 0)).is_err());
        assert!(g.add_color_stop(1.1, rgb(0, 0, 0)).is_err());
        assert!(g.add_color_stop(f64::NAN, rgb(0, 0, 0)).is_err());
        assert!(g.stops.is_empty());
    }

    #[test]
    fn test_resolved_stops_dedupes_equal_offsets() {
        let mut g = CanvasGradient::new_linear(0.0, 0.0, 100.0, 0.0);
        g.add_color_stop(0.5, rgb(255, 0, 0)).unwrap();
        g.add_color_stop(0.5, rgb(0, 0, 255)).unwrap();
        let resolved = g.resolved_stops();
        assert_eq!(resolved.len(), 1);
        // Later stop at the shared offset wins.
        assert_eq!(resolved[0].color.to_color_u8().blue(), 255);
    }

    #[test]
    fn test_sample_endpoints_and_midpoint() {
        let mut g = CanvasGradient::new_conic(&crate::geometry::ConicGradientParams {
            start_angle: 0.0,
            x: 0.0,
            y: 0.0,
        });
        g.add_color_stop(0.0, rgb(0, 0, 0)).unwrap();
        g.add_color_stop(1.0, rgb(255, 255, 255)).unwrap();
        assert_eq!(g.sample(0.0).to_color_u8().red(), 0);
        assert_eq!(g.sample(1.0).to_color_u8().red(), 255);
        let mid = g.sample(0.5).to_color_u8().red();
        assert!((126..=129).contains(&mid));
    }
}
