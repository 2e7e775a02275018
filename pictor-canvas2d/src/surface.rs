//! Canvas surface backends: immediate raster and deferred recording.
//!
//! A surface is either `Raster` (a pixel buffer, materialized from the
//! start) or `Recording` (device-space draw commands, used by the SVG
//! export canvas). A recording surface promotes to pixels the first time
//! a read-back is requested; the command list stays the source of truth
//! and the rasterization is a cache invalidated by subsequent draws, so
//! any number of promotions interleaved with further drawing produces the
//! same pixels as a single materialization at the end.

use crate::drawing_state::ClipState;
use crate::filter::FilterChain;
use crate::geometry::DirtyRect;
use crate::gradient::{CanvasGradient, GradientType};
use crate::pattern_cache::{PatternCacheKey, PatternPixmapCache};
use crate::style::FillStyle;
use tiny_skia::{Pixmap, Transform};

/// Default canvas width when a resize receives an invalid value.
pub const DEFAULT_WIDTH: u32 = 300;
/// Default canvas height when a resize receives an invalid value.
pub const DEFAULT_HEIGHT: u32 = 150;

/// Paint parameters captured per draw command.
#[derive(Debug, Clone)]
pub(crate) struct PaintSpec {
    pub style: FillStyle,
    pub global_alpha: f32,
    pub blend: tiny_skia::BlendMode,
    pub anti_alias: bool,
    /// Transform placing gradient/pattern geometry (expressed in user
    /// space) into device space. Solid colors ignore it.
    pub shader_transform: Transform,
}

/// Stroke parameters captured per draw command.
#[derive(Debug, Clone)]
pub(crate) struct StrokeSpec {
    pub width: f32,
    pub cap: tiny_skia::LineCap,
    pub join: tiny_skia::LineJoin,
    pub miter_limit: f32,
    pub dash: Vec<f32>,
    pub dash_offset: f32,
}

/// A device-space draw command with all state it needs snapshotted.
#[derive(Debug, Clone)]
pub(crate) enum RecordedOp {
    FillPath {
        path: tiny_skia::Path,
        paint: PaintSpec,
        rule: tiny_skia::FillRule,
        transform: Transform,
        clip: Option<ClipState>,
        filter: FilterChain,
    },
    StrokePath {
        path: tiny_skia::Path,
        paint: PaintSpec,
        stroke: StrokeSpec,
        transform: Transform,
        clip: Option<ClipState>,
        filter: FilterChain,
    },
    DrawPixmap {
        pixmap: Pixmap,
        opacity: f32,
        blend: tiny_skia::BlendMode,
        quality: tiny_skia::FilterQuality,
        transform: Transform,
        clip: Option<ClipState>,
    },
    PutImageData {
        data: Vec<u8>,
        width: u32,
        height: u32,
        dx: i32,
        dy: i32,
        dirty: DirtyRect,
    },
}

#[derive(Debug)]
enum Backend {
    /// Materialized pixel buffer drawn in place.
    Raster(Pixmap),
    /// Deferred command list plus an optional rasterization cache.
    Recording {
        ops: Vec<RecordedOp>,
        cache: Option<Pixmap>,
    },
}

/// Pixel/recording target owning the backing storage.
#[derive(Debug)]
pub(crate) struct Surface {
    backend: Backend,
    width: u32,
    height: u32,
    /// Owned cache of pattern backing pixmaps for shader lifetimes.
    pattern_cache: PatternPixmapCache,
}

/// Maximum number of bytes retained by the per-surface pattern cache.
const PATTERN_CACHE_MAX_BYTES: usize = 64 * 1024 * 1024;

impl Surface {
    pub fn new_raster(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            backend: Backend::Raster(Pixmap::new(width, height)?),
            width,
            height,
            pattern_cache: PatternPixmapCache::new(PATTERN_CACHE_MAX_BYTES),
        })
    }

    pub fn new_recording(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            backend: Backend::Recording {
                ops: Vec::new(),
                cache: None,
            },
            width,
            height,
            pattern_cache: PatternPixmapCache::new(PATTERN_CACHE_MAX_BYTES),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.backend, Backend::Recording { .. })
    }

    /// Recorded commands, if this is a recording surface.
    pub fn ops(&self) -> Option<&[RecordedOp]> {
        match &self.backend {
            Backend::Recording { ops, .. } => Some(ops),
            Backend::Raster(_) => None,
        }
    }

    /// Apply a draw command: immediately on raster, appended on recording.
    pub fn draw(&mut self, op: RecordedOp) {
        let (width, height) = (self.width, self.height);
        match &mut self.backend {
            Backend::Raster(pixmap) => {
                execute(pixmap, &op, &mut self.pattern_cache, width, height);
            }
            Backend::Recording { ops, cache } => {
                ops.push(op);
                // Rasterization cache is stale now.
                *cache = None;
            }
        }
    }

    /// Clear everything: pixels on raster, the command list on recording.
    pub fn clear_all(&mut self) {
        match &mut self.backend {
            Backend::Raster(pixmap) => pixmap.fill(tiny_skia::Color::TRANSPARENT),
            Backend::Recording { ops, cache } => {
                ops.clear();
                *cache = None;
            }
        }
        self.pattern_cache.clear();
    }

    /// Materialized pixels for read-back. A recording surface replays its
    /// commands into a cached pixmap here (layer promotion); the live
    /// drawing state stack is untouched by design, so drawing continues
    /// unchanged afterwards.
    pub fn pixels(&mut self) -> &Pixmap {
        let (width, height) = (self.width, self.height);
        match &mut self.backend {
            Backend::Raster(pixmap) => pixmap,
            Backend::Recording { ops, cache } => {
                if cache.is_none() {
                    let mut pixmap =
                        Pixmap::new(width, height).expect("surface dimensions already validated");
                    for op in ops.iter() {
                        execute(&mut pixmap, op, &mut self.pattern_cache, width, height);
                    }
                    *cache = Some(pixmap);
                }
                cache.as_ref().expect("cache just populated")
            }
        }
    }

    /// Replace the backing storage with a fresh buffer of the new size.
    ///
    /// The new buffer is constructed first and moved into the owning slot,
    /// so the old storage is dropped exactly once and no reader can see a
    /// half-initialized buffer.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        match &mut self.backend {
            Backend::Raster(pixmap) => {
                let Some(fresh) = Pixmap::new(width, height) else {
                    return false;
                };
                *pixmap = fresh;
            }
            Backend::Recording { ops, cache } => {
                ops.clear();
                *cache = None;
            }
        }
        self.width = width;
        self.height = height;
        self.pattern_cache.clear();
        true
    }
}

/// Execute one draw command against a pixmap.
fn execute(
    pixmap: &mut Pixmap,
    op: &RecordedOp,
    pattern_cache: &mut PatternPixmapCache,
    canvas_width: u32,
    canvas_height: u32,
) {
    match op {
        RecordedOp::FillPath {
            path,
            paint,
            rule,
            transform,
            clip,
            filter,
        } => {
            with_layer(pixmap, filter, |target| {
                let mask = clip_mask(clip, canvas_width, canvas_height);
                with_paint(paint, pattern_cache, canvas_width, canvas_height, |p| {
                    target.fill_path(path, p, *rule, *transform, mask.as_ref());
                });
            });
        }
        RecordedOp::StrokePath {
            path,
            paint,
            stroke,
            transform,
            clip,
            filter,
        } => {
            let stroke = tiny_skia::Stroke {
                width: stroke.width,
                line_cap: stroke.cap,
                line_join: stroke.join,
                miter_limit: stroke.miter_limit,
                dash: if stroke.dash.is_empty() {
                    None
                } else {
                    tiny_skia::StrokeDash::new(stroke.dash.clone(), stroke.dash_offset)
                },
            };
            with_layer(pixmap, filter, |target| {
                let mask = clip_mask(clip, canvas_width, canvas_height);
                with_paint(paint, pattern_cache, canvas_width, canvas_height, |p| {
                    target.stroke_path(path, p, &stroke, *transform, mask.as_ref());
                });
            });
        }
        RecordedOp::DrawPixmap {
            pixmap: source,
            opacity,
            blend,
            quality,
            transform,
            clip,
        } => {
            let paint = tiny_skia::PixmapPaint {
                opacity: *opacity,
                blend_mode: *blend,
                quality: *quality,
            };
            let mask = clip_mask(clip, canvas_width, canvas_height);
            pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, *transform, mask.as_ref());
        }
        RecordedOp::PutImageData {
            data,
            width,
            height,
            dx,
            dy,
            dirty,
        } => {
            put_image_data(pixmap, data, *width, *height, *dx, *dy, dirty);
        }
    }
}

/// Run a draw through a scratch layer when a filter chain is active.
fn with_layer(pixmap: &mut Pixmap, filter: &FilterChain, draw: impl FnOnce(&mut Pixmap)) {
    if filter.is_none() {
        draw(pixmap);
        return;
    }
    let Some(mut scratch) = Pixmap::new(pixmap.width(), pixmap.height()) else {
        draw(pixmap);
        return;
    };
    draw(&mut scratch);
    filter.apply(&mut scratch);
    pixmap.draw_pixmap(
        0,
        0,
        scratch.as_ref(),
        &tiny_skia::PixmapPaint::default(),
        Transform::identity(),
        None,
    );
}

fn clip_mask(
    clip: &Option<ClipState>,
    canvas_width: u32,
    canvas_height: u32,
) -> Option<tiny_skia::Mask> {
    clip.as_ref().and_then(|clip| {
        let mut mask = tiny_skia::Mask::new(canvas_width, canvas_height)?;
        mask.fill_path(&clip.path, clip.rule.into(), true, clip.transform);
        Some(mask)
    })
}

/// Build the tiny-skia paint for a paint spec and hand it to `draw`.
fn with_paint(
    spec: &PaintSpec,
    pattern_cache: &mut PatternPixmapCache,
    canvas_width: u32,
    canvas_height: u32,
    draw: impl FnOnce(&tiny_skia::Paint<'_>),
) {
    let mut paint = tiny_skia::Paint {
        anti_alias: spec.anti_alias,
        blend_mode: spec.blend,
        ..Default::default()
    };

    match &spec.style {
        FillStyle::Color(color) => {
            let mut color = *color;
            if spec.global_alpha < 1.0 {
                color.set_alpha((color.alpha() * spec.global_alpha).clamp(0.0, 1.0));
            }
            paint.set_color(color);
            draw(&paint);
        }
        FillStyle::LinearGradient(gradient) | FillStyle::RadialGradient(gradient) => {
            // The gradient geometry is expressed in user space; the spec's
            // transform places it in device space.
            let Some(shader) = gradient_shader(gradient, spec) else {
                return;
            };
            paint.shader = shader;
            draw(&paint);
        }
        FillStyle::ConicGradient(gradient) => {
            let Some(backing) = conic_backing(gradient, spec, canvas_width, canvas_height) else {
                return;
            };
            paint.shader = tiny_skia::Pattern::new(
                backing.as_ref(),
                tiny_skia::SpreadMode::Pad,
                tiny_skia::FilterQuality::Nearest,
                spec.global_alpha,
                Transform::identity(),
            );
            draw(&paint);
        }
        FillStyle::Pattern(pattern) => {
            let (cache_width, cache_height) = pattern.cache_dimensions(canvas_width, canvas_height);
            let key = PatternCacheKey {
                pattern_id: pattern.id(),
                repetition: pattern.repetition(),
                canvas_width: cache_width,
                canvas_height: cache_height,
            };
            let Some(backing) = pattern_cache.get_or_insert(key, || {
                pattern.create_cache_pixmap(canvas_width, canvas_height)
            }) else {
                return;
            };
            paint.shader = pattern
                .create_shader_for_pixmap(backing.as_ref().as_ref(), spec.shader_transform);
            draw(&paint);
        }
    }
}

fn gradient_shader(
    gradient: &CanvasGradient,
    spec: &PaintSpec,
) -> Option<tiny_skia::Shader<'static>> {
    let resolved = gradient.resolved_stops();
    if resolved.is_empty() {
        return None;
    }

    let stops: Vec<tiny_skia::GradientStop> = resolved
        .iter()
        .map(|stop| {
            let mut color = stop.color;
            if spec.global_alpha < 1.0 {
                color.set_alpha((color.alpha() * spec.global_alpha).clamp(0.0, 1.0));
            }
            tiny_skia::GradientStop::new(stop.offset as f32, color)
        })
        .collect();

    match &gradient.gradient_type {
        GradientType::Linear { x0, y0, x1, y1 } => tiny_skia::LinearGradient::new(
            tiny_skia::Point { x: *x0, y: *y0 },
            tiny_skia::Point { x: *x1, y: *y1 },
            stops,
            tiny_skia::SpreadMode::Pad,
            spec.shader_transform,
        ),
        GradientType::Radial(params) => tiny_skia::RadialGradient::new(
            tiny_skia::Point {
                x: params.x0,
                y: params.y0,
            },
            tiny_skia::Point {
                x: params.x1,
                y: params.y1,
            },
            params.r1,
            stops,
            tiny_skia::SpreadMode::Pad,
            spec.shader_transform,
        ),
        GradientType::Conic(_) => None,
    }
}

/// Rasterize a conic gradient into a canvas-sized backing pixmap.
///
/// tiny-skia has no sweep shader, so the angular interpolation is
/// evaluated per pixel, mapping each device pixel back into the
/// gradient's user space through the inverse shader transform.
fn conic_backing(
    gradient: &CanvasGradient,
    spec: &PaintSpec,
    canvas_width: u32,
    canvas_height: u32,
) -> Option<Pixmap> {
    let GradientType::Conic(params) = &gradient.gradient_type else {
        return None;
    };
    if gradient.resolved_stops().is_empty() {
        return None;
    }
    let inverse = spec.shader_transform.invert()?;

    let mut pixmap = Pixmap::new(canvas_width, canvas_height)?;
    let two_pi = std::f32::consts::PI * 2.0;
    for y in 0..canvas_height {
        for x in 0..canvas_width {
            let mut point = [tiny_skia::Point {
                x: x as f32 + 0.5,
                y: y as f32 + 0.5,
            }];
            inverse.map_points(&mut point);
            let dx = point[0].x - params.x;
            let dy = point[0].y - params.y;
            // Angle measured clockwise from the start angle; canvas conic
            // gradients start pointing up.
            let mut angle = dy.atan2(dx) + std::f32::consts::FRAC_PI_2 - params.start_angle;
            angle = angle.rem_euclid(two_pi);
            let color = gradient.sample(angle / two_pi);
            let c = color.to_color_u8();
            let a = c.alpha() as u16;
            let premul = tiny_skia::PremultipliedColorU8::from_rgba(
                ((c.red() as u16 * a + 127) / 255) as u8,
                ((c.green() as u16 * a + 127) / 255) as u8,
                ((c.blue() as u16 * a + 127) / 255) as u8,
                c.alpha(),
            )?;
            pixmap.pixels_mut()[(y * canvas_width + x) as usize] = premul;
        }
    }
    Some(pixmap)
}

/// Direct pixel write of non-premultiplied RGBA data, bypassing
/// compositing, with a dirty-rect window.
pub(crate) fn put_image_data(
    pixmap: &mut Pixmap,
    data: &[u8],
    width: u32,
    height: u32,
    dx: i32,
    dy: i32,
    dirty: &DirtyRect,
) {
    // Clamp dirty rect to source image bounds
    let dirty_x = dirty.x.max(0).min(width as i32);
    let dirty_y = dirty.y.max(0).min(height as i32);
    let dirty_width = dirty.width.max(0).min(width as i32 - dirty_x);
    let dirty_height = dirty.height.max(0).min(height as i32 - dirty_y);

    if dirty_width <= 0 || dirty_height <= 0 {
        return; // Nothing to draw
    }

    let dest_x = dx + dirty_x;
    let dest_y = dy + dirty_y;

    let canvas_width = pixmap.width() as i32;
    let canvas_height = pixmap.height() as i32;
    let stride = pixmap.width();
    let pixmap_data = pixmap.data_mut();

    for sy in 0..dirty_height {
        let src_row = dirty_y + sy;
        let dst_row = dest_y + sy;

        if dst_row < 0 || dst_row >= canvas_height {
            continue;
        }

        for sx in 0..dirty_width {
            let src_col = dirty_x + sx;
            let dst_col = dest_x + sx;

            if dst_col < 0 || dst_col >= canvas_width {
                continue;
            }

            let src_idx = ((src_row as u32 * width + src_col as u32) * 4) as usize;
            let dst_idx = ((dst_row as u32 * stride + dst_col as u32) * 4) as usize;

            let r = data[src_idx];
            let g = data[src_idx + 1];
            let b = data[src_idx + 2];
            let a = data[src_idx + 3];

            // Convert to premultiplied alpha using integer math
            let (pr, pg, pb) = if a == 255 {
                (r, g, b)
            } else if a == 0 {
                (0, 0, 0)
            } else {
                let a16 = a as u16;
                (
                    ((r as u16 * a16 + 127) / 255) as u8,
                    ((g as u16 * a16 + 127) / 255) as u8,
                    ((b as u16 * a16 + 127) / 255) as u8,
                )
            };

            pixmap_data[dst_idx] = pr;
            pixmap_data[dst_idx + 1] = pg;
            pixmap_data[dst_idx + 2] = pb;
            pixmap_data[dst_idx + 3] = a;
        }
    }
}
