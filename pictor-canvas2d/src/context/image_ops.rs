//! Image drawing, pixel data, and encoded output for Canvas2dContext.

use super::Canvas2dContext;
use crate::error::CanvasResult;
use crate::geometry::{CanvasImageDataRef, CanvasPixmapRef, DirtyRect, ImageCropParams};
use crate::image::CanvasImage;
use crate::pattern::{CanvasPattern, Repetition};
use crate::surface::RecordedOp;
use base64::Engine as _;
use std::sync::Arc;
use tiny_skia::{Pixmap, Transform};

/// Build an owned premultiplied pixmap from premultiplied RGBA bytes.
fn pixmap_from_premultiplied(image: CanvasPixmapRef<'_>) -> Option<Pixmap> {
    let r = tiny_skia::PixmapRef::from_bytes(image.data, image.width, image.height)?;
    Some(r.to_owned())
}

/// Build an owned premultiplied pixmap from straight-alpha RGBA bytes.
fn pixmap_from_straight(image: &CanvasImageDataRef<'_>) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width, image.height)?;
    for (i, px) in pixmap.pixels_mut().iter_mut().enumerate() {
        let offset = i * 4;
        let r = image.data[offset];
        let g = image.data[offset + 1];
        let b = image.data[offset + 2];
        let a = image.data[offset + 3];
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
        *px = tiny_skia::PremultipliedColorU8::from_rgba(pr, pg, pb, a)
            .unwrap_or(tiny_skia::PremultipliedColorU8::TRANSPARENT);
    }
    Some(pixmap)
}

impl Canvas2dContext {
    // --- Internal image drawing ---

    /// Internal: draw an owned premultiplied pixmap with a transform.
    fn submit_pixmap(&mut self, pixmap: Pixmap, transform: Transform) {
        let op = RecordedOp::DrawPixmap {
            pixmap,
            opacity: self.state.global_alpha,
            blend: self.state.global_composite_operation,
            quality: self.get_image_filter_quality(),
            transform,
            clip: self.state.clip.clone(),
        };
        self.surface.draw(op);
    }

    /// Internal: draw a cropped region of a premultiplied-alpha pixmap.
    pub(crate) fn draw_image_cropped(
        &mut self,
        image: CanvasPixmapRef<'_>,
        params: &ImageCropParams,
    ) {
        let Some(pixmap) = pixmap_from_premultiplied(image) else {
            return;
        };
        let ImageCropParams {
            sx,
            sy,
            sw,
            sh,
            dx,
            dy,
            dw,
            dh,
        } = *params;

        // Clamp source rectangle to image bounds
        let sx = sx.max(0.0);
        let sy = sy.max(0.0);
        let sw = sw.min(image.width as f32 - sx);
        let sh = sh.min(image.height as f32 - sy);

        if sw <= 0.0 || sh <= 0.0 || dw <= 0.0 || dh <= 0.0 {
            return;
        }

        // Extract the source region into a temporary pixmap
        let sub_width = sw.ceil() as u32;
        let sub_height = sh.ceil() as u32;

        if let Some(mut sub_pixmap) = Pixmap::new(sub_width, sub_height) {
            let src_x = sx.floor() as i32;
            let src_y = sy.floor() as i32;
            let extract_transform = Transform::from_translate(-src_x as f32, -src_y as f32);
            sub_pixmap.draw_pixmap(
                0,
                0,
                pixmap.as_ref(),
                &tiny_skia::PixmapPaint::default(),
                extract_transform,
                None,
            );

            let scale_x = dw / sub_width as f32;
            let scale_y = dh / sub_height as f32;
            let transform = self
                .state
                .transform
                .pre_translate(dx, dy)
                .pre_scale(scale_x, scale_y);
            self.submit_pixmap(sub_pixmap, transform);
        }
    }

    // --- Public draw image methods ---

    /// Draw straight-alpha image data at the specified position.
    pub fn draw_image_data(&mut self, image: &CanvasImageDataRef<'_>, dx: f32, dy: f32) {
        if let Some(pixmap) = pixmap_from_straight(image) {
            let transform = self.state.transform.pre_translate(dx, dy);
            self.submit_pixmap(pixmap, transform);
        }
    }

    /// Draw straight-alpha image data scaled to the given dimensions.
    pub fn draw_image_data_scaled(
        &mut self,
        image: &CanvasImageDataRef<'_>,
        dx: f32,
        dy: f32,
        dw: f32,
        dh: f32,
    ) {
        if let Some(pixmap) = pixmap_from_straight(image) {
            let scale_x = dw / image.width as f32;
            let scale_y = dh / image.height as f32;
            let transform = self
                .state
                .transform
                .pre_translate(dx, dy)
                .pre_scale(scale_x, scale_y);
            self.submit_pixmap(pixmap, transform);
        }
    }

    /// Draw a cropped region of straight-alpha image data.
    pub fn draw_image_data_cropped(
        &mut self,
        image: &CanvasImageDataRef<'_>,
        params: &ImageCropParams,
    ) {
        if let Some(pixmap) = pixmap_from_straight(image) {
            let premul = CanvasPixmapRef {
                data: pixmap.data(),
                width: image.width,
                height: image.height,
            };
            self.draw_image_cropped(premul, params);
        }
    }

    /// Draw a decoded image at the specified position.
    pub fn draw_image_source(&mut self, image: &CanvasImage, dx: f32, dy: f32) {
        if let Some(data) = image.as_image_data() {
            self.draw_image_data(&data, dx, dy);
        }
    }

    /// Draw a decoded image scaled to the given dimensions.
    pub fn draw_image_source_scaled(
        &mut self,
        image: &CanvasImage,
        dx: f32,
        dy: f32,
        dw: f32,
        dh: f32,
    ) {
        if let Some(data) = image.as_image_data() {
            self.draw_image_data_scaled(&data, dx, dy, dw, dh);
        }
    }

    // --- Canvas-as-source operations ---

    /// Draw another canvas at the specified position.
    ///
    /// Reading the source promotes it to pixels; its own drawing state
    /// (transform, clip, saves) is untouched, so it keeps accepting
    /// drawing calls exactly as before the read.
    pub fn draw_canvas(&mut self, source: &mut Canvas2dContext, dx: f32, dy: f32) {
        let pixmap = source.surface.pixels().clone();
        let transform = self.state.transform.pre_translate(dx, dy);
        self.submit_pixmap(pixmap, transform);
    }

    /// Draw another canvas scaled to the specified dimensions.
    pub fn draw_canvas_scaled(
        &mut self,
        source: &mut Canvas2dContext,
        dx: f32,
        dy: f32,
        dw: f32,
        dh: f32,
    ) {
        let pixmap = source.surface.pixels().clone();
        let scale_x = dw / pixmap.width() as f32;
        let scale_y = dh / pixmap.height() as f32;
        let transform = self
            .state
            .transform
            .pre_translate(dx, dy)
            .pre_scale(scale_x, scale_y);
        self.submit_pixmap(pixmap, transform);
    }

    /// Draw a cropped region of another canvas.
    pub fn draw_canvas_cropped(&mut self, source: &mut Canvas2dContext, params: &ImageCropParams) {
        let pixmap = source.surface.pixels().clone();
        let image = CanvasPixmapRef {
            data: pixmap.data(),
            width: pixmap.width(),
            height: pixmap.height(),
        };
        self.draw_image_cropped(image, params);
    }

    /// Create a pattern from another canvas.
    ///
    /// The source pixels are snapshotted at creation time; later drawing
    /// on the source canvas does not change the pattern.
    pub fn create_pattern_from_canvas(
        &self,
        source: &mut Canvas2dContext,
        repetition: &str,
    ) -> CanvasResult<Arc<CanvasPattern>> {
        let rep = repetition.parse::<Repetition>()?;
        let pattern = CanvasPattern::from_pixmap_ref(source.surface.pixels().as_ref(), rep)?;
        Ok(Arc::new(pattern))
    }

    // --- Image data ---

    /// Create a new ImageData buffer filled with transparent black.
    pub fn create_image_data(&self, width: u32, height: u32) -> Vec<u8> {
        vec![0u8; (width * height * 4) as usize]
    }

    /// Get image data for a region of the canvas (straight alpha).
    ///
    /// Forces a promotion on recording surfaces.
    pub fn get_image_data(&mut self, x: i32, y: i32, width: u32, height: u32) -> Vec<u8> {
        let canvas_width = self.surface.width();
        let canvas_height = self.surface.height();
        let pixmap = self.surface.pixels();
        let mut data = vec![0u8; (width * height * 4) as usize];

        for dy in 0..height {
            for dx in 0..width {
                let src_x = x + dx as i32;
                let src_y = y + dy as i32;

                let dst_idx = ((dy * width + dx) * 4) as usize;

                if src_x >= 0
                    && src_x < canvas_width as i32
                    && src_y >= 0
                    && src_y < canvas_height as i32
                {
                    let src_idx = (src_y as u32 * canvas_width + src_x as u32) as usize;
                    let pixel = &pixmap.data()[src_idx * 4..src_idx * 4 + 4];

                    // Convert from premultiplied alpha to straight alpha
                    let a = pixel[3];
                    if a == 0 {
                        data[dst_idx..dst_idx + 4].copy_from_slice(&[0, 0, 0, 0]);
                    } else if a == 255 {
                        data[dst_idx..dst_idx + 4].copy_from_slice(pixel);
                    } else {
                        let alpha_f = a as f32 / 255.0;
                        data[dst_idx] = (pixel[0] as f32 / alpha_f).min(255.0) as u8;
                        data[dst_idx + 1] = (pixel[1] as f32 / alpha_f).min(255.0) as u8;
                        data[dst_idx + 2] = (pixel[2] as f32 / alpha_f).min(255.0) as u8;
                        data[dst_idx + 3] = a;
                    }
                }
            }
        }

        data
    }

    /// Write image data to the canvas at the specified position.
    ///
    /// The data must be in non-premultiplied RGBA format. This bypasses
    /// compositing, clipping, and transforms: pixels are written directly.
    pub fn put_image_data(&mut self, data: &[u8], width: u32, height: u32, dx: i32, dy: i32) {
        self.put_image_data_dirty(
            data,
            width,
            height,
            dx,
            dy,
            &DirtyRect {
                x: 0,
                y: 0,
                width: width as i32,
                height: height as i32,
            },
        );
    }

    /// Write a portion of image data to the canvas.
    ///
    /// The dirty rectangle selects which portion of the source to write.
    /// Pixels outside the canvas bounds are silently ignored.
    pub fn put_image_data_dirty(
        &mut self,
        data: &[u8],
        width: u32,
        height: u32,
        dx: i32,
        dy: i32,
        dirty: &DirtyRect,
    ) {
        self.surface.draw(RecordedOp::PutImageData {
            data: data.to_vec(),
            width,
            height,
            dx,
            dy,
            dirty: *dirty,
        });
    }

    // --- Encoded output ---

    /// Export the canvas as PNG data.
    ///
    /// # Arguments
    /// * `ppi` - Optional pixels per inch for PNG metadata. Defaults to 72.
    pub fn to_png(&mut self, ppi: Option<f32>) -> CanvasResult<Vec<u8>> {
        let ppi = ppi.unwrap_or(72.0);
        let width = self.surface.width();
        let height = self.surface.height();

        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);

            // Set pixel density metadata (pixels per meter)
            let ppm = (ppi.max(0.0) / 0.0254).round() as u32;
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: ppm,
                yppu: ppm,
                unit: png::Unit::Meter,
            }));

            let mut writer = encoder.write_header()?;

            // Convert from premultiplied to straight alpha for PNG
            let data = self.get_image_data(0, 0, width, height);
            writer.write_image_data(&data)?;
        }
        Ok(buf)
    }

    /// Export the canvas as a base64 `data:` URL (PNG payload).
    pub fn to_data_url(&mut self) -> CanvasResult<String> {
        let png = self.to_png(None)?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(png);
        Ok(format!("data:image/png;base64,{encoded}"))
    }
}
