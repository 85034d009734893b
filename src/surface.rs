// Drawing targets for the rain. Particles only ever clear the surface and fill
// axis aligned squares, so that is all a Surface has to support.

use crate::color::Color;
use wasm_bindgen::{Clamped, JsValue};
use web_sys::{CanvasRenderingContext2d, ImageData};

pub trait Surface {
    fn clear(&mut self, color: Color);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color, alpha: f64);
}

// Draws straight onto a browser 2d context
pub struct CanvasSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d, width: f64, height: f64) -> Self {
        CanvasSurface { ctx, width, height }
    }
}

impl<'a> Surface for CanvasSurface<'a> {
    #[allow(deprecated)]
    fn clear(&mut self, color: Color) {
        self.ctx.set_global_alpha(1.0);
        self.ctx.set_fill_style(&JsValue::from_str(&color.to_css()));
        self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
    }

    #[allow(deprecated)]
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
        self.ctx.set_fill_style(&JsValue::from_str(&color.to_css()));
        self.ctx.fill_rect(x, y, width, height);
        self.ctx.set_global_alpha(1.0);
    }
}

/// RGBA8 software raster. Used when the host wants one `put_image_data` per
/// frame instead of a 2d context call per particle.
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixel_data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        PixelBuffer {
            width,
            height,
            pixel_data: vec![0x00; (width * height * 4) as usize],
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixel_data = vec![0x00; (width * height * 4) as usize];
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixel_data
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.get_pixel_index(x, y).map(|idx| Color {
            r: self.pixel_data[idx],
            g: self.pixel_data[idx + 1],
            b: self.pixel_data[idx + 2],
            a: self.pixel_data[idx + 3],
        })
    }

    pub fn put_to(&self, ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
        let image_data = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(&self.pixel_data[..]),
            self.width,
            self.height,
        )?;
        ctx.put_image_data(&image_data, 0.0, 0.0)
    }

    fn get_pixel_index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            Some(((y * self.width as i32 + x) * 4) as usize)
        } else {
            None
        }
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(idx) = self.get_pixel_index(x, y) {
            self.pixel_data[idx] = color.r;
            self.pixel_data[idx + 1] = color.g;
            self.pixel_data[idx + 2] = color.b;
            self.pixel_data[idx + 3] = color.a;
        }
    }
}

impl Surface for PixelBuffer {
    fn clear(&mut self, color: Color) {
        for pixel in self.pixel_data.chunks_exact_mut(4) {
            pixel[0] = color.r;
            pixel[1] = color.g;
            pixel[2] = color.b;
            pixel[3] = color.a;
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color, alpha: f64) {
        if alpha <= 0.0 || width <= 0.0 || height <= 0.0 {
            return;
        }
        // Cover every pixel whose center lies inside the rect, like the canvas does
        let x0 = (x - 0.5).ceil() as i32;
        let y0 = (y - 0.5).ceil() as i32;
        let x1 = (x + width - 0.5).ceil() as i32;
        let y1 = (y + height - 0.5).ceil() as i32;
        for pixel_y in y0.max(0)..y1.min(self.height as i32) {
            for pixel_x in x0.max(0)..x1.min(self.width as i32) {
                if let Some(dst) = self.get_pixel(pixel_x, pixel_y) {
                    self.set_pixel(pixel_x, pixel_y, color.blend_over(dst, alpha));
                }
            }
        }
    }
}
