use image::{Rgba, RgbaImage};
use posesync_protocol::Point;
use std::path::Path;

use crate::error::ClientError;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// A participant's drawing surface.
///
/// Illustrations draw in capture coordinates; the surface applies one
/// uniform scale so the whole capture frame fits the canvas.
pub struct Surface {
    image: RgbaImage,
    scale: f32,
}

impl Surface {
    pub fn new(canvas_width: u32, canvas_height: u32, capture_width: u32, capture_height: u32) -> Self {
        let scale = (canvas_width as f32 / capture_width.max(1) as f32)
            .min(canvas_height as f32 / capture_height.max(1) as f32);
        Self {
            image: RgbaImage::from_pixel(canvas_width, canvas_height, BACKGROUND),
            scale,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = BACKGROUND;
        }
    }

    /// Capture coordinates to canvas coordinates
    pub fn to_canvas(&self, point: Point) -> (f32, f32) {
        (point.x * self.scale, point.y * self.scale)
    }

    /// Stepped line, clipped to the canvas first so the step count never
    /// exceeds the canvas size whatever the endpoints are.
    pub fn draw_line(&mut self, from: Point, to: Point, color: Rgba<u8>) {
        let (x0, y0) = self.to_canvas(from);
        let (x1, y1) = self.to_canvas(to);
        let Some((x0, y0, x1, y1)) = self.clip(x0, y0, x1, y1) else {
            return;
        };
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as u32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.plot(x0 + (x1 - x0) * t, y0 + (y1 - y0) * t, color);
        }
    }

    pub fn draw_dot(&mut self, center: Point, radius: f32, color: Rgba<u8>) {
        let (cx, cy) = self.to_canvas(center);
        let r = radius.max(0.0);
        let span = r.ceil() as i32;
        for dy in -span..=span {
            for dx in -span..=span {
                let (fx, fy) = (dx as f32, dy as f32);
                if fx * fx + fy * fy <= r * r {
                    self.plot(cx + fx, cy + fy, color);
                }
            }
        }
    }

    /// Liang-Barsky clip against the canvas rectangle
    fn clip(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Option<(f32, f32, f32, f32)> {
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            return None;
        }
        let (dx, dy) = (x1 - x0, y1 - y0);
        if !dx.is_finite() || !dy.is_finite() {
            return None;
        }
        let max_x = self.image.width() as f32;
        let max_y = self.image.height() as f32;
        let (mut t0, mut t1) = (0.0f32, 1.0f32);
        for (p, q) in [(-dx, x0), (dx, max_x - x0), (-dy, y0), (dy, max_y - y0)] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
            } else {
                let r = q / p;
                if p < 0.0 {
                    t0 = t0.max(r);
                } else {
                    t1 = t1.min(r);
                }
                if t0 > t1 {
                    return None;
                }
            }
        }
        Some((x0 + dx * t0, y0 + dy * t0, x0 + dx * t1, y0 + dy * t1))
    }

    fn plot(&mut self, x: f32, y: f32, color: Rgba<u8>) {
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x < self.image.width() && y < self.image.height() {
            self.image.put_pixel(x, y, color);
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ClientError> {
        self.image.save(path)?;
        Ok(())
    }
}
