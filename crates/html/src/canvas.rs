use crate::Node;
use crate::dom_utils::attr;
use image::{Rgba, RgbaImage, imageops};

const DEFAULT_WIDTH: u32 = 300;
const DEFAULT_HEIGHT: u32 = 150;

/// Bitmap size a `<canvas>` gets from its `width`/`height` attributes.
pub fn canvas_size(node: &Node) -> (u32, u32) {
    fn dim(node: &Node, name: &str, fallback: u32) -> u32 {
        attr(node, name)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(fallback)
    }
    (
        dim(node, "width", DEFAULT_WIDTH),
        dim(node, "height", DEFAULT_HEIGHT),
    )
}

/// A `CanvasRenderingContext2D` reduced to what printing needs.
pub struct Canvas2d<'a> {
    bitmap: &'a mut RgbaImage,
}

impl<'a> Canvas2d<'a> {
    pub(crate) fn new(bitmap: &'a mut RgbaImage) -> Self {
        Self { bitmap }
    }

    /// `drawImage(source, x, y)` with source-over compositing.
    pub fn draw_image(&mut self, source: &RgbaImage, x: i64, y: i64) {
        imageops::overlay(self.bitmap, source, x, y);
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: [u8; 4]) {
        let (w, h) = self.bitmap.dimensions();
        for py in y..y.saturating_add(height).min(h) {
            for px in x..x.saturating_add(width).min(w) {
                self.bitmap.put_pixel(px, py, Rgba(color));
            }
        }
    }

    pub fn bitmap(&self) -> &RgbaImage {
        self.bitmap
    }
}
