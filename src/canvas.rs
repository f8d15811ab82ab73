use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageEncoder, Rgba, RgbaImage, imageops};

use crate::components::history::Snapshot;
use crate::error::EditorError;

/// Viewport bounds: ingested images are scaled to fit inside this box,
/// preserving aspect ratio. Also the placeholder size of an empty surface.
pub const MAX_CANVAS_WIDTH: u32 = 800;
pub const MAX_CANVAS_HEIGHT: u32 = 600;

// ============================================================================
// CANVAS SURFACE — the 2D drawing surface the session renders into
// ============================================================================

/// In-memory RGBA drawing surface. Exposes get-current-pixels,
/// draw-image, clear, and resize; snapshot encode/restore round-trips
/// through PNG so history entries are compact and lossless.
pub struct CanvasSurface {
    pixels: RgbaImage,
}

impl Default for CanvasSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasSurface {
    /// Empty (transparent) surface at the placeholder size.
    pub fn new() -> Self {
        Self {
            pixels: RgbaImage::from_pixel(MAX_CANVAS_WIDTH, MAX_CANVAS_HEIGHT, Rgba([0, 0, 0, 0])),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Raw fixed-stride RGBA byte buffer, length `4 * width * height`.
    pub fn image_data(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Replace the surface contents with a same-sized RGBA buffer.
    pub fn put_image_data(&mut self, data: &[u8]) -> Result<(), EditorError> {
        let expected = (self.width() * self.height() * 4) as usize;
        if data.len() != expected {
            return Err(EditorError::BufferSize {
                expected,
                got: data.len(),
            });
        }
        self.pixels = RgbaImage::from_raw(self.width(), self.height(), data.to_vec())
            .ok_or(EditorError::BufferSize {
                expected,
                got: data.len(),
            })?;
        Ok(())
    }

    /// Scale `img` to fit the viewport bounds (aspect ratio preserved, both
    /// dimensions bounded) and return the surface-sized result without
    /// touching the current surface. Ingestion commits it via [`Self::set`].
    pub fn scale_to_fit(img: &DynamicImage) -> RgbaImage {
        let src = img.to_rgba8();
        let (w, h) = (src.width().max(1), src.height().max(1));
        let scale = (MAX_CANVAS_WIDTH as f32 / w as f32).min(MAX_CANVAS_HEIGHT as f32 / h as f32);
        let new_w = ((w as f32 * scale) as u32).max(1);
        let new_h = ((h as f32 * scale) as u32).max(1);
        if (new_w, new_h) == (w, h) {
            src
        } else {
            imageops::resize(&src, new_w, new_h, imageops::FilterType::Triangle)
        }
    }

    /// Resize the surface to the bitmap's dimensions and draw it.
    pub fn set(&mut self, bitmap: RgbaImage) {
        self.pixels = bitmap;
    }

    /// Clear the surface and reset it to the placeholder size.
    pub fn clear_to_placeholder(&mut self) {
        self.pixels =
            RgbaImage::from_pixel(MAX_CANVAS_WIDTH, MAX_CANVAS_HEIGHT, Rgba([0, 0, 0, 0]));
    }

    /// Encode the current surface into an immutable snapshot.
    pub fn snapshot(&self) -> Result<Snapshot, EditorError> {
        let content = encode_png(&self.pixels)?;
        Ok(Snapshot::new(content, self.width(), self.height()))
    }

    /// Re-render a snapshot onto the surface, adopting its dimensions.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), EditorError> {
        let img = image::load_from_memory(&snapshot.content)
            .map_err(|e| EditorError::DecodeFailed(e.to_string()))?;
        self.pixels = img.to_rgba8();
        Ok(())
    }
}

/// PNG-encode an RGBA bitmap (lossless, byte-exact round trip).
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, EditorError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), img.width(), img.height(), image::ColorType::Rgba8)
        .map_err(|e| EditorError::EncodeFailed(e.to_string()))?;
    Ok(buf)
}
