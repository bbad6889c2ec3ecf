//! Print surface raster
//!
//! The offscreen RGBA8 canvas the artwork is painted into. It is independent
//! of the window and of the GPU: the renderer uploads it into the print
//! texture whenever the dirty flag is set.

use image::{Rgba, RgbaImage};

/// Fixed-size offscreen canvas for the print band.
pub struct PrintSurfaceRaster {
    /// Straight-alpha RGBA8 pixels, row-major, top row first
    pixels: RgbaImage,
    /// Set after a repaint, cleared by the consumer
    dirty: bool,
    /// Bumped on every repaint
    generation: u64,
}

impl PrintSurfaceRaster {
    /// Create a transparent raster. Dimensions are clamped to at least 1.
    ///
    /// A new raster starts dirty so the first frame uploads it.
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        Self {
            pixels: RgbaImage::new(width, height),
            dirty: true,
            generation: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width() as f32 / self.height() as f32
    }

    /// Reset every pixel to fully transparent
    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        self.pixels.put_pixel(x, y, Rgba(rgba));
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    /// Signal that the pixels changed and must be re-uploaded
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.generation += 1;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Consume the dirty flag, returning whether it was set
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Raw RGBA8 bytes for texture upload
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl std::fmt::Debug for PrintSurfaceRaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrintSurfaceRaster")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("dirty", &self.dirty)
            .field("generation", &self.generation)
            .finish()
    }
}
