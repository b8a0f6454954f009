//! In-memory RGBA surface with source-over blending.

use backdrop_core::surface::{BackingStore, Surface, SurfaceSize};
use backdrop_core::Tint;

/// Premultiplied RGBA, components in [0, 1].
pub type Pixel = [f32; 4];

/// A backing store of premultiplied RGBA pixels.
///
/// Drawing coordinates are CSS pixels; they are multiplied by the scale
/// from the last [`configure`](Surface::configure) call. Circles get a one
/// pixel linear falloff at the rim so sub-pixel particles still register.
#[derive(Debug, Clone, Default)]
pub struct RasterSurface {
    width: usize,
    height: usize,
    scale: f64,
    pixels: Vec<Pixel>,
    fill: Pixel,
}

impl RasterSurface {
    /// An unconfigured surface; it draws nothing until configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backing-store width in device pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Backing-store height in device pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Pixel at device coordinates, or `None` outside the store.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Pixel> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    fn blend(&mut self, x: usize, y: usize, coverage: f32) {
        let src = self.fill;
        let dst = &mut self.pixels[y * self.width + x];
        let keep = 1.0 - src[3] * coverage;
        for (d, s) in dst.iter_mut().zip(src) {
            *d = s * coverage + *d * keep;
        }
    }
}

impl Surface for RasterSurface {
    fn configure(&mut self, store: &BackingStore) {
        self.width = store.pixel_width as usize;
        self.height = store.pixel_height as usize;
        self.scale = store.scale;
        self.pixels = vec![[0.0; 4]; self.width * self.height];
    }

    fn clear(&mut self, size: SurfaceSize) {
        let w = ((size.width * self.scale).ceil() as usize).min(self.width);
        let h = ((size.height * self.scale).ceil() as usize).min(self.height);
        for row in self.pixels.chunks_mut(self.width.max(1)).take(h) {
            row[..w].fill([0.0; 4]);
        }
    }

    fn set_fill(&mut self, tint: &Tint) {
        let a = tint.alpha.clamp(0.0, 1.0) as f32;
        let c = tint.color;
        self.fill = [c.r as f32 * a, c.g as f32 * a, c.b as f32 * a, a];
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64) {
        if self.width == 0 || self.height == 0 || radius <= 0.0 {
            return;
        }
        let cx = x * self.scale;
        let cy = y * self.scale;
        let r = radius * self.scale;
        let reach = r + 0.5;

        let x0 = (cx - reach).floor().max(0.0) as usize;
        let y0 = (cy - reach).floor().max(0.0) as usize;
        let x1 = (cx + reach).ceil();
        let y1 = (cy + reach).ceil();
        if x1 < 0.0 || y1 < 0.0 {
            return;
        }
        let x1 = (x1 as usize).min(self.width);
        let y1 = (y1 as usize).min(self.height);

        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                let coverage = (reach - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0) as f32;
                if coverage > 0.0 {
                    self.blend(px, py, coverage);
                }
            }
        }
    }
}
