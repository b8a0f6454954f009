//! Conversion of a [`RasterSurface`] into an opaque RGBA8 buffer.

use backdrop_core::Srgb;

use crate::raster::RasterSurface;

/// Composites the surface over `background` and returns `width * height * 4`
/// bytes of RGBA with alpha fixed at 255.
pub fn to_rgba8(surface: &RasterSurface, background: Srgb) -> Vec<u8> {
    let bg = [background.r as f32, background.g as f32, background.b as f32];
    surface
        .pixels()
        .iter()
        .flat_map(|p| {
            let keep = 1.0 - p[3];
            let channel = |i: usize| ((p[i] + bg[i] * keep).clamp(0.0, 1.0) * 255.0).round() as u8;
            [channel(0), channel(1), channel(2), 255u8]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use backdrop_core::surface::{BackingStore, Surface, SurfaceSize};
    use backdrop_core::Tint;

    fn surface(w: f64, h: f64) -> RasterSurface {
        let mut s = RasterSurface::new();
        s.configure(&BackingStore::compute(SurfaceSize::new(w, h), 1.0));
        s
    }

    #[test]
    fn buffer_has_four_bytes_per_pixel() {
        let s = surface(8.0, 4.0);
        assert_eq!(to_rgba8(&s, Srgb::from_rgb8(0, 0, 0)).len(), 8 * 4 * 4);
    }

    #[test]
    fn empty_surface_shows_background() {
        let s = surface(2.0, 2.0);
        let buf = to_rgba8(&s, Srgb::from_rgb8(11, 16, 32));
        assert_eq!(&buf[..4], &[11, 16, 32, 255]);
    }

    #[test]
    fn half_alpha_white_over_black_is_mid_gray() {
        let mut s = surface(10.0, 10.0);
        s.set_fill(&Tint::new(Srgb::from_rgb8(255, 255, 255), 0.5));
        s.fill_circle(5.0, 5.0, 3.0);
        let buf = to_rgba8(&s, Srgb::from_rgb8(0, 0, 0));
        let i = (5 * 10 + 5) * 4;
        assert!((127..=128).contains(&buf[i]), "got {}", buf[i]);
        assert_eq!(buf[i + 3], 255);
    }
}
