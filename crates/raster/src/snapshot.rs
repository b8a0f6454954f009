//! PNG snapshots of a [`RasterSurface`].
//!
//! Feature-gated behind `png` so consumers that only need the in-memory
//! surface do not pull in the `image` crate.

use std::path::Path;

use backdrop_core::{BackdropError, Srgb};

use crate::pixel::to_rgba8;
use crate::raster::RasterSurface;

/// Writes the surface composited over `background` as a PNG.
///
/// Returns `BackdropError::InvalidDimensions` for an unconfigured (empty)
/// surface, or `BackdropError::Io` on encode/write failure.
pub fn write_png(
    surface: &RasterSurface,
    background: Srgb,
    path: &Path,
) -> Result<(), BackdropError> {
    if surface.width() == 0 || surface.height() == 0 {
        return Err(BackdropError::InvalidDimensions);
    }
    let w = u32::try_from(surface.width()).map_err(|_| BackdropError::InvalidDimensions)?;
    let h = u32::try_from(surface.height()).map_err(|_| BackdropError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, to_rgba8(surface, background))
        .ok_or_else(|| BackdropError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| BackdropError::Io(e.to_string()))
}
