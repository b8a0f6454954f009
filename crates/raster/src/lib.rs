#![deny(unsafe_code)]
//! Software drawing surface for the backdrop particle field.
//!
//! [`RasterSurface`] implements [`backdrop_core::Surface`] on an in-memory
//! RGBA buffer so the field can be rendered without a browser: for CLI
//! snapshots and for pixel-level tests. PNG output lives behind the `png`
//! feature (default on).

pub mod pixel;
pub mod raster;

#[cfg(feature = "png")]
pub mod snapshot;

use backdrop_core::{Srgb, Theme};

pub use raster::RasterSurface;

/// Page background the particle layer is composited over in snapshots.
pub fn page_background(theme: Theme) -> Srgb {
    match theme {
        Theme::Dark => Srgb::from_rgb8(0x0b, 0x10, 0x20),
        Theme::Light => Srgb::from_rgb8(0xf5, 0xf7, 0xfb),
    }
}
