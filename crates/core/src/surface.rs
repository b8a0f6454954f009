//! The drawing-surface contract the particle field renders through.
//!
//! A host (a browser canvas, the software rasterizer, a test recorder)
//! implements [`Surface`]. All coordinates handed to a surface are in CSS
//! pixels; the surface maps them to backing-store pixels using the scale
//! carried by [`BackingStore`].

use crate::color::Tint;

/// Visible size of a drawing surface in CSS pixels.
///
/// Negative, NaN and infinite inputs collapse to zero, so a hidden or
/// not-yet-laid-out element yields a zero-area surface rather than garbage.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        let sanitize = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self {
            width: sanitize(width),
            height: sanitize(height),
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

/// Clamps a reported device pixel ratio to `(0, cap]`.
///
/// Hosts that report nothing usable (zero, negative, NaN) are treated as
/// ratio 1.
pub fn clamp_pixel_ratio(raw: f64, cap: f64) -> f64 {
    let ratio = if raw.is_finite() && raw > 0.0 { raw } else { 1.0 };
    ratio.min(cap.max(1.0))
}

/// Backing-store geometry derived from a CSS size and a pixel ratio.
///
/// Computed purely from its inputs, so configuring a surface twice with the
/// same size and ratio produces the same result as configuring it once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackingStore {
    /// Size the element is pinned to in CSS pixels.
    pub css: SurfaceSize,
    /// Backing-store width in device pixels.
    pub pixel_width: u32,
    /// Backing-store height in device pixels.
    pub pixel_height: u32,
    /// Uniform scale from CSS to device pixels.
    pub scale: f64,
}

impl BackingStore {
    pub fn compute(css: SurfaceSize, ratio: f64) -> Self {
        Self {
            css,
            pixel_width: (css.width * ratio).floor() as u32,
            pixel_height: (css.height * ratio).floor() as u32,
            scale: ratio,
        }
    }
}

/// A 2-D drawing target.
///
/// Implementations must set the CSS-to-device transform absolutely in
/// [`configure`](Surface::configure); repeated calls never compound.
pub trait Surface {
    /// Resizes the backing store, pins the CSS size, and sets the transform.
    fn configure(&mut self, store: &BackingStore);

    /// Clears the rectangle `(0, 0, size.width, size.height)`.
    fn clear(&mut self, size: SurfaceSize);

    /// Sets the fill used by subsequent [`fill_circle`](Surface::fill_circle) calls.
    fn set_fill(&mut self, tint: &Tint);

    /// Fills a full circle centered at `(x, y)`.
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64);
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn configure(&mut self, store: &BackingStore) {
        (**self).configure(store);
    }

    fn clear(&mut self, size: SurfaceSize) {
        (**self).clear(size);
    }

    fn set_fill(&mut self, tint: &Tint) {
        (**self).set_fill(tint);
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64) {
        (**self).fill_circle(x, y, radius);
    }
}

/// One call made against a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Configure(BackingStore),
    Clear(SurfaceSize),
    SetFill(Tint),
    FillCircle { x: f64, y: f64, radius: f64 },
}

/// Surface that records every call instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// Drains the recorded calls.
    pub fn take(&mut self) -> Vec<SurfaceCall> {
        std::mem::take(&mut self.calls)
    }

    /// The most recent backing store passed to `configure`, if any.
    pub fn last_store(&self) -> Option<BackingStore> {
        self.calls.iter().rev().find_map(|c| match c {
            SurfaceCall::Configure(store) => Some(*store),
            _ => None,
        })
    }

    /// Number of circles filled so far.
    pub fn circle_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SurfaceCall::FillCircle { .. }))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn configure(&mut self, store: &BackingStore) {
        self.calls.push(SurfaceCall::Configure(*store));
    }

    fn clear(&mut self, size: SurfaceSize) {
        self.calls.push(SurfaceCall::Clear(size));
    }

    fn set_fill(&mut self, tint: &Tint) {
        self.calls.push(SurfaceCall::SetFill(*tint));
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.calls.push(SurfaceCall::FillCircle { x, y, radius });
    }
}
