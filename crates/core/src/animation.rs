//! Frame-driven loop around a [`ParticleField`].
//!
//! The host calls [`FrameLoop::tick`] once per display refresh. Resize
//! notifications go through [`FrameLoop::request_resize`], which only queues
//! the new geometry; the queued resize is applied at the start of a later
//! tick. All dimension changes therefore happen on the same context that
//! draws, and a drag-resize storm collapses into a single recompute.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::FieldConfig;
use crate::field::ParticleField;
use crate::surface::{Surface, SurfaceSize};
use crate::theme::ThemeSource;
use crate::timing::Debouncer;

/// Cloneable stop signal shared between the loop and whoever owns the page.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What the scheduler should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    /// Request another frame.
    Continue,
    /// Do not reschedule.
    Stop,
}

/// A field, the surface it draws on, and the theme it reads.
pub struct FrameLoop<S, T> {
    field: ParticleField,
    surface: S,
    theme: T,
    resize: Debouncer<(SurfaceSize, f64)>,
    stop: StopHandle,
    frames: u64,
}

impl<S: Surface, T: ThemeSource> FrameLoop<S, T> {
    /// Binds `field` to `surface` and pushes the initial backing store.
    pub fn new(field: ParticleField, mut surface: S, theme: T) -> Self {
        field.configure(&mut surface);
        let debounce_ms = field.config().resize_debounce_ms as f64;
        Self {
            field,
            surface,
            theme,
            resize: Debouncer::new(debounce_ms),
            stop: StopHandle::new(),
            frames: 0,
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Queues a resize; it takes effect once notifications go quiet.
    pub fn request_resize(&mut self, size: SurfaceSize, pixel_ratio: f64, now_ms: f64) {
        self.resize.push((size, pixel_ratio), now_ms);
    }

    /// Runs one frame unless stopped.
    pub fn tick(&mut self, now_ms: f64) -> LoopControl {
        if self.stop.is_stopped() {
            return LoopControl::Stop;
        }
        if let Some((size, ratio)) = self.resize.poll(now_ms) {
            if self.field.resize(size, ratio) {
                self.field.configure(&mut self.surface);
                trace!(frame = self.frames, "debounced resize applied");
            }
        }
        let theme = self.theme.theme();
        self.field.frame(&mut self.surface, theme);
        self.frames += 1;
        LoopControl::Continue
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Drives `frame_loop` for up to `frames` ticks on a synthetic clock.
///
/// `on_frame` sees the loop after every drawn frame. Returns the number of
/// frames actually drawn, which is lower than `frames` if the loop was
/// stopped.
pub fn run_frames<S, T, F>(
    frame_loop: &mut FrameLoop<S, T>,
    frames: usize,
    start_ms: f64,
    frame_ms: f64,
    mut on_frame: F,
) -> usize
where
    S: Surface,
    T: ThemeSource,
    F: FnMut(usize, &mut FrameLoop<S, T>),
{
    let mut drawn = 0;
    for i in 0..frames {
        let now = start_ms + i as f64 * frame_ms;
        if frame_loop.tick(now) == LoopControl::Stop {
            break;
        }
        drawn += 1;
        on_frame(i, frame_loop);
    }
    drawn
}

/// Seeds a field for `surface` and binds the two into a loop.
///
/// `surface` is `None` when the host page has nothing to draw on; that is not
/// an error, and nothing is measured, seeded or configured. `measure` reads
/// the surface's CSS size; `entropy` seeds the PRNG when the config has no
/// seed.
pub fn bootstrap<S, T, M>(
    surface: Option<S>,
    measure: M,
    pixel_ratio: f64,
    config: FieldConfig,
    entropy: f64,
    theme: T,
) -> Option<FrameLoop<S, T>>
where
    S: Surface,
    T: ThemeSource,
    M: FnOnce(&S) -> SurfaceSize,
{
    let Some(surface) = surface else {
        debug!("no drawing surface, particle field disabled");
        return None;
    };
    let size = measure(&surface);
    let mut rng = config.rng(entropy);
    let field = ParticleField::new(size, pixel_ratio, config, &mut rng);
    Some(FrameLoop::new(field, surface, theme))
}
