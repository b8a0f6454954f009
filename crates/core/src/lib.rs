#![deny(unsafe_code)]
//! Core types for the backdrop particle field.
//!
//! A [`ParticleField`] owns a fixed set of drifting [`Particle`]s and draws
//! them through the host-provided [`Surface`] trait, tinted by the active
//! [`Theme`]. [`FrameLoop`] drives a field once per display frame with
//! debounced resizes and an explicit [`StopHandle`]. The [`page`] module
//! holds the platform-free logic of the surrounding page behaviour.

pub mod animation;
pub mod color;
pub mod config;
pub mod error;
pub mod field;
pub mod page;
pub mod particle;
pub mod prng;
pub mod surface;
pub mod theme;
pub mod timing;

pub use animation::{bootstrap, run_frames, FrameLoop, LoopControl, StopHandle};
pub use color::{Srgb, Tint};
pub use config::{DensityPolicy, EdgePolicy, FieldConfig, ThemeTints};
pub use error::BackdropError;
pub use field::ParticleField;
pub use particle::Particle;
pub use prng::Xorshift64;
pub use surface::{BackingStore, RecordingSurface, Surface, SurfaceCall, SurfaceSize};
pub use theme::{Theme, ThemeController, ThemeSource, ThemeStore};

/// Element id of the canvas the field draws on.
pub const CANVAS_ELEMENT_ID: &str = "particle-canvas";
