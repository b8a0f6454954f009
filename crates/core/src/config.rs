//! Tunables for a particle field.
//!
//! [`FieldConfig`] deserializes from any subset of its keys; missing keys take
//! the defaults below. Call [`FieldConfig::validate`] (or use
//! [`FieldConfig::from_json_str`], which does) before building a field.

use serde::{Deserialize, Serialize};

use crate::color::{Srgb, Tint};
use crate::error::BackdropError;
use crate::prng::Xorshift64;
use crate::surface::SurfaceSize;
use crate::theme::Theme;

/// Default CSS pixels of surface area per particle.
const DEFAULT_PIXELS_PER_PARTICLE: f64 = 90_000.0;
/// Default minimum particle count.
const DEFAULT_FLOOR: usize = 24;
/// Default radius range in CSS pixels.
const DEFAULT_RADIUS: [f64; 2] = [0.6, 1.8];
/// Default per-axis speed bound in CSS pixels per frame.
const DEFAULT_SPEED: f64 = 0.15;
/// Default overshoot beyond each edge before a particle wraps.
const DEFAULT_WRAP_MARGIN: f64 = 10.0;
const DEFAULT_MAX_PIXEL_RATIO: f64 = 2.0;
/// Hard ceiling on particles per field, whatever the policy says.
pub const MAX_PARTICLES: usize = 2_000;
/// Smallest accepted area per particle.
pub const MIN_PIXELS_PER_PARTICLE: f64 = 100.0;
const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 150;

/// How many particles a surface gets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityPolicy {
    /// Always exactly this many.
    Fixed(usize),
    /// One particle per `pixels_per_particle` of CSS area, never fewer than `floor`.
    Area {
        pixels_per_particle: f64,
        floor: usize,
    },
}

impl Default for DensityPolicy {
    fn default() -> Self {
        DensityPolicy::Area {
            pixels_per_particle: DEFAULT_PIXELS_PER_PARTICLE,
            floor: DEFAULT_FLOOR,
        }
    }
}

impl DensityPolicy {
    /// Particle count for a surface of the given size, at most
    /// [`MAX_PARTICLES`].
    ///
    /// A zero-area surface (hidden element) gets the floor.
    pub fn count(&self, size: SurfaceSize) -> usize {
        let count = match *self {
            DensityPolicy::Fixed(n) => n,
            DensityPolicy::Area {
                pixels_per_particle,
                floor,
            } => {
                let proportional = (size.area() / pixels_per_particle).floor();
                if proportional.is_finite() && proportional > 0.0 {
                    (proportional as usize).max(floor)
                } else {
                    floor
                }
            }
        };
        count.min(MAX_PARTICLES)
    }
}

/// What happens when a particle crosses an edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Leave by `margin` pixels, re-enter `margin` pixels beyond the opposite edge.
    Wrap { margin: f64 },
    /// Bounce: clamp to the edge and point the velocity back inward.
    Reflect,
}

impl Default for EdgePolicy {
    fn default() -> Self {
        EdgePolicy::Wrap {
            margin: DEFAULT_WRAP_MARGIN,
        }
    }
}

impl EdgePolicy {
    /// How far outside `[0, extent]` a particle may legitimately sit.
    pub fn margin(&self) -> f64 {
        match *self {
            EdgePolicy::Wrap { margin } => margin,
            EdgePolicy::Reflect => 0.0,
        }
    }
}

/// Fill tints per theme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThemeTints {
    pub dark: Tint,
    pub light: Tint,
}

impl Default for ThemeTints {
    fn default() -> Self {
        Self {
            dark: Tint::new(Srgb::from_rgb8(125, 211, 252), 0.04),
            light: Tint::new(Srgb::from_rgb8(6, 10, 30), 0.06),
        }
    }
}

impl ThemeTints {
    pub fn for_theme(&self, theme: Theme) -> &Tint {
        match theme {
            Theme::Dark => &self.dark,
            Theme::Light => &self.light,
        }
    }
}

/// Complete configuration of a particle field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub density: DensityPolicy,
    /// `[min, max)` radius in CSS pixels.
    pub radius: [f64; 2],
    /// Velocity components are drawn from `[-speed, speed)`.
    pub speed: f64,
    pub edge: EdgePolicy,
    pub max_pixel_ratio: f64,
    pub resize_debounce_ms: u64,
    pub tints: ThemeTints,
    /// Fixed PRNG seed; `None` lets the host pick one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            density: DensityPolicy::default(),
            radius: DEFAULT_RADIUS,
            speed: DEFAULT_SPEED,
            edge: EdgePolicy::default(),
            max_pixel_ratio: DEFAULT_MAX_PIXEL_RATIO,
            resize_debounce_ms: DEFAULT_RESIZE_DEBOUNCE_MS,
            tints: ThemeTints::default(),
            seed: None,
        }
    }
}

impl FieldConfig {
    /// Parses a JSON document and validates it.
    pub fn from_json_str(json: &str) -> Result<Self, BackdropError> {
        let config: FieldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds from an already-parsed JSON value and validates it.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, BackdropError> {
        let config = FieldConfig::deserialize(value)?;
        config.validate()?;
        Ok(config)
    }

    /// PRNG for spawning: the configured seed, or `entropy` when unset.
    pub fn rng(&self, entropy: f64) -> Xorshift64 {
        match self.seed {
            Some(seed) => Xorshift64::new(seed),
            None => Xorshift64::from_entropy(entropy),
        }
    }

    /// Checks ranges and returns the first problem found.
    pub fn validate(&self) -> Result<(), BackdropError> {
        let invalid = |msg: String| Err(BackdropError::InvalidConfig(msg));

        match self.density {
            DensityPolicy::Fixed(n) if n == 0 || n > MAX_PARTICLES => {
                return invalid(format!(
                    "fixed particle count must be in 1..={MAX_PARTICLES}, got {n}"
                ))
            }
            DensityPolicy::Area {
                pixels_per_particle,
                floor,
            } => {
                if !(pixels_per_particle.is_finite()
                    && pixels_per_particle >= MIN_PIXELS_PER_PARTICLE)
                {
                    return invalid(format!(
                        "pixels_per_particle must be >= {}, got {}",
                        MIN_PIXELS_PER_PARTICLE, pixels_per_particle
                    ));
                }
                if floor == 0 || floor > MAX_PARTICLES {
                    return invalid(format!(
                        "density floor must be in 1..={MAX_PARTICLES}, got {floor}"
                    ));
                }
            }
            DensityPolicy::Fixed(_) => {}
        }

        let [rmin, rmax] = self.radius;
        if !(rmin.is_finite() && rmax.is_finite()) || rmin < 0.0 || rmin > rmax {
            return invalid(format!("radius range [{rmin}, {rmax}] is not valid"));
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            return invalid(format!("speed must be finite and >= 0, got {}", self.speed));
        }
        if let EdgePolicy::Wrap { margin } = self.edge {
            if !margin.is_finite() || margin < 0.0 {
                return invalid(format!("wrap margin must be finite and >= 0, got {margin}"));
            }
        }
        if !self.max_pixel_ratio.is_finite() || self.max_pixel_ratio < 1.0 {
            return invalid(format!(
                "max_pixel_ratio must be >= 1, got {}",
                self.max_pixel_ratio
            ));
        }
        for (name, tint) in [("dark", &self.tints.dark), ("light", &self.tints.light)] {
            if !(0.0..=1.0).contains(&tint.alpha) {
                return invalid(format!("{name} tint alpha {} outside [0, 1]", tint.alpha));
            }
        }
        Ok(())
    }
}
