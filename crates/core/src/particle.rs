//! A single drifting point and its motion rule.

use glam::DVec2;

use crate::config::{EdgePolicy, FieldConfig};
use crate::prng::Xorshift64;
use crate::surface::SurfaceSize;

/// A point with constant velocity, drawn as a filled circle.
///
/// Position and velocity are in CSS pixels and CSS pixels per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: DVec2,
    pub velocity: DVec2,
    pub radius: f64,
}

impl Particle {
    /// Draws a particle uniformly inside `size` with radius and velocity
    /// taken from `config`.
    pub fn spawn(rng: &mut Xorshift64, size: SurfaceSize, config: &FieldConfig) -> Self {
        let position = DVec2::new(
            rng.next_range(0.0, size.width),
            rng.next_range(0.0, size.height),
        );
        let [rmin, rmax] = config.radius;
        let radius = rng.next_range(rmin, rmax);
        let velocity = DVec2::new(
            rng.next_symmetric(config.speed),
            rng.next_symmetric(config.speed),
        );
        Self {
            position,
            velocity,
            radius,
        }
    }

    /// Moves one frame and applies the edge policy.
    pub fn advance(&mut self, size: SurfaceSize, edge: EdgePolicy) {
        self.position += self.velocity;
        match edge {
            EdgePolicy::Wrap { margin } => {
                self.position.x = wrap_axis(self.position.x, size.width, margin);
                self.position.y = wrap_axis(self.position.y, size.height, margin);
            }
            EdgePolicy::Reflect => {
                (self.position.x, self.velocity.x) =
                    reflect_axis(self.position.x, self.velocity.x, size.width);
                (self.position.y, self.velocity.y) =
                    reflect_axis(self.position.y, self.velocity.y, size.height);
            }
        }
    }

    /// Whether the particle sits inside `[-margin, extent + margin]` on both axes.
    pub fn within(&self, size: SurfaceSize, margin: f64) -> bool {
        let inside = |v: f64, extent: f64| v >= -margin && v <= extent + margin;
        inside(self.position.x, size.width) && inside(self.position.y, size.height)
    }
}

/// Past `-margin` re-enter at `extent + margin`, past `extent + margin`
/// re-enter at `-margin`.
///
/// A shrink can leave a particle far beyond the new extent; it is brought
/// back on the very next frame.
fn wrap_axis(v: f64, extent: f64, margin: f64) -> f64 {
    if v < -margin {
        extent + margin
    } else if v > extent + margin {
        -margin
    } else {
        v
    }
}

/// Clamps into `[0, extent]` and points the velocity inward on contact.
fn reflect_axis(v: f64, velocity: f64, extent: f64) -> (f64, f64) {
    if v < 0.0 {
        (0.0, velocity.abs())
    } else if v > extent {
        (extent, -velocity.abs())
    } else {
        (v, velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(x: f64, y: f64, vx: f64, vy: f64) -> Particle {
        Particle {
            position: DVec2::new(x, y),
            velocity: DVec2::new(vx, vy),
            radius: 1.0,
        }
    }

    const SIZE: SurfaceSize = SurfaceSize {
        width: 800.0,
        height: 600.0,
    };
    const WRAP: EdgePolicy = EdgePolicy::Wrap { margin: 10.0 };

    #[test]
    fn advance_moves_by_velocity() {
        let mut p = particle(100.0, 100.0, 0.1, -0.2);
        p.advance(SIZE, WRAP);
        assert!((p.position.x - 100.1).abs() < 1e-12);
        assert!((p.position.y - 99.8).abs() < 1e-12);
    }

    #[test]
    fn wrap_leaves_left_and_enters_right() {
        let mut p = particle(-9.95, 300.0, -0.1, 0.0);
        p.advance(SIZE, WRAP);
        assert_eq!(p.position.x, 810.0);
    }

    #[test]
    fn wrap_leaves_bottom_and_enters_top() {
        let mut p = particle(400.0, 609.95, 0.0, 0.1);
        p.advance(SIZE, WRAP);
        assert_eq!(p.position.y, -10.0);
    }

    #[test]
    fn wrap_brings_back_particle_stranded_by_shrink() {
        let small = SurfaceSize::new(300.0, 200.0);
        let mut p = particle(700.0, 500.0, 0.1, 0.1);
        p.advance(small, WRAP);
        assert!(p.within(small, 10.0), "{p:?}");
    }

    #[test]
    fn reflect_flips_velocity_inward() {
        let mut p = particle(799.95, 0.3, 0.1, -0.2);
        p.advance(SIZE, EdgePolicy::Reflect);
        assert_eq!(p.position.x, 800.0);
        assert!(p.velocity.x < 0.0);

        p.advance(SIZE, EdgePolicy::Reflect);
        p.advance(SIZE, EdgePolicy::Reflect);
        assert!(p.velocity.y > 0.0);
        assert!(p.within(SIZE, 0.0));
    }

    #[test]
    fn reflect_clamps_particle_stranded_by_shrink() {
        let small = SurfaceSize::new(300.0, 200.0);
        let mut p = particle(700.0, 500.0, 0.1, 0.1);
        p.advance(small, EdgePolicy::Reflect);
        assert!(p.within(small, 0.0));
        assert!(p.velocity.x < 0.0 && p.velocity.y < 0.0);
    }

    #[test]
    fn spawn_respects_config_ranges() {
        let config = FieldConfig::default();
        let mut rng = Xorshift64::new(3);
        for _ in 0..1000 {
            let p = Particle::spawn(&mut rng, SIZE, &config);
            assert!((0.0..800.0).contains(&p.position.x));
            assert!((0.0..600.0).contains(&p.position.y));
            assert!((0.6..1.8).contains(&p.radius));
            assert!(p.velocity.x.abs() <= 0.15 && p.velocity.y.abs() <= 0.15);
        }
    }

    #[test]
    fn spawn_on_zero_size_surface_sits_at_origin() {
        let mut rng = Xorshift64::new(3);
        let p = Particle::spawn(&mut rng, SurfaceSize::default(), &FieldConfig::default());
        assert_eq!(p.position, DVec2::ZERO);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn extent() -> impl Strategy<Value = f64> {
            1.0_f64..2000.0
        }

        proptest! {
            #[test]
            fn wrap_keeps_particle_within_margin(
                w in extent(),
                h in extent(),
                x in -5000.0_f64..5000.0,
                y in -5000.0_f64..5000.0,
                vx in -0.5_f64..0.5,
                vy in -0.5_f64..0.5,
                margin in 0.0_f64..20.0,
            ) {
                let size = SurfaceSize::new(w, h);
                let mut p = particle(x, y, vx, vy);
                p.advance(size, EdgePolicy::Wrap { margin });
                prop_assert!(p.within(size, margin), "{p:?} escaped {size:?}");
            }

            #[test]
            fn reflect_keeps_particle_on_surface(
                w in extent(),
                h in extent(),
                x in -5000.0_f64..5000.0,
                y in -5000.0_f64..5000.0,
                vx in -0.5_f64..0.5,
                vy in -0.5_f64..0.5,
            ) {
                let size = SurfaceSize::new(w, h);
                let mut p = particle(x, y, vx, vy);
                p.advance(size, EdgePolicy::Reflect);
                prop_assert!(p.within(size, 0.0), "{p:?} escaped {size:?}");
            }
        }
    }
}
