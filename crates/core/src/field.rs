//! The particle field: a fixed set of drifting particles bound to one surface.
//!
//! The particle count is decided once, from the surface size at creation.
//! Later resizes change the bounds and the backing store but never the
//! count, so repeated resizes cannot accumulate particles. Particles left
//! outside a shrunken surface are pulled back in by the edge policy on their
//! next update.

use tracing::debug;

use crate::config::FieldConfig;
use crate::particle::Particle;
use crate::prng::Xorshift64;
use crate::surface::{clamp_pixel_ratio, BackingStore, Surface, SurfaceSize};
use crate::theme::Theme;

/// Owns particle state and the geometry of the surface it draws on.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    store: BackingStore,
    config: FieldConfig,
}

impl ParticleField {
    /// Seeds a field for a surface of `size` CSS pixels.
    ///
    /// `pixel_ratio` is the raw device pixel ratio reported by the host; it is
    /// clamped to the configured cap. The config is assumed validated.
    pub fn new(
        size: SurfaceSize,
        pixel_ratio: f64,
        config: FieldConfig,
        rng: &mut Xorshift64,
    ) -> Self {
        let ratio = clamp_pixel_ratio(pixel_ratio, config.max_pixel_ratio);
        let store = BackingStore::compute(size, ratio);
        let count = config.density.count(size);
        let particles = (0..count)
            .map(|_| Particle::spawn(rng, size, &config))
            .collect();
        debug!(
            count,
            width = size.width,
            height = size.height,
            scale = ratio,
            "particle field created"
        );
        Self {
            particles,
            store,
            config,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Current visible size in CSS pixels.
    pub fn size(&self) -> SurfaceSize {
        self.store.css
    }

    pub fn backing_store(&self) -> &BackingStore {
        &self.store
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Pushes the current backing-store geometry to `surface`.
    pub fn configure<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.configure(&self.store);
    }

    /// Adopts a new surface size and pixel ratio.
    ///
    /// Returns `true` when the backing store actually changed; a repeated
    /// call with the same inputs is a no-op.
    pub fn resize(&mut self, size: SurfaceSize, pixel_ratio: f64) -> bool {
        let ratio = clamp_pixel_ratio(pixel_ratio, self.config.max_pixel_ratio);
        let store = BackingStore::compute(size, ratio);
        if store == self.store {
            return false;
        }
        debug!(
            width = size.width,
            height = size.height,
            scale = ratio,
            "particle field resized"
        );
        self.store = store;
        true
    }

    /// Advances every particle by one frame without drawing.
    pub fn step(&mut self) {
        let size = self.store.css;
        let edge = self.config.edge;
        for p in &mut self.particles {
            p.advance(size, edge);
        }
    }

    /// Draws the current state without advancing it.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S, theme: Theme) {
        surface.clear(self.store.css);
        surface.set_fill(self.config.tints.for_theme(theme));
        for p in &self.particles {
            surface.fill_circle(p.position.x, p.position.y, p.radius);
        }
    }

    /// One display frame: move every particle, then clear and draw with the
    /// theme tint.
    pub fn frame<S: Surface + ?Sized>(&mut self, surface: &mut S, theme: Theme) {
        self.step();
        self.render(surface, theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DensityPolicy, EdgePolicy};
    use crate::surface::{RecordingSurface, SurfaceCall};

    fn config_with_count_40() -> FieldConfig {
        FieldConfig {
            density: DensityPolicy::Area {
                pixels_per_particle: 12_000.0,
                floor: 24,
            },
            seed: Some(7),
            ..FieldConfig::default()
        }
    }

    fn field(size: SurfaceSize, config: FieldConfig) -> ParticleField {
        let mut rng = config.rng(0.0);
        ParticleField::new(size, 1.0, config, &mut rng)
    }

    #[test]
    fn creates_density_adapted_count_inside_surface() {
        let size = SurfaceSize::new(800.0, 600.0);
        let f = field(size, config_with_count_40());
        assert_eq!(f.len(), 40);
        for p in f.particles() {
            assert!((0.0..800.0).contains(&p.position.x));
            assert!((0.0..600.0).contains(&p.position.y));
        }
    }

    #[test]
    fn zero_size_surface_still_gets_floor() {
        let f = field(SurfaceSize::default(), FieldConfig::default());
        assert_eq!(f.len(), 24);
    }

    #[test]
    fn pixel_ratio_is_clamped_into_backing_store() {
        let config = FieldConfig::default();
        let mut rng = Xorshift64::new(1);
        let f = ParticleField::new(SurfaceSize::new(100.0, 50.0), 3.0, config, &mut rng);
        assert_eq!(f.backing_store().scale, 2.0);
        assert_eq!(f.backing_store().pixel_width, 200);
        assert_eq!(f.backing_store().pixel_height, 100);
    }

    #[test]
    fn thousand_frames_stay_inside_margin() {
        let size = SurfaceSize::new(800.0, 600.0);
        let mut f = field(size, config_with_count_40());
        let mut surface = RecordingSurface::new();
        for _ in 0..1000 {
            f.frame(&mut surface, Theme::Dark);
            for p in f.particles() {
                assert!(
                    (-10.0..=810.0).contains(&p.position.x)
                        && (-10.0..=610.0).contains(&p.position.y),
                    "particle escaped: {p:?}"
                );
            }
            surface.take();
        }
    }

    #[test]
    fn shrink_mid_run_reenters_new_bounds() {
        let mut f = field(SurfaceSize::new(800.0, 600.0), config_with_count_40());
        let mut surface = RecordingSurface::new();
        for _ in 0..50 {
            f.frame(&mut surface, Theme::Dark);
        }
        let small = SurfaceSize::new(300.0, 200.0);
        assert!(f.resize(small, 1.0));
        f.frame(&mut surface, Theme::Dark);
        assert!(f.particles().iter().all(|p| p.within(small, 10.0)));
        assert_eq!(f.len(), 40);
    }

    #[test]
    fn shrink_under_reflect_clamps_immediately() {
        let config = FieldConfig {
            edge: EdgePolicy::Reflect,
            ..config_with_count_40()
        };
        let mut f = field(SurfaceSize::new(800.0, 600.0), config);
        let small = SurfaceSize::new(300.0, 200.0);
        f.resize(small, 1.0);
        f.step();
        assert!(f.particles().iter().all(|p| p.within(small, 0.0)));
    }

    #[test]
    fn resize_is_idempotent() {
        let mut f = field(SurfaceSize::new(800.0, 600.0), FieldConfig::default());
        let size = SurfaceSize::new(1024.0, 768.0);
        assert!(f.resize(size, 1.5));
        let first = *f.backing_store();
        assert!(!f.resize(size, 1.5));
        assert_eq!(*f.backing_store(), first);
    }

    #[test]
    fn repeated_resizes_do_not_change_count() {
        let mut f = field(SurfaceSize::new(800.0, 600.0), config_with_count_40());
        for i in 0..20 {
            let grow = 800.0 + 100.0 * i as f64;
            f.resize(SurfaceSize::new(grow, grow), 1.0);
        }
        assert_eq!(f.len(), 40);
    }

    #[test]
    fn frame_issues_clear_fill_then_one_circle_per_particle() {
        let mut f = field(SurfaceSize::new(800.0, 600.0), config_with_count_40());
        let mut surface = RecordingSurface::new();
        f.frame(&mut surface, Theme::Light);
        let calls = surface.calls();
        assert_eq!(calls[0], SurfaceCall::Clear(SurfaceSize::new(800.0, 600.0)));
        assert_eq!(calls[1], SurfaceCall::SetFill(f.config().tints.light));
        assert_eq!(surface.circle_count(), 40);
        assert_eq!(calls.len(), 42);
    }

    #[test]
    fn theme_changes_only_fill_color() {
        let config = config_with_count_40();
        let mut light = field(SurfaceSize::new(800.0, 600.0), config.clone());
        let mut dark = field(SurfaceSize::new(800.0, 600.0), config);
        let mut ls = RecordingSurface::new();
        let mut ds = RecordingSurface::new();
        for i in 0..30 {
            let theme = if i % 2 == 0 { Theme::Light } else { Theme::Dark };
            light.frame(&mut ls, theme);
            dark.frame(&mut ds, Theme::Dark);
        }
        assert_eq!(light.particles(), dark.particles());
        let fills = |s: &RecordingSurface| {
            s.calls()
                .iter()
                .filter(|c| matches!(c, SurfaceCall::SetFill(_)))
                .count()
        };
        assert_eq!(fills(&ls), 30);
        assert_ne!(ls.calls(), ds.calls());
    }

    #[test]
    fn render_does_not_move_particles() {
        let f = field(SurfaceSize::new(400.0, 300.0), FieldConfig::default());
        let before = f.particles().to_vec();
        let mut surface = RecordingSurface::new();
        f.render(&mut surface, Theme::Dark);
        assert_eq!(f.particles(), before.as_slice());
        assert_eq!(surface.circle_count(), before.len());
    }

    #[test]
    fn configure_pushes_backing_store() {
        let f = field(SurfaceSize::new(640.0, 480.0), FieldConfig::default());
        let mut surface = RecordingSurface::new();
        f.configure(&mut surface);
        assert_eq!(surface.last_store(), Some(*f.backing_store()));
    }

    #[test]
    fn same_seed_same_field() {
        let a = field(SurfaceSize::new(800.0, 600.0), config_with_count_40());
        let b = field(SurfaceSize::new(800.0, 600.0), config_with_count_40());
        assert_eq!(a.particles(), b.particles());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn count_is_exact_for_fixed_policy(n in 1_usize..300, seed: u64) {
                let config = FieldConfig {
                    density: DensityPolicy::Fixed(n),
                    seed: Some(seed),
                    ..FieldConfig::default()
                };
                let f = field(SurfaceSize::new(640.0, 480.0), config);
                prop_assert_eq!(f.len(), n);
            }

            #[test]
            fn particles_never_escape(
                w in 50.0_f64..1500.0,
                h in 50.0_f64..1500.0,
                seed: u64,
                reflect: bool,
            ) {
                let edge = if reflect { EdgePolicy::Reflect } else { EdgePolicy::default() };
                let config = FieldConfig {
                    edge,
                    seed: Some(seed),
                    speed: 0.5,
                    ..FieldConfig::default()
                };
                let size = SurfaceSize::new(w, h);
                let mut f = field(size, config);
                for _ in 0..200 {
                    f.step();
                    for p in f.particles() {
                        prop_assert!(p.within(size, edge.margin()), "{:?}", p);
                    }
                }
            }
        }
    }
}
