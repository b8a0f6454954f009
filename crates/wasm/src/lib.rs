#![deny(unsafe_code)]
//! Browser bindings for the backdrop particle field.
//!
//! `startBackdrop(configJson, reveal, tilt)` wires a loaded page: the particle
//! canvas (`#particle-canvas`), theme toggle with persistence, mobile nav,
//! smooth anchor scrolling, active-section highlighting, keyboard focus
//! assist, and the optional reveal/tilt effects passed in as JS callbacks.
//!
//! Everything here is best-effort. A missing element or a failing host call
//! disables that one feature and never throws back into the page.

#[cfg(target_arch = "wasm32")]
mod canvas;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod enhance;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{start_backdrop, PageHandle};

use backdrop_core::{FieldConfig, SurfaceSize};
use tracing::warn;

/// Body class marking the light theme.
pub const LIGHT_THEME_CLASS: &str = "light-theme";
/// Class toggled on `.nav-links` to show the mobile menu.
pub const NAV_OPEN_CLASS: &str = "open";
/// Class marking the highlighted nav link.
pub const NAV_ACTIVE_CLASS: &str = "active";
/// Body class enabling visible focus rings after keyboard navigation.
pub const FOCUS_ASSIST_CLASS: &str = "show-focus";

/// Parses the optional config passed from JS, falling back to defaults.
///
/// A bad config only loses the customization, never the background.
pub fn config_or_default(json: Option<&str>) -> FieldConfig {
    match json.map(FieldConfig::from_json_str) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            warn!(error = %e, "ignoring invalid backdrop config");
            FieldConfig::default()
        }
        None => FieldConfig::default(),
    }
}

/// CSS size the canvas should fill.
///
/// The containing block decides when it has an area; the canvas's own box
/// is only a fallback because it reflects the inline size last pinned on it,
/// and with no stylesheet it echoes the backing store (CSS size times pixel
/// ratio), which would feed back into every resize.
pub fn layout_size(container: Option<(i32, i32)>, element: (i32, i32)) -> SurfaceSize {
    let (w, h) = match container {
        Some((w, h)) if w > 0 && h > 0 => (w, h),
        _ => element,
    };
    SurfaceSize::new(f64::from(w), f64::from(h))
}

/// Selector for the nav link pointing at section `id`.
pub fn nav_link_selector(id: &str) -> String {
    format!(".nav-links a[href=\"#{id}\"]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        assert_eq!(config_or_default(None), FieldConfig::default());
    }

    #[test]
    fn valid_config_is_used() {
        let config = config_or_default(Some(r#"{"speed": 0.3}"#));
        assert_eq!(config.speed, 0.3);
    }

    #[test]
    fn invalid_config_falls_back() {
        assert_eq!(
            config_or_default(Some(r#"{"speed": -3}"#)),
            FieldConfig::default()
        );
        assert_eq!(config_or_default(Some("not json")), FieldConfig::default());
    }

    #[test]
    fn container_size_wins_over_pinned_canvas() {
        // Canvas pinned at 300px with a 2x backing store reads back 600 when
        // unpinned; the container keeps reporting the real layout size.
        let first = layout_size(Some((300, 150)), (300, 150));
        let again = layout_size(Some((300, 150)), (600, 300));
        assert_eq!(first, SurfaceSize::new(300.0, 150.0));
        assert_eq!(again, first);
    }

    #[test]
    fn repeated_measure_is_a_fixed_point() {
        use backdrop_core::BackingStore;
        let mut size = layout_size(Some((1280, 720)), (300, 150));
        for _ in 0..5 {
            let store = BackingStore::compute(size, 2.0);
            let pinned = (store.css.width as i32, store.css.height as i32);
            size = layout_size(Some((1280, 720)), pinned);
        }
        assert_eq!(size, SurfaceSize::new(1280.0, 720.0));
    }

    #[test]
    fn collapsed_container_falls_back_to_element() {
        assert_eq!(
            layout_size(Some((0, 0)), (640, 480)),
            SurfaceSize::new(640.0, 480.0)
        );
        assert_eq!(layout_size(None, (640, 480)), SurfaceSize::new(640.0, 480.0));
    }

    #[test]
    fn nav_selector_targets_hash_href() {
        assert_eq!(nav_link_selector("about"), ".nav-links a[href=\"#about\"]");
    }
}
