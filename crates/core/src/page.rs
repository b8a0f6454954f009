//! Page behaviour around the particle field, kept free of any DOM types.
//!
//! The browser binding feeds measurements in and applies the answers; the
//! arithmetic and the degrade-gracefully rules live here.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Nav height assumed for anchor scrolling when the navbar cannot be measured.
pub const ANCHOR_NAV_FALLBACK: f64 = 72.0;
/// Extra gap left above an anchor target.
pub const ANCHOR_GAP: f64 = 8.0;
/// Nav height assumed for section highlighting when unmeasurable.
pub const SECTION_NAV_FALLBACK: f64 = 80.0;
/// Look-ahead below the nav when deciding the active section.
pub const SECTION_LOOKAHEAD: f64 = 12.0;
/// Scroll handler throttle interval.
pub const SCROLL_THROTTLE_MS: f64 = 120.0;
/// Delay before `.reveal` elements are force-shown without a reveal library.
pub const REVEAL_FALLBACK_DELAY_MS: i32 = 350;

fn measured_or(height: Option<f64>, fallback: f64) -> f64 {
    match height {
        Some(h) if h.is_finite() && h > 0.0 => h,
        _ => fallback,
    }
}

/// Whether a link's `href` is a same-page anchor worth intercepting.
///
/// A bare `#` is left to the browser.
pub fn is_in_page_anchor(href: &str) -> bool {
    href.len() > 1 && href.starts_with('#')
}

/// Document scroll offset that puts an anchor target just below a fixed nav.
///
/// `target_top` is the target's viewport-relative top edge.
pub fn anchor_scroll_top(target_top: f64, scroll_y: f64, nav_height: Option<f64>) -> f64 {
    target_top + scroll_y - measured_or(nav_height, ANCHOR_NAV_FALLBACK) - ANCHOR_GAP
}

/// Index of the section the reader is in: the last one whose top has passed
/// the line just below the nav. Falls back to the first section.
pub fn active_section(offsets: &[f64], scroll_y: f64, nav_height: Option<f64>) -> Option<usize> {
    if offsets.is_empty() {
        return None;
    }
    let line = scroll_y + measured_or(nav_height, SECTION_NAV_FALLBACK) + SECTION_LOOKAHEAD;
    Some(offsets.iter().rposition(|&top| top <= line).unwrap_or(0))
}

/// Parameters handed to a reveal strategy for each `.reveal` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealOptions {
    /// Starting vertical offset in pixels.
    pub from_y: f64,
    pub duration_s: f64,
    pub ease: String,
    /// Scroll-trigger start expression.
    pub start: String,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            from_y: 28.0,
            duration_s: 0.9,
            ease: "power3.out".into(),
            start: "top 85%".into(),
        }
    }
}

/// Parameters handed to a tilt strategy for each project card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TiltOptions {
    pub max: f64,
    pub speed: f64,
    pub glare: bool,
    #[serde(rename = "max-glare")]
    pub max_glare: f64,
}

impl Default for TiltOptions {
    fn default() -> Self {
        Self {
            max: 8.0,
            speed: 350.0,
            glare: true,
            max_glare: 0.14,
        }
    }
}

/// Scroll-triggered reveal animation provided by the host page.
pub trait RevealStrategy {
    /// Registers reveals for every element matching the reveal selector.
    fn reveal_all(&self, options: &RevealOptions) -> Result<(), String>;
}

/// Hover-tilt effect provided by the host page.
pub trait TiltStrategy {
    fn tilt_all(&self, options: &TiltOptions) -> Result<(), String>;
}

/// What happened when enhancements were applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnhancementOutcome {
    /// Reveal content must be made visible by the caller.
    pub needs_reveal_fallback: bool,
    pub tilt_applied: bool,
}

/// Optional third-party effects injected at construction.
///
/// A missing or failing strategy is not an error: reveals fall back to
/// showing the content, tilt is simply skipped.
#[derive(Default)]
pub struct Enhancements {
    pub reveal: Option<Box<dyn RevealStrategy>>,
    pub tilt: Option<Box<dyn TiltStrategy>>,
    pub reveal_options: RevealOptions,
    pub tilt_options: TiltOptions,
}

impl Enhancements {
    /// Runs whichever strategies are present. Never fails.
    pub fn apply(&self) -> EnhancementOutcome {
        let needs_reveal_fallback = match &self.reveal {
            Some(reveal) => match reveal.reveal_all(&self.reveal_options) {
                Ok(()) => false,
                Err(e) => {
                    warn!(error = %e, "reveal animation failed, showing content statically");
                    true
                }
            },
            None => true,
        };
        let tilt_applied = match &self.tilt {
            Some(tilt) => match tilt.tilt_all(&self.tilt_options) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "tilt init failed");
                    false
                }
            },
            None => false,
        };
        EnhancementOutcome {
            needs_reveal_fallback,
            tilt_applied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn bare_hash_and_external_links_are_not_intercepted() {
        assert!(!is_in_page_anchor("#"));
        assert!(!is_in_page_anchor(""));
        assert!(!is_in_page_anchor("about.html#team"));
        assert!(is_in_page_anchor("#projects"));
    }

    #[test]
    fn anchor_offset_subtracts_nav_and_gap() {
        assert_eq!(anchor_scroll_top(300.0, 1000.0, Some(64.0)), 1228.0);
    }

    #[test]
    fn anchor_offset_uses_fallback_nav() {
        assert_eq!(anchor_scroll_top(300.0, 0.0, None), 220.0);
        assert_eq!(anchor_scroll_top(300.0, 0.0, Some(0.0)), 220.0);
    }

    #[test]
    fn active_section_picks_last_passed() {
        let offsets = [0.0, 600.0, 1200.0, 1800.0];
        assert_eq!(active_section(&offsets, 0.0, Some(72.0)), Some(0));
        assert_eq!(active_section(&offsets, 520.0, Some(72.0)), Some(1));
        assert_eq!(active_section(&offsets, 1500.0, Some(72.0)), Some(2));
        assert_eq!(active_section(&offsets, 9000.0, None), Some(3));
    }

    #[test]
    fn active_section_defaults_to_first_and_handles_empty() {
        assert_eq!(active_section(&[500.0, 900.0], 0.0, None), Some(0));
        assert_eq!(active_section(&[], 100.0, None), None);
    }

    struct Recorder {
        log: Rc<RefCell<Vec<String>>>,
        fail: bool,
    }

    impl RevealStrategy for Recorder {
        fn reveal_all(&self, options: &RevealOptions) -> Result<(), String> {
            self.log.borrow_mut().push(format!("reveal {}", options.ease));
            if self.fail {
                Err("gsap exploded".into())
            } else {
                Ok(())
            }
        }
    }

    impl TiltStrategy for Recorder {
        fn tilt_all(&self, options: &TiltOptions) -> Result<(), String> {
            self.log.borrow_mut().push(format!("tilt {}", options.max));
            if self.fail {
                Err("tilt exploded".into())
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn no_strategies_degrades_to_fallback() {
        let outcome = Enhancements::default().apply();
        assert!(outcome.needs_reveal_fallback);
        assert!(!outcome.tilt_applied);
    }

    #[test]
    fn present_strategies_receive_options() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let enhancements = Enhancements {
            reveal: Some(Box::new(Recorder {
                log: Rc::clone(&log),
                fail: false,
            })),
            tilt: Some(Box::new(Recorder {
                log: Rc::clone(&log),
                fail: false,
            })),
            ..Enhancements::default()
        };
        let outcome = enhancements.apply();
        assert!(!outcome.needs_reveal_fallback);
        assert!(outcome.tilt_applied);
        assert_eq!(*log.borrow(), vec!["reveal power3.out", "tilt 8"]);
    }

    #[test]
    fn failing_strategies_are_swallowed() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let enhancements = Enhancements {
            reveal: Some(Box::new(Recorder {
                log: Rc::clone(&log),
                fail: true,
            })),
            tilt: Some(Box::new(Recorder {
                log: Rc::clone(&log),
                fail: true,
            })),
            ..Enhancements::default()
        };
        let outcome = enhancements.apply();
        assert!(outcome.needs_reveal_fallback);
        assert!(!outcome.tilt_applied);
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn tilt_options_use_hyphenated_glare_key() {
        let v = serde_json::to_value(TiltOptions::default()).unwrap();
        assert_eq!(v["max-glare"], 0.14);
        assert_eq!(v["speed"], 350.0);
    }
}
