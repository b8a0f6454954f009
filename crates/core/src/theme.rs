//! Light/dark theme state shared between the page toggle and the field.
//!
//! The field only ever *reads* the theme, once per frame, through
//! [`ThemeSource`]. [`ThemeController`] owns the writable side: it restores
//! the persisted preference, toggles it, and writes it back through a
//! [`ThemeStore`].

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Storage key under which the theme preference is persisted.
pub const THEME_STORAGE_KEY: &str = "backdrop-theme";

/// Active color mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn is_light(self) -> bool {
        self == Theme::Light
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Value written to storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Restores a stored preference. Anything unrecognized falls back to dark.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    /// Label for the toggle button: it shows the theme you would switch to.
    pub fn toggle_glyph(self) -> &'static str {
        match self {
            Theme::Light => "\u{1F319}",
            Theme::Dark => "\u{2600}\u{FE0F}",
        }
    }
}

/// Read-only view of the current theme.
pub trait ThemeSource {
    fn theme(&self) -> Theme;
}

impl ThemeSource for Theme {
    fn theme(&self) -> Theme {
        *self
    }
}

impl ThemeSource for Cell<Theme> {
    fn theme(&self) -> Theme {
        self.get()
    }
}

impl<T: ThemeSource + ?Sized> ThemeSource for Rc<T> {
    fn theme(&self) -> Theme {
        (**self).theme()
    }
}

/// Key/value persistence for the theme preference.
pub trait ThemeStore {
    fn load(&self) -> Option<String>;
    fn save(&mut self, value: &str);
}

/// Owns the theme preference and publishes it to readers.
pub struct ThemeController<S: ThemeStore> {
    store: S,
    current: Rc<Cell<Theme>>,
}

impl<S: ThemeStore> ThemeController<S> {
    /// Restores the stored preference and writes it back, so storage always
    /// holds a normalized value after startup.
    pub fn new(store: S) -> Self {
        let initial = Theme::from_stored(store.load().as_deref());
        let mut controller = Self {
            store,
            current: Rc::new(Cell::new(initial)),
        };
        controller.set(initial);
        controller
    }

    pub fn theme(&self) -> Theme {
        self.current.get()
    }

    pub fn set(&mut self, theme: Theme) {
        self.current.set(theme);
        self.store.save(theme.as_str());
    }

    /// Flips the theme and returns the new value.
    pub fn toggle(&mut self) -> Theme {
        let next = self.theme().toggled();
        self.set(next);
        next
    }

    /// Shared handle for readers such as the particle field.
    pub fn source(&self) -> Rc<Cell<Theme>> {
        Rc::clone(&self.current)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct MemoryThemeStore {
        value: Option<String>,
    }

    impl MemoryThemeStore {
        fn with_value(value: &str) -> Self {
            Self {
                value: Some(value.to_owned()),
            }
        }

        fn value(&self) -> Option<&str> {
            self.value.as_deref()
        }
    }

    impl ThemeStore for MemoryThemeStore {
        fn load(&self) -> Option<String> {
            self.value.clone()
        }

        fn save(&mut self, value: &str) {
            self.value = Some(value.to_owned());
        }
    }

    impl<S: ThemeStore> ThemeController<S> {
        fn store(&self) -> &S {
            &self.store
        }
    }

    #[test]
    fn unknown_stored_value_falls_back_to_dark() {
        assert_eq!(Theme::from_stored(None), Theme::Dark);
        assert_eq!(Theme::from_stored(Some("sepia")), Theme::Dark);
        assert_eq!(Theme::from_stored(Some("light")), Theme::Light);
    }

    #[test]
    fn controller_restores_and_normalizes_storage() {
        let controller = ThemeController::new(MemoryThemeStore::with_value("sepia"));
        assert_eq!(controller.theme(), Theme::Dark);
        assert_eq!(controller.store().value(), Some("dark"));
    }

    #[test]
    fn controller_restores_light() {
        let controller = ThemeController::new(MemoryThemeStore::with_value("light"));
        assert!(controller.theme().is_light());
    }

    #[test]
    fn toggle_persists_and_publishes() {
        let mut controller = ThemeController::new(MemoryThemeStore::default());
        let source = controller.source();
        assert_eq!(source.theme(), Theme::Dark);

        assert_eq!(controller.toggle(), Theme::Light);
        assert_eq!(source.theme(), Theme::Light);
        assert_eq!(controller.store().value(), Some("light"));

        controller.toggle();
        assert_eq!(source.theme(), Theme::Dark);
    }

    #[test]
    fn glyph_points_at_the_other_theme() {
        assert_eq!(Theme::Light.toggle_glyph(), "🌙");
        assert_eq!(Theme::Dark.toggle_glyph(), "☀️");
    }

    #[test]
    fn theme_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Theme::Light).unwrap(), "\"light\"");
    }
}
