//! DOM wiring for the page behaviour around the canvas.
//!
//! Each `install_*` function quietly does nothing when the elements it needs
//! are missing. Listeners live for the lifetime of the page, so their
//! closures are leaked with `forget`.

use std::cell::RefCell;
use std::rc::Rc;

use backdrop_core::page::{
    active_section, anchor_scroll_top, is_in_page_anchor, REVEAL_FALLBACK_DELAY_MS,
    SCROLL_THROTTLE_MS,
};
use backdrop_core::theme::{Theme, ThemeController, ThemeStore, THEME_STORAGE_KEY};
use backdrop_core::timing::Throttle;
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlElement, KeyboardEvent, ScrollBehavior, ScrollToOptions,
    Storage, Window,
};

use crate::{
    nav_link_selector, FOCUS_ASSIST_CLASS, LIGHT_THEME_CLASS, NAV_ACTIVE_CLASS, NAV_OPEN_CLASS,
};

/// Milliseconds since page load, or 0 when the Performance API is missing.
pub fn now_ms(window: &Window) -> f64 {
    window.performance().map(|p| p.now()).unwrap_or(0.0)
}

fn listen<E, F>(target: &web_sys::EventTarget, event: &str, handler: F)
where
    E: FromWasmAbi + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::<dyn FnMut(E)>::new(handler);
    match target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        Ok(()) => closure.forget(),
        Err(e) => warn!(event, error = ?e, "could not attach listener"),
    }
}

fn query(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn nav_height(document: &Document) -> Option<f64> {
    query(document, "#navbar")
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .map(|el| el.offset_height() as f64)
}

/// `localStorage`-backed theme persistence. Storage may be unavailable
/// (privacy mode); reads then return nothing and writes are dropped.
pub struct LocalThemeStore(Option<Storage>);

impl LocalThemeStore {
    pub fn new(window: &Window) -> Self {
        Self(window.local_storage().ok().flatten())
    }
}

impl ThemeStore for LocalThemeStore {
    fn load(&self) -> Option<String> {
        self.0.as_ref()?.get_item(THEME_STORAGE_KEY).ok().flatten()
    }

    fn save(&mut self, value: &str) {
        if let Some(storage) = &self.0 {
            let _ = storage.set_item(THEME_STORAGE_KEY, value);
        }
    }
}

/// Mirrors `theme` onto the body class and the toggle button label.
pub fn apply_theme(document: &Document, theme: Theme) {
    if let Some(body) = document.body() {
        let classes = body.class_list();
        let _ = if theme.is_light() {
            classes.add_1(LIGHT_THEME_CLASS)
        } else {
            classes.remove_1(LIGHT_THEME_CLASS)
        };
    }
    if let Some(button) = document.get_element_by_id("theme-toggle") {
        button.set_text_content(Some(theme.toggle_glyph()));
    }
}

pub fn install_theme_toggle(
    document: &Document,
    controller: Rc<RefCell<ThemeController<LocalThemeStore>>>,
) {
    apply_theme(document, controller.borrow().theme());
    let Some(button) = document.get_element_by_id("theme-toggle") else {
        return;
    };
    let doc = document.clone();
    listen(&button, "click", move |_: Event| {
        let theme = controller.borrow_mut().toggle();
        apply_theme(&doc, theme);
        debug!(theme = theme.as_str(), "theme toggled");
    });
}

fn close_nav(document: &Document) {
    if let Some(links) = query(document, ".nav-links") {
        let _ = links.class_list().remove_1(NAV_OPEN_CLASS);
    }
}

/// Adds a menu button when the markup lacks one and toggles `.nav-links`.
pub fn install_nav_toggle(document: &Document) {
    if query(document, ".nav-toggle").is_none() {
        let host = query(document, "#navbar .nav-inner").or_else(|| query(document, "#navbar"));
        if let (Some(host), Ok(button)) = (host, document.create_element("button")) {
            button.set_class_name("nav-toggle");
            button.set_inner_html("\u{2630}");
            let _ = button.set_attribute("aria-label", "Open menu");
            let _ = host.append_child(&button);
        }
    }
    let Some(toggle) = query(document, ".nav-toggle") else {
        return;
    };
    let doc = document.clone();
    listen(&toggle, "click", move |_: Event| {
        if let Some(links) = query(&doc, ".nav-links") {
            let _ = links.class_list().toggle(NAV_OPEN_CLASS);
        }
    });
}

/// Smooth-scrolls same-page anchors to just below the fixed nav.
pub fn install_anchor_scrolling(window: &Window, document: &Document) {
    for link in query_all(document, "a[href^=\"#\"]") {
        let Some(href) = link.get_attribute("href").filter(|h| is_in_page_anchor(h)) else {
            continue;
        };
        let win = window.clone();
        let doc = document.clone();
        listen(&link, "click", move |event: Event| {
            event.prevent_default();
            let Some(target) = query(&doc, &href) else {
                return;
            };
            let top = anchor_scroll_top(
                target.get_bounding_client_rect().top(),
                win.scroll_y().unwrap_or(0.0),
                nav_height(&doc),
            );
            let options = ScrollToOptions::new();
            options.set_top(top);
            options.set_behavior(ScrollBehavior::Smooth);
            win.scroll_to_with_scroll_to_options(&options);
            close_nav(&doc);
        });
    }
}

fn highlight_active_section(window: &Window, document: &Document, sections: &[HtmlElement]) {
    let offsets: Vec<f64> = sections.iter().map(|s| s.offset_top() as f64).collect();
    let Some(index) = active_section(
        &offsets,
        window.scroll_y().unwrap_or(0.0),
        nav_height(document),
    ) else {
        return;
    };
    for link in query_all(document, ".nav-links a") {
        let _ = link.class_list().remove_1(NAV_ACTIVE_CLASS);
    }
    if let Some(link) = query(document, &nav_link_selector(&sections[index].id())) {
        let _ = link.class_list().add_1(NAV_ACTIVE_CLASS);
    }
}

/// Highlights the nav link of the section in view, throttled on scroll.
pub fn install_section_highlight(window: &Window, document: &Document) {
    let sections: Vec<HtmlElement> = query_all(document, "section[id]")
        .into_iter()
        .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
        .collect();
    if sections.is_empty() {
        return;
    }
    highlight_active_section(window, document, &sections);

    let throttle = RefCell::new(Throttle::new(SCROLL_THROTTLE_MS));
    let win = window.clone();
    let doc = document.clone();
    listen(window, "scroll", move |_: Event| {
        if throttle.borrow_mut().ready(now_ms(&win)) {
            highlight_active_section(&win, &doc, &sections);
        }
    });
}

/// Shows focus rings once the user starts tabbing.
pub fn install_focus_assist(window: &Window, document: &Document) {
    let doc = document.clone();
    listen(window, "keyup", move |event: KeyboardEvent| {
        if event.key() == "Tab" {
            if let Some(body) = doc.body() {
                let _ = body.class_list().add_1(FOCUS_ASSIST_CLASS);
            }
        }
    });
}

/// Makes `.reveal` content visible after a short delay when no reveal
/// animation is driving it.
pub fn schedule_reveal_fallback(window: &Window, document: &Document) {
    let doc = document.clone();
    let show = Closure::once_into_js(move || {
        for el in query_all(&doc, ".reveal") {
            if let Ok(el) = el.dyn_into::<HtmlElement>() {
                let _ = el.style().set_property("opacity", "1");
            }
        }
    });
    if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        show.unchecked_ref(),
        REVEAL_FALLBACK_DELAY_MS,
    ) {
        warn!(error = ?e, "could not schedule reveal fallback");
    }
}
