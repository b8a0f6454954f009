//! `startBackdrop` entry point and the requestAnimationFrame loop.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use backdrop_core::page::Enhancements;
use backdrop_core::surface::clamp_pixel_ratio;
use backdrop_core::{
    bootstrap, FrameLoop, LoopControl, StopHandle, Theme, ThemeController, CANVAS_ELEMENT_ID,
};
use tracing::{debug, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlCanvasElement, Window};

use crate::canvas::CanvasSurface;
use crate::dom::{self, LocalThemeStore};
use crate::enhance::{JsReveal, JsTilt};
use crate::config_or_default;

type PageLoop = FrameLoop<CanvasSurface, Rc<Cell<Theme>>>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Handle returned to JS for stopping the particle animation.
#[wasm_bindgen]
pub struct PageHandle {
    stop: Option<StopHandle>,
}

#[wasm_bindgen]
impl PageHandle {
    /// Stops the animation after the current frame. Idempotent.
    pub fn stop(&self) {
        if let Some(stop) = &self.stop {
            stop.stop();
        }
    }

    /// `false` once stopped, or when the page has no particle canvas.
    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.stop.as_ref().is_some_and(|s| !s.is_stopped())
    }
}

/// Wires the whole page. Call once after the DOM is ready.
///
/// `config_json` customizes the particle field; `reveal` and `tilt` are
/// optional effect callbacks, each called once with its options object.
#[wasm_bindgen(js_name = startBackdrop)]
pub fn start_backdrop(
    config_json: Option<String>,
    reveal: Option<js_sys::Function>,
    tilt: Option<js_sys::Function>,
) -> Option<PageHandle> {
    let window = web_sys::window()?;
    let document = window.document()?;

    let controller = Rc::new(RefCell::new(ThemeController::new(LocalThemeStore::new(
        &window,
    ))));
    let theme = controller.borrow().source();

    dom::install_theme_toggle(&document, controller);
    dom::install_nav_toggle(&document);
    dom::install_anchor_scrolling(&window, &document);
    dom::install_section_highlight(&window, &document);
    dom::install_focus_assist(&window, &document);

    let enhancements = Enhancements {
        reveal: reveal.map(|f| Box::new(JsReveal(f)) as _),
        tilt: tilt.map(|f| Box::new(JsTilt(f)) as _),
        ..Enhancements::default()
    };
    if enhancements.apply().needs_reveal_fallback {
        dom::schedule_reveal_fallback(&window, &document);
    }

    let canvas = document
        .get_element_by_id(CANVAS_ELEMENT_ID)
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok());
    let stop = start_particles(&window, canvas, config_json.as_deref(), theme);
    Some(PageHandle { stop })
}

fn start_particles(
    window: &Window,
    canvas: Option<HtmlCanvasElement>,
    config_json: Option<&str>,
    theme: Rc<Cell<Theme>>,
) -> Option<StopHandle> {
    let surface = canvas.and_then(|canvas| {
        let surface = CanvasSurface::new(canvas);
        if surface.is_none() {
            warn!("particle canvas has no 2d context");
        }
        surface
    });
    let config = config_or_default(config_json);
    let cap = config.max_pixel_ratio;
    let ratio = window.device_pixel_ratio();
    let frame_loop = bootstrap(
        surface,
        CanvasSurface::measure,
        ratio,
        config,
        js_sys::Date::now(),
        theme,
    )?;
    let size = frame_loop.field().size();
    let stop = frame_loop.stop_handle();
    let frame_loop: Rc<RefCell<PageLoop>> = Rc::new(RefCell::new(frame_loop));

    install_resize(window, Rc::downgrade(&frame_loop));
    run_animation(window.clone(), frame_loop);

    let ratio = clamp_pixel_ratio(ratio, cap);
    info!(width = size.width, height = size.height, ratio, "particle backdrop started");
    Some(stop)
}

/// The listener only holds a weak reference, so a stopped loop is freed.
fn install_resize(window: &Window, frame_loop: Weak<RefCell<PageLoop>>) {
    let win = window.clone();
    let on_resize = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
        let Some(frame_loop) = frame_loop.upgrade() else {
            return;
        };
        let mut frame_loop = frame_loop.borrow_mut();
        let size = frame_loop.surface().measure();
        frame_loop.request_resize(size, win.device_pixel_ratio(), dom::now_ms(&win));
    });
    match window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref()) {
        Ok(()) => on_resize.forget(),
        Err(e) => warn!(error = ?e, "could not attach resize listener"),
    }
}

fn request_frame(window: &Window, callback: &FrameCallback) {
    if let Some(closure) = callback.borrow().as_ref() {
        if let Err(e) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            warn!(error = ?e, "requestAnimationFrame failed, animation halted");
        }
    }
}

fn run_animation(window: Window, frame_loop: Rc<RefCell<PageLoop>>) {
    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let next = Rc::clone(&callback);
    let win = window.clone();
    *callback.borrow_mut() = Some(Closure::new(move |now: f64| {
        if frame_loop.borrow_mut().tick(now) == LoopControl::Stop {
            debug!(frames = frame_loop.borrow().frames(), "particle loop stopped");
            // Dropping the closure breaks the Rc cycle.
            let _ = next.borrow_mut().take();
            return;
        }
        request_frame(&win, &next);
    }));
    request_frame(&window, &callback);
}
