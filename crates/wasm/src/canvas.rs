//! `Surface` implementation over a 2-D canvas context.

use backdrop_core::surface::{BackingStore, Surface, SurfaceSize};
use backdrop_core::Tint;
use tracing::trace;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::layout_size;

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    last_fill: Option<Tint>,
}

impl CanvasSurface {
    /// Acquires the 2-D context, or `None` if the canvas refuses one.
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self {
            canvas,
            ctx,
            last_fill: None,
        })
    }

    /// Laid-out CSS size available to the canvas: the containing block's
    /// client box, falling back to the canvas's own box. The inline size
    /// pinned by `configure` is left in place.
    pub fn measure(&self) -> SurfaceSize {
        let container = self
            .canvas
            .parent_element()
            .map(|parent| (parent.client_width(), parent.client_height()));
        let own = (self.canvas.offset_width(), self.canvas.offset_height());
        layout_size(container, own)
    }
}

impl Surface for CanvasSurface {
    fn configure(&mut self, store: &BackingStore) {
        // Assigning width/height resets the context state, including the fill.
        self.canvas.set_width(store.pixel_width);
        self.canvas.set_height(store.pixel_height);
        self.last_fill = None;

        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{}px", store.css.width));
        let _ = style.set_property("height", &format!("{}px", store.css.height));

        let s = store.scale;
        if let Err(e) = self.ctx.set_transform(s, 0.0, 0.0, s, 0.0, 0.0) {
            trace!(error = ?e, "set_transform rejected");
        }
    }

    fn clear(&mut self, size: SurfaceSize) {
        self.ctx.clear_rect(0.0, 0.0, size.width, size.height);
    }

    fn set_fill(&mut self, tint: &Tint) {
        if self.last_fill.as_ref() == Some(tint) {
            return;
        }
        #[allow(deprecated)]
        self.ctx.set_fill_style(&JsValue::from_str(&tint.to_css()));
        self.last_fill = Some(*tint);
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.ctx.begin_path();
        if self
            .ctx
            .arc(x, y, radius, 0.0, std::f64::consts::TAU)
            .is_ok()
        {
            self.ctx.fill();
        }
    }
}
