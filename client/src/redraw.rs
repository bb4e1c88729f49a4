use std::cell::RefCell;
use std::rc::Rc;

use fractal_viewer_shared::pixels::to_rgba;
use fractal_viewer_shared::redraw::{self, FETCH_DEBOUNCE_MS};
use fractal_viewer_shared::{DecodedImage, FractalRequest, Placement, RedrawAction, ViewState, plan_redraw};
use leptos::prelude::*;
use wasm_bindgen::{Clamped, JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use crate::debounce::{BrowserTimers, Debouncer};
use crate::fetch::fetch_fractal;

/// The last tile received, kept as RGBA so pan previews don't re-expand it.
pub(crate) struct CachedTile {
    pub res_x: u32,
    pub res_y: u32,
    pub rgba: Vec<u8>,
}

impl CachedTile {
    pub(crate) fn from_image(image: &DecodedImage) -> Self {
        Self {
            res_x: image.res_x,
            res_y: image.res_y,
            rgba: to_rgba(&image.pixels),
        }
    }

    /// Centered under `view` by the tile's own size, which is the size the
    /// server answered with rather than the size requested.
    pub(crate) fn placement(&self, view: &ViewState) -> Placement {
        redraw::placement(view, (self.res_x, self.res_y))
    }
}

/// Fetches, caches and paints tiles onto the fractal canvas.
#[derive(Clone)]
pub(crate) struct RedrawPipeline {
    canvas: NodeRef<leptos::html::Canvas>,
    cached: Rc<RefCell<Option<CachedTile>>>,
    fetcher: Debouncer<(FractalRequest, ViewState), BrowserTimers>,
}

impl RedrawPipeline {
    pub(crate) fn new(canvas: NodeRef<leptos::html::Canvas>, status: RwSignal<Option<String>>) -> Self {
        let cached: Rc<RefCell<Option<CachedTile>>> = Rc::new(RefCell::new(None));
        let cached_fetch = Rc::clone(&cached);

        // `view` is the state at redraw time; its offsets position the tile.
        let fetcher = Debouncer::new(BrowserTimers, FETCH_DEBOUNCE_MS, move |(request, view): (FractalRequest, ViewState)| {
            let cached = Rc::clone(&cached_fetch);
            spawn_local(async move {
                match fetch_fractal(request).await {
                    Ok(image) => {
                        let tile = CachedTile::from_image(&image);
                        paint_tile(canvas, &tile, tile.placement(&view));
                        *cached.borrow_mut() = Some(tile);
                        status.set(None);
                    }
                    Err(e) => {
                        web_sys::console::warn_1(&format!("Fractal fetch failed: {e}").into());
                        status.set(Some(e.to_string()));
                    }
                }
            });
        });

        Self {
            canvas,
            cached,
            fetcher,
        }
    }

    /// Repaint the cached tile at the live offset, or schedule a fetch when
    /// there is nothing cached or `force_refetch` is set.
    pub(crate) fn redraw(&self, view: &ViewState, force_refetch: bool) {
        let cached_res = self
            .cached
            .borrow()
            .as_ref()
            .map(|tile| (tile.res_x, tile.res_y));

        match plan_redraw(view, cached_res, force_refetch) {
            RedrawAction::Fetch { request, .. } => self.fetcher.call((request, *view)),
            RedrawAction::Repaint { placement } => {
                if let Some(tile) = self.cached.borrow().as_ref() {
                    paint_tile(self.canvas, tile, placement);
                }
            }
        }
    }
}

fn paint_tile(canvas: NodeRef<leptos::html::Canvas>, tile: &CachedTile, placement: Placement) {
    let Some(canvas) = canvas.get_untracked() else {
        return;
    };
    if let Err(e) = put_tile(&canvas, tile, placement) {
        web_sys::console::warn_1(&format!("Canvas paint failed: {e:?}").into());
    }
}

fn put_tile(canvas: &HtmlCanvasElement, tile: &CachedTile, placement: Placement) -> Result<(), JsValue> {
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(tile.rgba.as_slice()), tile.res_x, tile.res_y)?;

    ctx.clear_rect(0.0, 0.0, f64::from(canvas.width()), f64::from(canvas.height()));
    ctx.put_image_data(&data, f64::from(placement.x), f64::from(placement.y))
}
