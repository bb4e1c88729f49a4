use std::cell::RefCell;

use fractal_viewer_shared::{ViewState, ZoomDirection};
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{MouseEvent, WheelEvent};

use crate::app::{StatusMessage, ViewSignal};
use crate::redraw::RedrawPipeline;

const FALLBACK_SIZE: (u32, u32) = (800, 600);

struct ResizeBinding {
    window: web_sys::Window,
    _handler: wasm_bindgen::closure::Closure<dyn Fn()>,
}

thread_local! {
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
}

/// Canvas size for a window of `width` x `height` CSS pixels, at least 1x1.
pub(crate) fn canvas_size(width: f64, height: f64) -> (u32, u32) {
    let clamp = |v: f64| {
        if v.is_finite() && v >= 1.0 {
            v.floor().min(f64::from(u32::MAX)) as u32
        } else {
            1
        }
    };
    (clamp(width), clamp(height))
}

pub(crate) fn window_canvas_size() -> (u32, u32) {
    let Some(window) = web_sys::window() else {
        return FALLBACK_SIZE;
    };
    let w = window.inner_width().ok().and_then(|v| v.as_f64());
    let h = window.inner_height().ok().and_then(|v| v.as_f64());
    match (w, h) {
        (Some(w), Some(h)) => canvas_size(w, h),
        _ => FALLBACK_SIZE,
    }
}

fn set_backing_size(canvas: NodeRef<leptos::html::Canvas>, view: &ViewState) {
    if let Some(canvas) = canvas.get_untracked() {
        canvas.set_width(view.res_x);
        canvas.set_height(view.res_y);
    }
}

/// The pannable, zoomable fractal canvas with its zoom buttons and status line.
#[component]
pub fn FractalViewer() -> impl IntoView {
    let ViewSignal(view) = expect_context();
    let StatusMessage(status) = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let pipeline = RedrawPipeline::new(canvas_ref, status);

    // First paint once the canvas is in the DOM.
    Effect::new({
        let pipeline = pipeline.clone();
        move || {
            if canvas_ref.get().is_none() {
                return;
            }
            let current = view.get_untracked();
            set_backing_size(canvas_ref, &current);
            pipeline.redraw(&current, true);
        }
    });

    // Window resize: new backing size and a fresh tile.
    Effect::new({
        let pipeline = pipeline.clone();
        move || {
            let Some(window) = web_sys::window() else {
                return;
            };

            RESIZE_BINDING.with(|slot| {
                if let Some(old) = slot.borrow_mut().take() {
                    let _ = old.window.remove_event_listener_with_callback(
                        "resize",
                        old._handler.as_ref().unchecked_ref(),
                    );
                }
            });

            let pipeline = pipeline.clone();
            let handler = wasm_bindgen::closure::Closure::<dyn Fn()>::new(move || {
                let (w, h) = window_canvas_size();
                if view.try_update(|v| v.resize(w, h)).unwrap_or(false) {
                    let current = view.get_untracked();
                    set_backing_size(canvas_ref, &current);
                    pipeline.redraw(&current, true);
                }
            });
            if window
                .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
                .is_ok()
            {
                RESIZE_BINDING.with(|slot| {
                    *slot.borrow_mut() = Some(ResizeBinding {
                        window: window.clone(),
                        _handler: handler,
                    });
                });
            }
        }
    });

    let on_mouse_down = move |_: MouseEvent| {
        view.update(|v| v.press());
    };

    let on_mouse_move = {
        let pipeline = pipeline.clone();
        move |e: MouseEvent| {
            if view
                .try_update(|v| v.drag_by(e.movement_x(), e.movement_y()))
                .unwrap_or(false)
            {
                pipeline.redraw(&view.get_untracked(), false);
            }
        }
    };

    // mouseup and mouseleave both end the drag.
    let release = {
        let pipeline = pipeline.clone();
        move |_: MouseEvent| {
            if view.try_update(|v| v.release()).unwrap_or(false) {
                pipeline.redraw(&view.get_untracked(), true);
            }
        }
    };
    let on_mouse_up = release.clone();
    let on_mouse_leave = release;

    let zoom = {
        let pipeline = pipeline.clone();
        move |direction: ZoomDirection| {
            if view.try_update(|v| v.apply_zoom(direction)).unwrap_or(false) {
                pipeline.redraw(&view.get_untracked(), true);
            }
        }
    };

    let on_wheel = {
        let zoom = zoom.clone();
        move |e: WheelEvent| {
            e.prevent_default();
            zoom(ZoomDirection::from_wheel(e.delta_y()));
        }
    };
    let on_zoom_in = {
        let zoom = zoom.clone();
        move |_: MouseEvent| zoom(ZoomDirection::In)
    };
    let on_zoom_out = move |_: MouseEvent| zoom(ZoomDirection::Out);

    view! {
        <div style="position: relative; width: 100%; height: 100%;">
            <canvas
                id="fractal"
                node_ref=canvas_ref
                on:mousedown=on_mouse_down
                on:mousemove=on_mouse_move
                on:mouseup=on_mouse_up
                on:mouseleave=on_mouse_leave
                on:wheel=on_wheel
            />
            <div class="zoom-controls">
                <button id="zoom-in" title="Zoom in" on:click=on_zoom_in>"+"</button>
                <button id="zoom-out" title="Zoom out" on:click=on_zoom_out>"\u{2212}"</button>
            </div>
            <div
                id="status"
                role="status"
                style:display=move || if status.with(Option::is_some) { "block" } else { "none" }
            >
                {move || status.get().unwrap_or_default()}
            </div>
        </div>
    }
}
