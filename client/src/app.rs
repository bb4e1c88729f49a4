use fractal_viewer_shared::ViewState;
use leptos::prelude::*;

use crate::canvas::{FractalViewer, window_canvas_size};

/// Newtype wrappers so each signal gets its own Leptos context slot.
#[derive(Clone, Copy)]
pub(crate) struct ViewSignal(pub RwSignal<ViewState>);
/// Last fetch error shown in `#status`; cleared by a successful paint.
#[derive(Clone, Copy)]
pub(crate) struct StatusMessage(pub RwSignal<Option<String>>);

#[component]
pub fn App() -> impl IntoView {
    let (res_x, res_y) = window_canvas_size();
    provide_context(ViewSignal(RwSignal::new(ViewState::new(res_x, res_y))));
    provide_context(StatusMessage(RwSignal::new(None)));

    view! { <FractalViewer /> }
}
