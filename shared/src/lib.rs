pub mod bitmap;
pub mod error;
pub mod pixels;
pub mod redraw;
pub mod view;
pub mod wire;

pub use error::FetchError;
pub use redraw::{Placement, RedrawAction, plan_redraw};
pub use view::{DragState, ViewState, ZoomDirection};
pub use wire::{DecodedImage, FractalRequest, FractalResponse};
