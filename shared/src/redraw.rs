use crate::view::ViewState;
use crate::wire::FractalRequest;

/// Requested tiles are this much larger than the viewport on each axis, so
/// a pan within the margin can be previewed without a refetch.
pub const OVERSAMPLE_FACTOR: f64 = 1.5;

/// Trailing-edge debounce delay for tile fetches.
pub const FETCH_DEBOUNCE_MS: u32 = 300;

/// Canvas position of an image's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RedrawAction {
    /// Request a new tile; paint it at `placement` once it arrives.
    Fetch {
        request: FractalRequest,
        placement: Placement,
    },
    /// Repaint the cached tile at the live drag offset.
    Repaint { placement: Placement },
}

pub fn oversampled(res: u32) -> u32 {
    (f64::from(res) * OVERSAMPLE_FACTOR).ceil() as u32
}

/// `offset - ceil((image - viewport) / 2)`: centers an oversampled image
/// under the viewport, shifted by the drag offset.
pub fn place_axis(offset: i32, image: u32, viewport: u32) -> i32 {
    let margin = ((f64::from(image) - f64::from(viewport)) / 2.0).ceil() as i32;
    offset.saturating_sub(margin)
}

pub fn placement(view: &ViewState, image_res: (u32, u32)) -> Placement {
    Placement {
        x: place_axis(view.offset_x, image_res.0, view.res_x),
        y: place_axis(view.offset_y, image_res.1, view.res_y),
    }
}

/// Oversampled request for the current view.
pub fn tile_request(view: &ViewState) -> FractalRequest {
    FractalRequest {
        center_x: view.center_x,
        center_y: view.center_y,
        zoom: view.zoom,
        res_x: oversampled(view.res_x),
        res_y: oversampled(view.res_y),
    }
}

/// Decide between refetching and repainting the cached tile.
///
/// `cached` is the resolution of the last painted tile, if any.
pub fn plan_redraw(view: &ViewState, cached: Option<(u32, u32)>, force_refetch: bool) -> RedrawAction {
    match cached {
        Some(image_res) if !force_refetch => RedrawAction::Repaint {
            placement: placement(view, image_res),
        },
        _ => {
            let request = tile_request(view);
            RedrawAction::Fetch {
                request,
                placement: placement(view, (request.res_x, request.res_y)),
            }
        }
    }
}
