/// Multiplicative zoom step for the buttons and the wheel.
pub const ZOOM_STEP: f64 = 1.25;

pub const INITIAL_CENTER_X: f64 = -0.5;
pub const INITIAL_CENTER_Y: f64 = 0.0;
pub const INITIAL_ZOOM: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Wheel scrolling down (positive `delta_y`) zooms out.
    pub fn from_wheel(delta_y: f64) -> Self {
        if delta_y > 0.0 { Self::Out } else { Self::In }
    }

    pub fn factor(self) -> f64 {
        match self {
            Self::In => ZOOM_STEP,
            Self::Out => 1.0 / ZOOM_STEP,
        }
    }
}

/// Pan/zoom state of the viewer.
///
/// `center_*` and `zoom` describe the fractal plane (`zoom` is pixels per
/// unit). `offset_*` is a drag delta in canvas pixels that has not been
/// folded into the center yet; it is zero whenever the state is `Idle`
/// after a commit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub center_x: f64,
    pub center_y: f64,
    pub zoom: f64,
    pub offset_x: i32,
    pub offset_y: i32,
    pub res_x: u32,
    pub res_y: u32,
    pub drag: DragState,
}

impl ViewState {
    pub fn new(res_x: u32, res_y: u32) -> Self {
        Self {
            center_x: INITIAL_CENTER_X,
            center_y: INITIAL_CENTER_Y,
            zoom: INITIAL_ZOOM,
            offset_x: 0,
            offset_y: 0,
            res_x,
            res_y,
            drag: DragState::Idle,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag == DragState::Dragging
    }

    /// `mousedown`: start a drag. No-op when already dragging.
    pub fn press(&mut self) {
        if self.drag == DragState::Idle {
            self.drag = DragState::Dragging;
        }
    }

    /// `mousemove`: accumulate the movement delta. Returns `true` when the
    /// offset changed and a preview repaint is due.
    pub fn drag_by(&mut self, dx: i32, dy: i32) -> bool {
        if !self.is_dragging() {
            return false;
        }
        self.offset_x = self.offset_x.saturating_add(dx);
        self.offset_y = self.offset_y.saturating_add(dy);
        true
    }

    /// `mouseup`: fold the drag offset into the center. Returns `true` when
    /// a drag was committed and a refetch is due.
    pub fn release(&mut self) -> bool {
        if !self.is_dragging() {
            return false;
        }
        self.drag = DragState::Idle;
        self.commit_offset();
        true
    }

    /// Pixel offset to plane delta, including the half-pixel term.
    fn commit_offset(&mut self) {
        let half_pixel = 1.0 / (2.0 * self.zoom);
        self.center_x -= f64::from(self.offset_x) / self.zoom + half_pixel;
        self.center_y += f64::from(self.offset_y) / self.zoom + half_pixel;
        self.offset_x = 0;
        self.offset_y = 0;
    }

    /// Multiply the zoom by one step. Returns `false` (and leaves the zoom
    /// untouched) if the result would not be a positive finite number.
    pub fn apply_zoom(&mut self, direction: ZoomDirection) -> bool {
        let next = self.zoom * direction.factor();
        if !next.is_finite() || next <= 0.0 {
            return false;
        }
        self.zoom = next;
        true
    }

    pub fn resize(&mut self, res_x: u32, res_y: u32) -> bool {
        if (self.res_x, self.res_y) == (res_x, res_y) {
            return false;
        }
        self.res_x = res_x;
        self.res_y = res_y;
        true
    }
}
