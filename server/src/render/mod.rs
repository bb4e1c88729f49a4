//! Escape-time Mandelbrot rendering.
//!
//! A renderer turns [`FractalParameters`] into a row-major `Vec<bool>` of
//! `res_x * res_y` pixels, `true` for points whose orbit stays bounded.

mod combinators;
mod cpu;

pub use combinators::{Queued, Race};
pub use cpu::CpuRenderer;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use fractal_viewer_shared::FractalRequest;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("renderer needs at least one worker")]
    InvalidWorkers,
    #[error("render queue is full")]
    QueueFull,
    #[error("no renderers configured")]
    NoRenderers,
    #[error("render worker panicked")]
    WorkerPanicked,
    #[error("render cancelled")]
    Cancelled,
}

pub trait FractalGenerator: Send + Sync {
    /// Render, giving up with [`ComputeError::Cancelled`] once `cancel`
    /// fires.
    fn compute_cancellable(
        &self,
        params: &FractalParameters,
        cancel: &CancelToken,
    ) -> Result<Vec<bool>, ComputeError>;

    fn compute(&self, params: &FractalParameters) -> Result<Vec<bool>, ComputeError> {
        self.compute_cancellable(params, &CancelToken::default())
    }
}

/// Cooperative cancellation. A child token is cancelled when it or any of
/// its ancestors is; cancelling a child leaves the parent untouched.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flags: Vec<Arc<AtomicBool>>,
}

impl CancelToken {
    pub fn child(&self) -> Self {
        let mut flags = self.flags.clone();
        flags.push(Arc::new(AtomicBool::new(false)));
        Self { flags }
    }

    /// No-op on the root token.
    pub fn cancel(&self) {
        if let Some(own) = self.flags.last() {
            own.store(true, Ordering::Relaxed);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.flags.iter().any(|flag| flag.load(Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalParameters {
    pub center: (f64, f64),
    pub zoom: f64,
    pub res_x: u32,
    pub res_y: u32,
    pub iterations: u32,
    /// Escape radius; an orbit with `|z| > limit` has escaped.
    pub limit: f64,
}

impl FractalParameters {
    pub fn from_request(request: &FractalRequest, base_iterations: u32, limit: f64) -> Self {
        Self {
            center: (request.center_x, request.center_y),
            zoom: request.zoom,
            res_x: request.res_x,
            res_y: request.res_y,
            iterations: iterations_for_zoom(base_iterations, request.zoom),
            limit,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.res_x as usize * self.res_y as usize
    }

    /// Plane distance between neighbouring pixels.
    pub fn pixel_size(&self) -> f64 {
        1.0 / self.zoom
    }

    /// Plane coordinate of the center of pixel (0, 0).
    pub fn upper_left(&self) -> (f64, f64) {
        let d = self.pixel_size();
        (
            self.center.0 - d * f64::from(self.res_x) / 2.0 + d / 2.0,
            self.center.1 + d * f64::from(self.res_y) / 2.0 - d / 2.0,
        )
    }
}

/// Deeper zooms get more iterations: `base * ln(1 + zoom)`.
pub fn iterations_for_zoom(base: u32, zoom: f64) -> u32 {
    (f64::from(base) * zoom.ln_1p()) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < 1e-12,
            "expected {expected}, got {actual} (diff: {diff})"
        );
    }

    #[test]
    fn cancelling_a_child_spares_its_parent() {
        let root = CancelToken::default();
        root.cancel();
        assert!(!root.is_cancelled());

        let race = root.child();
        let racer = race.child();
        racer.cancel();
        assert!(racer.is_cancelled());
        assert!(!race.is_cancelled());

        let sibling = race.child();
        race.cancel();
        assert!(sibling.is_cancelled());
    }

    #[test]
    fn iterations_grow_logarithmically() {
        assert_eq!(iterations_for_zoom(100, 0.0), 0);
        assert_eq!(iterations_for_zoom(100, 200.0), 530);
        assert_eq!(iterations_for_zoom(100, 1e6), 1381);
    }

    #[test]
    fn upper_left_is_half_a_pixel_inside_the_frame() {
        let params = FractalParameters {
            center: (0.0, 0.0),
            zoom: 2.0,
            res_x: 4,
            res_y: 2,
            iterations: 1,
            limit: 2.0,
        };
        let (x, y) = params.upper_left();
        assert_close(x, -0.75);
        assert_close(y, 0.25);
    }

    #[test]
    fn parameters_follow_request() {
        let request = FractalRequest {
            center_x: -0.5,
            center_y: 0.25,
            zoom: 200.0,
            res_x: 600,
            res_y: 450,
        };
        let params = FractalParameters::from_request(&request, 100, 2.0);
        assert_eq!(params.center, (-0.5, 0.25));
        assert_eq!(params.iterations, 530);
        assert_eq!(params.pixel_count(), 270_000);
    }
}
