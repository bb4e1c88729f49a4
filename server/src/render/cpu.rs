use std::thread;

use super::{CancelToken, ComputeError, FractalGenerator, FractalParameters};

/// Renders on `workers` scoped threads. Worker `w` takes the flat pixel
/// indices `w, w + workers, w + 2 * workers, …`, which spreads the
/// expensive in-set pixels evenly across threads.
#[derive(Debug, Clone, Copy)]
pub struct CpuRenderer {
    pub workers: usize,
}

impl CpuRenderer {
    pub fn new(workers: usize) -> Self {
        Self { workers }
    }
}

impl FractalGenerator for CpuRenderer {
    fn compute_cancellable(
        &self,
        params: &FractalParameters,
        cancel: &CancelToken,
    ) -> Result<Vec<bool>, ComputeError> {
        if self.workers == 0 {
            return Err(ComputeError::InvalidWorkers);
        }
        let total = params.pixel_count();
        let workers = self.workers;
        let grid = PixelGrid::new(params);

        let strides = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|first| {
                    scope.spawn(move || {
                        let mut stride = Vec::with_capacity(total.div_ceil(workers));
                        for index in (first..total).step_by(workers) {
                            if cancel.is_cancelled() {
                                return Err(ComputeError::Cancelled);
                            }
                            stride.push(grid.in_set(index));
                        }
                        Ok(stride)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or(Err(ComputeError::WorkerPanicked)))
                .collect::<Result<Vec<_>, _>>()
        })?;

        let mut out = vec![false; total];
        for (first, stride) in strides.into_iter().enumerate() {
            for (n, pixel) in stride.into_iter().enumerate() {
                out[first + n * workers] = pixel;
            }
        }
        Ok(out)
    }
}

#[derive(Clone, Copy)]
struct PixelGrid {
    origin: (f64, f64),
    step: f64,
    res_x: usize,
    iterations: u32,
    limit_sq: f64,
}

impl PixelGrid {
    fn new(params: &FractalParameters) -> Self {
        Self {
            origin: params.upper_left(),
            step: params.pixel_size(),
            res_x: params.res_x as usize,
            iterations: params.iterations,
            limit_sq: params.limit * params.limit,
        }
    }

    fn in_set(&self, index: usize) -> bool {
        let column = (index % self.res_x) as f64;
        let row = (index / self.res_x) as f64;
        let cr = self.origin.0 + column * self.step;
        let ci = self.origin.1 - row * self.step;
        orbit_stays_bounded(cr, ci, self.iterations, self.limit_sq)
    }
}

fn orbit_stays_bounded(cr: f64, ci: f64, iterations: u32, limit_sq: f64) -> bool {
    let (mut zr, mut zi) = (0.0f64, 0.0f64);
    for _ in 0..iterations {
        let next_r = zr * zr - zi * zi + cr;
        zi = 2.0 * zr * zi + ci;
        zr = next_r;
        if zr * zr + zi * zi > limit_sq {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(center: (f64, f64), zoom: f64, res_x: u32, res_y: u32) -> FractalParameters {
        FractalParameters {
            center,
            zoom,
            res_x,
            res_y,
            iterations: 200,
            limit: 2.0,
        }
    }

    #[test]
    fn classifies_known_points() {
        assert!(orbit_stays_bounded(0.0, 0.0, 500, 4.0));
        assert!(orbit_stays_bounded(-1.0, 0.0, 500, 4.0));
        assert!(!orbit_stays_bounded(2.0, 2.0, 500, 4.0));
        assert!(!orbit_stays_bounded(0.5, 0.5, 500, 4.0));
    }

    #[test]
    fn output_is_row_major_with_requested_size() {
        // 3x3 grid at zoom 1 around the origin: columns -1, 0, 1 and rows 1, 0, -1.
        let pixels = CpuRenderer::new(2)
            .compute(&params((0.0, 0.0), 1.0, 3, 3))
            .unwrap();
        assert_eq!(pixels.len(), 9);
        // (0, 0) and (-1, 0) are members, (1, 0) escapes.
        assert_eq!(&pixels[3..6], &[true, true, false]);
        // (1, 1) escapes.
        assert!(!pixels[2]);
    }

    #[test]
    fn worker_count_does_not_change_the_image() {
        let p = params((-0.5, 0.0), 40.0, 37, 23);
        let reference = CpuRenderer::new(1).compute(&p).unwrap();
        for workers in [2, 3, 8, 64] {
            assert_eq!(
                CpuRenderer::new(workers).compute(&p).unwrap(),
                reference,
                "workers = {workers}"
            );
        }
        assert!(reference.iter().any(|px| *px));
        assert!(reference.iter().any(|px| !*px));
    }

    #[test]
    fn more_workers_than_pixels() {
        let p = params((0.0, 0.0), 1.0, 3, 1);
        assert_eq!(
            CpuRenderer::new(8).compute(&p).unwrap(),
            CpuRenderer::new(1).compute(&p).unwrap()
        );
    }

    #[test]
    fn empty_frame_renders_nothing() {
        let pixels = CpuRenderer::new(4)
            .compute(&params((0.0, 0.0), 1.0, 0, 10))
            .unwrap();
        assert!(pixels.is_empty());
    }

    #[test]
    fn cancelled_render_stops_early() {
        let cancel = CancelToken::default().child();
        cancel.cancel();
        let err = CpuRenderer::new(3)
            .compute_cancellable(&params((-0.5, 0.0), 100.0, 64, 64), &cancel)
            .unwrap_err();
        assert!(matches!(err, ComputeError::Cancelled));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let err = CpuRenderer::new(0)
            .compute(&params((0.0, 0.0), 1.0, 2, 2))
            .unwrap_err();
        assert!(matches!(err, ComputeError::InvalidWorkers));
    }
}
