use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config;
use crate::render::FractalGenerator;

/// Per-request rendering knobs, fixed at startup.
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub base_iterations: u32,
    pub escape_limit: f64,
    pub max_pixels: usize,
}

impl RenderSettings {
    pub fn from_env() -> Self {
        Self {
            base_iterations: config::base_iterations(),
            escape_limit: config::escape_limit(),
            max_pixels: config::max_pixels(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub renderer: Arc<dyn FractalGenerator>,
    pub settings: RenderSettings,
    pub observability: Arc<ObservabilityCounters>,
}

impl AppState {
    pub fn new(renderer: Arc<dyn FractalGenerator>, settings: RenderSettings) -> Self {
        Self {
            renderer,
            settings,
            observability: Arc::new(ObservabilityCounters::default()),
        }
    }
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    render_requests_total: AtomicU64,
    rejected_requests_total: AtomicU64,
    queue_full_total: AtomicU64,
    render_failures_total: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct ObservabilitySnapshot {
    pub render_requests_total: u64,
    pub rejected_requests_total: u64,
    pub queue_full_total: u64,
    pub render_failures_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            render_requests_total: self.render_requests_total.load(Ordering::Relaxed),
            rejected_requests_total: self.rejected_requests_total.load(Ordering::Relaxed),
            queue_full_total: self.queue_full_total.load(Ordering::Relaxed),
            render_failures_total: self.render_failures_total.load(Ordering::Relaxed),
        }
    }

    pub fn record_render_request(&self) {
        self.render_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_request(&self) {
        self.rejected_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_queue_full(&self) {
        self.queue_full_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_render_failure(&self) {
        self.render_failures_total.fetch_add(1, Ordering::Relaxed);
    }
}
