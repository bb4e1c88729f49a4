use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_ITERATIONS: u32 = 100;
pub const DEFAULT_ESCAPE_LIMIT: f64 = 2.0;
pub const DEFAULT_QUEUE_CAPACITY: usize = 5;
/// Covers an oversampled 4K viewport (5760 x 3240).
pub const DEFAULT_MAX_PIXELS: usize = 20_000_000;
pub const DEFAULT_STATIC_DIR: &str = "client/dist";

pub fn port() -> u16 {
    std::env::var("FRACTAL_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_PORT)
}

pub fn address() -> String {
    std::env::var("FRACTAL_ADDRESS")
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_ADDRESS.to_owned())
}

/// Worker-thread counts of the CPU renderers. More than one entry races
/// renderers of different widths against each other.
pub fn renderer_workers() -> Vec<usize> {
    let parsed: Vec<usize> = std::env::var("FRACTAL_WORKERS")
        .ok()
        .map(|value| {
            value
                .split(',')
                .filter_map(|part| part.trim().parse::<usize>().ok())
                .filter(|workers| *workers > 0)
                .collect()
        })
        .unwrap_or_default();
    if parsed.is_empty() {
        vec![default_workers()]
    } else {
        parsed
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

pub fn base_iterations() -> u32 {
    std::env::var("FRACTAL_ITERATIONS")
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_ITERATIONS)
}

pub fn escape_limit() -> f64 {
    std::env::var("FRACTAL_LIMIT")
        .ok()
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value > 0.0)
        .unwrap_or(DEFAULT_ESCAPE_LIMIT)
}

pub fn queue_capacity() -> usize {
    std::env::var("FRACTAL_QUEUE_CAPACITY")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_QUEUE_CAPACITY)
}

pub fn max_pixels() -> usize {
    std::env::var("FRACTAL_MAX_PIXELS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MAX_PIXELS)
}

pub fn static_dir() -> PathBuf {
    std::env::var("FRACTAL_STATIC_DIR")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR))
}
