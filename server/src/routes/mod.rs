pub mod api;
pub mod fractal;
