mod app;
mod config;
mod render;
mod routes;
mod state;

use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::render::{CpuRenderer, FractalGenerator, Queued, Race};
use crate::state::{AppState, RenderSettings};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let workers = config::renderer_workers();
    let queue_capacity = config::queue_capacity();
    let settings = RenderSettings::from_env();
    let renderer = build_renderer(&workers, queue_capacity);
    tracing::info!(
        ?workers,
        queue_capacity,
        base_iterations = settings.base_iterations,
        escape_limit = settings.escape_limit,
        max_pixels = settings.max_pixels,
        "Computing on CPU"
    );

    let static_dir = config::static_dir();
    if !static_dir.is_dir() {
        tracing::warn!(dir = %static_dir.display(), "static client directory not found");
    }
    let app = app::build_app(AppState::new(renderer, settings), &static_dir);

    let addr = format!("{}:{}", config::address(), config::port());
    tracing::info!("Fractal viewer listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind TCP listener");
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
    }

    tracing::info!("Server shut down gracefully");
}

/// One CPU renderer per worker count (raced when there are several),
/// behind a bounded queue.
fn build_renderer(workers: &[usize], queue_capacity: usize) -> Arc<dyn FractalGenerator> {
    match workers {
        [single] => Arc::new(Queued::new(CpuRenderer::new(*single), queue_capacity)),
        many => {
            let racers = many
                .iter()
                .map(|&n| Arc::new(CpuRenderer::new(n)) as Arc<dyn FractalGenerator>)
                .collect();
            Arc::new(Queued::new(Race::new(racers), queue_capacity))
        }
    }
}

async fn shutdown_signal() {
    let received = tokio::select! {
        () = interrupt() => "ctrl-c",
        () = terminate() => "SIGTERM",
    };
    tracing::info!(signal = received, "Shutdown signal received");
}

/// Resolves on Ctrl-C. Never resolves if the handler can't be installed.
async fn interrupt() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to install SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
