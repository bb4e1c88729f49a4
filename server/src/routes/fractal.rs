use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use fractal_viewer_shared::{FractalRequest, FractalResponse};

use crate::render::{ComputeError, FractalParameters};
use crate::state::{AppState, RenderSettings};

/// `GET /fractal?centerx&centery&zoom&resx&resy`
///
/// Missing or unparsable parameters are rejected by the `Query` extractor
/// with `400` before this runs.
pub async fn get_fractal(
    State(state): State<AppState>,
    Query(request): Query<FractalRequest>,
) -> Result<Json<FractalResponse>, StatusCode> {
    state.observability.record_render_request();
    if let Err(reason) = validate_request(&request, &state.settings) {
        state.observability.record_rejected_request();
        tracing::debug!(?request, reason, "rejected fractal request");
        return Err(StatusCode::BAD_REQUEST);
    }

    let params = FractalParameters::from_request(
        &request,
        state.settings.base_iterations,
        state.settings.escape_limit,
    );
    let renderer = Arc::clone(&state.renderer);
    let started = Instant::now();
    let rendered = tokio::task::spawn_blocking(move || renderer.compute(&params)).await;

    let pixels = match rendered {
        Ok(Ok(pixels)) => pixels,
        Ok(Err(ComputeError::QueueFull)) => {
            state.observability.record_queue_full();
            tracing::warn!(
                resx = request.res_x,
                resy = request.res_y,
                "render queue full, shedding request"
            );
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
        Ok(Err(e)) => {
            state.observability.record_render_failure();
            tracing::error!(error = %e, "fractal render failed");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Err(e) => {
            state.observability.record_render_failure();
            tracing::error!(error = %e, "fractal render task failed");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let response = FractalResponse::from_pixels(request.res_x, request.res_y, &pixels);
    tracing::info!(
        centerx = request.center_x,
        centery = request.center_y,
        zoom = request.zoom,
        resx = request.res_x,
        resy = request.res_y,
        iterations = params.iterations,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "rendered fractal"
    );
    Ok(Json(response))
}

fn validate_request(request: &FractalRequest, settings: &RenderSettings) -> Result<(), &'static str> {
    if !request.center_x.is_finite() || !request.center_y.is_finite() {
        return Err("center must be finite");
    }
    if !request.zoom.is_finite() || request.zoom <= 0.0 {
        return Err("zoom must be positive");
    }
    if request.res_x == 0 || request.res_y == 0 {
        return Err("resolution must be non-zero");
    }
    if request.pixel_count() > settings.max_pixels {
        return Err("resolution exceeds pixel budget");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::path::Path;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use fractal_viewer_shared::ViewState;
    use fractal_viewer_shared::redraw::tile_request;

    use super::*;
    use crate::render::{CpuRenderer, FractalGenerator, Queued};

    fn settings() -> RenderSettings {
        RenderSettings {
            base_iterations: 50,
            escape_limit: 2.0,
            max_pixels: 10_000,
        }
    }

    fn test_state(renderer: Arc<dyn FractalGenerator>) -> AppState {
        AppState::new(renderer, settings())
    }

    async fn spawn_test_server(state: AppState) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let app = crate::app::build_app(state, Path::new("does-not-exist"));
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test app");
        });
        (addr, handle)
    }

    async fn status_for(state: AppState, uri: &str) -> StatusCode {
        let app = crate::app::build_app(state, Path::new("does-not-exist"));
        app.oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router response")
            .status()
    }

    #[test]
    fn validation_rejects_degenerate_views() {
        let ok = FractalRequest {
            center_x: -0.5,
            center_y: 0.0,
            zoom: 200.0,
            res_x: 60,
            res_y: 45,
        };
        assert_eq!(validate_request(&ok, &settings()), Ok(()));
        assert!(validate_request(&FractalRequest { zoom: 0.0, ..ok }, &settings()).is_err());
        assert!(validate_request(&FractalRequest { zoom: f64::NAN, ..ok }, &settings()).is_err());
        assert!(validate_request(&FractalRequest { res_x: 0, ..ok }, &settings()).is_err());
        assert!(
            validate_request(&FractalRequest { center_y: f64::INFINITY, ..ok }, &settings())
                .is_err()
        );
        assert!(
            validate_request(&FractalRequest { res_x: 101, res_y: 100, ..ok }, &settings())
                .is_err()
        );
    }

    #[test]
    fn default_budget_admits_full_screen_tiles() {
        let defaults = RenderSettings {
            base_iterations: crate::config::DEFAULT_ITERATIONS,
            escape_limit: crate::config::DEFAULT_ESCAPE_LIMIT,
            max_pixels: crate::config::DEFAULT_MAX_PIXELS,
        };
        for (res_x, res_y) in [(1920, 1080), (2560, 1440), (3840, 2160)] {
            let request = tile_request(&ViewState::new(res_x, res_y));
            assert_eq!(
                validate_request(&request, &defaults),
                Ok(()),
                "{res_x}x{res_y} viewport"
            );
        }
    }

    #[tokio::test]
    async fn fractal_endpoint_returns_decodable_bitmap() {
        let state = test_state(Arc::new(CpuRenderer::new(2)));
        let (addr, server_handle) = spawn_test_server(state.clone()).await;

        let response = reqwest::Client::new()
            .get(format!(
                "http://{addr}/fractal?centerx=-0.5&centery=0&zoom=200&resx=61&resy=45"
            ))
            .send()
            .await
            .expect("fractal request")
            .error_for_status()
            .expect("fractal status");
        assert_eq!(
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
        let body = response
            .json::<FractalResponse>()
            .await
            .expect("parse fractal response");

        assert_eq!((body.res_x, body.res_y), (61, 45));
        let image = body.decode().expect("decode bitmap");
        assert_eq!(image.pixels.len(), 61 * 45);
        // The view is centered on -0.5 + 0i, well inside the main cardioid.
        assert!(image.pixels[22 * 61 + 30]);

        let health = reqwest::get(format!("http://{addr}/health"))
            .await
            .expect("health request")
            .json::<serde_json::Value>()
            .await
            .expect("parse health");
        assert_eq!(health["status"], "ok");
        assert_eq!(health["observability"]["render_requests_total"], 1);

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn zoomed_out_view_has_escaping_corners() {
        let state = test_state(Arc::new(CpuRenderer::new(1)));
        let (addr, server_handle) = spawn_test_server(state).await;

        let body = reqwest::get(format!(
            "http://{addr}/fractal?centerx=-0.5&centery=0&zoom=10&resx=50&resy=40"
        ))
        .await
        .expect("fractal request")
        .json::<FractalResponse>()
        .await
        .expect("parse fractal response");
        let image = body.decode().expect("decode bitmap");
        // Top-left corner is about -2.95 + 1.95i.
        assert!(!image.pixels[0]);
        assert!(image.pixels[20 * 50 + 25]);

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn bad_parameters_are_rejected() {
        let state = test_state(Arc::new(CpuRenderer::new(1)));
        assert_eq!(
            status_for(state.clone(), "/fractal?centerx=0&centery=0&zoom=1&resx=10").await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(state.clone(), "/fractal?centerx=a&centery=0&zoom=1&resx=10&resy=10").await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(state.clone(), "/fractal?centerx=0&centery=0&zoom=0&resx=10&resy=10").await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(state.clone(), "/fractal?centerx=0&centery=0&zoom=1&resx=1000&resy=1000")
                .await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(state.observability.snapshot().rejected_requests_total, 2);
    }

    #[tokio::test]
    async fn full_queue_maps_to_service_unavailable() {
        let state = test_state(Arc::new(Queued::new(CpuRenderer::new(1), 0)));
        assert_eq!(
            status_for(state.clone(), "/fractal?centerx=0&centery=0&zoom=1&resx=4&resy=4").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(state.observability.snapshot().queue_full_total, 1);
    }

    #[tokio::test]
    async fn renderer_failure_maps_to_internal_error() {
        let state = test_state(Arc::new(CpuRenderer::new(0)));
        assert_eq!(
            status_for(state.clone(), "/fractal?centerx=0&centery=0&zoom=1&resx=4&resy=4").await,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(state.observability.snapshot().render_failures_total, 1);
    }
}
