use std::path::Path;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;

use crate::routes;
use crate::state::AppState;

pub(crate) fn build_app(state: AppState, static_dir: &Path) -> Router {
    let static_assets = Router::new()
        .fallback_service(
            ServeDir::new(static_dir)
                .precompressed_br()
                .precompressed_gzip(),
        )
        .layer(middleware::from_fn(apply_cache_policy));

    let app = Router::new()
        .route("/fractal", axum::routing::get(routes::fractal::get_fractal))
        .route("/health", axum::routing::get(routes::api::health));

    app.layer(CompressionLayer::new())
        .fallback_service(static_assets)
        .with_state(state)
}

/// Applies the path's cache policy to successful static responses that
/// don't already carry one.
async fn apply_cache_policy(request: Request, next: Next) -> Response {
    let policy = cache_control_for_path(request.uri().path());
    let mut response = next.run(request).await;

    if let Some(policy) = policy.filter(|_| response.status().is_success()) {
        response
            .headers_mut()
            .entry(header::CACHE_CONTROL)
            .or_insert(HeaderValue::from_static(policy));
    }
    response
}

/// Hashed bundle assets are immutable; the page is always revalidated.
fn cache_control_for_path(path: &str) -> Option<&'static str> {
    if is_hashed_bundle_asset(path) {
        return Some("public, max-age=31536000, immutable");
    }
    if path == "/" || path.ends_with(".html") {
        return Some("no-cache");
    }
    None
}

fn is_hashed_bundle_asset(path: &str) -> bool {
    let path = Path::new(path);
    let is_bundle = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("wasm" | "js" | "css")
    );
    is_bundle
        && path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| stem.split(['-', '_']).any(is_content_hash))
}

fn is_content_hash(segment: &str) -> bool {
    segment.len() >= 8 && segment.bytes().all(|b| b.is_ascii_hexdigit())
}
