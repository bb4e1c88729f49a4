use axum::Json;
use axum::extract::State;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let observability = state.observability.snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "max_pixels": state.settings.max_pixels,
        "observability": {
            "render_requests_total": observability.render_requests_total,
            "rejected_requests_total": observability.rejected_requests_total,
            "queue_full_total": observability.queue_full_total,
            "render_failures_total": observability.render_failures_total,
        }
    }))
}
