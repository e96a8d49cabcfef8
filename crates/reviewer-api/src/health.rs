use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use reviewer_types::api::HealthResponse;
use serde_json::json;
use tracing::error;

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> Response {
    match state.service.health_check().await {
        Ok(()) => Json(HealthResponse { status: "healthy" }).into_response(),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
