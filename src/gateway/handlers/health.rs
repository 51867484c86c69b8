//! Health check handler

use axum::Json;
use serde::Serialize;

use super::super::types::ApiResponse;
use crate::order::now_ms;

#[derive(Serialize)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    pub timestamp_ms: i64,
}

/// Liveness probe. Deliberately exposes no internal detail.
pub async fn health_check() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        timestamp_ms: now_ms(),
    }))
}
