//! Mock seeding surface, compiled only with the `mock-api` feature.
//!
//! Lets demos and integration tests plant orders and backend statuses
//! without a real payment rail. Production builds must compile with
//! `--no-default-features` to exclude these routes.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, ok};
use crate::dispute::BackendStatus;
use crate::error::codes;
use crate::order::{OrderRecord, OrderStatus, now_ms};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockOrderRequest {
    pub order_no: String,
    pub principal_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Backdates `created_at` so delay gating can be exercised.
    #[serde(default)]
    pub age_secs: Option<i64>,
}

/// Seed one order directly into the store.
pub async fn mock_order(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MockOrderRequest>,
) -> ApiResult<Value> {
    let status = match request.status.as_deref() {
        Some(raw) => OrderStatus::parse(raw).ok_or_else(|| {
            ApiError::new(
                StatusCode::BAD_REQUEST,
                codes::VALIDATION_ERROR,
                format!("unknown status: {raw}"),
            )
        })?,
        None => OrderStatus::Pending,
    };

    let mut order = OrderRecord::new(
        &request.order_no,
        &request.principal_id,
        None,
        None,
        request.amount.unwrap_or(Decimal::new(100, 0)),
    );
    order.status = status;
    order.actual_status = status;
    if let Some(age) = request.age_secs {
        order.created_at = now_ms() - age * 1000;
    }
    state.store.insert(order).await?;

    ok(json!({ "orderNo": request.order_no }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockBackendStatusRequest {
    pub order_no: String,
    pub status: String,
}

/// Seed the authoritative status the dispute resolver will fetch.
pub async fn mock_backend_status(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MockBackendStatusRequest>,
) -> ApiResult<Value> {
    let backend = state.mock_backend.as_ref().ok_or_else(|| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::VALIDATION_ERROR,
            "mock backend is not active; a real backend URL is configured",
        )
    })?;

    backend.set(&request.order_no, BackendStatus::parse(&request.status));
    ok(json!({ "orderNo": request.order_no, "status": request.status }))
}
