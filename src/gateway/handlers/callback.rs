//! Provider webhook handler
//!
//! External completion providers deliver status notifications here. The
//! channel segment identifies the provider; delivery semantics are
//! at-least-once, so the reconciler behind this handler is idempotent.

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::info;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, ok};
use crate::callback::{CallbackAck, CallbackEnvelope};
use crate::error::codes;
use crate::transfer::CallbackProvider;

pub async fn provider_callback(
    State(state): State<Arc<AppState>>,
    Path(channel): Path<String>,
    Json(envelope): Json<CallbackEnvelope>,
) -> ApiResult<CallbackAck> {
    let provider = CallbackProvider::from_str(&channel).map_err(|_| {
        ApiError::new(
            StatusCode::NOT_FOUND,
            codes::NOT_FOUND,
            format!("unknown callback channel: {channel}"),
        )
    })?;

    info!(
        %provider,
        event = %envelope.notify_event,
        order_no = %envelope.data.order_no,
        "provider callback received"
    );

    let ack = state.reconciler.apply(&envelope.data).await?;
    ok(ack)
}
