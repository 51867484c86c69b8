//! Tool-call handler
//!
//! The conversational front end posts tool calls here. The principal is
//! identified by the `x-principal-id` header set by the front end after its
//! own session handling. This transport always answers HTTP 200; the
//! outcome code travels in the body envelope.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::Value;

use super::super::state::AppState;
use crate::tools::ToolCall;

const PRINCIPAL_HEADER: &str = "x-principal-id";
const ANONYMOUS_PRINCIPAL: &str = "anonymous";

pub async fn tool_call(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(call): Json<ToolCall>,
) -> Json<Value> {
    let principal_id = headers
        .get(PRINCIPAL_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .unwrap_or(ANONYMOUS_PRINCIPAL);

    Json(state.tools.dispatch(principal_id, &call).await)
}
