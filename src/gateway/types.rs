//! Gateway response envelope and error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{REMEDIATION_ACTIONS, ServiceError, codes};

/// Uniform response envelope: `{code, message, data}`.
///
/// The `code` field carries the outcome even on transports that always
/// answer HTTP 200 (the tool-call surface).
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: codes::OK,
            message: "success".to_string(),
            data: Some(data),
        }
    }
}

/// Gateway-level error: HTTP status plus the body envelope.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub message: String,
    pub data: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            data: None,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        let status = match &e {
            ServiceError::Validation { .. } | ServiceError::InvalidCallbackPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::VerificationFailed | ServiceError::AuthRequired { .. } => {
                StatusCode::UNAUTHORIZED
            }
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::UnknownBackendStatus(_) => StatusCode::OK,
            ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Backend(_) => StatusCode::BAD_GATEWAY,
        };
        let data = match &e {
            ServiceError::AuthRequired { reason } => Some(json!({
                "reason": reason,
                "actions": REMEDIATION_ACTIONS,
            })),
            _ => None,
        };
        Self {
            status,
            code: e.code(),
            message: e.to_string(),
            data,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "code": self.code,
            "message": self.message,
            "data": self.data,
        });
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Shorthand for a successful envelope.
pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let response = ApiResponse::success(json!({"x": 1}));
        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["code"], 200);
        assert_eq!(body["message"], "success");
        assert_eq!(body["data"]["x"], 1);
    }

    #[test]
    fn test_auth_required_maps_401_with_actions() {
        let err = ApiError::from(ServiceError::AuthRequired {
            reason: "delayed".to_string(),
        });
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.code, 401);
        assert!(err.data.is_some());
    }

    #[test]
    fn test_not_found_maps_404() {
        let err = ApiError::from(ServiceError::NotFound("X".to_string()));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, 404);
    }
}
