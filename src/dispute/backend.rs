//! Authoritative Backend Status Source
//!
//! Dispute resolution never trusts the locally cached status; it re-queries
//! the authoritative transaction backend through this seam. Production
//! wiring uses the HTTP source; tests and the `mock-api` feature use the
//! deterministic in-memory source.

use std::fmt;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use tracing::debug;

use crate::error::ServiceError;
use crate::order::OrderStatus;

/// Authoritative, externally sourced transaction state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Pending,
    Success,
    Failed,
    Cancelled,
    /// Anything the backend reports that we do not model. A real,
    /// enumerated state rather than an implicit catch-all branch.
    Unknown(String),
}

impl BackendStatus {
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "PENDING" => BackendStatus::Pending,
            "SUCCESS" => BackendStatus::Success,
            "FAILED" => BackendStatus::Failed,
            "CANCELLED" => BackendStatus::Cancelled,
            other => BackendStatus::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BackendStatus::Pending => "PENDING",
            BackendStatus::Success => "SUCCESS",
            BackendStatus::Failed => "FAILED",
            BackendStatus::Cancelled => "CANCELLED",
            BackendStatus::Unknown(raw) => raw,
        }
    }

    /// True when the cached order status already reflects this backend
    /// status (no discrepancy).
    pub fn matches(&self, status: OrderStatus) -> bool {
        matches!(
            (self, status),
            (BackendStatus::Pending, OrderStatus::Pending)
                | (BackendStatus::Success, OrderStatus::Success)
                | (BackendStatus::Failed, OrderStatus::Failed)
                | (BackendStatus::Cancelled, OrderStatus::Cancelled)
        )
    }
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[async_trait]
pub trait BackendStatusSource: Send + Sync {
    /// Fetch the current authoritative status for an order.
    async fn fetch(&self, order_no: &str) -> Result<BackendStatus, ServiceError>;
}

/// Deterministic in-memory source. Orders without a seeded status report
/// `Unknown("UNAVAILABLE")`, which routes to the escalation path.
#[derive(Default)]
pub struct StaticBackendStatusSource {
    statuses: DashMap<String, BackendStatus>,
}

impl StaticBackendStatusSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, order_no: &str, status: BackendStatus) {
        self.statuses.insert(order_no.to_string(), status);
    }
}

#[async_trait]
impl BackendStatusSource for StaticBackendStatusSource {
    async fn fetch(&self, order_no: &str) -> Result<BackendStatus, ServiceError> {
        match self.statuses.get(order_no) {
            Some(status) => Ok(status.clone()),
            None => {
                debug!(order_no, "no seeded backend status");
                Ok(BackendStatus::Unknown("UNAVAILABLE".to_string()))
            }
        }
    }
}

/// HTTP source querying the real transaction backend.
pub struct HttpBackendStatusSource {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: String,
}

impl HttpBackendStatusSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl BackendStatusSource for HttpBackendStatusSource {
    async fn fetch(&self, order_no: &str) -> Result<BackendStatus, ServiceError> {
        let url = format!("{}/transactions/{}/status", self.base_url, order_no);
        let body: StatusBody = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ServiceError::Backend(e.to_string()))?
            .error_for_status()
            .map_err(|e| ServiceError::Backend(e.to_string()))?
            .json()
            .await
            .map_err(|e| ServiceError::Backend(e.to_string()))?;

        Ok(BackendStatus::parse(&body.status))
    }
}
