//! Dispute Resolver
//!
//! Deterministic state machine over the freshly fetched backend status.
//! Classification is a closed enum match: the same backend status and order
//! always yield the same scenario. The FAILED correction is the only path
//! outside the callback reconciler allowed to write `actual_status`;
//! SUCCESS and PENDING never mutate it, so two call sites cannot race the
//! same field under different truth sources.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::ServiceError;
use crate::notify::{CustomerContact, Notifier};
use crate::order::{OrderStatus, now_ms};
use crate::store::OrderStore;
use crate::verification::VerificationSessionStore;

use super::backend::{BackendStatus, BackendStatusSource};

/// Escalation priority and resolution SLA for unknown statuses.
const ESCALATION_PRIORITY: &str = "high";
const ESCALATION_SLA_HOURS: u32 = 4;
/// Deterministic ETA surfaced for still-pending transactions.
const PENDING_ETA_HOURS: u32 = 24;

/// Scenario classification of one reconciliation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeScenario {
    FailedTransaction,
    CompletedTransaction,
    PendingTransaction,
    UnknownStatus,
}

impl DisputeScenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisputeScenario::FailedTransaction => "failed_transaction",
            DisputeScenario::CompletedTransaction => "completed_transaction",
            DisputeScenario::PendingTransaction => "pending_transaction",
            DisputeScenario::UnknownStatus => "unknown_status",
        }
    }
}

/// Derived record of one reconciliation attempt. Always recomputed from the
/// order plus a fresh authoritative fetch; never stored as system of record.
#[derive(Debug, Clone, Serialize)]
pub struct DisputeCase {
    pub order_no: String,
    pub app_status: OrderStatus,
    pub backend_status: String,
    pub has_discrepancy: bool,
    pub scenario: DisputeScenario,
    pub generated_at: i64,
}

/// Deterministic processing detail for pending transactions.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingDetails {
    pub state: &'static str,
    pub eta_hours: u32,
}

/// Escalation record for unknown statuses.
#[derive(Debug, Clone, Serialize)]
pub struct Escalation {
    pub escalated_at: i64,
    pub priority: &'static str,
    pub sla_hours: u32,
}

/// Full resolution returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct DisputeResolution {
    pub case: DisputeCase,
    pub refund_initiated: bool,
    /// True when the caller must supply customer contact details before a
    /// bank-details form can be sent.
    pub contact_requested: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing: Option<ProcessingDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation: Option<Escalation>,
    pub next_step: String,
}

/// One dispute request against a specific order.
#[derive(Debug, Clone)]
pub struct DisputeRequest {
    pub order_no: String,
    pub dispute_type: String,
    pub contact: Option<CustomerContact>,
}

pub struct DisputeResolver {
    store: Arc<dyn OrderStore>,
    sessions: Arc<VerificationSessionStore>,
    backend: Arc<dyn BackendStatusSource>,
    notifier: Arc<dyn Notifier>,
}

impl DisputeResolver {
    pub fn new(
        store: Arc<dyn OrderStore>,
        sessions: Arc<VerificationSessionStore>,
        backend: Arc<dyn BackendStatusSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            sessions,
            backend,
            notifier,
        }
    }

    /// Pure classification of a backend status.
    pub fn classify(status: &BackendStatus) -> DisputeScenario {
        match status {
            BackendStatus::Failed => DisputeScenario::FailedTransaction,
            BackendStatus::Success => DisputeScenario::CompletedTransaction,
            BackendStatus::Pending => DisputeScenario::PendingTransaction,
            BackendStatus::Cancelled | BackendStatus::Unknown(_) => DisputeScenario::UnknownStatus,
        }
    }

    /// Resolve one dispute.
    ///
    /// This is a second checkpoint independent of the authorization gate:
    /// dispute resolution is invoked directly by a principal, so it demands
    /// a live verification session before revealing any status detail.
    pub async fn resolve(
        &self,
        principal_id: &str,
        request: &DisputeRequest,
    ) -> Result<DisputeResolution, ServiceError> {
        if !self.sessions.is_verified(principal_id) {
            return Err(ServiceError::AuthRequired {
                reason: "dispute resolution requires identity verification".to_string(),
            });
        }

        let order = self
            .store
            .get(&request.order_no)
            .await?
            .ok_or_else(|| ServiceError::NotFound(request.order_no.clone()))?;

        // Always a fresh authoritative fetch, never the cached status.
        let backend_status = self.backend.fetch(&request.order_no).await?;
        let scenario = Self::classify(&backend_status);
        let has_discrepancy = !backend_status.matches(order.status);

        let case = DisputeCase {
            order_no: order.order_no.clone(),
            app_status: order.status,
            backend_status: backend_status.to_string(),
            has_discrepancy,
            scenario,
            generated_at: now_ms(),
        };

        info!(
            order_no = %order.order_no,
            scenario = scenario.as_str(),
            has_discrepancy,
            dispute_type = %request.dispute_type,
            "dispute classified"
        );

        let mut resolution = DisputeResolution {
            case,
            refund_initiated: false,
            contact_requested: false,
            processing: None,
            escalation: None,
            next_step: String::new(),
        };

        match scenario {
            DisputeScenario::FailedTransaction => {
                self.correct_to_failed(&order.order_no).await?;
                resolution.refund_initiated = true;
                resolution.next_step =
                    "refund initiated to the original funding source".to_string();
            }
            DisputeScenario::CompletedTransaction => match &request.contact {
                Some(contact) => {
                    self.notifier
                        .bank_details_request(contact, &order.order_no)
                        .await;
                    resolution.next_step =
                        "bank details collection notification sent to the customer".to_string();
                }
                None => {
                    resolution.contact_requested = true;
                    resolution.next_step =
                        "provide customer email to receive the bank details form".to_string();
                }
            },
            DisputeScenario::PendingTransaction => {
                resolution.processing = Some(ProcessingDetails {
                    state: "processing",
                    eta_hours: PENDING_ETA_HOURS,
                });
                resolution.next_step = format!(
                    "transaction is still processing; expected completion within {PENDING_ETA_HOURS} hours"
                );
            }
            DisputeScenario::UnknownStatus => {
                warn!(
                    order_no = %order.order_no,
                    backend_status = %backend_status,
                    "unknown backend status, escalating"
                );
                self.notifier
                    .escalation(&order.order_no, ESCALATION_PRIORITY)
                    .await;
                resolution.escalation = Some(Escalation {
                    escalated_at: now_ms(),
                    priority: ESCALATION_PRIORITY,
                    sla_hours: ESCALATION_SLA_HOURS,
                });
                resolution.next_step = format!(
                    "escalated to manual review; resolution within {ESCALATION_SLA_HOURS} hours"
                );
            }
        }

        Ok(resolution)
    }

    /// FAILED-correction: CAS the local status pair to FAILED.
    async fn correct_to_failed(&self, order_no: &str) -> Result<(), ServiceError> {
        for _ in 0..4 {
            let order = self
                .store
                .get(order_no)
                .await?
                .ok_or_else(|| ServiceError::NotFound(order_no.to_string()))?;

            if order.actual_status == OrderStatus::Failed {
                return Ok(());
            }

            let applied = self
                .store
                .update_status_if(
                    order_no,
                    order.actual_status,
                    OrderStatus::Failed,
                    OrderStatus::Failed,
                )
                .await?;
            if applied {
                info!(order_no, "local status corrected to FAILED");
                return Ok(());
            }
        }

        Err(ServiceError::Store(format!(
            "failed-status correction for {order_no} lost CAS race repeatedly"
        )))
    }
}
