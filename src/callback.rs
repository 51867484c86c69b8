//! Callback Reconciler
//!
//! Applies asynchronous completion events from external channels to order
//! state. Deliveries may be duplicated or arrive out of order; every status
//! transition is a set-to-value CAS so re-applying a payload is a no-op and
//! a terminal status is never regressed to a non-terminal one.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ServiceError;
use crate::order::OrderStatus;
use crate::store::OrderStore;
use crate::transfer::BindingRegistry;

/// Webhook body: `{notifyEvent, data: {...}}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackEnvelope {
    pub notify_event: String,
    pub data: CallbackPayload,
}

/// Completion payload from the external channel.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackPayload {
    /// Order reference; providers send `orderNo` or `transactionId`.
    #[serde(alias = "transactionId")]
    pub order_no: String,
    /// Reported backend status name
    pub status: String,
    pub amount: Option<String>,
    pub beneficiary: Option<String>,
    pub timestamp: Option<i64>,
}

/// How a delivery was handled. All three are acknowledged as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackDisposition {
    /// Status transition applied
    Applied,
    /// Re-delivery of an already-applied status
    Duplicate,
    /// Accepted but ignored: the order is already terminal
    Ignored,
}

/// Idempotent acknowledgment returned to the provider.
#[derive(Debug, Clone, Serialize)]
pub struct CallbackAck {
    pub order_no: String,
    pub disposition: CallbackDisposition,
    /// Order status after handling this delivery
    pub status: OrderStatus,
}

pub struct CallbackReconciler {
    store: Arc<dyn OrderStore>,
    bindings: Arc<BindingRegistry>,
}

impl CallbackReconciler {
    pub fn new(store: Arc<dyn OrderStore>, bindings: Arc<BindingRegistry>) -> Self {
        Self { store, bindings }
    }

    /// Apply one delivery.
    ///
    /// Malformed payloads and unknown orders are rejected without mutating
    /// anything; they are surfaced (never silently dropped) so the provider
    /// retries and operators can investigate.
    pub async fn apply(&self, payload: &CallbackPayload) -> Result<CallbackAck, ServiceError> {
        if payload.order_no.is_empty() {
            return Err(ServiceError::InvalidCallbackPayload(
                "missing order reference".to_string(),
            ));
        }

        let incoming = OrderStatus::parse(&payload.status).ok_or_else(|| {
            ServiceError::InvalidCallbackPayload(format!(
                "unrecognized status '{}'",
                payload.status
            ))
        })?;

        // CAS loop: a concurrent writer can move the guard at most a
        // handful of times before one side reaches a terminal decision.
        for _ in 0..4 {
            let order = match self.store.get(&payload.order_no).await? {
                Some(order) => order,
                None => {
                    warn!(order_no = %payload.order_no, "callback for unknown order");
                    return Err(ServiceError::InvalidCallbackPayload(format!(
                        "unknown order: {}",
                        payload.order_no
                    )));
                }
            };

            // Re-delivery of the status we already hold: acknowledged no-op.
            if order.actual_status == incoming {
                return Ok(CallbackAck {
                    order_no: order.order_no,
                    disposition: CallbackDisposition::Duplicate,
                    status: incoming,
                });
            }

            // Never regress a terminal status. Conflicting or late payloads
            // are acknowledged so the provider's retry loop terminates, but
            // state is left untouched.
            if order.actual_status.is_terminal() {
                if incoming.is_terminal() {
                    warn!(
                        order_no = %order.order_no,
                        current = %order.actual_status,
                        incoming = %incoming,
                        "conflicting terminal callback ignored"
                    );
                }
                return Ok(CallbackAck {
                    order_no: order.order_no,
                    disposition: CallbackDisposition::Ignored,
                    status: order.actual_status,
                });
            }

            let applied = self
                .store
                .update_status_if(&order.order_no, order.actual_status, incoming, incoming)
                .await?;

            if applied {
                self.bindings.consume(&order.order_no);
                info!(
                    order_no = %order.order_no,
                    from = %order.actual_status,
                    to = %incoming,
                    "callback applied"
                );
                return Ok(CallbackAck {
                    order_no: order.order_no,
                    disposition: CallbackDisposition::Applied,
                    status: incoming,
                });
            }
            // Guard moved under us; re-read and re-decide.
        }

        Err(ServiceError::Store(format!(
            "callback for {} lost CAS race repeatedly",
            payload.order_no
        )))
    }
}
