//! Transfer Authorization Gate
//!
//! The single enforcement point for delayed-order detail. Every targeted
//! order lookup passes through here; no other component may reveal detail
//! for a delayed order to an unverified principal.

use std::sync::Arc;

use tracing::debug;

use crate::error::ServiceError;
use crate::order::{OrderView, now_ms};
use crate::policy::DelayPolicy;
use crate::store::OrderStore;
use crate::verification::VerificationSessionStore;

/// A transaction query as submitted by a caller.
#[derive(Debug, Clone)]
pub enum OrderQuery {
    /// Targeted lookup of one specific order
    ByOrderNo(String),
    /// Aggregate listing of the principal's most recent orders
    Recent(usize),
}

/// Authorized result of a query.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    Single(OrderView),
    Listing(Vec<OrderView>),
}

pub struct TransferAuthorizationGate {
    store: Arc<dyn OrderStore>,
    sessions: Arc<VerificationSessionStore>,
    policy: DelayPolicy,
}

impl TransferAuthorizationGate {
    pub fn new(
        store: Arc<dyn OrderStore>,
        sessions: Arc<VerificationSessionStore>,
        policy: DelayPolicy,
    ) -> Self {
        Self {
            store,
            sessions,
            policy,
        }
    }

    /// Resolve the query, rejecting targeted lookups of delayed orders by
    /// unverified principals with `AuthRequired`.
    ///
    /// Unknown order numbers are `NotFound`, distinct from `AuthRequired`,
    /// so callers can tell "doesn't exist" from "exists but hidden".
    pub async fn authorize(
        &self,
        principal_id: &str,
        query: OrderQuery,
    ) -> Result<QueryOutcome, ServiceError> {
        match query {
            OrderQuery::Recent(count) => {
                let orders = self.store.list_recent(principal_id, count).await?;
                let views = orders.iter().map(OrderView::from).collect();
                Ok(QueryOutcome::Listing(views))
            }
            OrderQuery::ByOrderNo(order_no) => {
                let order = self
                    .store
                    .get(&order_no)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound(order_no.clone()))?;

                if self.policy.requires_verification(&order, now_ms())
                    && !self.sessions.is_verified(principal_id)
                {
                    debug!(principal_id, order_no, "delayed order lookup blocked");
                    return Err(ServiceError::AuthRequired {
                        reason: "transaction is delayed or flagged; identity verification is required to view its detail".to_string(),
                    });
                }

                Ok(QueryOutcome::Single(OrderView::from(&order)))
            }
        }
    }
}
