//! Delay Policy
//!
//! Pure predicate deciding whether targeted lookup of an order must be
//! gated behind identity verification. Aggregate listings are never gated:
//! bulk listing exposes no sensitive single-transaction detail, a targeted
//! dispute does.

use crate::order::OrderRecord;

/// Verification-gating policy over order age and status.
#[derive(Debug, Clone, Copy)]
pub struct DelayPolicy {
    delay_threshold_secs: i64,
}

impl DelayPolicy {
    pub fn new(delay_threshold_secs: u64) -> Self {
        Self {
            delay_threshold_secs: delay_threshold_secs as i64,
        }
    }

    /// An order is delayed when it is older than the threshold while still
    /// not in a terminal state.
    #[inline]
    pub fn is_delayed(&self, order: &OrderRecord, now_ms: i64) -> bool {
        !order.status.is_terminal() && order.age_secs(now_ms) > self.delay_threshold_secs
    }

    /// Targeted lookup of this order requires a verified principal when the
    /// order is delayed, or anomalous regardless of age.
    #[inline]
    pub fn requires_verification(&self, order: &OrderRecord, now_ms: i64) -> bool {
        self.is_delayed(order, now_ms) || order.status.is_anomalous()
    }
}
