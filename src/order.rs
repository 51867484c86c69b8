//! Order Model
//!
//! One remittance transaction and its status pair. `status` is the last
//! displayed status; `actual_status` is the most recently confirmed
//! authoritative status and is written only by the callback reconciler, an
//! authoritative re-query, or the dispute FAILED-correction path.

use std::fmt;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order status enumeration
///
/// Status IDs are designed for PostgreSQL storage as SMALLINT.
/// Terminal states: SUCCESS (10), FAILED (-10), CANCELLED (-20)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum OrderStatus {
    /// Payment issued, completion callback not yet received
    Pending = 0,

    /// Terminal: funds delivered
    Success = 10,

    /// Terminal: transfer failed upstream
    Failed = -10,

    /// Terminal: compensating cancellation applied
    Cancelled = -20,

    /// Anomalous: held for anti-money-laundering review.
    /// Always gated behind identity verification regardless of age.
    AmlHold = 20,
}

impl OrderStatus {
    /// Check if this is a terminal status (no more transitions expected)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Success | OrderStatus::Failed | OrderStatus::Cancelled
        )
    }

    /// Check if this status is flagged anomalous
    #[inline]
    pub fn is_anomalous(&self) -> bool {
        matches!(self, OrderStatus::AmlHold)
    }

    /// Get the numeric status ID for PostgreSQL storage
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    /// Convert from PostgreSQL status ID
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(OrderStatus::Pending),
            10 => Some(OrderStatus::Success),
            -10 => Some(OrderStatus::Failed),
            -20 => Some(OrderStatus::Cancelled),
            20 => Some(OrderStatus::AmlHold),
            _ => None,
        }
    }

    /// Get human-readable status name
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Success => "SUCCESS",
            OrderStatus::Failed => "FAILED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::AmlHold => "AML_HOLD",
        }
    }

    /// Parse a status name as delivered by external channels.
    /// Accepts any case; unknown names return None.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(OrderStatus::Pending),
            "SUCCESS" => Some(OrderStatus::Success),
            "FAILED" => Some(OrderStatus::Failed),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            "AML_HOLD" => Some(OrderStatus::AmlHold),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i16> for OrderStatus {
    type Error = ();

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        OrderStatus::from_id(value).ok_or(())
    }
}

/// Get current timestamp in milliseconds
#[inline]
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// One remittance transaction record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Unique, caller-visible order number (ULID for generated orders)
    pub order_no: String,
    /// Principal that created the order
    pub principal_id: String,
    /// Last displayed status
    pub status: OrderStatus,
    /// Most recently confirmed authoritative status
    pub actual_status: OrderStatus,
    /// Beneficiary account reference
    pub beneficiary_id: Option<String>,
    /// Beneficiary display name
    pub beneficiary_name: Option<String>,
    /// Send amount
    pub amount: Decimal,
    /// Created timestamp (millis)
    pub created_at: i64,
    /// Last updated timestamp (millis)
    pub updated_at: i64,
}

impl OrderRecord {
    /// Create a new order record in PENDING status
    pub fn new(
        order_no: impl Into<String>,
        principal_id: impl Into<String>,
        beneficiary_id: Option<String>,
        beneficiary_name: Option<String>,
        amount: Decimal,
    ) -> Self {
        let now = now_ms();
        Self {
            order_no: order_no.into(),
            principal_id: principal_id.into(),
            status: OrderStatus::Pending,
            actual_status: OrderStatus::Pending,
            beneficiary_id,
            beneficiary_name,
            amount,
            created_at: now,
            updated_at: now,
        }
    }

    /// Order age in seconds relative to `now_ms`
    #[inline]
    pub fn age_secs(&self, now_ms: i64) -> i64 {
        (now_ms - self.created_at) / 1000
    }
}

impl fmt::Display for OrderRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order[{}] principal={} amount={} status={} actual={}",
            self.order_no, self.principal_id, self.amount, self.status, self.actual_status
        )
    }
}

/// Caller-facing view of an order (returned by the authorization gate)
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub order_no: String,
    pub status: &'static str,
    pub amount: Decimal,
    pub beneficiary_name: Option<String>,
    pub created_at: i64,
}

impl From<&OrderRecord> for OrderView {
    fn from(record: &OrderRecord) -> Self {
        Self {
            order_no: record.order_no.clone(),
            status: record.status.as_str(),
            amount: record.amount,
            beneficiary_name: record.beneficiary_name.clone(),
            created_at: record.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Success.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());

        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::AmlHold.is_terminal());
    }

    #[test]
    fn test_anomalous_statuses() {
        assert!(OrderStatus::AmlHold.is_anomalous());
        assert!(!OrderStatus::Pending.is_anomalous());
        assert!(!OrderStatus::Success.is_anomalous());
    }

    #[test]
    fn test_status_id_roundtrip() {
        let statuses = [
            OrderStatus::Pending,
            OrderStatus::Success,
            OrderStatus::Failed,
            OrderStatus::Cancelled,
            OrderStatus::AmlHold,
        ];

        for status in statuses {
            let id = status.id();
            let recovered = OrderStatus::from_id(id).unwrap();
            assert_eq!(status, recovered);
        }
    }

    #[test]
    fn test_invalid_status_id() {
        assert!(OrderStatus::from_id(999).is_none());
        assert!(OrderStatus::from_id(-999).is_none());
    }

    #[test]
    fn test_parse() {
        assert_eq!(OrderStatus::parse("SUCCESS"), Some(OrderStatus::Success));
        assert_eq!(OrderStatus::parse("success"), Some(OrderStatus::Success));
        assert_eq!(OrderStatus::parse("aml_hold"), Some(OrderStatus::AmlHold));
        assert_eq!(OrderStatus::parse("SETTLED"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }

    #[test]
    fn test_record_new() {
        let record = OrderRecord::new(
            "ORD123",
            "agent-1",
            Some("BEN-9".to_string()),
            Some("Amara Osei".to_string()),
            Decimal::new(25000, 2),
        );

        assert_eq!(record.status, OrderStatus::Pending);
        assert_eq!(record.actual_status, OrderStatus::Pending);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_age_secs() {
        let mut record = OrderRecord::new("ORD1", "agent-1", None, None, Decimal::ONE);
        record.created_at = 1_000_000;
        assert_eq!(record.age_secs(1_000_000 + 900_000), 900);
        assert_eq!(record.age_secs(1_000_000), 0);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&OrderStatus::AmlHold).unwrap();
        assert_eq!(json, "\"AML_HOLD\"");
        let back: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(back, OrderStatus::Cancelled);
    }
}
