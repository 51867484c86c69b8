//! Outbound Notifications
//!
//! Rendering and delivery (email/voice/text) are external collaborators;
//! this module only defines the seam the dispute resolver dispatches
//! through, plus a tracing-backed implementation and a recording one for
//! tests.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

/// Customer contact details collected during a dispute.
#[derive(Debug, Clone)]
pub struct CustomerContact {
    pub email: String,
    pub name: Option<String>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Ask the customer for bank details to receive dispute proceeds.
    async fn bank_details_request(&self, contact: &CustomerContact, order_no: &str);

    /// Surface an escalation to manual review.
    async fn escalation(&self, order_no: &str, priority: &str);
}

/// Logs notification intents; delivery happens downstream.
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn bank_details_request(&self, contact: &CustomerContact, order_no: &str) {
        info!(
            order_no,
            email = %contact.email,
            "bank details collection notification dispatched"
        );
    }

    async fn escalation(&self, order_no: &str, priority: &str) {
        info!(order_no, priority, "dispute escalated to manual review");
    }
}

/// Records every notification for assertions in tests.
#[derive(Default)]
pub struct RecordingNotifier {
    pub bank_details: Mutex<Vec<(String, String)>>,
    pub escalations: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn bank_details_request(&self, contact: &CustomerContact, order_no: &str) {
        self.bank_details
            .lock()
            .unwrap()
            .push((order_no.to_string(), contact.email.clone()));
    }

    async fn escalation(&self, order_no: &str, priority: &str) {
        self.escalations
            .lock()
            .unwrap()
            .push((order_no.to_string(), priority.to_string()));
    }
}
