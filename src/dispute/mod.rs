//! Dispute handling: authoritative-status reconciliation for completed,
//! failed, pending, or unrecognized transactions.

pub mod backend;
pub mod resolver;

pub use backend::{BackendStatus, BackendStatusSource, HttpBackendStatusSource, StaticBackendStatusSource};
pub use resolver::{
    DisputeCase, DisputeRequest, DisputeResolution, DisputeResolver, DisputeScenario, Escalation,
    ProcessingDetails,
};
