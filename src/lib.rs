//! RemitFlow - Customer Service Automation for Cross-Border Transfers
//!
//! Backend for a conversational customer-service front end: verification-
//! gated transaction queries, two-stage transfer initiation with deferred
//! callback completion, idempotent webhook reconciliation, and dispute
//! resolution against the authoritative payment backend.
//!
//! # Modules
//!
//! - [`order`] - Transfer order model and status machine
//! - [`store`] - Order store trait, in-memory implementation
//! - [`persistence`] - PostgreSQL order store
//! - [`verification`] - Identity verification sessions with TTL expiry
//! - [`policy`] - Delay classification policy
//! - [`gate`] - Verification gate over transaction queries
//! - [`transfer`] - Two-stage transfer protocol and callback bindings
//! - [`callback`] - Idempotent webhook status reconciliation
//! - [`dispute`] - Dispute resolution against the authoritative backend
//! - [`tools`] - Tool-call dispatch for the conversational front end
//! - [`gateway`] - Axum HTTP surface
//! - [`notify`] - Customer notification seam

pub mod callback;
pub mod config;
pub mod dispute;
pub mod error;
pub mod gate;
pub mod gateway;
pub mod logging;
pub mod notify;
pub mod order;
pub mod persistence;
pub mod policy;
pub mod store;
pub mod tools;
pub mod transfer;
pub mod verification;


// Convenient re-exports at crate root
pub use callback::{CallbackAck, CallbackDisposition, CallbackPayload, CallbackReconciler};
pub use config::AppConfig;
pub use dispute::{DisputeResolver, DisputeScenario};
pub use error::ServiceError;
pub use gate::TransferAuthorizationGate;
pub use order::{OrderRecord, OrderStatus, OrderView};
pub use policy::DelayPolicy;
pub use store::{MemoryOrderStore, OrderStore};
pub use tools::{ToolCall, ToolRouter};
pub use transfer::{TransferArgs, TransferProtocol, TransferReceipt};
pub use verification::VerificationSessionStore;
