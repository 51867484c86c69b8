//! Two-Stage Transfer Protocol
//!
//! Discovery → confirmation → pending-callback transfer.
//!
//! # Flow
//!
//! ```text
//! discover(partial args) ──▶ FieldRequirements        (pure, repeatable)
//! confirm(full args)     ──▶ Order[PENDING]
//!                            + CallbackBinding
//!                            + payment link           (returns immediately)
//!                  ... external payment surface ...
//! webhook delivery       ──▶ CallbackReconciler       (separate inbound path)
//! ```
//!
//! # Safety Invariants
//!
//! 1. Stage 1 has no side effects; only stage 2 mutates.
//! 2. Exactly one active callback binding per order; later bindings supersede.
//! 3. Confirm is not cancelable once the order exists; compensation is the
//!    explicit CANCELLED transition.

pub mod binding;
pub mod protocol;
pub mod types;

pub use binding::{BindingRegistry, CallbackBinding, new_callback_token};
pub use protocol::TransferProtocol;
pub use types::{
    CallbackProvider, FieldRequirement, FieldRequirements, TransferArgs, TransferReceipt,
};
