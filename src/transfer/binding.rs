//! Callback Bindings
//!
//! Links one in-flight transfer to one external completion channel.
//! Exactly one binding is active per order at a time; a later binding for
//! the same order supersedes rather than duplicates. Consumption is
//! tolerant of zero, one, or many webhook deliveries.

use dashmap::DashMap;
use rand::Rng;

use super::types::CallbackProvider;

/// One callback binding for an in-flight transfer.
#[derive(Debug, Clone)]
pub struct CallbackBinding {
    pub order_no: String,
    pub provider: CallbackProvider,
    pub callback_url: String,
    pub callback_token: String,
    pub consumed: bool,
}

/// Generate an opaque callback token (16 random bytes, hex).
pub fn new_callback_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill(&mut bytes[..]);
    hex::encode(bytes)
}

/// Registry of active callback bindings, keyed by order number.
#[derive(Default)]
pub struct BindingRegistry {
    bindings: DashMap<String, CallbackBinding>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a binding, superseding any existing binding for the order.
    pub fn install(&self, binding: CallbackBinding) {
        self.bindings.insert(binding.order_no.clone(), binding);
    }

    pub fn get(&self, order_no: &str) -> Option<CallbackBinding> {
        self.bindings.get(order_no).map(|b| b.clone())
    }

    /// Mark the binding consumed and return its pre-consumption snapshot.
    /// Re-consuming an already consumed binding is allowed (webhook
    /// re-delivery) and reported via the snapshot's `consumed` flag.
    pub fn consume(&self, order_no: &str) -> Option<CallbackBinding> {
        self.bindings.get_mut(order_no).map(|mut b| {
            let snapshot = b.clone();
            b.consumed = true;
            snapshot
        })
    }
}
