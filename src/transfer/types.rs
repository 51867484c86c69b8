//! Transfer Protocol Types
//!
//! Request/response DTOs for the two-stage transfer protocol. Amounts
//! travel as strings at the API edge to avoid float precision issues.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// External completion channel for a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackProvider {
    Voice,
    Text,
}

impl CallbackProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallbackProvider::Voice => "voice",
            CallbackProvider::Text => "text",
        }
    }
}

impl fmt::Display for CallbackProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CallbackProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "voice" => Ok(CallbackProvider::Voice),
            "text" | "sms" => Ok(CallbackProvider::Text),
            _ => Err(()),
        }
    }
}

/// Arguments to the transfer tool. All fields optional: stage 1 discovery
/// probes which are still missing without committing anything.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TransferArgs {
    pub beneficiary_id: Option<String>,
    #[validate(length(min = 1, max = 128, message = "must be 1-128 characters"))]
    pub beneficiary_name: Option<String>,
    /// Amount as string (to avoid float precision issues)
    pub send_amount: Option<String>,
    /// "voice" or "text"; configured default applies when absent
    pub callback_provider: Option<String>,
}

impl TransferArgs {
    /// Parse and range-check the amount, if present and well-formed.
    pub fn parsed_amount(&self) -> Option<Decimal> {
        let raw = self.send_amount.as_deref()?.trim();
        let amount = Decimal::from_str(raw).ok()?;
        (amount > Decimal::ZERO).then_some(amount)
    }

    /// Parse the requested provider, if present and recognized.
    pub fn parsed_provider(&self) -> Option<CallbackProvider> {
        self.callback_provider
            .as_deref()
            .and_then(|s| s.parse().ok())
    }
}

/// One missing or invalid field reported by discovery.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldRequirement {
    pub field: &'static str,
    pub message: String,
}

/// Stage-1 discovery result: the schema of missing/invalid fields.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FieldRequirements {
    pub missing: Vec<FieldRequirement>,
    pub invalid: Vec<FieldRequirement>,
}

impl FieldRequirements {
    pub fn is_satisfied(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }

    pub(crate) fn missing(&mut self, field: &'static str) {
        self.missing.push(FieldRequirement {
            field,
            message: "required".to_string(),
        });
    }

    pub(crate) fn invalid(&mut self, field: &'static str, message: impl Into<String>) {
        self.invalid.push(FieldRequirement {
            field,
            message: message.into(),
        });
    }

    /// First offending field, for error surfacing.
    pub fn first_field(&self) -> Option<&'static str> {
        self.missing
            .first()
            .or_else(|| self.invalid.first())
            .map(|r| r.field)
    }
}

/// Stage-2 confirmation result: payment initiated, completion deferred to
/// the callback channel.
#[derive(Debug, Clone, Serialize)]
pub struct TransferReceipt {
    pub order_no: String,
    pub payment_link: String,
    pub callback_provider: CallbackProvider,
    pub callback_url: String,
    pub callback_token: String,
}
