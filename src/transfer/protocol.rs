//! Two-Stage Transfer Protocol
//!
//! Stage 1 (discovery) lets a caller probe required fields without
//! committing funds or creating a callback binding. Stage 2 (confirm) is
//! the sole mutating operation: it creates the PENDING order, installs the
//! callback binding, and returns a payment link immediately. Completion
//! arrives later via the webhook; confirm never blocks on it.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use crate::config::TransferConfig;
use crate::error::ServiceError;
use crate::order::{OrderRecord, OrderStatus};
use crate::store::OrderStore;

use super::binding::{BindingRegistry, CallbackBinding, new_callback_token};
use super::types::{CallbackProvider, FieldRequirements, TransferArgs, TransferReceipt};

pub struct TransferProtocol {
    store: Arc<dyn OrderStore>,
    bindings: Arc<BindingRegistry>,
    config: TransferConfig,
}

impl TransferProtocol {
    pub fn new(
        store: Arc<dyn OrderStore>,
        bindings: Arc<BindingRegistry>,
        config: TransferConfig,
    ) -> Self {
        Self {
            store,
            bindings,
            config,
        }
    }

    /// Stage 1: pure field discovery. No order, no binding, no side effects.
    pub fn discover(args: &TransferArgs) -> FieldRequirements {
        let mut reqs = FieldRequirements::default();

        if args.beneficiary_id.as_deref().is_none_or(str::is_empty) {
            reqs.missing("beneficiary_id");
        }
        match args.beneficiary_name.as_deref() {
            None | Some("") => reqs.missing("beneficiary_name"),
            Some(_) => {
                if args.validate().is_err() {
                    reqs.invalid("beneficiary_name", "must be 1-128 characters");
                }
            }
        }
        match args.send_amount.as_deref() {
            None | Some("") => reqs.missing("send_amount"),
            Some(_) => {
                if args.parsed_amount().is_none() {
                    reqs.invalid("send_amount", "must be a positive decimal amount");
                }
            }
        }
        if let Some(raw) = args.callback_provider.as_deref()
            && CallbackProvider::from_str(raw).is_err()
        {
            reqs.invalid("callback_provider", "must be 'voice' or 'text'");
        }

        reqs
    }

    /// Stage 2: confirm the transfer.
    ///
    /// Re-runs discovery as a guard against internal callers bypassing the
    /// tool layer. Once the order exists this operation is not cancelable;
    /// compensation is the explicit [`cancel`](Self::cancel) path.
    pub async fn confirm(
        &self,
        principal_id: &str,
        args: &TransferArgs,
    ) -> Result<TransferReceipt, ServiceError> {
        let reqs = Self::discover(args);
        if !reqs.is_satisfied() {
            let field = reqs.first_field().unwrap_or("arguments");
            return Err(ServiceError::invalid(field, "transfer arguments incomplete"));
        }

        // Discovery guaranteed these parse.
        let amount = args
            .parsed_amount()
            .ok_or_else(|| ServiceError::invalid("send_amount", "must be a positive decimal amount"))?;
        let provider = match args.parsed_provider() {
            Some(p) => p,
            None => CallbackProvider::from_str(&self.config.default_provider)
                .map_err(|_| ServiceError::Store("misconfigured default callback provider".to_string()))?,
        };

        let order_no = ulid::Ulid::new().to_string();
        let record = OrderRecord::new(
            &order_no,
            principal_id,
            args.beneficiary_id.clone(),
            args.beneficiary_name.clone(),
            amount,
        );
        self.store.insert(record).await?;

        let callback_token = new_callback_token();
        let callback_url = format!("{}/callback/{}", self.config.callback_base, provider);
        self.bindings.install(CallbackBinding {
            order_no: order_no.clone(),
            provider,
            callback_url: callback_url.clone(),
            callback_token: callback_token.clone(),
            consumed: false,
        });

        // The link carries everything the external payment surface needs to
        // initiate the actual funds movement.
        let payment_link = format!(
            "{}/pay/{}?token={}",
            self.config.payment_link_base, order_no, callback_token
        );

        info!(
            principal_id,
            order_no,
            provider = %provider,
            %amount,
            "transfer confirmed, awaiting completion callback"
        );

        Ok(TransferReceipt {
            order_no,
            payment_link,
            callback_provider: provider,
            callback_url,
            callback_token,
        })
    }

    /// Compensating cancellation: mark a still-pending order CANCELLED.
    /// Returns false when the order already reached a terminal state.
    pub async fn cancel(&self, order_no: &str) -> Result<bool, ServiceError> {
        // Bounded CAS loop; concurrent callback application can move the
        // guard under us at most a handful of times.
        for _ in 0..4 {
            let order = self
                .store
                .get(order_no)
                .await?
                .ok_or_else(|| ServiceError::NotFound(order_no.to_string()))?;

            if order.actual_status.is_terminal() {
                return Ok(false);
            }

            let applied = self
                .store
                .update_status_if(
                    order_no,
                    order.actual_status,
                    OrderStatus::Cancelled,
                    OrderStatus::Cancelled,
                )
                .await?;
            if applied {
                info!(order_no, "order cancelled (compensating path)");
                return Ok(true);
            }
        }

        warn!(order_no, "cancel lost CAS race repeatedly");
        Err(ServiceError::Store(format!(
            "could not cancel {order_no}: concurrent status updates"
        )))
    }
}
