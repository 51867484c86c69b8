//! Tool Router
//!
//! Dispatch surface for the conversational front end. Each tool call is a
//! name plus a JSON argument object; every dispatch returns a full response
//! envelope with the outcome code in the body, so the transport can stay at
//! HTTP 200 and the caller inspects `code`.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};
use validator::ValidateEmail;

use crate::dispute::{DisputeRequest, DisputeResolver};
use crate::error::{REMEDIATION_ACTIONS, ServiceError, codes};
use crate::gate::{OrderQuery, QueryOutcome, TransferAuthorizationGate};
use crate::notify::CustomerContact;
use crate::transfer::{TransferArgs, TransferProtocol};
use crate::verification::{CredentialProof, VerificationSessionStore};

/// Default listing size when `orderCount` is absent.
const DEFAULT_ORDER_COUNT: usize = 5;
const MAX_ORDER_COUNT: usize = 50;

/// One tool invocation as received from the front end.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyIdentityArgs {
    last_four_digits: String,
    expiry_date: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TransactionQueryArgs {
    order_no: Option<String>,
    order_count: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TransferMoneyArgs {
    beneficiary_id: Option<String>,
    beneficiary_name: Option<String>,
    send_amount: Option<String>,
    callback_provider: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DisputeArgs {
    order_no: String,
    #[serde(default)]
    dispute_type: Option<String>,
    #[serde(default)]
    last_four_digits: Option<String>,
    #[serde(default)]
    expiry_date: Option<String>,
    #[serde(default)]
    customer_email: Option<String>,
    #[serde(default)]
    customer_name: Option<String>,
}

pub struct ToolRouter {
    sessions: Arc<VerificationSessionStore>,
    gate: Arc<TransferAuthorizationGate>,
    protocol: Arc<TransferProtocol>,
    resolver: Arc<DisputeResolver>,
}

impl ToolRouter {
    pub fn new(
        sessions: Arc<VerificationSessionStore>,
        gate: Arc<TransferAuthorizationGate>,
        protocol: Arc<TransferProtocol>,
        resolver: Arc<DisputeResolver>,
    ) -> Self {
        Self {
            sessions,
            gate,
            protocol,
            resolver,
        }
    }

    /// Dispatch one call. Infallible at this layer: every failure becomes a
    /// structured envelope so the front end always has something to relay.
    pub async fn dispatch(&self, principal_id: &str, call: &ToolCall) -> Value {
        info!(principal_id, tool = %call.name, "tool call");
        match call.name.as_str() {
            "verify_identity" => self.verify_identity(principal_id, &call.arguments),
            "transaction_query" => self.transaction_query(principal_id, &call.arguments).await,
            "transfer_money" => self.transfer_money(principal_id, &call.arguments).await,
            "handle_completed_transaction_dispute" => {
                self.dispute(principal_id, &call.arguments).await
            }
            other => {
                warn!(principal_id, tool = other, "unknown tool");
                envelope(
                    codes::NOT_FOUND,
                    format!("unknown tool: {other}"),
                    Value::Null,
                )
            }
        }
    }

    fn verify_identity(&self, principal_id: &str, arguments: &Value) -> Value {
        let args: VerifyIdentityArgs = match parse_args(arguments) {
            Ok(a) => a,
            Err(e) => return error_envelope(&e),
        };
        let proof = CredentialProof {
            last_four: args.last_four_digits,
            expiry: args.expiry_date,
        };
        match self.sessions.verify(principal_id, &proof) {
            Ok(session) => ok_envelope(json!({
                "verified": true,
                "expiresAt": session.expires_at,
            })),
            // A mismatch is a normal conversational outcome, not a fault:
            // the envelope stays 200 so the front end can re-prompt.
            Err(ServiceError::VerificationFailed) => ok_envelope(json!({
                "verified": false,
                "reason": "the provided details did not match our records",
            })),
            Err(e) => error_envelope(&e),
        }
    }

    async fn transaction_query(&self, principal_id: &str, arguments: &Value) -> Value {
        let args: TransactionQueryArgs = match parse_args(arguments) {
            Ok(a) => a,
            Err(e) => return error_envelope(&e),
        };
        let query = match args.order_no {
            Some(order_no) if !order_no.is_empty() => OrderQuery::ByOrderNo(order_no),
            _ => OrderQuery::Recent(
                args.order_count
                    .unwrap_or(DEFAULT_ORDER_COUNT)
                    .min(MAX_ORDER_COUNT),
            ),
        };
        match self.gate.authorize(principal_id, query).await {
            Ok(QueryOutcome::Single(view)) => ok_envelope(json!({ "order": view })),
            Ok(QueryOutcome::Listing(views)) => {
                let count = views.len();
                ok_envelope(json!({ "orders": views, "count": count }))
            }
            Err(e) => error_envelope(&e),
        }
    }

    async fn transfer_money(&self, principal_id: &str, arguments: &Value) -> Value {
        let args: TransferMoneyArgs = match parse_args(arguments) {
            Ok(a) => a,
            Err(e) => return error_envelope(&e),
        };
        let transfer = TransferArgs {
            beneficiary_id: args.beneficiary_id,
            beneficiary_name: args.beneficiary_name,
            send_amount: args.send_amount,
            callback_provider: args.callback_provider,
        };

        // Stage 1: field discovery. An unsatisfied result is the schema the
        // front end should collect, not an error in the fault sense.
        let requirements = TransferProtocol::discover(&transfer);
        if !requirements.is_satisfied() {
            return envelope(
                codes::VALIDATION_ERROR,
                "additional fields are required to proceed".to_string(),
                json!({ "requirements": requirements }),
            );
        }

        // Stage 2: confirm.
        match self.protocol.confirm(principal_id, &transfer).await {
            Ok(receipt) => ok_envelope(json!({ "transfer": receipt })),
            Err(e) => error_envelope(&e),
        }
    }

    async fn dispute(&self, principal_id: &str, arguments: &Value) -> Value {
        let args: DisputeArgs = match parse_args(arguments) {
            Ok(a) => a,
            Err(e) => return error_envelope(&e),
        };

        // A live session carries; otherwise inline credentials may establish
        // one so the dispute proceeds in a single call.
        if !self.sessions.is_verified(principal_id) {
            let inline = match (&args.last_four_digits, &args.expiry_date) {
                (Some(last_four), Some(expiry)) => self
                    .sessions
                    .verify(
                        principal_id,
                        &CredentialProof {
                            last_four: last_four.clone(),
                            expiry: expiry.clone(),
                        },
                    )
                    .is_ok(),
                _ => false,
            };
            if !inline {
                return error_envelope(&ServiceError::AuthRequired {
                    reason: "dispute resolution requires identity verification".to_string(),
                });
            }
        }

        let contact = match args.customer_email {
            Some(email) => {
                if !email.validate_email() {
                    return error_envelope(&ServiceError::invalid(
                        "customerEmail",
                        "must be a valid email address",
                    ));
                }
                Some(CustomerContact {
                    email,
                    name: args.customer_name,
                })
            }
            None => None,
        };

        let request = DisputeRequest {
            order_no: args.order_no,
            dispute_type: args
                .dispute_type
                .unwrap_or_else(|| "not_received".to_string()),
            contact,
        };
        match self.resolver.resolve(principal_id, &request).await {
            Ok(resolution) => ok_envelope(json!({ "resolution": resolution })),
            Err(e) => error_envelope(&e),
        }
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(arguments: &Value) -> Result<T, ServiceError> {
    serde_json::from_value(arguments.clone())
        .map_err(|e| ServiceError::invalid("arguments", e.to_string()))
}

fn envelope(code: i32, message: String, data: Value) -> Value {
    json!({
        "code": code,
        "message": message,
        "data": data,
    })
}

fn ok_envelope(data: Value) -> Value {
    envelope(codes::OK, "success".to_string(), data)
}

fn error_envelope(err: &ServiceError) -> Value {
    let data = match err {
        ServiceError::AuthRequired { reason } => json!({
            "reason": reason,
            "actions": REMEDIATION_ACTIONS,
        }),
        ServiceError::Validation { field, .. } => json!({ "field": field }),
        _ => Value::Null,
    };
    envelope(err.code(), err.to_string(), data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransferConfig;
    use crate::dispute::{BackendStatus, StaticBackendStatusSource};
    use crate::notify::RecordingNotifier;
    use crate::order::{OrderRecord, OrderStatus, now_ms};
    use crate::policy::DelayPolicy;
    use crate::store::{MemoryOrderStore, OrderStore};
    use crate::transfer::BindingRegistry;
    use crate::verification::{CredentialDirectory, CredentialReference};
    use rust_decimal::Decimal;

    struct Fixture {
        store: Arc<MemoryOrderStore>,
        backend: Arc<StaticBackendStatusSource>,
        router: ToolRouter,
    }

    fn fixture() -> Fixture {
        let store: Arc<MemoryOrderStore> = Arc::new(MemoryOrderStore::new());
        let directory = Arc::new(CredentialDirectory::new());
        directory.insert(
            "agent-1",
            CredentialReference {
                last_four: "4821".to_string(),
                expiry: "2027-03".to_string(),
            },
        );
        let sessions = Arc::new(VerificationSessionStore::new(directory, 1800));
        let gate = Arc::new(TransferAuthorizationGate::new(
            store.clone(),
            sessions.clone(),
            DelayPolicy::new(600),
        ));
        let protocol = Arc::new(TransferProtocol::new(
            store.clone(),
            Arc::new(BindingRegistry::new()),
            TransferConfig::default(),
        ));
        let backend = Arc::new(StaticBackendStatusSource::new());
        let resolver = Arc::new(DisputeResolver::new(
            store.clone(),
            sessions.clone(),
            backend.clone(),
            Arc::new(RecordingNotifier::new()),
        ));
        let router = ToolRouter::new(sessions, gate, protocol, resolver);
        Fixture {
            store,
            backend,
            router,
        }
    }

    fn call(name: &str, arguments: Value) -> ToolCall {
        ToolCall {
            name: name.to_string(),
            arguments,
        }
    }

    async fn seed_delayed(fixture: &Fixture, order_no: &str) {
        let mut order = OrderRecord::new(order_no, "agent-1", None, None, Decimal::new(150, 0));
        order.created_at = now_ms() - 900 * 1000;
        fixture.store.insert(order).await.unwrap();
    }

    #[tokio::test]
    async fn test_verify_identity_success_and_mismatch() {
        let fixture = fixture();

        let response = fixture
            .router
            .dispatch(
                "agent-1",
                &call(
                    "verify_identity",
                    json!({"lastFourDigits": "4821", "expiryDate": "2027-03"}),
                ),
            )
            .await;
        assert_eq!(response["code"], 200);
        assert_eq!(response["data"]["verified"], true);

        let response = fixture
            .router
            .dispatch(
                "agent-1",
                &call(
                    "verify_identity",
                    json!({"lastFourDigits": "0000", "expiryDate": "2027-03"}),
                ),
            )
            .await;
        // Mismatch stays a 200 conversational outcome
        assert_eq!(response["code"], 200);
        assert_eq!(response["data"]["verified"], false);
    }

    #[tokio::test]
    async fn test_delayed_query_gated_with_remediation() {
        let fixture = fixture();
        seed_delayed(&fixture, "DELAYED123456").await;

        let response = fixture
            .router
            .dispatch(
                "agent-1",
                &call("transaction_query", json!({"orderNo": "DELAYED123456"})),
            )
            .await;
        assert_eq!(response["code"], 401);
        assert_eq!(response["data"]["actions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_listing_unverified_succeeds() {
        let fixture = fixture();
        seed_delayed(&fixture, "DELAYED123456").await;

        let response = fixture
            .router
            .dispatch(
                "agent-1",
                &call("transaction_query", json!({"orderCount": 5})),
            )
            .await;
        assert_eq!(response["code"], 200);
        assert_eq!(response["data"]["count"], 1);
    }

    #[tokio::test]
    async fn test_transfer_discovery_then_confirm() {
        let fixture = fixture();

        let response = fixture
            .router
            .dispatch("agent-1", &call("transfer_money", json!({})))
            .await;
        assert_eq!(response["code"], 400);
        assert_eq!(
            response["data"]["requirements"]["missing"]
                .as_array()
                .unwrap()
                .len(),
            3
        );

        let response = fixture
            .router
            .dispatch(
                "agent-1",
                &call(
                    "transfer_money",
                    json!({
                        "beneficiaryId": "BEN-77",
                        "beneficiaryName": "Kwame Mensah",
                        "sendAmount": "320.50",
                        "callbackProvider": "text",
                    }),
                ),
            )
            .await;
        assert_eq!(response["code"], 200);
        assert!(response["data"]["transfer"]["payment_link"].is_string());
        assert!(response["data"]["transfer"]["order_no"].is_string());
    }

    #[tokio::test]
    async fn test_dispute_inline_verification() {
        let fixture = fixture();
        seed_delayed(&fixture, "X1").await;
        fixture.backend.set("X1", BackendStatus::Failed);

        // No session and no credentials: gated
        let response = fixture
            .router
            .dispatch(
                "agent-1",
                &call(
                    "handle_completed_transaction_dispute",
                    json!({"orderNo": "X1"}),
                ),
            )
            .await;
        assert_eq!(response["code"], 401);

        // Inline credentials establish the session in the same call
        let response = fixture
            .router
            .dispatch(
                "agent-1",
                &call(
                    "handle_completed_transaction_dispute",
                    json!({
                        "orderNo": "X1",
                        "lastFourDigits": "4821",
                        "expiryDate": "2027-03",
                    }),
                ),
            )
            .await;
        assert_eq!(response["code"], 200);
        assert_eq!(
            response["data"]["resolution"]["case"]["scenario"],
            "failed_transaction"
        );
        assert_eq!(response["data"]["resolution"]["refund_initiated"], true);

        let order = fixture.store.get("X1").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Failed);
    }

    #[tokio::test]
    async fn test_dispute_rejects_bad_email() {
        let fixture = fixture();
        seed_delayed(&fixture, "X1").await;
        fixture.backend.set("X1", BackendStatus::Success);

        let response = fixture
            .router
            .dispatch(
                "agent-1",
                &call(
                    "handle_completed_transaction_dispute",
                    json!({
                        "orderNo": "X1",
                        "lastFourDigits": "4821",
                        "expiryDate": "2027-03",
                        "customerEmail": "not-an-email",
                    }),
                ),
            )
            .await;
        assert_eq!(response["code"], 400);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let fixture = fixture();
        let response = fixture
            .router
            .dispatch("agent-1", &call("teleport_funds", json!({})))
            .await;
        assert_eq!(response["code"], 404);
    }
}
