//! HTTP-level flows against a live gateway on an ephemeral port: tool-call
//! envelopes, provider callbacks, and the mock seeding surface.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{Value, json};
use tokio::net::TcpListener;

use remitflow::config::{
    AppConfig, BackendConfig, CredentialSeed, GatewayConfig, PolicyConfig, TransferConfig,
    VerificationConfig,
};
use remitflow::dispute::StaticBackendStatusSource;
use remitflow::gateway::create_app;
use remitflow::gateway::state::AppState;
use remitflow::notify::TracingNotifier;
use remitflow::store::MemoryOrderStore;

const PRINCIPAL: &str = "agent-1";

fn test_config() -> AppConfig {
    AppConfig {
        log_level: "warn".to_string(),
        log_dir: "./logs".to_string(),
        log_file: "test.log".to_string(),
        use_json: false,
        rotation: "never".to_string(),
        gateway: GatewayConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        policy: PolicyConfig {
            delay_threshold_secs: 600,
        },
        verification: VerificationConfig { ttl_secs: 1800 },
        transfer: TransferConfig::default(),
        backend: BackendConfig::default(),
        postgres_url: None,
        credentials: vec![CredentialSeed {
            principal_id: PRINCIPAL.to_string(),
            last_four: "4821".to_string(),
            expiry: "2027-03".to_string(),
        }],
    }
}

async fn spawn_gateway() -> SocketAddr {
    let config = test_config();
    let store = Arc::new(MemoryOrderStore::new());
    let backend = Arc::new(StaticBackendStatusSource::new());
    let state = Arc::new(AppState::build(
        &config,
        store,
        backend.clone(),
        Arc::new(TracingNotifier),
        Some(backend),
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_app(state)).await.unwrap();
    });
    addr
}

async fn tool_call(client: &reqwest::Client, addr: SocketAddr, name: &str, arguments: Value) -> Value {
    let response = client
        .post(format!("http://{addr}/api/v1/tools/call"))
        .header("x-principal-id", PRINCIPAL)
        .json(&json!({"name": name, "arguments": arguments}))
        .send()
        .await
        .unwrap();
    // Tool transport always answers HTTP 200; the code travels in the body
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    response.json().await.unwrap()
}

async fn seed_order(client: &reqwest::Client, addr: SocketAddr, body: Value) {
    let response = client
        .post(format!("http://{addr}/internal/mock/order"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn test_health() {
    let addr = spawn_gateway().await;
    let body: Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["code"], 200);
    assert!(body["data"]["timestamp_ms"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_delayed_query_flow_over_http() {
    let addr = spawn_gateway().await;
    let client = reqwest::Client::new();
    seed_order(
        &client,
        addr,
        json!({
            "orderNo": "DELAYED123456",
            "principalId": PRINCIPAL,
            "ageSecs": 900,
        }),
    )
    .await;

    // Unverified targeted lookup is rejected in the body envelope
    let body = tool_call(
        &client,
        addr,
        "transaction_query",
        json!({"orderNo": "DELAYED123456"}),
    )
    .await;
    assert_eq!(body["code"], 401);
    assert_eq!(body["data"]["actions"].as_array().unwrap().len(), 2);

    // Listing stays open
    let body = tool_call(&client, addr, "transaction_query", json!({"orderCount": 5})).await;
    assert_eq!(body["code"], 200);
    assert_eq!(body["data"]["count"], 1);

    // Verify, then the lookup succeeds
    let body = tool_call(
        &client,
        addr,
        "verify_identity",
        json!({"lastFourDigits": "4821", "expiryDate": "2027-03"}),
    )
    .await;
    assert_eq!(body["data"]["verified"], true);

    let body = tool_call(
        &client,
        addr,
        "transaction_query",
        json!({"orderNo": "DELAYED123456"}),
    )
    .await;
    assert_eq!(body["code"], 200);
    assert_eq!(body["data"]["order"]["order_no"], "DELAYED123456");
}

#[tokio::test]
async fn test_transfer_and_callback_over_http() {
    let addr = spawn_gateway().await;
    let client = reqwest::Client::new();

    let body = tool_call(
        &client,
        addr,
        "transfer_money",
        json!({
            "beneficiaryId": "BEN-9",
            "beneficiaryName": "Kwame Mensah",
            "sendAmount": "320.50",
            "callbackProvider": "text",
        }),
    )
    .await;
    assert_eq!(body["code"], 200);
    let order_no = body["data"]["transfer"]["order_no"].as_str().unwrap().to_string();
    assert!(body["data"]["transfer"]["payment_link"]
        .as_str()
        .unwrap()
        .contains(&order_no));

    // Provider webhook completes the order
    let response = client
        .post(format!("http://{addr}/callback/text"))
        .json(&json!({
            "notifyEvent": "transfer.status",
            "data": {"orderNo": order_no, "status": "SUCCESS"},
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let ack: Value = response.json().await.unwrap();
    assert_eq!(ack["data"]["disposition"], "applied");

    // Redelivery acknowledges as duplicate
    let response = client
        .post(format!("http://{addr}/callback/text"))
        .json(&json!({
            "notifyEvent": "transfer.status",
            "data": {"transactionId": order_no, "status": "SUCCESS"},
        }))
        .send()
        .await
        .unwrap();
    let ack: Value = response.json().await.unwrap();
    assert_eq!(ack["data"]["disposition"], "duplicate");

    let body = tool_call(&client, addr, "transaction_query", json!({"orderNo": order_no})).await;
    assert_eq!(body["data"]["order"]["status"], "SUCCESS");
}

#[tokio::test]
async fn test_unknown_callback_channel_404() {
    let addr = spawn_gateway().await;
    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{addr}/callback/pigeon"))
        .json(&json!({
            "notifyEvent": "transfer.status",
            "data": {"orderNo": "X", "status": "SUCCESS"},
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dispute_flow_over_http() {
    let addr = spawn_gateway().await;
    let client = reqwest::Client::new();
    seed_order(
        &client,
        addr,
        json!({
            "orderNo": "ORD-FAIL",
            "principalId": PRINCIPAL,
            "ageSecs": 900,
        }),
    )
    .await;

    // Seed the authoritative status the resolver will fetch
    let response = client
        .post(format!("http://{addr}/internal/mock/backend_status"))
        .json(&json!({"orderNo": "ORD-FAIL", "status": "FAILED"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body = tool_call(
        &client,
        addr,
        "handle_completed_transaction_dispute",
        json!({
            "orderNo": "ORD-FAIL",
            "lastFourDigits": "4821",
            "expiryDate": "2027-03",
        }),
    )
    .await;
    assert_eq!(body["code"], 200);
    assert_eq!(
        body["data"]["resolution"]["case"]["scenario"],
        "failed_transaction"
    );
    assert_eq!(body["data"]["resolution"]["refund_initiated"], true);

    let body = tool_call(&client, addr, "transaction_query", json!({"orderNo": "ORD-FAIL"})).await;
    assert_eq!(body["data"]["order"]["status"], "FAILED");
}
