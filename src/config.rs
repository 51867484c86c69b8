use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub verification: VerificationConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    /// PostgreSQL connection URL for the durable order store.
    /// When absent the service runs on the in-memory store.
    #[serde(default)]
    pub postgres_url: Option<String>,
    /// Out-of-band credential references seeded at startup.
    #[serde(default)]
    pub credentials: Vec<CredentialSeed>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Delay policy configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PolicyConfig {
    /// Age beyond which a non-terminal order is considered delayed.
    pub delay_threshold_secs: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            delay_threshold_secs: 600,
        }
    }
}

/// Identity verification session configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VerificationConfig {
    /// Session lifetime after a successful verification.
    pub ttl_secs: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self { ttl_secs: 1800 }
    }
}

/// Transfer protocol configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TransferConfig {
    /// Callback provider used when the request does not name one: "voice" or "text".
    pub default_provider: String,
    /// Base URL embedded in generated payment links.
    pub payment_link_base: String,
    /// Externally reachable base URL for the webhook endpoints.
    pub callback_base: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            default_provider: "text".to_string(),
            payment_link_base: "https://pay.remitflow.example".to_string(),
            callback_base: "http://127.0.0.1:8080".to_string(),
        }
    }
}

/// Authoritative backend status source configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct BackendConfig {
    /// Base URL of the authoritative transaction status API.
    /// When absent the deterministic in-memory source is used.
    pub status_url: Option<String>,
}

/// One out-of-band credential reference for a principal.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CredentialSeed {
    pub principal_id: String,
    pub last_four: String,
    pub expiry: String,
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}
