//! RemitFlow service entry point.
//!
//! ```text
//! ┌──────────┐    ┌───────────┐    ┌────────────┐    ┌───────────┐
//! │  Config  │───▶│ AppState  │───▶│  Gateway   │───▶│  Tools /  │
//! │  (YAML)  │    │ (wiring)  │    │  (axum)    │    │ Callbacks │
//! └──────────┘    └───────────┘    └────────────┘    └───────────┘
//! ```
//!
//! The order store is PostgreSQL when `postgres_url` is configured,
//! in-memory otherwise. The backend status source is the HTTP client when
//! `backend.status_url` is configured, the seedable in-memory source
//! otherwise.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use remitflow::config::AppConfig;
use remitflow::dispute::{BackendStatusSource, HttpBackendStatusSource, StaticBackendStatusSource};
use remitflow::gateway::state::AppState;
use remitflow::logging::init_logging;
use remitflow::notify::{Notifier, TracingNotifier};
use remitflow::persistence::PgOrderStore;
use remitflow::store::{MemoryOrderStore, OrderStore};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _guard = init_logging(&config);

    info!(env, "starting remitflow");

    let store: Arc<dyn OrderStore> = match &config.postgres_url {
        Some(url) => {
            let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
            let store = PgOrderStore::new(pool);
            store.ensure_schema().await?;
            info!("order store: PostgreSQL");
            Arc::new(store)
        }
        None => {
            info!("order store: in-memory (no postgres_url configured)");
            Arc::new(MemoryOrderStore::new())
        }
    };

    let mut mock_backend = None;
    let backend: Arc<dyn BackendStatusSource> = match &config.backend.status_url {
        Some(url) => {
            info!(url = %url, "backend status source: HTTP");
            Arc::new(HttpBackendStatusSource::new(url.clone()))
        }
        None => {
            info!("backend status source: in-memory (no status_url configured)");
            let source = Arc::new(StaticBackendStatusSource::new());
            mock_backend = Some(source.clone());
            source
        }
    };

    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);

    let state = Arc::new(AppState::build(
        &config,
        store,
        backend,
        notifier,
        mock_backend,
    ));

    remitflow::gateway::run_server(&config.gateway.host, config.gateway.port, state).await;
    Ok(())
}
