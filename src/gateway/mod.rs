pub mod handlers;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use state::AppState;

/// Build the gateway router.
///
/// Two surfaces: `/api/v1/tools/call` for the conversational front end and
/// `/callback/{channel}` for provider webhooks. The mock seeding surface is
/// compiled only with the `mock-api` feature; production builds use
/// `--no-default-features` to exclude it.
pub fn create_app(state: Arc<AppState>) -> Router {
    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/v1/tools/call", post(handlers::tool_call))
        .route("/callback/{channel}", post(handlers::provider_callback));

    #[cfg(feature = "mock-api")]
    let app = app.nest(
        "/internal/mock",
        Router::new()
            .route("/order", post(handlers::mock::mock_order))
            .route("/backend_status", post(handlers::mock::mock_backend_status)),
    );

    app.with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the process is stopped.
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) {
    let app = create_app(state);

    let addr = format!("{host}:{port}");
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    info!("gateway listening on http://{addr}");
    info!("tool surface:    POST /api/v1/tools/call");
    info!("callback surface: POST /callback/{{channel}}");

    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {e}");
        std::process::exit(1);
    }
}
