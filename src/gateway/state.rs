use std::sync::Arc;

use crate::callback::CallbackReconciler;
use crate::config::AppConfig;
use crate::dispute::{BackendStatusSource, DisputeResolver, StaticBackendStatusSource};
use crate::gate::TransferAuthorizationGate;
use crate::notify::Notifier;
use crate::policy::DelayPolicy;
use crate::store::OrderStore;
use crate::tools::ToolRouter;
use crate::transfer::{BindingRegistry, TransferProtocol};
use crate::verification::{CredentialDirectory, VerificationSessionStore};

/// Shared gateway state. Every component is behind an Arc so handlers can
/// clone the state cheaply.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<VerificationSessionStore>,
    pub tools: Arc<ToolRouter>,
    pub reconciler: Arc<CallbackReconciler>,
    pub store: Arc<dyn OrderStore>,
    /// Seedable backend status source, wired only when no real backend URL
    /// is configured. Used by the mock surface.
    pub mock_backend: Option<Arc<StaticBackendStatusSource>>,
}

impl AppState {
    /// Assemble the full component graph from configuration.
    pub fn build(
        config: &AppConfig,
        store: Arc<dyn OrderStore>,
        backend: Arc<dyn BackendStatusSource>,
        notifier: Arc<dyn Notifier>,
        mock_backend: Option<Arc<StaticBackendStatusSource>>,
    ) -> Self {
        let directory = Arc::new(CredentialDirectory::from_seeds(&config.credentials));
        let sessions = Arc::new(VerificationSessionStore::new(
            directory,
            config.verification.ttl_secs,
        ));
        let bindings = Arc::new(BindingRegistry::new());

        let gate = Arc::new(TransferAuthorizationGate::new(
            store.clone(),
            sessions.clone(),
            DelayPolicy::new(config.policy.delay_threshold_secs),
        ));
        let protocol = Arc::new(TransferProtocol::new(
            store.clone(),
            bindings.clone(),
            config.transfer.clone(),
        ));
        let resolver = Arc::new(DisputeResolver::new(
            store.clone(),
            sessions.clone(),
            backend,
            notifier,
        ));
        let tools = Arc::new(ToolRouter::new(
            sessions.clone(),
            gate,
            protocol,
            resolver,
        ));
        let reconciler = Arc::new(CallbackReconciler::new(store.clone(), bindings));

        Self {
            sessions,
            tools,
            reconciler,
            store,
            mock_backend,
        }
    }
}
