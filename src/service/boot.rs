use std::sync::Arc;

use crate::{
    domain::{CoordinatorConfig, GatewayError, PurchaseError, ReconcileReport},
    port::{Gateway, Verifier},
    service::{Coordinator, IntentRouter},
};

/// Handles to a running session. Constructed once at startup and passed to
/// collaborators; there is no global instance.
pub struct Session {
    pub coordinator: Arc<Coordinator>,
    pub router: Arc<IntentRouter>,
    /// What the startup sweep recovered from prior sessions.
    pub reconcile: ReconcileReport,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("reconcile", &self.reconcile)
            .finish_non_exhaustive()
    }
}

/// Session bring-up: availability check, sandbox wallet logging, unfinished
/// purchase reconciliation, and the intent router subscription.
///
/// An unavailable gateway is a hard error for the session; everything after
/// that degrades per-flow instead of failing the boot.
pub async fn boot(
    gateway: Arc<dyn Gateway>,
    verifier: Arc<dyn Verifier>,
    config: CoordinatorConfig,
) -> Result<Session, PurchaseError> {
    if !gateway.is_available().await {
        tracing::warn!("purchase gateway unavailable, session cannot start");
        return Err(GatewayError::Unavailable.into());
    }

    match gateway.testing_wallet_address().await {
        Ok(address) => tracing::info!(%address, "gateway sandbox wallet"),
        Err(e) => tracing::debug!(error = %e, "no sandbox wallet address"),
    }

    let coordinator = Arc::new(Coordinator::new(gateway.clone(), verifier, config));
    let reconcile = coordinator.reconcile_unfinished().await?;

    let intents = gateway.subscribe_intents();
    let router = Arc::new(IntentRouter::new(coordinator.clone(), gateway));
    tokio::spawn(router.clone().run(intents));

    tracing::info!("purchase session initialized");
    Ok(Session {
        coordinator,
        router,
        reconcile,
    })
}
