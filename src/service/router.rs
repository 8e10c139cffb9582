use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    domain::{PurchaseError, PurchaseIntent, SessionAuthorization, Settlement},
    port::Gateway,
    service::Coordinator,
};

/// Forwards externally delivered purchase intents into the coordinator,
/// gated by the session authorization flag.
///
/// Intents arriving while unauthorized are dropped without queuing; a
/// sign-in must be followed by [`catch_up`] to recover whatever intent is
/// still pending at the gateway.
///
/// [`catch_up`]: IntentRouter::catch_up
pub struct IntentRouter {
    coordinator: Arc<Coordinator>,
    gateway: Arc<dyn Gateway>,
    authorization: SessionAuthorization,
}

impl IntentRouter {
    pub fn new(coordinator: Arc<Coordinator>, gateway: Arc<dyn Gateway>) -> Self {
        Self {
            coordinator,
            gateway,
            authorization: SessionAuthorization::new(),
        }
    }

    pub fn authorization(&self) -> SessionAuthorization {
        self.authorization.clone()
    }

    /// Consume pushed intents until the gateway closes the channel.
    pub async fn run(self: Arc<Self>, mut intents: mpsc::Receiver<PurchaseIntent>) {
        while let Some(intent) = intents.recv().await {
            self.on_intent(intent).await;
        }
        tracing::debug!("intent channel closed, router stopping");
    }

    async fn on_intent(&self, intent: PurchaseIntent) {
        if !self.authorization.is_authorized() {
            tracing::debug!(sku = %intent.sku, "dropping intent, session not authorized");
            return;
        }
        match self.confirm().await {
            Ok(settlement) => {
                tracing::info!(sku = %intent.sku, ?settlement, "purchase intent settled")
            }
            Err(e) => tracing::warn!(sku = %intent.sku, error = %e, "purchase intent failed"),
        }
    }

    /// Re-query the gateway for a pending intent after an authorization
    /// change. Dropped intents are not remembered, so this pull is the only
    /// way a pre-sign-in intent gets another chance.
    pub async fn catch_up(&self) -> Result<Option<Settlement>, PurchaseError> {
        if !self.authorization.is_authorized() {
            return Ok(None);
        }
        match self.gateway.purchase_intent().await? {
            Some(intent) => {
                tracing::info!(sku = %intent.sku, "confirming pending intent after sign-in");
                self.confirm().await.map(Some)
            }
            None => Ok(None),
        }
    }

    async fn confirm(&self) -> Result<Settlement, PurchaseError> {
        let outcome = self.gateway.confirm_purchase_intent().await?;
        self.coordinator.settle(outcome).await
    }
}
