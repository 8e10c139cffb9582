use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{
    GatewayError, Product, Purchase, PurchaseIntent, PurchaseOutcome,
};

/// The billing SDK surface consumed by the coordinator.
///
/// All operations are asynchronous and may fail or return partial data. The
/// coordinator never retries a failed call; a retry is always a new user
/// action or the next reconciliation sweep.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn is_available(&self) -> bool;

    /// Sandbox aid only; has no effect on control flow.
    async fn testing_wallet_address(&self) -> Result<String, GatewayError>;

    /// Catalog query, optionally restricted to the given skus.
    async fn products(&self, skus: Option<&[String]>) -> Result<Vec<Product>, GatewayError>;

    /// Start a user-initiated purchase and wait for its outcome.
    async fn purchase(&self, sku: &str) -> Result<PurchaseOutcome, GatewayError>;

    /// Confirm the currently pending purchase intent, turning it into an
    /// ordinary outcome.
    async fn confirm_purchase_intent(&self) -> Result<PurchaseOutcome, GatewayError>;

    /// Pull the currently pending intent, if any. Used for catch-up after a
    /// sign-in; pushed intents dropped while unauthorized are not remembered
    /// anywhere else.
    async fn purchase_intent(&self) -> Result<Option<PurchaseIntent>, GatewayError>;

    /// Mark a completed purchase as fulfilled so it is not re-delivered as
    /// unfinished. Expected to be idempotent on the gateway side; the
    /// coordinator does not deduplicate by sku itself.
    async fn consume_purchase(&self, sku: &str) -> Result<(), GatewayError>;

    async fn all_purchases(&self) -> Result<Vec<Purchase>, GatewayError>;

    async fn latest_purchase(&self, sku: &str) -> Result<Option<Purchase>, GatewayError>;

    /// Purchases completed in a prior session but never consumed.
    async fn unfinished_purchases(&self) -> Result<Vec<Purchase>, GatewayError>;

    /// Subscribe to purchase-intent-updated pushes as an explicit channel.
    ///
    /// The channel is bounded; when a subscriber lags, the gateway drops the
    /// push (the pull-based [`purchase_intent`] catch-up recovers it).
    ///
    /// [`purchase_intent`]: Gateway::purchase_intent
    fn subscribe_intents(&self) -> mpsc::Receiver<PurchaseIntent>;
}
