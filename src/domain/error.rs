use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures reported by the billing gateway itself: availability, transport,
/// or an SDK-side rejection. External to the purchase flow logic.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum GatewayError {
    #[error("Purchase gateway is not available")]
    Unavailable,
    #[error("Gateway transport error: {0}")]
    Transport(String),
    #[error("Gateway reported failure: {0}")]
    Sdk(String),
    #[error("No purchase found for sku {0}")]
    NotFound(String),
}

/// Failures detected while driving a purchase through the
/// verify -> consume -> grant chain.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum FlowError {
    #[error("Remote verifier rejected the purchase")]
    VerificationRejected,
    #[error("Verification transport error: {0}")]
    VerificationTransport(String),
    #[error("Local signature check failed, purchase not granted")]
    UnverifiedPayload,
    #[error("Consuming purchase failed: {0}")]
    Consumption(String),
}

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum PurchaseError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Flow(#[from] FlowError),
}
