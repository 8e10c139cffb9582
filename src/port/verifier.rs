use async_trait::async_trait;

use crate::domain::{FlowError, VerificationRecord};

/// Server-side confirmation that a purchase token is genuine.
///
/// Implementations must fail closed: transport problems, timeouts and
/// non-success statuses all surface as errors, never as success.
#[async_trait]
pub trait Verifier: Send + Sync {
    async fn verify(&self, record: &VerificationRecord) -> Result<(), FlowError>;
}
