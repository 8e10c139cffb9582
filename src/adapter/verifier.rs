use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{
    domain::{FlowError, VerificationRecord},
    port::Verifier,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote verifier backed by the validation endpoint.
///
/// Sends `GET {endpoint}?package_name=..&product_id=..&token=..` and treats
/// exactly HTTP 200 as a verified purchase. Only the status code is
/// consulted; parsing a structured verdict from the body would be a
/// worthwhile hardening step once the endpoint offers one.
pub struct HttpVerifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpVerifier {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, FlowError> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// Build a verifier with a custom request timeout. A timeout is a
    /// transport error and therefore a verification failure.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FlowError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FlowError::VerificationTransport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Verifier for HttpVerifier {
    async fn verify(&self, record: &VerificationRecord) -> Result<(), FlowError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("package_name", record.package_name.as_str()),
                ("product_id", record.product_id.as_str()),
                ("token", record.purchase_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FlowError::VerificationTransport(e.to_string()))?;

        if response.status() == StatusCode::OK {
            tracing::debug!(product_id = %record.product_id, "purchase verified by server");
            Ok(())
        } else {
            tracing::warn!(
                product_id = %record.product_id,
                status = %response.status(),
                "server rejected purchase verification"
            );
            Err(FlowError::VerificationRejected)
        }
    }
}
