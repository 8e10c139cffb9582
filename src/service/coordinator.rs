use std::sync::{Arc, Mutex};

use crate::{
    domain::{
        CoordinatorConfig, Disposition, FlowError, FuelTank, GatewayError, PurchaseError,
        PurchaseOutcome, ReconcileReport, Settlement, UnverifiedPolicy, VerificationRecord,
    },
    port::{Gateway, Verifier},
};

/// Drives every purchase outcome through classification, server verification,
/// consumption and the entitlement grant.
///
/// One instance is constructed at session start and shared by handle; user
/// purchases, intent confirmations and the startup reconciliation sweep all
/// funnel through it. No flow retries on failure: a failed verification or
/// consumption terminates that attempt and leaves the tank untouched.
pub struct Coordinator {
    gateway: Arc<dyn Gateway>,
    verifier: Arc<dyn Verifier>,
    tank: Mutex<FuelTank>,
    config: CoordinatorConfig,
}

impl Coordinator {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        verifier: Arc<dyn Verifier>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            gateway,
            verifier,
            tank: Mutex::new(FuelTank::full()),
            config,
        }
    }

    pub fn fuel(&self) -> u8 {
        self.tank.lock().unwrap().level()
    }

    /// Gameplay decrement: burn one unit of fuel. No-op when empty.
    pub fn spend_fuel(&self) -> u8 {
        let level = self.tank.lock().unwrap().spend();
        tracing::debug!(level, "fuel spent");
        level
    }

    /// User-initiated purchase: obtain an outcome from the gateway and settle it.
    pub async fn buy(&self, sku: &str) -> Result<Settlement, PurchaseError> {
        let outcome = self.gateway.purchase(sku).await?;
        self.settle(outcome).await
    }

    /// Classify one purchase outcome and drive it to its terminal state.
    ///
    /// Pending outcomes may be re-delivered later through this same entry
    /// point; nothing is recorded for them, so re-entry is idempotent.
    pub async fn settle(&self, outcome: PurchaseOutcome) -> Result<Settlement, PurchaseError> {
        match outcome.classify() {
            Disposition::VerifyAndConsume { sku, record } => {
                let fuel_level = self.verify_then_consume(&sku, &record).await?;
                Ok(Settlement::Granted { sku, fuel_level })
            }
            Disposition::Unverified { sku } => self.settle_unverified(sku).await,
            Disposition::StillPending => {
                tracing::debug!("purchase still pending at the gateway");
                Ok(Settlement::Pending)
            }
            Disposition::Cancelled => {
                tracing::info!("purchase cancelled by user");
                Ok(Settlement::Cancelled)
            }
            Disposition::Failed { reason } => {
                tracing::warn!(%reason, "gateway reported purchase failure");
                Err(GatewayError::Sdk(reason).into())
            }
        }
    }

    /// Verify the purchase server-side, then consume and grant.
    ///
    /// Fail-closed on verification: any verifier error means no consume and
    /// no grant. A consume failure after successful verification likewise
    /// grants nothing; the purchase stays unfinished and the next
    /// reconciliation sweep picks it up.
    async fn verify_then_consume(
        &self,
        sku: &str,
        record: &VerificationRecord,
    ) -> Result<u8, PurchaseError> {
        if let Err(e) = self.verifier.verify(record).await {
            tracing::warn!(sku, error = %e, "purchase verification failed");
            return Err(e.into());
        }
        self.consume_and_grant(sku).await
    }

    /// Consume via the gateway and grant exactly one unit on success.
    async fn consume_and_grant(&self, sku: &str) -> Result<u8, PurchaseError> {
        if let Err(e) = self.gateway.consume_purchase(sku).await {
            tracing::warn!(sku, error = %e, "consuming purchase failed");
            return Err(FlowError::Consumption(e.to_string()).into());
        }
        let level = self.tank.lock().unwrap().grant();
        tracing::info!(sku, level, "purchase consumed, fuel granted");
        Ok(level)
    }

    /// Policy decision point for a success whose local signature check failed.
    async fn settle_unverified(&self, sku: String) -> Result<Settlement, PurchaseError> {
        match self.config.unverified_policy {
            UnverifiedPolicy::Deny => {
                // The store auto-refunds unverified purchases out of band.
                tracing::warn!(sku, "unverified purchase denied by policy");
                Ok(Settlement::Denied { sku })
            }
            UnverifiedPolicy::GrantAnyway => {
                tracing::warn!(sku, "granting unverified purchase per policy");
                let fuel_level = self.consume_and_grant(&sku).await?;
                Ok(Settlement::Granted { sku, fuel_level })
            }
            UnverifiedPolicy::DeferToServer => match self.gateway.latest_purchase(&sku).await? {
                Some(purchase) => {
                    let fuel_level = self
                        .verify_then_consume(&sku, &purchase.verification)
                        .await?;
                    Ok(Settlement::Granted { sku, fuel_level })
                }
                None => {
                    tracing::warn!(sku, "no purchase record to defer to, denying");
                    Ok(Settlement::Denied { sku })
                }
            },
        }
    }

    /// Drain purchases left unfinished by prior sessions.
    ///
    /// Each purchase is an independent unit of work: a failure consuming one
    /// is recorded and the sweep moves on. Verification is not re-applied
    /// here; the purchase was already verified when originally completed.
    pub async fn reconcile_unfinished(&self) -> Result<ReconcileReport, PurchaseError> {
        let unfinished = self.gateway.unfinished_purchases().await?;
        let mut report = ReconcileReport::default();

        for purchase in unfinished {
            match self.consume_and_grant(&purchase.sku).await {
                Ok(_) => report.granted += 1,
                Err(e) => {
                    tracing::warn!(
                        sku = %purchase.sku,
                        uid = %purchase.uid,
                        error = %e,
                        "failed to reconcile unfinished purchase"
                    );
                    report.failures.push((purchase.sku, e));
                }
            }
        }

        if report.granted > 0 || !report.failures.is_empty() {
            tracing::info!(
                granted = report.granted,
                failed = report.failures.len(),
                "unfinished purchase sweep finished"
            );
        }
        Ok(report)
    }
}
