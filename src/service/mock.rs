use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;

use crate::{
    adapter::InMemoryGateway,
    domain::{
        FlowError, Product, Purchase, PurchaseOutcome, PurchasePayload, PurchaseState,
        VerificationRecord, VerificationStatus,
    },
    port::Verifier,
};

/// Package identifier used by the scripted demo/test data.
pub const DEMO_PACKAGE: &str = "com.refuel.drive";

/// Verifier with a fixed verdict and a call counter. Used by the demo CLI and
/// by tests that assert whether verification ever happened.
pub struct StubVerifier {
    verdict: Result<(), FlowError>,
    calls: AtomicUsize,
}

impl StubVerifier {
    pub fn approving() -> Self {
        Self {
            verdict: Ok(()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            verdict: Err(FlowError::VerificationRejected),
            calls: AtomicUsize::new(0),
        }
    }

    /// Simulates the validation endpoint being unreachable.
    pub fn transport_failing() -> Self {
        Self {
            verdict: Err(FlowError::VerificationTransport(
                "connection refused".to_string(),
            )),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Verifier for StubVerifier {
    async fn verify(&self, _record: &VerificationRecord) -> Result<(), FlowError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verdict.clone()
    }
}

/// Verification record with randomized token and order id for a sku.
pub fn verification_record(sku: &str) -> VerificationRecord {
    let mut rng = rand::rng();
    VerificationRecord {
        package_name: DEMO_PACKAGE.to_string(),
        product_id: sku.to_string(),
        purchase_token: format!("tok-{:016x}", rng.random::<u64>()),
        order_id: format!("order-{:08x}", rng.random::<u32>()),
        purchase_time: Utc::now(),
        developer_payload: None,
    }
}

/// A successful outcome that passed the local signature check.
pub fn verified_outcome(sku: &str) -> PurchaseOutcome {
    PurchaseOutcome::Success(PurchasePayload {
        sku: sku.to_string(),
        verification: VerificationStatus::Verified(verification_record(sku)),
    })
}

/// A successful outcome whose local signature check failed.
pub fn unverified_outcome(sku: &str) -> PurchaseOutcome {
    PurchaseOutcome::Success(PurchasePayload {
        sku: sku.to_string(),
        verification: VerificationStatus::Unverified,
    })
}

/// A completed-but-not-consumed purchase, as a prior session leaves it.
pub fn acknowledged_purchase(sku: &str) -> Purchase {
    let record = verification_record(sku);
    let mut rng = rand::rng();
    Purchase {
        uid: format!("uid-{:08x}", rng.random::<u32>()),
        sku: sku.to_string(),
        state: PurchaseState::Acknowledged,
        order_uid: record.order_id.clone(),
        payload: None,
        created: record.purchase_time,
        verification: record,
    }
}

/// Scripted gateway for the demo session: a small catalog, `buys` verified
/// purchase outcomes for `sku`, one purchase left unfinished by a prior
/// session, and one confirmable intent outcome.
pub fn seeded_gateway(sku: &str, buys: usize) -> InMemoryGateway {
    let gateway = InMemoryGateway::new().with_products(vec![
        Product {
            sku: "antifreeze".to_string(),
            title: "Antifreeze".to_string(),
            price_value: "0.99".to_string(),
            price_currency: "EUR".to_string(),
        },
        Product {
            sku: "gas".to_string(),
            title: "Gas".to_string(),
            price_value: "0.99".to_string(),
            price_currency: "EUR".to_string(),
        },
    ]);

    for _ in 0..buys {
        gateway.script_purchase(sku, verified_outcome(sku));
    }
    gateway.add_purchase(acknowledged_purchase(sku));
    gateway.script_intent_outcome(verified_outcome(sku));
    gateway
}
