#![allow(dead_code)]

/// Shared test utilities and helpers
use std::sync::Arc;

use refuel::{
    adapter::InMemoryGateway,
    domain::{CoordinatorConfig, UnverifiedPolicy},
    service::{mock::StubVerifier, Coordinator},
};

pub use refuel::service::mock::{
    acknowledged_purchase, unverified_outcome, verification_record, verified_outcome,
};

pub const SKU: &str = "antifreeze";

/// Test context wiring a scripted gateway and a stub verifier into a
/// coordinator, with helpers to steer the fuel level.
pub struct TestContext {
    pub gateway: Arc<InMemoryGateway>,
    pub verifier: Arc<StubVerifier>,
    pub coordinator: Coordinator,
}

impl TestContext {
    /// Approving verifier, default (Deny) policy, full tank.
    pub fn new() -> Self {
        Self::build(StubVerifier::approving(), CoordinatorConfig::default())
    }

    pub fn with_verifier(verifier: StubVerifier) -> Self {
        Self::build(verifier, CoordinatorConfig::default())
    }

    pub fn with_policy(policy: UnverifiedPolicy) -> Self {
        Self::build(
            StubVerifier::approving(),
            CoordinatorConfig {
                unverified_policy: policy,
            },
        )
    }

    pub fn build(verifier: StubVerifier, config: CoordinatorConfig) -> Self {
        let gateway = Arc::new(InMemoryGateway::new());
        let verifier = Arc::new(verifier);
        let coordinator = Coordinator::new(gateway.clone(), verifier.clone(), config);
        Self {
            gateway,
            verifier,
            coordinator,
        }
    }

    pub fn fuel(&self) -> u8 {
        self.coordinator.fuel()
    }

    /// Burn fuel down to the given level.
    pub fn drain_to(&self, level: u8) {
        while self.coordinator.fuel() > level {
            self.coordinator.spend_fuel();
        }
    }
}
