mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use refuel::{
    adapter::InMemoryGateway,
    domain::{CoordinatorConfig, PurchaseIntent, Settlement},
    service::{boot, mock::StubVerifier, Session},
};

async fn session_with_gateway() -> (Arc<InMemoryGateway>, Session) {
    let gateway = Arc::new(InMemoryGateway::new());
    let session = boot(
        gateway.clone(),
        Arc::new(StubVerifier::approving()),
        CoordinatorConfig::default(),
    )
    .await
    .unwrap();
    (gateway, session)
}

fn intent() -> PurchaseIntent {
    PurchaseIntent {
        sku: SKU.to_string(),
    }
}

/// Give the spawned router a moment to drain its channel.
async fn settle_router() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn unauthorized_intent_is_dropped() {
    let (gateway, session) = session_with_gateway().await;
    session.coordinator.spend_fuel();
    session.coordinator.spend_fuel();
    gateway.script_intent_outcome(verified_outcome(SKU));

    gateway.deliver_intent(intent());
    settle_router().await;

    assert_eq!(gateway.confirmations(), 0);
    assert!(gateway.consume_log().is_empty());
    assert_eq!(session.coordinator.fuel(), 2);
}

#[tokio::test]
async fn authorized_intent_is_confirmed_and_granted() {
    let (gateway, session) = session_with_gateway().await;
    session.coordinator.spend_fuel();
    session.coordinator.spend_fuel();
    gateway.script_intent_outcome(verified_outcome(SKU));

    session.router.authorization().sign_in();
    gateway.deliver_intent(intent());
    settle_router().await;

    assert_eq!(gateway.confirmations(), 1);
    assert_eq!(session.coordinator.fuel(), 3);
}

#[tokio::test]
async fn catch_up_after_sign_in_recovers_a_dropped_intent() {
    let (gateway, session) = session_with_gateway().await;
    session.coordinator.spend_fuel();
    gateway.script_intent_outcome(verified_outcome(SKU));

    // Delivered while signed out: pushed copy is dropped, but the gateway
    // still remembers the intent as pending.
    gateway.deliver_intent(intent());
    settle_router().await;
    assert_eq!(gateway.confirmations(), 0);

    session.router.authorization().sign_in();
    let settlement = session.router.catch_up().await.unwrap();

    assert_eq!(
        settlement,
        Some(Settlement::Granted {
            sku: SKU.to_string(),
            fuel_level: 4
        })
    );
    assert_eq!(gateway.confirmations(), 1);
}

#[tokio::test]
async fn catch_up_while_unauthorized_does_nothing() {
    let (gateway, session) = session_with_gateway().await;
    gateway.script_intent_outcome(verified_outcome(SKU));
    gateway.deliver_intent(intent());
    settle_router().await;

    let settlement = session.router.catch_up().await.unwrap();

    assert_eq!(settlement, None);
    assert_eq!(gateway.confirmations(), 0);
}

#[tokio::test]
async fn catch_up_with_no_pending_intent_is_a_no_op() {
    let (gateway, session) = session_with_gateway().await;
    session.router.authorization().sign_in();

    let settlement = session.router.catch_up().await.unwrap();

    assert_eq!(settlement, None);
    assert_eq!(gateway.confirmations(), 0);
}

#[tokio::test]
async fn sign_out_gates_intents_again() {
    let (gateway, session) = session_with_gateway().await;
    let authorization = session.router.authorization();
    gateway.script_intent_outcome(verified_outcome(SKU));

    authorization.sign_in();
    authorization.sign_out();
    gateway.deliver_intent(intent());
    settle_router().await;

    assert_eq!(gateway.confirmations(), 0);
}
