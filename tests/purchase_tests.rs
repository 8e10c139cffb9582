mod common;

use common::*;
use refuel::{
    domain::{
        FlowError, GatewayError, PurchaseError, PurchaseOutcome, Settlement, UnverifiedPolicy,
    },
    service::mock::StubVerifier,
};

#[tokio::test]
async fn verified_purchase_grants_one_unit() {
    let ctx = TestContext::new();
    ctx.drain_to(2);
    ctx.gateway.script_purchase(SKU, verified_outcome(SKU));

    let settlement = ctx.coordinator.buy(SKU).await.unwrap();

    assert_eq!(
        settlement,
        Settlement::Granted {
            sku: SKU.to_string(),
            fuel_level: 3
        }
    );
    assert_eq!(ctx.fuel(), 3);
    assert_eq!(ctx.verifier.calls(), 1);
    assert_eq!(ctx.gateway.consume_log(), vec![SKU.to_string()]);
}

#[tokio::test]
async fn grant_at_full_tank_is_a_no_op() {
    let ctx = TestContext::new();
    ctx.gateway.script_purchase(SKU, verified_outcome(SKU));

    let settlement = ctx.coordinator.buy(SKU).await.unwrap();

    assert_eq!(
        settlement,
        Settlement::Granted {
            sku: SKU.to_string(),
            fuel_level: 4
        }
    );
    assert_eq!(ctx.fuel(), 4);
}

#[tokio::test]
async fn verifier_transport_error_prevents_consume() {
    let ctx = TestContext::with_verifier(StubVerifier::transport_failing());
    ctx.drain_to(2);

    let err = ctx
        .coordinator
        .settle(verified_outcome(SKU))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PurchaseError::Flow(FlowError::VerificationTransport(_))
    ));
    assert!(ctx.gateway.consume_log().is_empty());
    assert_eq!(ctx.fuel(), 2);
}

#[tokio::test]
async fn verifier_rejection_prevents_consume_and_grant() {
    let ctx = TestContext::with_verifier(StubVerifier::rejecting());
    ctx.drain_to(1);

    let err = ctx
        .coordinator
        .settle(verified_outcome(SKU))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PurchaseError::Flow(FlowError::VerificationRejected)
    ));
    assert!(ctx.gateway.consume_log().is_empty());
    assert_eq!(ctx.fuel(), 1);
}

#[tokio::test]
async fn consume_failure_prevents_grant() {
    let ctx = TestContext::new();
    ctx.drain_to(2);
    ctx.gateway.fail_consume(SKU);

    let err = ctx
        .coordinator
        .settle(verified_outcome(SKU))
        .await
        .unwrap_err();

    assert!(matches!(err, PurchaseError::Flow(FlowError::Consumption(_))));
    assert_eq!(ctx.verifier.calls(), 1);
    assert_eq!(ctx.fuel(), 2);
}

#[tokio::test]
async fn unverified_purchase_denied_by_default() {
    let ctx = TestContext::new();
    ctx.drain_to(2);

    let settlement = ctx
        .coordinator
        .settle(unverified_outcome(SKU))
        .await
        .unwrap();

    assert_eq!(
        settlement,
        Settlement::Denied {
            sku: SKU.to_string()
        }
    );
    assert_eq!(ctx.verifier.calls(), 0);
    assert!(ctx.gateway.consume_log().is_empty());
    assert_eq!(ctx.fuel(), 2);
}

#[tokio::test]
async fn unverified_purchase_granted_under_grant_anyway_policy() {
    let ctx = TestContext::with_policy(UnverifiedPolicy::GrantAnyway);
    ctx.drain_to(1);

    let settlement = ctx
        .coordinator
        .settle(unverified_outcome(SKU))
        .await
        .unwrap();

    assert_eq!(
        settlement,
        Settlement::Granted {
            sku: SKU.to_string(),
            fuel_level: 2
        }
    );
    // Grant-anyway skips the server round-trip but still consumes.
    assert_eq!(ctx.verifier.calls(), 0);
    assert_eq!(ctx.gateway.consume_log(), vec![SKU.to_string()]);
}

#[tokio::test]
async fn defer_to_server_reuses_latest_purchase_record() {
    let ctx = TestContext::with_policy(UnverifiedPolicy::DeferToServer);
    ctx.drain_to(0);
    ctx.gateway.add_purchase(acknowledged_purchase(SKU));

    let settlement = ctx
        .coordinator
        .settle(unverified_outcome(SKU))
        .await
        .unwrap();

    assert_eq!(
        settlement,
        Settlement::Granted {
            sku: SKU.to_string(),
            fuel_level: 1
        }
    );
    assert_eq!(ctx.verifier.calls(), 1);
}

#[tokio::test]
async fn defer_to_server_denies_without_a_record() {
    let ctx = TestContext::with_policy(UnverifiedPolicy::DeferToServer);
    ctx.drain_to(3);

    let settlement = ctx
        .coordinator
        .settle(unverified_outcome(SKU))
        .await
        .unwrap();

    assert_eq!(
        settlement,
        Settlement::Denied {
            sku: SKU.to_string()
        }
    );
    assert_eq!(ctx.fuel(), 3);
}

#[tokio::test]
async fn pending_outcome_changes_nothing_and_may_reenter() {
    let ctx = TestContext::new();
    ctx.drain_to(2);

    let first = ctx.coordinator.settle(PurchaseOutcome::Pending).await.unwrap();
    let second = ctx.coordinator.settle(PurchaseOutcome::Pending).await.unwrap();

    assert_eq!(first, Settlement::Pending);
    assert_eq!(second, Settlement::Pending);
    assert_eq!(ctx.fuel(), 2);
    assert!(ctx.gateway.consume_log().is_empty());
}

#[tokio::test]
async fn cancelled_outcome_is_terminal() {
    let ctx = TestContext::new();
    ctx.drain_to(2);

    let settlement = ctx
        .coordinator
        .settle(PurchaseOutcome::UserCancelled)
        .await
        .unwrap();

    assert_eq!(settlement, Settlement::Cancelled);
    assert_eq!(ctx.fuel(), 2);
}

#[tokio::test]
async fn failed_outcome_surfaces_the_carried_error() {
    let ctx = TestContext::new();

    let err = ctx
        .coordinator
        .settle(PurchaseOutcome::Failed {
            reason: "payment declined".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, PurchaseError::Gateway(GatewayError::Sdk(_))));
    assert_eq!(ctx.fuel(), 4);
}

#[tokio::test]
async fn buying_an_unknown_sku_fails() {
    let ctx = TestContext::new();

    let err = ctx.coordinator.buy("snow-tires").await.unwrap_err();

    assert!(matches!(err, PurchaseError::Gateway(GatewayError::Sdk(_))));
    assert_eq!(ctx.fuel(), 4);
}
