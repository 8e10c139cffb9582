use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::PurchaseError;

/// Server-side verification data attached to a completed purchase.
///
/// The coordinator forwards `package_name`, `product_id` and `purchase_token`
/// to the remote verifier. The remaining fields travel with the purchase but
/// never steer control flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub package_name: String,
    pub product_id: String,
    pub purchase_token: String,
    pub order_id: String,
    pub purchase_time: DateTime<Utc>,
    pub developer_payload: Option<String>,
}

/// Result of the gateway's local signature check on a successful purchase.
///
/// The verification record is only trustworthy enough to forward when the
/// local check passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum VerificationStatus {
    Verified(VerificationRecord),
    Unverified,
}

/// Payload carried inside a successful [`PurchaseOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasePayload {
    pub sku: String,
    pub verification: VerificationStatus,
}

/// What the gateway reported for one purchase attempt or intent confirmation.
///
/// Immutable once received; classified exactly once via [`classify`].
///
/// [`classify`]: PurchaseOutcome::classify
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state")]
pub enum PurchaseOutcome {
    Success(PurchasePayload),
    Pending,
    UserCancelled,
    Failed { reason: String },
}

/// Exhaustive classification of a [`PurchaseOutcome`], pure and side-effect
/// free. The coordinator dispatches on this instead of matching loosely-typed
/// result objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Locally verified success: proceed to server verification, then consume.
    VerifyAndConsume {
        sku: String,
        record: VerificationRecord,
    },
    /// Success whose local signature check failed; policy decides.
    Unverified { sku: String },
    /// The outcome may be re-delivered later through the same entry point.
    StillPending,
    /// Terminal for this attempt, no state change.
    Cancelled,
    /// Terminal for this attempt; the carried error is recorded.
    Failed { reason: String },
}

impl PurchaseOutcome {
    pub fn classify(self) -> Disposition {
        match self {
            PurchaseOutcome::Success(payload) => match payload.verification {
                VerificationStatus::Verified(record) => Disposition::VerifyAndConsume {
                    sku: payload.sku,
                    record,
                },
                VerificationStatus::Unverified => Disposition::Unverified { sku: payload.sku },
            },
            PurchaseOutcome::Pending => Disposition::StillPending,
            PurchaseOutcome::UserCancelled => Disposition::Cancelled,
            PurchaseOutcome::Failed { reason } => Disposition::Failed { reason },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseState {
    /// Payment started but not yet completed.
    Pending,
    /// Completed and verified, not yet consumed. Re-delivered as unfinished
    /// until the coordinator consumes it.
    Acknowledged,
    Consumed,
}

/// A completed transaction as returned by history and unfinished queries.
///
/// Created by the gateway; transitions Acknowledged -> Consumed exactly once,
/// driven only by the coordinator. Never deleted by this system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub uid: String,
    pub sku: String,
    pub state: PurchaseState,
    pub order_uid: String,
    pub payload: Option<String>,
    pub created: DateTime<Utc>,
    pub verification: VerificationRecord,
}

/// A purchase originated outside the running session (store catalog or deep
/// link). Must be explicitly confirmed before it yields a [`PurchaseOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseIntent {
    pub sku: String,
}

/// Catalog listing returned by the gateway's product query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    pub title: String,
    pub price_value: String,
    pub price_currency: String,
}

/// Terminal result of settling one purchase outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// Verified, consumed and granted; carries the fuel level after the grant.
    Granted { sku: String, fuel_level: u8 },
    /// Still pending at the gateway; nothing changed.
    Pending,
    /// User backed out; nothing changed.
    Cancelled,
    /// Unverified success denied by policy; nothing granted.
    Denied { sku: String },
}

/// Outcome of one unfinished-purchase sweep. Items are independent: failures
/// are collected per sku and never abort the rest of the sweep.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub granted: usize,
    pub failures: Vec<(String, PurchaseError)>,
}
