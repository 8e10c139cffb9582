use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{
    domain::{
        GatewayError, Product, Purchase, PurchaseIntent, PurchaseOutcome, PurchaseState,
        VerificationStatus,
    },
    port::Gateway,
};

/// Capacity of each intent push channel. A lagging subscriber loses the push
/// and recovers via the pull-based intent query.
const INTENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Default)]
struct GatewayData {
    available: bool,
    wallet_address: String,
    products: Vec<Product>,
    /// Scripted outcomes per sku, consumed front-to-back by `purchase`.
    purchase_scripts: HashMap<String, VecDeque<PurchaseOutcome>>,
    /// Scripted outcomes for intent confirmations.
    intent_scripts: VecDeque<PurchaseOutcome>,
    pending_intent: Option<PurchaseIntent>,
    /// Skus whose consumption is scripted to fail.
    consume_failures: HashSet<String>,
    /// Every sku passed to `consume_purchase`, in call order.
    consume_log: Vec<String>,
    confirmations: usize,
    purchases: Vec<Purchase>,
    intent_subscribers: Vec<mpsc::Sender<PurchaseIntent>>,
}

/// Scripted in-memory gateway, the sandbox stand-in for the billing SDK.
///
/// Used by the demo CLI and the test suite. Outcomes are queued up front via
/// the scripting methods; the trait implementation then behaves like the real
/// surface, including purchase bookkeeping and idempotent consumption.
pub struct InMemoryGateway {
    data: Mutex<GatewayData>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(GatewayData {
                available: true,
                wallet_address: "0x71c0ffee5andbox000000000000000000000001".to_string(),
                ..GatewayData::default()
            }),
        }
    }

    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.data.lock().unwrap().products = products;
        self
    }

    pub fn set_available(&self, available: bool) {
        self.data.lock().unwrap().available = available;
    }

    /// Queue the outcome the next `purchase(sku)` call will report.
    pub fn script_purchase(&self, sku: &str, outcome: PurchaseOutcome) {
        self.data
            .lock()
            .unwrap()
            .purchase_scripts
            .entry(sku.to_string())
            .or_default()
            .push_back(outcome);
    }

    /// Queue the outcome the next intent confirmation will report.
    pub fn script_intent_outcome(&self, outcome: PurchaseOutcome) {
        self.data.lock().unwrap().intent_scripts.push_back(outcome);
    }

    /// Make consumption fail for the given sku until cleared.
    pub fn fail_consume(&self, sku: &str) {
        self.data
            .lock()
            .unwrap()
            .consume_failures
            .insert(sku.to_string());
    }

    /// Seed a purchase left over from a prior session.
    pub fn add_purchase(&self, purchase: Purchase) {
        self.data.lock().unwrap().purchases.push(purchase);
    }

    /// Push an intent to every subscriber and remember it as pending.
    pub fn deliver_intent(&self, intent: PurchaseIntent) {
        let mut data = self.data.lock().unwrap();
        data.pending_intent = Some(intent.clone());
        data.intent_subscribers.retain(|tx| {
            match tx.try_send(intent.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(sku = %intent.sku, "intent subscriber lagging, push dropped");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
    }

    pub fn consume_log(&self) -> Vec<String> {
        self.data.lock().unwrap().consume_log.clone()
    }

    pub fn confirmations(&self) -> usize {
        self.data.lock().unwrap().confirmations
    }

    /// Record a successful outcome's purchase in the history, the way the
    /// real gateway creates a purchase when a transaction completes.
    fn record_success(data: &mut GatewayData, outcome: &PurchaseOutcome) {
        if let PurchaseOutcome::Success(payload) = outcome {
            if let VerificationStatus::Verified(record) = &payload.verification {
                let uid = format!("purchase-{}", data.purchases.len() + 1);
                data.purchases.push(Purchase {
                    uid,
                    sku: payload.sku.clone(),
                    state: PurchaseState::Acknowledged,
                    order_uid: record.order_id.clone(),
                    payload: record.developer_payload.clone(),
                    created: record.purchase_time,
                    verification: record.clone(),
                });
            }
        }
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Gateway for InMemoryGateway {
    async fn is_available(&self) -> bool {
        self.data.lock().unwrap().available
    }

    async fn testing_wallet_address(&self) -> Result<String, GatewayError> {
        let data = self.data.lock().unwrap();
        if !data.available {
            return Err(GatewayError::Unavailable);
        }
        Ok(data.wallet_address.clone())
    }

    async fn products(&self, skus: Option<&[String]>) -> Result<Vec<Product>, GatewayError> {
        let data = self.data.lock().unwrap();
        if !data.available {
            return Err(GatewayError::Unavailable);
        }
        Ok(match skus {
            Some(wanted) => data
                .products
                .iter()
                .filter(|p| wanted.contains(&p.sku))
                .cloned()
                .collect(),
            None => data.products.clone(),
        })
    }

    async fn purchase(&self, sku: &str) -> Result<PurchaseOutcome, GatewayError> {
        let mut data = self.data.lock().unwrap();
        if !data.available {
            return Err(GatewayError::Unavailable);
        }
        let outcome = match data
            .purchase_scripts
            .get_mut(sku)
            .and_then(VecDeque::pop_front)
        {
            Some(outcome) => outcome,
            None => PurchaseOutcome::Failed {
                reason: format!("{sku} is not in the catalog"),
            },
        };
        Self::record_success(&mut data, &outcome);
        Ok(outcome)
    }

    async fn confirm_purchase_intent(&self) -> Result<PurchaseOutcome, GatewayError> {
        let mut data = self.data.lock().unwrap();
        if !data.available {
            return Err(GatewayError::Unavailable);
        }
        data.confirmations += 1;
        data.pending_intent = None;
        let outcome = data
            .intent_scripts
            .pop_front()
            .ok_or_else(|| GatewayError::Sdk("no purchase intent to confirm".to_string()))?;
        Self::record_success(&mut data, &outcome);
        Ok(outcome)
    }

    async fn purchase_intent(&self) -> Result<Option<PurchaseIntent>, GatewayError> {
        let data = self.data.lock().unwrap();
        if !data.available {
            return Err(GatewayError::Unavailable);
        }
        Ok(data.pending_intent.clone())
    }

    async fn consume_purchase(&self, sku: &str) -> Result<(), GatewayError> {
        let mut data = self.data.lock().unwrap();
        if !data.available {
            return Err(GatewayError::Unavailable);
        }
        data.consume_log.push(sku.to_string());
        if data.consume_failures.contains(sku) {
            return Err(GatewayError::Sdk(format!("consume rejected for {sku}")));
        }
        // Idempotent: consuming an already-consumed sku is a no-op.
        for purchase in data.purchases.iter_mut() {
            if purchase.sku == sku && purchase.state == PurchaseState::Acknowledged {
                purchase.state = PurchaseState::Consumed;
            }
        }
        Ok(())
    }

    async fn all_purchases(&self) -> Result<Vec<Purchase>, GatewayError> {
        let data = self.data.lock().unwrap();
        if !data.available {
            return Err(GatewayError::Unavailable);
        }
        Ok(data.purchases.clone())
    }

    async fn latest_purchase(&self, sku: &str) -> Result<Option<Purchase>, GatewayError> {
        let data = self.data.lock().unwrap();
        if !data.available {
            return Err(GatewayError::Unavailable);
        }
        Ok(data.purchases.iter().rev().find(|p| p.sku == sku).cloned())
    }

    async fn unfinished_purchases(&self) -> Result<Vec<Purchase>, GatewayError> {
        let data = self.data.lock().unwrap();
        if !data.available {
            return Err(GatewayError::Unavailable);
        }
        Ok(data
            .purchases
            .iter()
            .filter(|p| p.state == PurchaseState::Acknowledged)
            .cloned()
            .collect())
    }

    fn subscribe_intents(&self) -> mpsc::Receiver<PurchaseIntent> {
        let (tx, rx) = mpsc::channel(INTENT_CHANNEL_CAPACITY);
        self.data.lock().unwrap().intent_subscribers.push(tx);
        rx
    }
}
