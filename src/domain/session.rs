use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Shared sign-in flag gating whether incoming purchase intents are
/// auto-confirmed. Cloned into the intent router and the UI layer.
///
/// Flipping to authorized does not replay dropped intents; the router's
/// pull-based catch-up must be invoked explicitly after sign-in.
#[derive(Debug, Clone, Default)]
pub struct SessionAuthorization(Arc<AtomicBool>);

impl SessionAuthorization {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn sign_out(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_authorized(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
