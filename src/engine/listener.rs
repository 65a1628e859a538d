//! Background entitlement listener.
//!
//! The platform delivers entitlement/transaction updates on a long-lived
//! stream, independent of any purchase the engine started. The listener's
//! only job is to finalize verified transactions so the platform stops
//! redelivering them; finalization is idempotent, so overlapping with a
//! purchase flow acknowledging the same transaction is harmless.

use std::sync::Arc;

use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::store::{EntitlementEvent, StoreApi};

/// Cancellable handle to the listener task. Started once per engine,
/// cancelled exactly once at teardown (or on drop).
#[derive(Debug)]
pub struct EntitlementListener {
    task: Option<JoinHandle<()>>,
}

impl EntitlementListener {
    pub fn start<S>(store: Arc<S>) -> Self
    where
        S: StoreApi + ?Sized + 'static,
    {
        let task = tokio::spawn(async move {
            log::info!("[LISTENER] entitlement listener started");
            let mut events = store.entitlement_events();
            while let Some(event) = events.next().await {
                match event {
                    EntitlementEvent::Verified(tx) => {
                        log::info!(
                            "[LISTENER] finalizing transaction {} for {}",
                            tx.id,
                            tx.product_id
                        );
                        store.finish_transaction(tx.id).await;
                    }
                    // Never finalize what the platform could not verify;
                    // its own recovery will redeliver the transaction.
                    EntitlementEvent::Unverified { product_id, reason } => {
                        log::warn!(
                            "[LISTENER] skipping unverified event for {product_id}: {reason}"
                        );
                    }
                }
            }
            log::info!("[LISTENER] entitlement stream ended");
        });
        Self { task: Some(task) }
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            log::info!("[LISTENER] cancelling entitlement listener");
            task.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for EntitlementListener {
    fn drop(&mut self) {
        self.cancel();
    }
}
