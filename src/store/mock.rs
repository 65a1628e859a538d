//! Pure in-memory store client for tests and the sandbox binary.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio::sync::mpsc;

use crate::model::StoreOffering;
use crate::store::{
    CorrelationToken, EntitlementEvent, PurchaseOutcome, StoreApi, StoreError, StoreTransaction,
};

struct MockState {
    offerings: Vec<StoreOffering>,
    /// Scripted purchase results, consumed front-to-back. When empty, a
    /// purchase auto-succeeds with a generated transaction.
    purchase_script: VecDeque<Result<PurchaseOutcome, StoreError>>,
    /// Every finish call, in order, including repeats.
    finished: Vec<u64>,
    lookup_calls: usize,
    purchase_calls: usize,
    last_token: Option<CorrelationToken>,
    next_transaction_id: u64,
    events: Option<mpsc::UnboundedReceiver<EntitlementEvent>>,
    event_sender: mpsc::UnboundedSender<EntitlementEvent>,
}

pub struct MockStore {
    state: Mutex<MockState>,
}

impl MockStore {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: Mutex::new(MockState {
                offerings: Vec::new(),
                purchase_script: VecDeque::new(),
                finished: Vec::new(),
                lookup_calls: 0,
                purchase_calls: 0,
                last_token: None,
                next_transaction_id: 1000,
                events: Some(rx),
                event_sender: tx,
            }),
        }
    }

    pub fn set_offerings(&self, offerings: Vec<StoreOffering>) {
        self.state.lock().unwrap().offerings = offerings;
    }

    pub fn queue_purchase_result(&self, result: Result<PurchaseOutcome, StoreError>) {
        self.state.lock().unwrap().purchase_script.push_back(result);
    }

    /// Handle for feeding entitlement events into the stream.
    pub fn event_sender(&self) -> mpsc::UnboundedSender<EntitlementEvent> {
        self.state.lock().unwrap().event_sender.clone()
    }

    pub fn finished_transactions(&self) -> Vec<u64> {
        self.state.lock().unwrap().finished.clone()
    }

    pub fn lookup_calls(&self) -> usize {
        self.state.lock().unwrap().lookup_calls
    }

    pub fn purchase_calls(&self) -> usize {
        self.state.lock().unwrap().purchase_calls
    }

    pub fn last_token(&self) -> Option<CorrelationToken> {
        self.state.lock().unwrap().last_token
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreApi for MockStore {
    async fn lookup_offerings(&self, ids: &[String]) -> Result<Vec<StoreOffering>, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.lookup_calls += 1;
        if ids.is_empty() {
            return Err(StoreError::EmptyRequest);
        }
        let found: Vec<StoreOffering> = state
            .offerings
            .iter()
            .filter(|o| ids.iter().any(|id| id == o.id()))
            .cloned()
            .collect();
        if found.is_empty() {
            return Err(StoreError::NoOfferings);
        }
        Ok(found)
    }

    async fn purchase(
        &self,
        offering: &StoreOffering,
        token: CorrelationToken,
    ) -> Result<PurchaseOutcome, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.purchase_calls += 1;
        state.last_token = Some(token);
        if let Some(scripted) = state.purchase_script.pop_front() {
            return scripted;
        }
        let id = state.next_transaction_id;
        state.next_transaction_id += 1;
        Ok(PurchaseOutcome::Verified(StoreTransaction {
            id,
            original_id: id,
            product_id: offering.product_id.clone(),
            receipt: format!("receipt-{}-{id}", offering.product_id),
        }))
    }

    fn entitlement_events(&self) -> BoxStream<'static, EntitlementEvent> {
        let rx = self.state.lock().unwrap().events.take();
        match rx {
            Some(rx) => Box::pin(futures::stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|event| (event, rx))
            })),
            // The stream was already claimed; hand out one that never yields.
            None => Box::pin(futures::stream::pending()),
        }
    }

    async fn finish_transaction(&self, transaction_id: u64) {
        self.state.lock().unwrap().finished.push(transaction_id);
    }
}
