//! Scriptable in-memory backend for tests and the sandbox binary.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::{BackendApi, BackendError};
use crate::model::{ApiEnvelope, CatalogProduct, Entitlement, EntitlementSnapshot, PurchaseProof, ThemeEntry};

#[derive(Default)]
struct MockState {
    snapshot: Option<ApiEnvelope<EntitlementSnapshot>>,
    catalog: Option<ApiEnvelope<Vec<CatalogProduct>>>,
    theme: Option<ApiEnvelope<Vec<ThemeEntry>>>,
    purchase: Option<ApiEnvelope<Entitlement>>,
    fail_transport: bool,
    snapshot_calls: usize,
    catalog_calls: usize,
    theme_calls: usize,
    submit_calls: usize,
    last_proof: Option<PurchaseProof>,
}

#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_snapshot(&self, envelope: ApiEnvelope<EntitlementSnapshot>) {
        self.state.lock().unwrap().snapshot = Some(envelope);
    }

    pub fn set_catalog(&self, envelope: ApiEnvelope<Vec<CatalogProduct>>) {
        self.state.lock().unwrap().catalog = Some(envelope);
    }

    pub fn set_theme(&self, envelope: ApiEnvelope<Vec<ThemeEntry>>) {
        self.state.lock().unwrap().theme = Some(envelope);
    }

    pub fn set_purchase_response(&self, envelope: ApiEnvelope<Entitlement>) {
        self.state.lock().unwrap().purchase = Some(envelope);
    }

    /// Makes every operation fail before producing an envelope, the way an
    /// unreachable or garbled backend would.
    pub fn fail_all(&self) {
        self.state.lock().unwrap().fail_transport = true;
    }

    pub fn snapshot_calls(&self) -> usize {
        self.state.lock().unwrap().snapshot_calls
    }

    pub fn catalog_calls(&self) -> usize {
        self.state.lock().unwrap().catalog_calls
    }

    pub fn theme_calls(&self) -> usize {
        self.state.lock().unwrap().theme_calls
    }

    pub fn submit_calls(&self) -> usize {
        self.state.lock().unwrap().submit_calls
    }

    pub fn last_proof(&self) -> Option<PurchaseProof> {
        self.state.lock().unwrap().last_proof.clone()
    }
}

fn decode_failure() -> BackendError {
    // A mock stand-in for an unusable response body.
    let err = serde_json::from_str::<ApiEnvelope<()>>("garbled").unwrap_err();
    BackendError::Decoding(err)
}

fn not_found<T>() -> ApiEnvelope<T> {
    ApiEnvelope::failure(404, "Error", "Resource Not Found")
}

#[async_trait]
impl BackendApi for MockBackend {
    async fn entitlement_snapshot(
        &self,
        _user_id: &str,
    ) -> Result<ApiEnvelope<EntitlementSnapshot>, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.snapshot_calls += 1;
        if state.fail_transport {
            return Err(decode_failure());
        }
        Ok(state.snapshot.clone().unwrap_or_else(not_found))
    }

    async fn catalog(&self) -> Result<ApiEnvelope<Vec<CatalogProduct>>, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.catalog_calls += 1;
        if state.fail_transport {
            return Err(decode_failure());
        }
        Ok(state.catalog.clone().unwrap_or_else(not_found))
    }

    async fn theme_config(&self) -> Result<ApiEnvelope<Vec<ThemeEntry>>, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.theme_calls += 1;
        if state.fail_transport {
            return Err(decode_failure());
        }
        Ok(state.theme.clone().unwrap_or_else(not_found))
    }

    async fn submit_purchase(
        &self,
        proof: &PurchaseProof,
    ) -> Result<ApiEnvelope<Entitlement>, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.submit_calls += 1;
        state.last_proof = Some(proof.clone());
        if state.fail_transport {
            return Err(decode_failure());
        }
        Ok(state.purchase.clone().unwrap_or_else(not_found))
    }
}
