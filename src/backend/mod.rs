//! Entitlement/subscription backend boundary.
//!
//! Four authenticated operations, each decoding the canonical
//! `{code, title, message, data}` envelope. Transport failures and decode
//! failures are distinct error kinds: the engine shows both as a generic
//! user-facing error, but a decode failure means the contract drifted and
//! must stay visible in the logs.

pub mod http;
pub mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{ApiEnvelope, CatalogProduct, Entitlement, EntitlementSnapshot, PurchaseProof, ThemeEntry};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response body: {0}")]
    Decoding(#[from] serde_json::Error),
}

#[async_trait]
pub trait BackendApi: Send + Sync {
    /// `GET /api/iap/{userId}/Active`: current subscription plus the
    /// catalog/theme freshness timestamps.
    async fn entitlement_snapshot(
        &self,
        user_id: &str,
    ) -> Result<ApiEnvelope<EntitlementSnapshot>, BackendError>;

    /// `GET /api/core/app/product`: the sellable product catalog.
    async fn catalog(&self) -> Result<ApiEnvelope<Vec<CatalogProduct>>, BackendError>;

    /// `GET /api/theme`: vendor theme configuration.
    async fn theme_config(&self) -> Result<ApiEnvelope<Vec<ThemeEntry>>, BackendError>;

    /// `POST /api/iap/ios/handle`: submits a purchase proof for
    /// verification and recording.
    async fn submit_purchase(
        &self,
        proof: &PurchaseProof,
    ) -> Result<ApiEnvelope<Entitlement>, BackendError>;
}

#[async_trait]
impl<T: BackendApi + ?Sized> BackendApi for Arc<T> {
    async fn entitlement_snapshot(
        &self,
        user_id: &str,
    ) -> Result<ApiEnvelope<EntitlementSnapshot>, BackendError> {
        (**self).entitlement_snapshot(user_id).await
    }

    async fn catalog(&self) -> Result<ApiEnvelope<Vec<CatalogProduct>>, BackendError> {
        (**self).catalog().await
    }

    async fn theme_config(&self) -> Result<ApiEnvelope<Vec<ThemeEntry>>, BackendError> {
        (**self).theme_config().await
    }

    async fn submit_purchase(
        &self,
        proof: &PurchaseProof,
    ) -> Result<ApiEnvelope<Entitlement>, BackendError> {
        (**self).submit_purchase(proof).await
    }
}
