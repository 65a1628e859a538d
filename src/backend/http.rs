//! HTTP implementation of [`BackendApi`] over reqwest.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::backend::{BackendApi, BackendError};
use crate::model::{ApiEnvelope, CatalogProduct, Entitlement, EntitlementSnapshot, PurchaseProof, ThemeEntry};

const HEADER_X_API_KEY: &str = "x-api-key";

pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    // Responses are read as text and decoded separately so a malformed body
    // surfaces as BackendError::Decoding rather than a transport failure.
    async fn get_envelope<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiEnvelope<T>, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("[BACKEND] GET {url}");
        let body = self
            .http
            .get(&url)
            .header(HEADER_X_API_KEY, &self.api_key)
            .send()
            .await?
            .text()
            .await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn entitlement_snapshot(
        &self,
        user_id: &str,
    ) -> Result<ApiEnvelope<EntitlementSnapshot>, BackendError> {
        self.get_envelope(&format!("/api/iap/{user_id}/Active")).await
    }

    async fn catalog(&self) -> Result<ApiEnvelope<Vec<CatalogProduct>>, BackendError> {
        self.get_envelope("/api/core/app/product").await
    }

    async fn theme_config(&self) -> Result<ApiEnvelope<Vec<ThemeEntry>>, BackendError> {
        self.get_envelope("/api/theme").await
    }

    async fn submit_purchase(
        &self,
        proof: &PurchaseProof,
    ) -> Result<ApiEnvelope<Entitlement>, BackendError> {
        let url = format!("{}/api/iap/ios/handle", self.base_url);
        log::debug!("[BACKEND] POST {url} for {}", proof.product_id);
        let body = self
            .http
            .post(&url)
            .header(HEADER_X_API_KEY, &self.api_key)
            .json(proof)
            .send()
            .await?
            .text()
            .await?;
        Ok(serde_json::from_str(&body)?)
    }
}
