//! Platform purchase subsystem boundary.
//!
//! The engine never talks to the platform store directly; it depends on
//! [`StoreApi`], which models the four capabilities it needs: catalog lookup
//! by identifier, purchase initiation, a never-ending entitlement event
//! stream, and transaction finalization. The production implementation is
//! platform glue supplied by the embedding application; [`mock::MockStore`]
//! serves tests and the sandbox binary.

pub mod mock;

use std::fmt;

use async_trait::async_trait;
use futures::stream::BoxStream;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::model::StoreOffering;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The caller asked for offerings without any identifiers.
    #[error("no product identifiers were requested")]
    EmptyRequest,
    /// The platform returned zero offerings for a non-empty request.
    #[error("the store returned no offerings")]
    NoOfferings,
    /// The platform rejected or failed the request.
    #[error("store request failed: {0}")]
    Rejected(String),
}

/// A platform transaction proving a completed purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreTransaction {
    pub id: u64,
    pub original_id: u64,
    pub product_id: String,
    /// Signed receipt blob, forwarded verbatim to the backend.
    pub receipt: String,
}

/// Terminal result of one purchase request.
#[derive(Debug, Clone)]
pub enum PurchaseOutcome {
    /// Signature checked out; carries the transaction to verify and finish.
    Verified(StoreTransaction),
    /// The platform produced a result whose signature did not verify.
    Unverified { product_id: String, reason: String },
    Cancelled,
    /// Deferred, e.g. awaiting parental approval.
    Pending,
    Unknown,
}

/// One item from the platform's entitlement/transaction update stream.
#[derive(Debug, Clone)]
pub enum EntitlementEvent {
    Verified(StoreTransaction),
    Unverified { product_id: String, reason: String },
}

#[async_trait]
pub trait StoreApi: Send + Sync {
    /// Looks up the platform offerings for the given identifiers.
    ///
    /// Fails with [`StoreError::EmptyRequest`] when `ids` is empty and with
    /// [`StoreError::NoOfferings`] when the platform answers a non-empty
    /// request with zero offerings.
    async fn lookup_offerings(&self, ids: &[String]) -> Result<Vec<StoreOffering>, StoreError>;

    /// Requests a purchase of `offering`, tagged with the per-user
    /// correlation token.
    async fn purchase(
        &self,
        offering: &StoreOffering,
        token: CorrelationToken,
    ) -> Result<PurchaseOutcome, StoreError>;

    /// Infinite stream of entitlement updates. Under normal operation the
    /// stream never completes; completion means the platform connection is
    /// gone.
    fn entitlement_events(&self) -> BoxStream<'static, EntitlementEvent>;

    /// Acknowledges a transaction so the platform stops redelivering it.
    /// Finishing the same id more than once is safe.
    async fn finish_transaction(&self, transaction_id: u64);
}

/// Opaque per-user token attached to purchase requests so the platform can
/// associate payment with an account without seeing the raw user id.
///
/// The derivation is a one-way function of the user id alone, so repeated
/// purchases by the same user always carry the same token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationToken([u8; 16]);

impl CorrelationToken {
    pub fn derive(user_id: &str) -> Self {
        let digest = Sha256::digest(user_id.as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for CorrelationToken {
    // UUID-style grouping: 8-4-4-4-12 hex digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = hex::encode(self.0);
        write!(
            f,
            "{}-{}-{}-{}-{}",
            &hex[..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_derivation_is_deterministic() {
        let a = CorrelationToken::derive("user-42");
        let b = CorrelationToken::derive("user-42");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn distinct_users_get_distinct_tokens() {
        assert_ne!(
            CorrelationToken::derive("user-a"),
            CorrelationToken::derive("user-b")
        );
    }

    #[test]
    fn token_displays_in_uuid_grouping() {
        let token = CorrelationToken::derive("user-42").to_string();
        let groups: Vec<&str> = token.split('-').collect();
        assert_eq!(
            groups.iter().map(|g| g.len()).collect::<Vec<_>>(),
            vec![8, 4, 4, 4, 12]
        );
    }
}
