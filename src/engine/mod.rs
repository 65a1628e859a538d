//! Purchase reconciliation engine.
//!
//! This is the core of the crate: it reconciles the backend's view of the
//! user (entitlement snapshot + catalog), the platform store's view
//! (offerings + purchase results) and the local cache into one published
//! [`EngineState`].
//!
//! # Architecture guarantees
//! * **Single owner**: all published state lives behind `&mut self`;
//!   operations are cooperative async tasks that suspend only at I/O.
//! * **Errors are dead ends**: no public operation returns an error.
//!   Every failure is captured into `last_error` (or a non-fatal status
//!   flag) and logged; nothing here is fatal to the process.
//! * **Deterministic teardown**: the background entitlement listener is an
//!   explicit handle cancelled exactly once at shutdown.

pub mod listener;
pub mod logic;
pub mod state;


pub use state::EngineState;

use std::path::PathBuf;
use std::sync::Arc;

use crate::backend::{BackendApi, BackendError};
use crate::cache::{CacheStore, CatalogCache, ThemeCache};
use crate::model::{
    CatalogProduct, EntitlementSnapshot, ErrorInfo, PurchaseProof, StoreOffering, ThemeEntry,
};
use crate::store::{CorrelationToken, PurchaseOutcome, StoreApi, StoreError, StoreTransaction};

use listener::EntitlementListener;

/// Injected engine configuration. No globals: the embedding application
/// owns the user identity and the cache location.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub user_id: String,
    pub cache_dir: PathBuf,
}

/// State carried through one purchase flow, from product selection to the
/// platform result. Never persisted; dropped on every exit from the flow.
struct PurchaseAttempt<'a> {
    product: &'a CatalogProduct,
    offering: StoreOffering,
    token: CorrelationToken,
}

pub struct ReconcileEngine<B, S: ?Sized> {
    user_id: String,
    backend: B,
    store: Arc<S>,
    cache: CacheStore,
    state: EngineState,
    /// Last snapshot fetched from the backend; source of the freshness
    /// timestamps and the active subscription.
    snapshot: Option<EntitlementSnapshot>,
    listener: EntitlementListener,
}

impl<B, S> ReconcileEngine<B, S>
where
    B: BackendApi,
    S: StoreApi + ?Sized + 'static,
{
    /// Builds the engine and starts the background entitlement listener.
    ///
    /// Must be called within a tokio runtime.
    pub fn new(config: EngineConfig, backend: B, store: Arc<S>) -> Self {
        let listener = EntitlementListener::start(store.clone());
        Self {
            user_id: config.user_id,
            backend,
            store,
            cache: CacheStore::new(config.cache_dir),
            state: EngineState::default(),
            snapshot: None,
            listener,
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn select_product(&mut self, product: Option<CatalogProduct>) {
        self.state.selected_product = product;
    }

    /// Cancels the background listener. Idempotent; also runs on drop.
    pub fn shutdown(&mut self) {
        self.listener.cancel();
    }

    // ---------------------------------------------------------------
    // initialize
    // ---------------------------------------------------------------

    /// Activates the engine: entitlement snapshot, then theme and catalog
    /// caches gated on the snapshot's freshness timestamps, then the
    /// entitlement/catalog membership recompute. Strictly sequential:
    /// every step depends on the snapshot fetched first.
    ///
    /// `loading` is cleared on every exit path, including partial failure.
    pub async fn initialize(&mut self) {
        log::info!("[ENGINE] initializing for user {}", self.user_id);
        self.state.loading = true;
        self.initialize_inner().await;
        self.state.loading = false;
    }

    async fn initialize_inner(&mut self) {
        self.fetch_snapshot().await;
        self.ensure_theme_fresh().await;
        self.ensure_catalog_fresh().await;
        self.recompute_entitlement();
    }

    async fn fetch_snapshot(&mut self) {
        match self.backend.entitlement_snapshot(&self.user_id).await {
            Ok(envelope) => match envelope.into_success() {
                Ok(snapshot) => self.snapshot = Some(snapshot),
                Err(err) => self.publish_error(err),
            },
            Err(err) => {
                self.log_backend_failure("entitlement snapshot", &err);
                self.set_error("Unknown Error", err.to_string());
            }
        }
    }

    /// Recomputes entitlement-against-catalog membership from the snapshot.
    fn recompute_entitlement(&mut self) {
        let Some(subscription) = self.snapshot.as_ref().and_then(|s| s.subscription.clone())
        else {
            log::info!("[ENGINE] no existing subscription for {}", self.user_id);
            return;
        };
        logic::ensure_entitlement_product(&mut self.state.catalog, &subscription);
        self.state.entitlement = Some(subscription);
    }

    // ---------------------------------------------------------------
    // Cache helpers
    // ---------------------------------------------------------------

    async fn ensure_theme_fresh(&mut self) {
        let Some(target) = self.snapshot.as_ref().and_then(|s| s.theme_config_time_stamp)
        else {
            return;
        };
        if let Some(theme) = self.cache.cached_theme(target) {
            self.state.theme = theme;
            return;
        }
        // Miss: live fetch, write-through only on success.
        if let Some(theme) = self.fetch_theme().await {
            self.cache.save_theme(&ThemeCache {
                time_stamp: Some(target),
                theme: Some(theme.clone()),
            });
            self.state.theme = theme;
        }
    }

    async fn ensure_catalog_fresh(&mut self) {
        let Some(target) = self
            .snapshot
            .as_ref()
            .and_then(|s| s.product_update_time_stamp)
        else {
            return;
        };
        if let Some(products) = self.cache.cached_products(target) {
            self.state.catalog = products;
            return;
        }
        if let Some(products) = self.fetch_catalog().await {
            self.cache.save_products(&CatalogCache {
                time_stamp: Some(target),
                products: Some(products.clone()),
            });
            self.state.catalog = products;
        }
    }

    async fn fetch_theme(&mut self) -> Option<Vec<ThemeEntry>> {
        match self.backend.theme_config().await {
            Ok(envelope) => match envelope.into_success() {
                Ok(theme) => Some(theme),
                Err(err) => {
                    self.publish_error(err);
                    None
                }
            },
            Err(err) => {
                self.log_backend_failure("theme config", &err);
                self.set_error("Error", err.to_string());
                None
            }
        }
    }

    async fn fetch_catalog(&mut self) -> Option<Vec<CatalogProduct>> {
        match self.backend.catalog().await {
            Ok(envelope) => match envelope.into_success() {
                Ok(products) => Some(products),
                Err(err) => {
                    self.publish_error(err);
                    None
                }
            },
            Err(err) => {
                self.log_backend_failure("catalog", &err);
                self.set_error("Error", err.to_string());
                None
            }
        }
    }

    // ---------------------------------------------------------------
    // refresh_catalog
    // ---------------------------------------------------------------

    /// Cross-references the backend catalog against the platform store and
    /// publishes the purchasable intersection, descending by price.
    ///
    /// An empty candidate list fails fast without touching the store; a
    /// non-empty request the platform answers with zero offerings is a
    /// distinct failure, but both leave the catalog unpopulated and show
    /// the same user-facing message.
    pub async fn refresh_catalog(&mut self) {
        let ids: Vec<String> = self
            .state
            .catalog
            .iter()
            .map(|p| p.product_id.clone())
            .collect();
        if ids.is_empty() {
            log::warn!("[ENGINE] refresh_catalog: no candidate products");
            self.set_error("Error", "No products available.");
            return;
        }

        match self.store.lookup_offerings(&ids).await {
            Ok(offerings) => {
                log::info!("[ENGINE] store returned {} offerings", offerings.len());
                self.state.store_offerings = offerings;
                self.state.catalog =
                    logic::purchasable_catalog(&self.state.catalog, &self.state.store_offerings);
                if let Some(entitlement) = self.state.entitlement.clone() {
                    logic::ensure_entitlement_product(&mut self.state.catalog, &entitlement);
                }
            }
            Err(err @ (StoreError::EmptyRequest | StoreError::NoOfferings)) => {
                log::warn!("[ENGINE] offering lookup failed: {err}");
                self.set_error("Error", "No products available.");
            }
            Err(err) => {
                self.set_error("Error", format!("Failed to fetch store offerings: {err}"));
            }
        }
    }

    // ---------------------------------------------------------------
    // purchase
    // ---------------------------------------------------------------

    /// Runs one purchase flow for `product`.
    ///
    /// A second call while one is in flight is a no-op; the in-progress
    /// flag is released on every exit path.
    pub async fn purchase(&mut self, product: &CatalogProduct) {
        if self.state.purchase_in_progress {
            log::warn!(
                "[ENGINE] purchase of {} ignored: another purchase is in flight",
                product.id()
            );
            return;
        }
        self.state.purchase_in_progress = true;
        self.purchase_inner(product).await;
        self.state.purchase_in_progress = false;
    }

    async fn purchase_inner(&mut self, product: &CatalogProduct) {
        log::info!("[ENGINE] purchasing {}", product.id());
        self.state.purchase_pending = false;

        // Resolve the platform offering; one catalog refresh before giving up.
        let mut offering = logic::offering_for(&self.state.store_offerings, product.id()).cloned();
        if offering.is_none() {
            self.refresh_catalog().await;
            offering = logic::offering_for(&self.state.store_offerings, product.id()).cloned();
        }
        let Some(offering) = offering else {
            self.set_error("Unavailable", "Product could not be found.");
            return;
        };

        let attempt = PurchaseAttempt {
            product,
            offering,
            token: CorrelationToken::derive(&self.user_id),
        };

        match self.store.purchase(&attempt.offering, attempt.token).await {
            Ok(PurchaseOutcome::Verified(tx)) => self.verify_and_finish(tx).await,
            Ok(PurchaseOutcome::Unverified { product_id, reason }) => {
                // Deliberately not finalized: the platform's own recovery
                // will redeliver the transaction.
                log::warn!("[ENGINE] unverified purchase result for {product_id}: {reason}");
                self.set_error("Error", "Failed to verify the purchase.");
            }
            Ok(PurchaseOutcome::Cancelled) => {
                log::info!("[ENGINE] user cancelled purchase of {}", attempt.product.id());
                self.state.last_error = None;
            }
            Ok(PurchaseOutcome::Pending) => {
                log::info!("[ENGINE] purchase of {} is pending", attempt.product.id());
                self.state.purchase_pending = true;
            }
            Ok(PurchaseOutcome::Unknown) => {
                self.set_error("Error", "Unknown purchase result.");
            }
            Err(err) => {
                self.set_error("Error", format!("Purchase failed: {err}"));
            }
        }
    }

    /// Submits the transaction proof to the backend, then finalizes the
    /// platform transaction exactly once, after the backend call resolved,
    /// so a lost verification can still be retried from the pending
    /// transaction.
    async fn verify_and_finish(&mut self, tx: StoreTransaction) {
        let proof = PurchaseProof {
            partner_user_id: self.user_id.clone(),
            receipt: tx.receipt.clone(),
            product_id: tx.product_id.clone(),
            original_transaction_id: tx.original_id,
        };

        match self.backend.submit_purchase(&proof).await {
            Ok(envelope) => match envelope.into_success() {
                Ok(entitlement) => {
                    log::info!("[ENGINE] backend confirmed purchase of {}", entitlement.id());
                    logic::ensure_entitlement_product(&mut self.state.catalog, &entitlement);
                    self.state.entitlement = Some(entitlement);
                    self.state.selected_product = None;
                    self.state.last_error = None;
                }
                Err(err) => self.publish_error(err),
            },
            Err(err) => {
                self.log_backend_failure("purchase verification", &err);
                self.set_error("Transaction Failed!", "Purchase Unsuccessful.");
            }
        }

        self.store.finish_transaction(tx.id).await;
    }

    // ---------------------------------------------------------------
    // Error plumbing
    // ---------------------------------------------------------------

    /// Business errors from the backend surface verbatim.
    fn publish_error(&mut self, err: ErrorInfo) {
        log::warn!("[ENGINE] {}: {}", err.title, err.message);
        self.state.last_error = Some(err);
    }

    fn set_error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.publish_error(ErrorInfo::new(title, message));
    }

    fn log_backend_failure(&self, what: &str, err: &BackendError) {
        match err {
            // A decode failure means the wire contract drifted; keep it
            // loud in the logs even though the user sees a generic error.
            BackendError::Decoding(e) => {
                log::error!("[ENGINE] {what} response failed to decode: {e}");
            }
            BackendError::Transport(e) => {
                log::warn!("[ENGINE] {what} request failed: {e}");
            }
        }
    }

    // Test-only accessors, mirroring the mock-driven tests' needs.
    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut EngineState {
        &mut self.state
    }

    #[cfg(test)]
    pub(crate) fn listener(&self) -> &EntitlementListener {
        &self.listener
    }
}
