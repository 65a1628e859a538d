use crate::model::{CatalogProduct, Entitlement, ErrorInfo, StoreOffering, ThemeEntry};

/// State published by the reconciliation engine.
///
/// Owned exclusively by the engine and mutated only from its own
/// operations; the presentation layer observes, never writes.
#[derive(Debug)]
pub struct EngineState {
    /// True from construction until the first `initialize()` completes, and
    /// again for the duration of any later run.
    pub loading: bool,
    /// Mutual-exclusion flag held for the whole of one purchase flow.
    pub purchase_in_progress: bool,
    /// Informational: the last purchase ended in a deferred (e.g. parental
    /// approval) state. Not an error.
    pub purchase_pending: bool,
    /// The purchasable catalog, descending by price after reconciliation.
    pub catalog: Vec<CatalogProduct>,
    pub store_offerings: Vec<StoreOffering>,
    pub theme: Vec<ThemeEntry>,
    pub entitlement: Option<Entitlement>,
    pub selected_product: Option<CatalogProduct>,
    pub last_error: Option<ErrorInfo>,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            loading: true,
            purchase_in_progress: false,
            purchase_pending: false,
            catalog: Vec::new(),
            store_offerings: Vec::new(),
            theme: Vec::new(),
            entitlement: None,
            selected_product: None,
            last_error: None,
        }
    }
}

impl EngineState {
    /// Resolves the active entitlement against the published catalog.
    ///
    /// Always succeeds for a present entitlement once reconciliation has
    /// run, because the engine synthesizes a catalog entry for entitled
    /// products the catalog no longer carries.
    pub fn purchased_product(&self) -> Option<&CatalogProduct> {
        let entitlement = self.entitlement.as_ref()?;
        self.catalog.iter().find(|p| p.id() == entitlement.id())
    }
}
