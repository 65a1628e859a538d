use serde::{Deserialize, Serialize};

use crate::model::period::{PeriodUnit, RecurringPeriod};
use crate::model::product::CatalogProduct;

/// Snapshot returned by `GET /api/iap/{userId}/Active`.
///
/// Besides the current subscription (if any) it carries the freshness
/// timestamps that gate the catalog and theme caches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementSnapshot {
    #[serde(rename = "subscriptionResponseDTO")]
    pub subscription: Option<Entitlement>,
    pub product_update_time_stamp: Option<i64>,
    // The backend spells it this way; keep the wire name as-is.
    #[serde(rename = "themConfigTimeStamp")]
    pub theme_config_time_stamp: Option<i64>,
}

/// The user's active subscription as recognized by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
    pub product_id: String,
    pub service_level: String,
    pub vendor_name: String,
    pub app_name: String,
    #[serde(rename = "appPlatformID")]
    pub app_platform_id: String,
    pub platform: String,
    pub partner_user_id: String,
    pub start_date: i64,
    pub end_date: i64,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_transaction_id: Option<u64>,
}

impl Entitlement {
    pub fn id(&self) -> &str {
        &self.product_id
    }

    /// Builds a stand-in catalog entry for an entitlement whose product is
    /// no longer in the fetched catalog, so the subscription stays
    /// displayable. Display fields are placeholders; the id is what counts.
    pub fn synthetic_product(&self) -> CatalogProduct {
        CatalogProduct {
            product_id: self.product_id.clone(),
            display_name: self.product_id.clone(),
            description: self.service_level.clone(),
            price: 0.0,
            display_price: String::new(),
            recurring_period_code: RecurringPeriod::new(1, PeriodUnit::Month),
            product_type: self.kind.clone(),
        }
    }
}

/// Body of the purchase-verification submission
/// (`POST /api/iap/ios/handle`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseProof {
    pub partner_user_id: String,
    pub receipt: String,
    pub product_id: String,
    pub original_transaction_id: u64,
}
