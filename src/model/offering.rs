use serde::{Deserialize, Serialize};

use crate::model::period::RecurringPeriod;

/// The platform store's own record for a product identifier.
///
/// Offerings share the identifier space with [`CatalogProduct`]; the
/// intersection of the two id sets is the actually-purchasable catalog.
///
/// [`CatalogProduct`]: crate::model::CatalogProduct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreOffering {
    pub product_id: String,
    pub display_name: String,
    pub description: String,
    pub price: f64,
    pub display_price: String,
    /// Subscription group this offering renews within.
    pub subscription_group_id: String,
    pub period: RecurringPeriod,
    pub currency_code: String,
    pub introductory_offer: Option<OfferDiscount>,
    #[serde(default)]
    pub promotional_offers: Vec<OfferDiscount>,
}

impl StoreOffering {
    pub fn id(&self) -> &str {
        &self.product_id
    }
}

/// Introductory or promotional discount terms attached to an offering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferDiscount {
    pub mode: DiscountMode,
    pub display_price: String,
    pub period: RecurringPeriod,
    /// How many periods the discounted price applies for.
    pub period_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscountMode {
    FreeTrial,
    PayAsYouGo,
    PayUpFront,
}
