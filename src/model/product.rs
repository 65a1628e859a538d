use serde::{Deserialize, Serialize};

use crate::model::period::RecurringPeriod;

/// A purchasable entity as advertised by the backend catalog.
///
/// The backend owns pricing and display strings; whether the product can
/// actually be bought depends on the platform store also offering the same
/// identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub product_id: String,
    pub display_name: String,
    pub description: String,
    pub price: f64,
    pub display_price: String,
    pub recurring_period_code: RecurringPeriod,
    pub product_type: String,
}

impl CatalogProduct {
    pub fn id(&self) -> &str {
        &self.product_id
    }
}
