//! Pure reconciliation functions: no I/O, no async, deterministic.

use std::cmp::Ordering;

use crate::model::{CatalogProduct, Entitlement, StoreOffering};

/// Intersects the backend catalog with the platform offerings and orders
/// the result by descending price, so premium tiers surface first.
///
/// The sort is stable: products with equal prices keep their original
/// catalog order.
pub fn purchasable_catalog(
    catalog: &[CatalogProduct],
    offerings: &[StoreOffering],
) -> Vec<CatalogProduct> {
    let mut purchasable: Vec<CatalogProduct> = catalog
        .iter()
        .filter(|p| offerings.iter().any(|o| o.id() == p.id()))
        .cloned()
        .collect();
    purchasable.sort_by(|a, b| b.price.partial_cmp(&a.price).unwrap_or(Ordering::Equal));
    purchasable
}

pub fn offering_for<'a>(
    offerings: &'a [StoreOffering],
    product_id: &str,
) -> Option<&'a StoreOffering> {
    offerings.iter().find(|o| o.id() == product_id)
}

/// Guarantees the entitled product is present in the catalog, appending a
/// synthetic entry when the fetched catalog no longer carries it.
pub fn ensure_entitlement_product(catalog: &mut Vec<CatalogProduct>, entitlement: &Entitlement) {
    if !catalog.iter().any(|p| p.id() == entitlement.id()) {
        log::info!(
            "[ENGINE] entitled product {} missing from catalog, appending synthetic entry",
            entitlement.id()
        );
        catalog.push(entitlement.synthetic_product());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PeriodUnit, RecurringPeriod};

    fn product(id: &str, price: f64) -> CatalogProduct {
        CatalogProduct {
            product_id: id.to_string(),
            display_name: id.to_string(),
            description: String::new(),
            price,
            display_price: format!("${price}"),
            recurring_period_code: RecurringPeriod::new(1, PeriodUnit::Month),
            product_type: "SUBSCRIPTION".to_string(),
        }
    }

    fn offering(id: &str, price: f64) -> StoreOffering {
        StoreOffering {
            product_id: id.to_string(),
            display_name: id.to_string(),
            description: String::new(),
            price,
            display_price: format!("${price}"),
            subscription_group_id: "group-1".to_string(),
            period: RecurringPeriod::new(1, PeriodUnit::Month),
            currency_code: "USD".to_string(),
            introductory_offer: None,
            promotional_offers: Vec::new(),
        }
    }

    fn entitlement(product_id: &str) -> Entitlement {
        Entitlement {
            product_id: product_id.to_string(),
            service_level: "premium".to_string(),
            vendor_name: "vendor".to_string(),
            app_name: "app".to_string(),
            app_platform_id: "platform-1".to_string(),
            platform: "ios".to_string(),
            partner_user_id: "user-1".to_string(),
            start_date: 0,
            end_date: 0,
            status: "ACTIVE".to_string(),
            kind: "SUBSCRIPTION".to_string(),
            original_transaction_id: None,
        }
    }

    #[test]
    fn sorts_by_descending_price() {
        let catalog = [product("a", 1.99), product("b", 9.99), product("c", 4.99)];
        let offerings = [offering("a", 1.99), offering("b", 9.99), offering("c", 4.99)];

        let prices: Vec<f64> = purchasable_catalog(&catalog, &offerings)
            .iter()
            .map(|p| p.price)
            .collect();
        assert_eq!(prices, vec![9.99, 4.99, 1.99]);
    }

    #[test]
    fn equal_prices_keep_catalog_order() {
        let catalog = [product("first", 4.99), product("second", 4.99), product("cheap", 0.99)];
        let offerings = [
            offering("second", 4.99),
            offering("first", 4.99),
            offering("cheap", 0.99),
        ];

        let result = purchasable_catalog(&catalog, &offerings);
        let ids: Vec<&str> = result.iter().map(|p| p.product_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "cheap"]);
    }

    #[test]
    fn drops_products_without_an_offering() {
        let catalog = [product("kept", 4.99), product("dropped", 1.99)];
        let offerings = [offering("kept", 4.99)];

        let result = purchasable_catalog(&catalog, &offerings);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].product_id, "kept");
    }

    #[test]
    fn synthesizes_missing_entitled_product() {
        let mut catalog = vec![product("other", 4.99)];
        ensure_entitlement_product(&mut catalog, &entitlement("legacy_plan"));

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[1].product_id, "legacy_plan");
    }

    #[test]
    fn leaves_catalog_alone_when_entitled_product_present() {
        let mut catalog = vec![product("plan", 4.99)];
        ensure_entitlement_product(&mut catalog, &entitlement("plan"));
        assert_eq!(catalog.len(), 1);
    }
}
