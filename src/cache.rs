//! Durable cache for the catalog and theme blobs.
//!
//! Each resource class is one JSON file pairing a backend-issued freshness
//! timestamp with its payload. An entry is usable only when its timestamp
//! exactly matches the timestamp the backend most recently reported AND the
//! payload is non-empty; anything else is a miss. A missing or unreadable
//! file is also just a miss; the cache never fails a reconciliation run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::model::{CatalogProduct, ThemeEntry};

const PRODUCTS_FILE: &str = "SubscriptionProducts.json";
const THEME_FILE: &str = "BrandTheme.json";

/// On-disk form of the catalog blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCache {
    pub time_stamp: Option<i64>,
    pub products: Option<Vec<CatalogProduct>>,
}

/// On-disk form of the theme blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeCache {
    pub time_stamp: Option<i64>,
    pub theme: Option<Vec<ThemeEntry>>,
}

/// File-backed key→blob store rooted at an application-private directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns cached products when the stored timestamp matches
    /// `latest_timestamp` and the payload is non-empty.
    pub fn cached_products(&self, latest_timestamp: i64) -> Option<Vec<CatalogProduct>> {
        let cache: CatalogCache = self.load(PRODUCTS_FILE)?;
        match (cache.time_stamp, cache.products) {
            (Some(ts), Some(products)) if ts == latest_timestamp && !products.is_empty() => {
                log::debug!("[CACHE] catalog hit for timestamp {ts}");
                Some(products)
            }
            _ => None,
        }
    }

    /// Returns the cached theme when the stored timestamp matches
    /// `latest_timestamp` and the payload is non-empty.
    pub fn cached_theme(&self, latest_timestamp: i64) -> Option<Vec<ThemeEntry>> {
        let cache: ThemeCache = self.load(THEME_FILE)?;
        match (cache.time_stamp, cache.theme) {
            (Some(ts), Some(theme)) if ts == latest_timestamp && !theme.is_empty() => {
                log::debug!("[CACHE] theme hit for timestamp {ts}");
                Some(theme)
            }
            _ => None,
        }
    }

    pub fn save_products(&self, cache: &CatalogCache) {
        self.save(PRODUCTS_FILE, cache);
    }

    pub fn save_theme(&self, cache: &ThemeCache) {
        self.save(THEME_FILE, cache);
    }

    fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    fn load<T: DeserializeOwned>(&self, file_name: &str) -> Option<T> {
        let path = self.path(file_name);
        if !path.exists() {
            return None;
        }
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(err) => {
                log::warn!("[CACHE] failed to read {}: {err}", path.display());
                return None;
            }
        };
        match serde_json::from_slice(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("[CACHE] failed to decode {}: {err}", path.display());
                None
            }
        }
    }

    // Whole-file replace: write a sibling temp file, then rename it over the
    // target so a reader never observes a partially written entry.
    fn save<T: Serialize>(&self, file_name: &str, value: &T) {
        if let Err(err) = self.try_save(file_name, value) {
            log::error!("[CACHE] failed to save {file_name}: {err}");
        }
    }

    fn try_save<T: Serialize>(&self, file_name: &str, value: &T) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let target = self.path(file_name);
        let tmp = tmp_path(&target);
        let data = serde_json::to_vec(value)?;
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &target)?;
        Ok(())
    }
}

fn tmp_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
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

    #[test]
    fn absent_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        assert!(cache.cached_products(1234).is_none());
        assert!(cache.cached_theme(1234).is_none());
    }

    #[test]
    fn matching_timestamp_is_a_hit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        cache.save_products(&CatalogCache {
            time_stamp: Some(1234),
            products: Some(vec![product("p1", 1.99)]),
        });

        let hit = cache.cached_products(1234).unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].product_id, "p1");
    }

    #[test]
    fn stale_timestamp_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        cache.save_products(&CatalogCache {
            time_stamp: Some(1234),
            products: Some(vec![product("p1", 1.99)]),
        });

        assert!(cache.cached_products(9999).is_none());
    }

    #[test]
    fn empty_payload_is_a_miss_even_when_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        cache.save_products(&CatalogCache {
            time_stamp: Some(1234),
            products: Some(vec![]),
        });

        assert!(cache.cached_products(1234).is_none());
    }

    #[test]
    fn save_replaces_the_whole_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        cache.save_products(&CatalogCache {
            time_stamp: Some(1234),
            products: Some(vec![product("old", 1.99)]),
        });
        cache.save_products(&CatalogCache {
            time_stamp: Some(9999),
            products: Some(vec![product("new", 4.99)]),
        });

        assert!(cache.cached_products(1234).is_none());
        let hit = cache.cached_products(9999).unwrap();
        assert_eq!(hit[0].product_id, "new");
    }

    #[test]
    fn corrupt_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("BrandTheme.json"), b"not json").unwrap();
        let cache = CacheStore::new(dir.path());
        assert!(cache.cached_theme(1).is_none());
    }
}
