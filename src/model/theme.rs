use serde::{Deserialize, Serialize};

/// One vendor theme entry from the backend theme config.
///
/// The engine only fetches and caches these; applying them is the
/// presentation layer's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeEntry {
    pub theme_name: String,
    pub logo_url: String,
    pub primary_color: String,
    pub secondary_color: String,
}
