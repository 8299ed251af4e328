//! Storefront configuration.
//!
//! Values are resolved in three layers: built-in defaults, then environment
//! variables, then command-line flags (applied by the binary).

use std::env;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use log::warn;
use serde::{Deserialize, Serialize};

pub const DATA_DIR_ENV: &str = "STOREFRONT_DATA_DIR";
pub const CATALOG_ENV: &str = "STOREFRONT_CATALOG";
pub const PAGE_SIZE_ENV: &str = "STOREFRONT_PAGE_SIZE";

pub const DEFAULT_CART_KEY: &str = "cart-storage";
pub const DEFAULT_FAVORITES_KEY: &str = "favorites-storage";
pub const DEFAULT_PAGE_SIZE: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Directory holding one JSON file per key-value key.
    pub data_dir: PathBuf,
    /// JSON file with the catalog snapshot, if one is configured.
    pub catalog_path: Option<PathBuf>,
    pub page_size: NonZeroUsize,
    pub cart_key: String,
    pub favorites_key: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            catalog_path: None,
            page_size: default_page_size(),
            cart_key: DEFAULT_CART_KEY.to_string(),
            favorites_key: DEFAULT_FAVORITES_KEY.to_string(),
        }
    }
}

fn default_page_size() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN)
}

impl StorefrontConfig {
    /// Defaults overridden by any `STOREFRONT_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| env::var(name).ok())
    }

    /// Applies overrides from `lookup`; unparsable values are ignored with a warning.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup(CATALOG_ENV).filter(|v| !v.is_empty()) {
            self.catalog_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup(PAGE_SIZE_ENV) {
            match raw.parse::<NonZeroUsize>() {
                Ok(size) => self.page_size = size,
                Err(e) => warn!("Ignoring {}={:?}: {}", PAGE_SIZE_ENV, raw, e),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.page_size.get(), 6);
        assert_eq!(config.cart_key, "cart-storage");
        assert_eq!(config.favorites_key, "favorites-storage");
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = StorefrontConfig::default().with_overrides(lookup_from(&[
            (DATA_DIR_ENV, "/tmp/shop"),
            (CATALOG_ENV, "catalog.json"),
            (PAGE_SIZE_ENV, "12"),
        ]));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/shop"));
        assert_eq!(config.catalog_path, Some(PathBuf::from("catalog.json")));
        assert_eq!(config.page_size.get(), 12);
    }

    #[test]
    fn test_invalid_page_size_is_ignored() {
        let config = StorefrontConfig::default()
            .with_overrides(lookup_from(&[(PAGE_SIZE_ENV, "0")]));
        assert_eq!(config.page_size.get(), DEFAULT_PAGE_SIZE);

        let config = StorefrontConfig::default()
            .with_overrides(lookup_from(&[(PAGE_SIZE_ENV, "six")]));
        assert_eq!(config.page_size.get(), DEFAULT_PAGE_SIZE);
    }
}
