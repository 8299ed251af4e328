//! Catalog snapshot and the queries run against it.
//!
//! - [`Catalog`]: the immutable product snapshot for one view.
//! - [`CatalogFeed`]: a snapshot that may still be loading.
//! - [`query`]: facet extraction, filtering, sorting and pagination.
//! - [`view`]: the per-view [`QueryState`] and its reset rules.
//! - [`search`]: instant substring search.

pub mod query;
pub mod search;
pub mod view;

pub use query::{CatalogQueryConfig, CatalogQueryResult, FacetOptions, Selection, SortMode};
pub use view::QueryState;

use std::fs;
use std::path::Path;

use crate::{Product, ProductId, Result};

/// An ordered, immutable product snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Parses a JSON array of products.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(serde_json::from_slice(bytes)?))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        let catalog = Self::from_json(&bytes)?;
        log::info!("Loaded {} products from {:?}", catalog.len(), path.as_ref());
        Ok(catalog)
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn query(&self, config: &CatalogQueryConfig) -> CatalogQueryResult<'_> {
        query::run_query(&self.products, config)
    }

    pub fn search(&self, text: &str, limit: usize) -> Vec<&Product> {
        search::instant_search(&self.products, text, limit)
    }
}

/// The catalog as seen by a view: still being fetched, or ready.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CatalogFeed {
    #[default]
    Loading,
    Ready(Catalog),
}

impl CatalogFeed {
    pub fn is_loading(&self) -> bool {
        matches!(self, CatalogFeed::Loading)
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        match self {
            CatalogFeed::Loading => None,
            CatalogFeed::Ready(catalog) => Some(catalog),
        }
    }

    /// `None` while loading; queries never run against a partial snapshot.
    pub fn query(&self, config: &CatalogQueryConfig) -> Option<CatalogQueryResult<'_>> {
        self.catalog().map(|catalog| catalog.query(config))
    }
}
