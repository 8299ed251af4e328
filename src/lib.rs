//! Storefront State is the client-side state and query layer of a storefront.
//!
//! It keeps a shopping cart and a favorites collection as persisted stores on top of a
//! generic key-value blob store, and runs a catalog query pipeline that filters, sorts
//! and paginates a product snapshot in response to facet selections.
//!
//! ## Core Components
//! - [`engine`]: The key-value backend (In-memory with optional on-disk persistence).
//! - [`product`]: Shared value types ([`Product`], [`ProductId`], [`Money`]).
//! - [`stores`]: The cart and favorites stores.
//! - [`catalog`]: Catalog snapshot, query engine, view state and instant search.
//! - [`sdk`]: Startup wiring that builds and rehydrates a [`sdk::Storefront`].

pub mod catalog;
pub mod config;
pub mod engine;
pub mod product;
pub mod sdk;
pub mod session;
pub mod stores;

pub use config::StorefrontConfig;
pub use product::{Money, Product, ProductId};
pub use session::Session;

use thiserror::Error;

/// Errors returned by the storefront layer.
///
/// Store operations never surface these for ordinary misuse; they come from the
/// key-value backend and from parsing external input.
#[derive(Error, Debug)]
pub enum Error {
    /// The requested key does not exist in the key-value store.
    #[error("key not found")]
    KeyNotFound,
    /// The key cannot be used as a storage name.
    #[error("invalid key: {0}")]
    InvalidKey(String),
    /// A value could not be parsed from user or config input.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error during JSON serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A specialized Result type for storefront operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Defines basic read operations for the key-value store.
pub trait KVReader: Send + Sync {
    /// Retrieves the value stored under `key`.
    fn get(&self, key: &str) -> Result<serde_json::Value>;
}

/// Defines basic write and delete operations for the key-value store.
pub trait KVWriter: Send + Sync {
    /// Stores a value under `key`, replacing any previous value.
    fn set(&self, key: &str, value: serde_json::Value) -> Result<()>;
    /// Deletes `key`. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

/// The backing medium for the cart and favorites stores.
///
/// Writes are synchronous: once `set` returns `Ok`, the value is durable (or, for a
/// non-persistent store, held in memory).
pub trait KeyValueStore: KVReader + KVWriter {
    /// Whether values survive a process restart.
    fn is_persistent(&self) -> bool;
}
