/// Startup wiring for the storefront state.
///
/// This module builds the key-value store, rehydrates the cart and favorites
/// stores from it, and falls back to in-memory operation when the data directory
/// is unusable.
pub mod storefront;

pub use storefront::{open, Storefront};
