//! Instant search for the search overlay.
//!
//! Matching is plain case-insensitive substring containment over a few text
//! fields. There is no scoring: results keep catalog order.

use crate::Product;

/// How many results the overlay shows while typing.
pub const INSTANT_RESULTS_LIMIT: usize = 8;

/// `needle` must already be lowercase.
pub fn matches(product: &Product, needle: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(needle);
    contains(&product.name)
        || contains(&product.category)
        || product.subcategory.as_deref().is_some_and(contains)
        || contains(&product.description)
}

/// Up to `limit` products matching `query`; a blank query matches nothing.
pub fn instant_search<'a>(products: &'a [Product], query: &str, limit: usize) -> Vec<&'a Product> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    products
        .iter()
        .filter(|p| matches(p, &needle))
        .take(limit)
        .collect()
}
