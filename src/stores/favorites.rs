use std::collections::HashSet;
use std::sync::Arc;

use log::debug;

use crate::stores::StoreSlot;
use crate::{KeyValueStore, Product, ProductId};

/// The shopper's favorites, persisted under its own key.
///
/// Entries keep insertion order for display; membership goes through an id index.
pub struct FavoritesStore {
    items: Vec<Product>,
    index: HashSet<ProductId>,
    slot: StoreSlot,
}

impl FavoritesStore {
    pub fn open(kv: Arc<dyn KeyValueStore>, key: &str) -> Self {
        let slot = StoreSlot::new(kv, key);
        let (items, index) = dedup(slot.load());
        debug!("Favorites rehydrated with {} entries", items.len());
        Self { items, index, slot }
    }

    /// Re-reads the persisted favorites, discarding the in-memory copy.
    pub fn reload(&mut self) {
        let (items, index) = dedup(self.slot.load());
        self.items = items;
        self.index = index;
    }

    /// Adds `product` if absent, removes it otherwise. Returns whether it is now a favorite.
    pub fn toggle_favorite(&mut self, product: &Product) -> bool {
        let now_favorite = if self.index.remove(&product.id) {
            self.items.retain(|item| item.id != product.id);
            false
        } else {
            self.index.insert(product.id);
            self.items.push(product.clone());
            true
        };
        debug!("Product {} favorite: {}", product.id, now_favorite);
        self.slot.save(&self.items);
        now_favorite
    }

    pub fn is_favorite(&self, product_id: ProductId) -> bool {
        self.index.contains(&product_id)
    }

    pub fn clear_favorites(&mut self) {
        self.items.clear();
        self.index.clear();
        debug!("Favorites cleared");
        self.slot.save(&self.items);
    }

    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_durable(&self) -> bool {
        self.slot.is_durable()
    }
}

/// Keeps the first entry per product id from a stored collection.
fn dedup(raw: Vec<Product>) -> (Vec<Product>, HashSet<ProductId>) {
    let mut index = HashSet::with_capacity(raw.len());
    let items: Vec<Product> = raw
        .into_iter()
        .filter(|product| index.insert(product.id))
        .collect();
    (items, index)
}
