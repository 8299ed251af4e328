use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::stores::StoreSlot;
use crate::{KeyValueStore, Money, Product, ProductId, Session};

/// One row in the cart.
///
/// Carries a snapshot of the product taken when the line was first added, so later
/// catalog changes do not reach existing lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
    #[serde(default)]
    pub selected_size: Option<String>,
}

impl CartLineItem {
    pub fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Identity is the product id together with the selected size.
    pub fn matches(&self, product_id: ProductId, selected_size: Option<&str>) -> bool {
        self.product.id == product_id && self.selected_size.as_deref() == selected_size
    }

    pub fn line_price(&self) -> Money {
        self.product.price * self.quantity
    }
}

/// Cart aggregates for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    pub line_count: usize,
    pub total_items: u64,
    pub subtotal: Money,
    /// Checkout is offered only for a non-empty cart.
    pub checkout_enabled: bool,
    /// Signed-in shoppers see member checkout.
    pub member_checkout: bool,
}

/// The shopper's cart, persisted under its own key.
pub struct CartStore {
    items: Vec<CartLineItem>,
    slot: StoreSlot,
}

impl CartStore {
    /// Rehydrates the cart stored under `key`, or starts empty.
    pub fn open(kv: Arc<dyn KeyValueStore>, key: &str) -> Self {
        let slot = StoreSlot::new(kv, key);
        let items = sanitize(slot.load());
        debug!("Cart rehydrated with {} lines", items.len());
        Self { items, slot }
    }

    /// Re-reads the persisted cart, discarding the in-memory copy.
    pub fn reload(&mut self) {
        self.items = sanitize(self.slot.load());
    }

    /// Adds one unit of `product` in `selected_size`.
    pub fn add_item(&mut self, product: &Product, selected_size: Option<&str>) {
        match self
            .items
            .iter_mut()
            .find(|item| item.matches(product.id, selected_size))
        {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => self.items.push(CartLineItem {
                product: product.clone(),
                quantity: 1,
                selected_size: selected_size.map(str::to_string),
            }),
        }
        debug!("Added product {} (size {:?}) to cart", product.id, selected_size);
        self.persist();
    }

    /// Takes one unit off the matching line, dropping the line when it reaches zero.
    pub fn remove_item(&mut self, product_id: ProductId, selected_size: Option<&str>) {
        let Some(index) = self.position(product_id, selected_size) else {
            return;
        };
        if self.items[index].quantity > 1 {
            self.items[index].quantity -= 1;
        } else {
            self.items.remove(index);
        }
        debug!("Removed one of product {} (size {:?}) from cart", product_id, selected_size);
        self.persist();
    }

    /// Drops the matching line whatever its quantity.
    pub fn delete_item(&mut self, product_id: ProductId, selected_size: Option<&str>) {
        let Some(index) = self.position(product_id, selected_size) else {
            return;
        };
        self.items.remove(index);
        debug!("Deleted product {} (size {:?}) from cart", product_id, selected_size);
        self.persist();
    }

    pub fn clear_cart(&mut self) {
        self.items.clear();
        debug!("Cart cleared");
        self.persist();
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quantity of the matching line, 0 when absent.
    pub fn quantity_of(&self, product_id: ProductId, selected_size: Option<&str>) -> u32 {
        self.position(product_id, selected_size)
            .map_or(0, |i| self.items[i].quantity)
    }

    /// Sum of quantities across all lines.
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `price * quantity` in minor units.
    pub fn total_price(&self) -> Money {
        self.items.iter().map(CartLineItem::line_price).sum()
    }

    pub fn summary(&self, session: &Session) -> CartSummary {
        CartSummary {
            line_count: self.line_count(),
            total_items: self.total_items(),
            subtotal: self.total_price(),
            checkout_enabled: !self.is_empty(),
            member_checkout: session.is_member(),
        }
    }

    /// Whether mutations are still reaching durable storage.
    pub fn is_durable(&self) -> bool {
        self.slot.is_durable()
    }

    fn position(&self, product_id: ProductId, selected_size: Option<&str>) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.matches(product_id, selected_size))
    }

    fn persist(&mut self) {
        self.slot.save(&self.items);
    }
}

/// Drops zero-quantity rows and merges duplicate identity keys from a stored cart.
fn sanitize(raw: Vec<CartLineItem>) -> Vec<CartLineItem> {
    let mut items: Vec<CartLineItem> = Vec::with_capacity(raw.len());
    for line in raw.into_iter().filter(|line| line.quantity > 0) {
        match items
            .iter_mut()
            .find(|kept| kept.matches(line.product.id, line.selected_size.as_deref()))
        {
            Some(kept) => kept.quantity = kept.quantity.saturating_add(line.quantity),
            None => items.push(line),
        }
    }
    items
}
