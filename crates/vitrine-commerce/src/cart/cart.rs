//! Cart store and line item types.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::cart::pricing;
use crate::catalog::Product;
use crate::config::{StoreConfig, MAX_QUANTITY_PER_ITEM};
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};

/// Identity of a cart line: product plus the chosen color and size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LineKey {
    pub product_id: ProductId,
    pub color: String,
    pub size: String,
}

impl LineKey {
    pub fn new(
        product_id: impl Into<ProductId>,
        color: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            color: color.into(),
            size: size.into(),
        }
    }
}

/// A line item in the cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLineItem {
    /// Catalog product, shared with the catalog.
    pub product: Arc<Product>,
    /// Quantity, always at least 1.
    pub quantity: i64,
    /// Chosen variant color.
    pub selected_color: String,
    /// Chosen size within the color.
    pub selected_size: String,
}

impl CartLineItem {
    /// The line's key.
    pub fn key(&self) -> LineKey {
        LineKey::new(
            self.product.id.clone(),
            self.selected_color.clone(),
            self.selected_size.clone(),
        )
    }

    /// Check whether this line has the given key.
    pub fn is(&self, product_id: &ProductId, color: &str, size: &str) -> bool {
        &self.product.id == product_id && self.selected_color == color && self.selected_size == size
    }

    /// Unit price times quantity.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.product
            .price
            .try_multiply(self.quantity)
            .ok_or(CommerceError::Overflow)
    }
}

/// Immutable view of the cart published to observers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CartSnapshot {
    /// Line items in insertion order.
    pub items: Vec<CartLineItem>,
    /// Whether the cart panel should be shown.
    pub is_open: bool,
    /// Incremented on every change.
    pub revision: u64,
}

impl CartSnapshot {
    /// Sum of quantities.
    pub fn total_items(&self) -> i64 {
        self.items
            .iter()
            .fold(0_i64, |acc, i| acc.saturating_add(i.quantity))
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The shopping cart of one session.
///
/// Every mutation builds a fresh [`CartSnapshot`] instead of editing the
/// current one, so snapshots already handed to observers never change.
/// The store is single-owner; share it by reference.
#[derive(Debug)]
pub struct CartStore {
    currency: Currency,
    max_quantity: i64,
    state: Arc<CartSnapshot>,
    publisher: watch::Sender<Arc<CartSnapshot>>,
}

impl CartStore {
    /// Create an empty cart.
    pub fn new(currency: Currency, max_quantity: i64) -> Self {
        let state = Arc::new(CartSnapshot::default());
        let (publisher, _) = watch::channel(Arc::clone(&state));
        Self {
            currency,
            max_quantity,
            state,
            publisher,
        }
    }

    /// Create an empty cart with the store's currency and limits.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.currency, config.max_quantity_per_item)
    }

    /// Add an item to the cart.
    ///
    /// Merges into an existing line with the same key, otherwise appends a
    /// new line. Opens the cart panel. Returns an error if:
    /// - quantity is not positive
    /// - the product is not offered in this color and size
    /// - the product is priced in another currency
    /// - the merged quantity would exceed the per-line limit
    pub fn add_item(
        &mut self,
        product: Arc<Product>,
        color: &str,
        size: &str,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        if product.price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: product.price.currency.code().to_string(),
            });
        }
        product.ensure_offers(color, size)?;

        let mut items = self.state.items.clone();
        let quantity = match items.iter_mut().find(|i| i.is(&product.id, color, size)) {
            Some(existing) => {
                let merged = existing
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CommerceError::Overflow)?;
                self.check_limit(merged)?;
                existing.quantity = merged;
                merged
            }
            None => {
                self.check_limit(quantity)?;
                items.push(CartLineItem {
                    product: Arc::clone(&product),
                    quantity,
                    selected_color: color.to_string(),
                    selected_size: size.to_string(),
                });
                quantity
            }
        };

        tracing::debug!(product_id = %product.id, color, size, quantity, "cart line added");
        self.commit(items, true);
        Ok(())
    }

    /// Remove the line with this key.
    ///
    /// Returns false and leaves the cart untouched if there is no such line.
    pub fn remove_item(&mut self, product_id: &ProductId, color: &str, size: &str) -> bool {
        if !self.state.items.iter().any(|i| i.is(product_id, color, size)) {
            return false;
        }

        let items = self
            .state
            .items
            .iter()
            .filter(|i| !i.is(product_id, color, size))
            .cloned()
            .collect();
        tracing::debug!(%product_id, color, size, "cart line removed");
        self.commit(items, self.state.is_open);
        true
    }

    /// Set a line's quantity.
    ///
    /// A quantity of zero or less removes the line. Returns whether a line
    /// was changed.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        color: &str,
        size: &str,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        if quantity <= 0 {
            return Ok(self.remove_item(product_id, color, size));
        }
        self.check_limit(quantity)?;

        if !self.state.items.iter().any(|i| i.is(product_id, color, size)) {
            return Ok(false);
        }

        let items = self
            .state
            .items
            .iter()
            .map(|i| {
                if i.is(product_id, color, size) {
                    CartLineItem {
                        quantity,
                        ..i.clone()
                    }
                } else {
                    i.clone()
                }
            })
            .collect();
        tracing::debug!(%product_id, color, size, quantity, "cart line updated");
        self.commit(items, self.state.is_open);
        Ok(true)
    }

    /// Clear all items from the cart.
    pub fn clear(&mut self) {
        if self.state.items.is_empty() {
            return;
        }
        tracing::debug!(lines = self.state.items.len(), "cart cleared");
        self.commit(Vec::new(), self.state.is_open);
    }

    /// Show or hide the cart panel.
    pub fn set_open(&mut self, open: bool) {
        if self.state.is_open != open {
            self.commit(self.state.items.clone(), open);
        }
    }

    /// Whether the cart panel should be shown.
    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    /// Get total item count (sum of quantities).
    pub fn total_items(&self) -> i64 {
        self.state.total_items()
    }

    /// Sum of price times quantity over all lines.
    pub fn total_price(&self) -> Result<Money, CommerceError> {
        pricing::subtotal(&self.state.items, self.currency)
    }

    /// Line items in insertion order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.state.items
    }

    /// Get a line by key.
    pub fn get_item(&self, key: &LineKey) -> Option<&CartLineItem> {
        self.state
            .items
            .iter()
            .find(|i| i.is(&key.product_id, &key.color, &key.size))
    }

    /// Get number of distinct lines.
    pub fn unique_item_count(&self) -> usize {
        self.state.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    /// Cart currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<CartSnapshot> {
        Arc::clone(&self.state)
    }

    /// Watch the cart; the receiver sees a new snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CartSnapshot>> {
        self.publisher.subscribe()
    }

    /// End the session. Observers see the channel close.
    pub fn dispose(self) {
        tracing::debug!(
            lines = self.state.items.len(),
            revision = self.state.revision,
            "cart disposed"
        );
    }

    fn check_limit(&self, quantity: i64) -> Result<(), CommerceError> {
        if quantity > self.max_quantity {
            return Err(CommerceError::QuantityExceedsLimit(quantity, self.max_quantity));
        }
        Ok(())
    }

    fn commit(&mut self, items: Vec<CartLineItem>, is_open: bool) {
        let next = Arc::new(CartSnapshot {
            items,
            is_open,
            revision: self.state.revision + 1,
        });
        self.state = Arc::clone(&next);
        self.publisher.send_replace(next);
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new(Currency::default(), MAX_QUANTITY_PER_ITEM)
    }
}
