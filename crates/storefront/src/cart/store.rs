//! The cart store: sole owner of the shopper's cart.
//!
//! Every mutation is applied in memory and announced to subscribers before the
//! call returns. A write-through store also rewrites its slot on every change,
//! logging and swallowing storage failures; cart operations never fail. An
//! on-save store leaves writing to an explicit [`CartStore::save`].

use quality_bearings_core::{Cart, Price, Product, ProductId};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::storage::{CartStorage, StorageError};

/// Aggregates published to subscribers after each change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    /// Sum of quantities.
    pub item_count: u64,
    /// Sum of line totals.
    pub total_price: Price,
    /// Number of distinct products.
    pub line_count: usize,
}

impl CartSummary {
    fn of(cart: &Cart) -> Self {
        Self {
            item_count: cart.total_item_count(),
            total_price: cart.total_price(),
            line_count: cart.len(),
        }
    }
}

/// When a store writes its cart to the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// After every mutation that changes the cart. Failures are logged.
    WriteThrough,
    /// Only when [`CartStore::save`] is called.
    OnSave,
}

/// Cart state plus its storage slot and change notifications.
pub struct CartStore {
    cart: Cart,
    storage: Box<dyn CartStorage>,
    persistence: Persistence,
    /// Set when the slot is behind the in-memory cart.
    dirty: bool,
    mini_cart_open: bool,
    updates: watch::Sender<CartSummary>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("persistence", &self.persistence)
            .field("dirty", &self.dirty)
            .field("mini_cart_open", &self.mini_cart_open)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create a write-through store from the contents of `storage`.
    ///
    /// An empty slot yields an empty cart. A slot that cannot be read or
    /// parsed also yields an empty cart; the failure is logged, not returned.
    pub fn hydrate(storage: impl CartStorage + 'static) -> Self {
        Self::hydrate_with(storage, Persistence::WriteThrough)
    }

    /// Create a store from the contents of `storage` with the given
    /// persistence mode. Hydration fails closed as in [`CartStore::hydrate`].
    pub fn hydrate_with(storage: impl CartStorage + 'static, persistence: Persistence) -> Self {
        let cart = match storage.load() {
            Ok(Some(cart)) => {
                debug!(lines = cart.len(), "Cart hydrated from storage");
                cart
            }
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable cart, starting empty");
                Cart::new()
            }
        };

        let (updates, _) = watch::channel(CartSummary::of(&cart));

        Self {
            cart,
            storage: Box::new(storage),
            persistence,
            dirty: false,
            mini_cart_open: false,
            updates,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of `product` and open the mini-cart.
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        debug!(product_id = %product.id, quantity, "Adding to cart");
        let changed = self.cart.add_item(product, quantity);
        self.mini_cart_open = true;
        self.commit(changed);
    }

    /// Remove the line for `id`, if any.
    pub fn remove_item(&mut self, id: ProductId) {
        debug!(product_id = %id, "Removing from cart");
        let changed = self.cart.remove_item(id);
        self.commit(changed);
    }

    /// Set the quantity for `id`; zero or less removes the line.
    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) {
        debug!(product_id = %id, quantity, "Updating cart quantity");
        let changed = self.cart.update_quantity(id, quantity);
        self.commit(changed);
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        debug!("Clearing cart");
        let changed = self.cart.clear();
        self.commit(changed);
    }

    /// Show or hide the mini-cart. Not persisted.
    pub const fn set_mini_cart_open(&mut self, open: bool) {
        self.mini_cart_open = open;
    }

    /// Write the cart to storage now and report the result.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the write fails; the store stays dirty.
    pub fn save(&mut self) -> Result<(), StorageError> {
        self.storage.save(&self.cart)?;
        self.dirty = false;
        Ok(())
    }

    /// Whether the slot is behind the in-memory cart.
    #[must_use]
    pub const fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    fn commit(&mut self, changed: bool) {
        if !changed {
            return;
        }

        self.dirty = true;
        if self.persistence == Persistence::WriteThrough
            && let Err(e) = self.save()
        {
            warn!(error = %e, "Failed to persist cart");
        }
        self.updates.send_replace(CartSummary::of(&self.cart));
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Read-only view of the cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.cart.total_item_count()
    }

    /// Sum of `price × quantity` across all lines.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.cart.total_price()
    }

    #[must_use]
    pub const fn is_mini_cart_open(&self) -> bool {
        self.mini_cart_open
    }

    /// Receive a [`CartSummary`] after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSummary> {
        self.updates.subscribe()
    }
}
