//! Application state shared across handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::watch;

use crate::cart::{CartStorage, CartStore, CartSummary, JsonFileStorage, StorageError};
use crate::catalog::{CatalogClient, CatalogError};
use crate::config::StorefrontConfig;

/// Reasons the storefront cannot start.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("catalog client: {0}")]
    Catalog(#[from] CatalogError),

    /// Usually another storefront, or the CLI, has the cart slot open.
    #[error("cart slot: {0}")]
    CartSlot(#[from] StorageError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the catalog client, the cart store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogClient,
    cart: Mutex<CartStore>,
    cart_summary: watch::Receiver<CartSummary>,
}

impl AppState {
    /// Create a new application state, taking the slot at `config.cart_path`
    /// and hydrating the cart from it. The slot stays locked until the state
    /// is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot is already owned or cannot be opened, or
    /// if the catalog client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let storage = JsonFileStorage::open(&config.cart_path)?;
        Self::with_storage(config, storage)
    }

    /// Create a new application state with a specific cart storage slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog client cannot be built.
    pub fn with_storage(
        config: StorefrontConfig,
        storage: impl CartStorage + 'static,
    ) -> Result<Self, StateError> {
        let catalog = CatalogClient::new(&config.catalog)?;
        let cart = CartStore::hydrate(storage);
        let cart_summary = cart.subscribe();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                cart: Mutex::new(cart),
                cart_summary,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog API client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Lock the cart store.
    ///
    /// Cart operations cannot leave the store half-updated, so a poisoned
    /// lock is recovered instead of propagated.
    ///
    /// The guard must not be held across an `.await`.
    pub fn cart(&self) -> MutexGuard<'_, CartStore> {
        self.inner
            .cart
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Latest cart aggregates, without locking the store.
    #[must_use]
    pub fn cart_summary(&self) -> CartSummary {
        *self.inner.cart_summary.borrow()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use quality_bearings_core::{Price, Product, ProductId};

    use super::*;
    use crate::cart::MemoryStorage;

    fn config() -> StorefrontConfig {
        StorefrontConfig::from_lookup(|_| None).unwrap()
    }

    #[test]
    fn test_summary_follows_cart_changes() {
        let state = AppState::with_storage(config(), MemoryStorage::new()).unwrap();
        assert_eq!(state.cart_summary().item_count, 0);

        let bearing = Product {
            id: ProductId::new(4),
            title: "Tapered Roller Bearing".to_string(),
            price: Price::from_cents(1250),
            description: String::new(),
            category: "roller-bearings".to_string(),
            image: String::new(),
            rating: None,
        };
        state.cart().add_item(&bearing, 3);

        let summary = state.cart_summary();
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.total_price, Price::from_cents(3750));
    }

    #[test]
    fn test_owned_slot_refuses_second_state() {
        let cart_path = std::env::temp_dir()
            .join(format!("qb-state-{}", uuid::Uuid::new_v4()))
            .join("cart.json");
        let config = || StorefrontConfig {
            cart_path: cart_path.clone(),
            ..config()
        };

        let first = AppState::new(config()).unwrap();
        assert!(matches!(
            AppState::new(config()),
            Err(StateError::CartSlot(StorageError::Locked { .. }))
        ));

        drop(first);
        assert!(AppState::new(config()).is_ok());

        std::fs::remove_dir_all(cart_path.parent().unwrap()).ok();
    }
}
