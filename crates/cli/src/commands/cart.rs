//! Cart management commands.
//!
//! These work on the slot the storefront hydrates from. A running storefront
//! keeps that slot locked, so changes are refused until it stops; use the
//! web cart meanwhile. `show` only reads and works either way.

#![allow(clippy::print_stdout)]

use std::path::Path;

use quality_bearings_core::{Cart, ProductId};
use quality_bearings_storefront::cart::{CartStore, JsonFileStorage, Persistence, StorageError};
use quality_bearings_storefront::catalog::CatalogClient;
use quality_bearings_storefront::config::CatalogConfig;

use super::CommandError;

/// Take the slot for a change. Writes happen once, in [`finish`].
fn open(path: &Path) -> Result<CartStore, CommandError> {
    tracing::debug!(path = %path.display(), "Opening cart slot");
    match JsonFileStorage::open(path) {
        Ok(storage) => Ok(CartStore::hydrate_with(storage, Persistence::OnSave)),
        Err(StorageError::Locked { path }) => Err(CommandError::CartInUse(path)),
        Err(e) => Err(e.into()),
    }
}

/// Save if anything changed, then print the cart.
fn finish(mut store: CartStore) -> Result<(), CommandError> {
    if store.has_unsaved_changes() {
        store.save()?;
    } else {
        println!("Nothing to change.");
    }
    print_cart(store.cart());
    Ok(())
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Cart is empty.");
        return;
    }

    for line in cart.items() {
        println!(
            "{:>4}  {:>3} x {:>10} = {:>10}  {}",
            line.id,
            line.quantity,
            line.price,
            line.line_total(),
            line.title
        );
    }
    println!(
        "\n{} items, total {}",
        cart.total_item_count(),
        cart.total_price()
    );
}

/// Show cart lines and totals.
///
/// An unreadable slot shows as empty, the same way the storefront hydrates it.
pub fn show(path: &Path) {
    let cart = JsonFileStorage::peek(path).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Cart slot is unreadable");
        None
    });
    print_cart(&cart.unwrap_or_default());
}

/// Fetch a product from the catalog and add it to the cart.
///
/// # Errors
///
/// Returns an error if the storefront holds the cart, the product cannot be
/// fetched, or the cart cannot be written.
pub async fn add(path: &Path, id: ProductId, quantity: u32) -> Result<(), CommandError> {
    // Fail before the network round trip if the slot is taken
    let mut store = open(path)?;

    let client = CatalogClient::new(&CatalogConfig::from_env()?)?;
    let product = client.get_product(id).await?;

    store.add_item(&product, quantity);
    finish(store)
}

/// Set a line's quantity; zero or less removes it.
///
/// # Errors
///
/// Returns an error if the storefront holds the cart or the cart cannot be
/// written.
pub fn update(path: &Path, id: ProductId, quantity: i64) -> Result<(), CommandError> {
    let mut store = open(path)?;
    if store.cart().get(id).is_none() {
        println!("Product {id} is not in the cart.");
        return Ok(());
    }

    store.update_quantity(id, quantity);
    finish(store)
}

/// Remove a line.
///
/// # Errors
///
/// Returns an error if the storefront holds the cart or the cart cannot be
/// written.
pub fn remove(path: &Path, id: ProductId) -> Result<(), CommandError> {
    let mut store = open(path)?;
    store.remove_item(id);
    finish(store)
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the storefront holds the cart or the cart cannot be
/// written.
pub fn clear(path: &Path) -> Result<(), CommandError> {
    let mut store = open(path)?;
    store.clear();
    finish(store)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use quality_bearings_core::{Price, Product};
    use quality_bearings_storefront::cart::CartStorage;

    use super::*;

    fn temp_slot() -> PathBuf {
        std::env::temp_dir()
            .join(format!("qb-cli-{}", uuid::Uuid::new_v4()))
            .join("cart.json")
    }

    fn seed(path: &Path, ids: &[i32]) {
        let mut cart = Cart::new();
        for &id in ids {
            let product = Product {
                id: ProductId::new(id),
                title: format!("Pillow Block {id}"),
                price: Price::from_cents(2500),
                description: String::new(),
                category: "housings".to_string(),
                image: String::new(),
                rating: None,
            };
            cart.add_item(&product, 1);
        }
        JsonFileStorage::open(path).unwrap().save(&cart).unwrap();
    }

    fn ids_on_disk(path: &Path) -> Vec<i32> {
        JsonFileStorage::peek(path)
            .unwrap()
            .unwrap_or_default()
            .items()
            .iter()
            .map(|line| line.id.as_i32())
            .collect()
    }

    #[test]
    fn test_changes_refused_while_storefront_holds_slot() {
        let path = temp_slot();
        seed(&path, &[1, 7]);

        // Stands in for a running storefront
        let server = CartStore::hydrate(JsonFileStorage::open(&path).unwrap());

        let err = remove(&path, ProductId::new(7)).unwrap_err();
        assert!(matches!(err, CommandError::CartInUse(ref p) if *p == path));
        assert!(clear(&path).is_err());
        assert_eq!(ids_on_disk(&path), vec![1, 7]);

        drop(server);
        remove(&path, ProductId::new(7)).unwrap();
        assert_eq!(ids_on_disk(&path), vec![1]);

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_noop_changes_leave_slot_untouched() {
        let path = temp_slot();
        seed(&path, &[2]);
        let before = fs::metadata(&path).unwrap().modified().unwrap();

        remove(&path, ProductId::new(99)).unwrap();
        update(&path, ProductId::new(99), 3).unwrap();

        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
        assert_eq!(ids_on_disk(&path), vec![2]);

        clear(&path).unwrap();
        assert!(ids_on_disk(&path).is_empty());

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
