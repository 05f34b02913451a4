//! Shopping cart line items and their bookkeeping.
//!
//! A [`Cart`] is an ordered list of [`CartLineItem`]s kept in insertion order.
//! It upholds two invariants through every operation, including
//! deserialization:
//!
//! - at most one line item per product id
//! - every quantity is at least 1 (setting a quantity to 0 removes the line)
//!
//! All operations are total. Mutations return `true` when they changed the
//! cart so callers can skip persisting no-ops.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Price, Product, ProductId};

/// One product entry in the cart.
///
/// Title, price, image and category are captured from the catalog when the
/// product is added and are not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub image: String,
    pub category: String,
    pub quantity: u32,
}

impl CartLineItem {
    /// Build a line item from a catalog product.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
            category: product.category.clone(),
            quantity: quantity.max(1),
        }
    }

    /// Price of this line (`price × quantity`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Persisted cart data that violates the cart invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("duplicate line item for product {0}")]
    DuplicateItem(ProductId),
    #[error("line item for product {0} has zero quantity")]
    ZeroQuantity(ProductId),
}

/// Ordered collection of cart line items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartLineItem>", into = "Vec<CartLineItem>")]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Look up the line item for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` units of `product`.
    ///
    /// Increments the existing line for the product's id, or appends a new
    /// line at the end. A quantity of 0 is treated as 1.
    pub fn add_item(&mut self, product: &Product, quantity: u32) -> bool {
        let quantity = quantity.max(1);
        match self.items.iter_mut().find(|item| item.id == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => self.items.push(CartLineItem::from_product(product, quantity)),
        }
        true
    }

    /// Remove the line for `id`. Absent ids are ignored.
    pub fn remove_item(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Set the quantity for `id` to exactly `quantity`.
    ///
    /// A quantity of zero or less removes the line. Absent ids are ignored.
    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_item(id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) if item.quantity != quantity => {
                item.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Remove every line item.
    pub fn clear(&mut self) -> bool {
        let changed = !self.items.is_empty();
        self.items.clear();
        changed
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `price × quantity` across all lines.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items.iter().map(CartLineItem::line_total).sum()
    }
}

impl TryFrom<Vec<CartLineItem>> for Cart {
    type Error = CartError;

    fn try_from(items: Vec<CartLineItem>) -> Result<Self, Self::Error> {
        for (index, item) in items.iter().enumerate() {
            if item.quantity == 0 {
                return Err(CartError::ZeroQuantity(item.id));
            }
            if items.iter().take(index).any(|earlier| earlier.id == item.id) {
                return Err(CartError::DuplicateItem(item.id));
            }
        }
        Ok(Self { items })
    }
}

impl From<Cart> for Vec<CartLineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Bearing {id}"),
            price: Price::from_cents(cents),
            description: String::new(),
            category: "ball-bearings".to_string(),
            image: format!("https://example.com/{id}.jpg"),
            rating: None,
        }
    }

    #[test]
    fn test_distinct_adds_sum_quantities() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 100), 2);
        cart.add_item(&product(2, 100), 3);
        cart.add_item(&product(3, 100), 1);

        assert_eq!(cart.len(), 3);
        assert_eq!(cart.total_item_count(), 6);
    }

    #[test]
    fn test_same_product_merges_into_one_line() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 100), 2);
        cart.add_item(&product(1, 100), 5);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 7);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut cart = Cart::new();
        cart.add_item(&product(3, 100), 1);
        cart.add_item(&product(1, 100), 1);
        cart.add_item(&product(3, 100), 1);

        let ids: Vec<i32> = cart.items().iter().map(|i| i.id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_zero_quantity_add_counts_as_one() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 100), 0);
        assert_eq!(cart.total_item_count(), 1);
    }

    #[test]
    fn test_update_to_zero_or_negative_removes() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 100), 2);
        cart.add_item(&product(2, 100), 2);

        assert!(cart.update_quantity(ProductId::new(1), 0));
        assert!(cart.update_quantity(ProductId::new(2), -1));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_sets_absolute_quantity() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 100), 5);

        assert!(cart.update_quantity(ProductId::new(1), 2));
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 2);
        assert!(!cart.update_quantity(ProductId::new(1), 2));
    }

    #[test]
    fn test_update_absent_id_does_not_create_line() {
        let mut cart = Cart::new();
        assert!(!cart.update_quantity(ProductId::new(9), 4));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_absent_id_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 100), 1);
        let before = cart.clone();

        assert!(!cart.remove_item(ProductId::new(2)));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        assert!(!cart.clear());
        cart.add_item(&product(1, 100), 1);
        assert!(cart.clear());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        assert_eq!(cart.total_item_count(), 0);
        assert_eq!(cart.total_price(), Price::ZERO);

        cart.add_item(&product(1, 1000), 2);
        cart.add_item(&product(2, 500), 1);
        assert_eq!(cart.total_price(), Price::from_cents(2500));
    }

    #[test]
    fn test_price_captured_at_add_time() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, 1000), 1);
        cart.add_item(&product(1, 9999), 1);

        assert_eq!(cart.total_price(), Price::from_cents(2000));
    }

    #[test]
    fn test_add_update_remove_scenario() {
        let mut cart = Cart::new();
        let item = product(1, 999);

        cart.add_item(&item, 1);
        assert_eq!(cart.total_item_count(), 1);
        assert_eq!(cart.total_price(), Price::from_cents(999));

        cart.add_item(&item, 2);
        assert_eq!(cart.total_item_count(), 3);
        assert_eq!(cart.total_price(), Price::from_cents(2997));

        cart.update_quantity(ProductId::new(1), 1);
        assert_eq!(cart.total_item_count(), 1);

        cart.remove_item(ProductId::new(1));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_serde_preserves_lines_and_order() {
        let mut cart = Cart::new();
        cart.add_item(&product(2, 1999), 4);
        cart.add_item(&product(1, 550), 1);

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_deserialize_rejects_invariant_violations() {
        let line = |id: i32, quantity: u32| CartLineItem {
            quantity,
            ..CartLineItem::from_product(&product(id, 100), 1)
        };

        let duplicate = serde_json::to_string(&vec![line(1, 1), line(1, 2)]).unwrap();
        assert!(serde_json::from_str::<Cart>(&duplicate).is_err());

        let zero = serde_json::to_string(&vec![line(1, 0)]).unwrap();
        assert!(serde_json::from_str::<Cart>(&zero).is_err());

        assert_eq!(
            Cart::try_from(vec![line(4, 1), line(4, 1)]),
            Err(CartError::DuplicateItem(ProductId::new(4)))
        );
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add { id: i32, quantity: u32 },
            Update { id: i32, quantity: i64 },
            Remove { id: i32 },
            Clear,
        }

        // A small id range so operations collide on the same lines often.
        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                4 => (1..8_i32, 1..6_u32).prop_map(|(id, quantity)| Op::Add { id, quantity }),
                3 => (1..8_i32, -2..6_i64).prop_map(|(id, quantity)| Op::Update { id, quantity }),
                2 => (1..8_i32).prop_map(|id| Op::Remove { id }),
                1 => Just(Op::Clear),
            ]
        }

        fn apply(cart: &mut Cart, op: &Op) {
            match *op {
                Op::Add { id, quantity } => {
                    cart.add_item(&product(id, i64::from(id) * 125), quantity);
                }
                Op::Update { id, quantity } => {
                    cart.update_quantity(ProductId::new(id), quantity);
                }
                Op::Remove { id } => {
                    cart.remove_item(ProductId::new(id));
                }
                Op::Clear => {
                    cart.clear();
                }
            }
        }

        proptest! {
            #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

            #[test]
            fn distinct_adds_sum_quantities(quantities in prop::collection::vec(1..50_u32, 0..12)) {
                let mut cart = Cart::new();
                for (id, quantity) in (1..).zip(&quantities) {
                    cart.add_item(&product(id, 100), *quantity);
                }

                let expected: u64 = quantities.iter().copied().map(u64::from).sum();
                prop_assert_eq!(cart.total_item_count(), expected);
                prop_assert_eq!(cart.len(), quantities.len());
            }

            #[test]
            fn operations_keep_invariants(ops in prop::collection::vec(op_strategy(), 0..40)) {
                let mut cart = Cart::new();
                for op in &ops {
                    apply(&mut cart, op);

                    let items = cart.items();
                    for (index, item) in items.iter().enumerate() {
                        prop_assert!(item.quantity >= 1);
                        prop_assert!(items.iter().skip(index + 1).all(|later| later.id != item.id));
                    }
                }

                let expected: u64 = cart.items().iter().map(|i| u64::from(i.quantity)).sum();
                prop_assert_eq!(cart.total_item_count(), expected);
            }

            #[test]
            fn serde_round_trip_keeps_lines_and_order(ops in prop::collection::vec(op_strategy(), 0..40)) {
                let mut cart = Cart::new();
                for op in &ops {
                    apply(&mut cart, op);
                }

                let json = serde_json::to_string(&cart).unwrap();
                let restored: Cart = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(restored, cart);
            }
        }
    }
}
