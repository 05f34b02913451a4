//! End-to-end cart behavior through the storefront's HTTP surface.

#![allow(clippy::unwrap_used)]

use quality_bearings_integration_tests::{
    FakeCatalog, MISSING_PRODUCT_ID, TestStorefront, cleanup, location, storefront_config,
    temp_cart_path,
};
use quality_bearings_storefront::cart::StorageError;
use quality_bearings_storefront::state::{AppState, StateError};
use reqwest::StatusCode;

async fn setup() -> (FakeCatalog, TestStorefront) {
    let catalog = FakeCatalog::spawn().await;
    let storefront = TestStorefront::spawn(&catalog, &temp_cart_path()).await;
    (catalog, storefront)
}

// ============================================================================
// Adding
// ============================================================================

#[tokio::test]
async fn test_adding_same_product_twice_sums_quantities() {
    let (_catalog, storefront) = setup().await;

    storefront
        .post_form("/cart/add", &[("product_id", "1"), ("quantity", "2")])
        .await;
    storefront
        .post_form("/cart/add", &[("product_id", "1"), ("quantity", "1")])
        .await;

    let cart = storefront.cart_json().await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["quantity"], 3);
    assert_eq!(cart["item_count"], 3);
    assert_eq!(cart["total_price"], "329.85");

    cleanup(storefront.cart_path());
}

#[tokio::test]
async fn test_add_snapshots_catalog_fields() {
    let (_catalog, storefront) = setup().await;

    storefront
        .post_form("/cart/add", &[("product_id", "9")])
        .await;

    let cart = storefront.cart_json().await;
    let line = &cart["items"][0];
    assert_eq!(line["id"], 9);
    assert_eq!(line["quantity"], 1);
    assert_eq!(line["category"], "electronics");
    assert_eq!(
        line["title"],
        "WD 2TB Elements Portable External Hard Drive - USB 3.0"
    );

    cleanup(storefront.cart_path());
}

#[tokio::test]
async fn test_add_redirects_to_product_confirmation_by_default() {
    let (_catalog, storefront) = setup().await;

    let response = storefront
        .post_form("/cart/add", &[("product_id", "5"), ("quantity", "1")])
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/product/5?added=1"));

    let (status, body) = storefront.page("/product/5?added=1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Added to cart!"));

    cleanup(storefront.cart_path());
}

#[tokio::test]
async fn test_add_returns_to_local_pages_only() {
    let (_catalog, storefront) = setup().await;

    let response = storefront
        .post_form(
            "/cart/add",
            &[("product_id", "2"), ("return_to", "/category/jewelery?columns=3")],
        )
        .await;
    assert_eq!(
        location(&response).as_deref(),
        Some("/category/jewelery?columns=3")
    );

    let response = storefront
        .post_form(
            "/cart/add",
            &[("product_id", "2"), ("return_to", "//evil.example.com/")],
        )
        .await;
    assert_eq!(location(&response).as_deref(), Some("/product/2?added=1"));

    cleanup(storefront.cart_path());
}

#[tokio::test]
async fn test_add_unknown_product_leaves_cart_alone() {
    let (_catalog, storefront) = setup().await;

    let response = storefront
        .post_form("/cart/add", &[("product_id", &MISSING_PRODUCT_ID.to_string())])
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = storefront
        .post_form("/cart/add", &[("product_id", "777")])
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let cart = storefront.cart_json().await;
    assert_eq!(cart["item_count"], 0);

    cleanup(storefront.cart_path());
}

#[tokio::test]
async fn test_add_rejects_zero_quantity() {
    let (_catalog, storefront) = setup().await;

    let response = storefront
        .post_form("/cart/add", &[("product_id", "1"), ("quantity", "0")])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let cart = storefront.cart_json().await;
    assert_eq!(cart["item_count"], 0);

    cleanup(storefront.cart_path());
}

#[tokio::test]
async fn test_add_when_catalog_down_is_bad_gateway() {
    let (catalog, storefront) = setup().await;
    catalog.set_broken(true);

    let response = storefront
        .post_form("/cart/add", &[("product_id", "1")])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    cleanup(storefront.cart_path());
}

// ============================================================================
// Updating and removing
// ============================================================================

#[tokio::test]
async fn test_update_sets_quantity() {
    let (_catalog, storefront) = setup().await;

    storefront
        .post_form("/cart/add", &[("product_id", "1"), ("quantity", "3")])
        .await;
    let response = storefront
        .post_form("/cart/update", &[("product_id", "1"), ("quantity", "5")])
        .await;

    assert_eq!(location(&response).as_deref(), Some("/cart"));
    let cart = storefront.cart_json().await;
    assert_eq!(cart["items"][0]["quantity"], 5);
    assert_eq!(cart["item_count"], 5);

    cleanup(storefront.cart_path());
}

#[tokio::test]
async fn test_update_to_zero_or_less_removes_line() {
    let (_catalog, storefront) = setup().await;

    storefront
        .post_form("/cart/add", &[("product_id", "1")])
        .await;
    storefront
        .post_form("/cart/add", &[("product_id", "2")])
        .await;

    storefront
        .post_form("/cart/update", &[("product_id", "1"), ("quantity", "0")])
        .await;
    storefront
        .post_form("/cart/update", &[("product_id", "2"), ("quantity", "-4")])
        .await;

    let cart = storefront.cart_json().await;
    assert!(cart["items"].as_array().unwrap().is_empty());
    assert_eq!(cart["total_price"], "0");

    cleanup(storefront.cart_path());
}

#[tokio::test]
async fn test_update_absent_product_is_noop() {
    let (_catalog, storefront) = setup().await;

    storefront
        .post_form("/cart/add", &[("product_id", "1")])
        .await;
    storefront
        .post_form("/cart/update", &[("product_id", "9"), ("quantity", "4")])
        .await;

    let cart = storefront.cart_json().await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["item_count"], 1);

    cleanup(storefront.cart_path());
}

#[tokio::test]
async fn test_remove_and_clear() {
    let (_catalog, storefront) = setup().await;

    for id in ["1", "2", "5"] {
        storefront
            .post_form("/cart/add", &[("product_id", id)])
            .await;
    }

    storefront
        .post_form("/cart/remove", &[("product_id", "2")])
        .await;
    let cart = storefront.cart_json().await;
    let ids: Vec<_> = cart["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|line| line["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 5]);

    let response = storefront.post_form("/cart/clear", &[]).await;
    assert_eq!(location(&response).as_deref(), Some("/cart"));
    assert_eq!(storefront.cart_json().await["item_count"], 0);

    cleanup(storefront.cart_path());
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_cart_survives_restart() {
    let catalog = FakeCatalog::spawn().await;
    let cart_path = temp_cart_path();

    let first = TestStorefront::spawn(&catalog, &cart_path).await;
    first
        .post_form("/cart/add", &[("product_id", "5"), ("quantity", "2")])
        .await;
    first
        .post_form("/cart/add", &[("product_id", "1")])
        .await;
    assert!(cart_path.exists());
    let before = first.cart_json().await;
    first.stop().await;

    let second = TestStorefront::spawn(&catalog, &cart_path).await;
    let cart = second.cart_json().await;
    assert_eq!(cart, before);
    assert_eq!(cart["item_count"], 3);
    assert_eq!(cart["items"][0]["id"], 5);

    second.stop().await;
    cleanup(&cart_path);
}

#[tokio::test]
async fn test_running_storefront_owns_its_slot() {
    let catalog = FakeCatalog::spawn().await;
    let cart_path = temp_cart_path();

    let storefront = TestStorefront::spawn(&catalog, &cart_path).await;
    storefront
        .post_form("/cart/add", &[("product_id", "2")])
        .await;

    let config = storefront_config(&catalog.base_url(), &cart_path);
    assert!(matches!(
        AppState::new(config),
        Err(StateError::CartSlot(StorageError::Locked { .. }))
    ));

    // The refused opener must not have touched the slot
    let cart = storefront.cart_json().await;
    assert_eq!(cart["item_count"], 1);
    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&cart_path).unwrap()).unwrap();
    assert_eq!(on_disk[0]["id"], 2);

    storefront.stop().await;
    let config = storefront_config(&catalog.base_url(), &cart_path);
    assert!(AppState::new(config).is_ok());

    cleanup(&cart_path);
}

#[tokio::test]
async fn test_corrupt_slot_starts_empty() {
    let catalog = FakeCatalog::spawn().await;
    let cart_path = temp_cart_path();
    std::fs::create_dir_all(cart_path.parent().unwrap()).unwrap();
    std::fs::write(&cart_path, "{\"not\": \"a cart\"").unwrap();

    let storefront = TestStorefront::spawn(&catalog, &cart_path).await;
    assert_eq!(storefront.cart_json().await["item_count"], 0);

    // The next mutation overwrites the corrupt slot
    storefront
        .post_form("/cart/add", &[("product_id", "1")])
        .await;
    let raw = std::fs::read_to_string(&cart_path).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&raw).is_ok());

    cleanup(&cart_path);
}

// ============================================================================
// Views
// ============================================================================

#[tokio::test]
async fn test_cart_page_shows_lines_and_totals() {
    let (_catalog, storefront) = setup().await;

    let (_, body) = storefront.page("/cart").await;
    assert!(body.contains("Your Cart is Empty"));

    storefront
        .post_form("/cart/add", &[("product_id", "1"), ("quantity", "3")])
        .await;

    let (status, body) = storefront.page("/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Your Cart (3 items)"));
    assert!(body.contains("$109.95"));
    assert!(body.contains("$329.85"));
    assert!(body.contains("Free Shipping"));
    assert!(body.contains("men-s-clothing-1"));

    cleanup(storefront.cart_path());
}

#[tokio::test]
async fn test_cart_count_fragment() {
    let (_catalog, storefront) = setup().await;

    storefront
        .post_form("/cart/add", &[("product_id", "9"), ("quantity", "4")])
        .await;

    let (status, body) = storefront.page("/cart/count").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(">4<"));

    cleanup(storefront.cart_path());
}

#[tokio::test]
async fn test_mini_cart_opens_on_add_and_closes() {
    let (_catalog, storefront) = setup().await;

    let (_, body) = storefront.page("/products").await;
    assert!(!body.contains("class=\"mini-cart\""));

    storefront
        .post_form("/cart/add", &[("product_id", "2"), ("return_to", "/products")])
        .await;
    let (_, body) = storefront.page("/products").await;
    assert!(body.contains("class=\"mini-cart\""));
    assert!(body.contains("Mens Casual Premium Slim Fit T-Shirts"));

    let response = storefront
        .post_form("/cart/mini-cart", &[("open", "false"), ("return_to", "/products")])
        .await;
    assert_eq!(location(&response).as_deref(), Some("/products"));

    let (_, body) = storefront.page("/products").await;
    assert!(!body.contains("class=\"mini-cart\""));

    cleanup(storefront.cart_path());
}
