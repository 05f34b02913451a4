//! Catalog browsing commands.
//!
//! # Environment Variables
//!
//! - `CATALOG_BASE_URL` - Catalog API base URL (default: <https://fakestoreapi.com>)
//! - `CATALOG_TIMEOUT_SECS` - Request timeout in seconds (default: 10)

#![allow(clippy::print_stdout)]

use quality_bearings_core::{Product, ProductId};
use quality_bearings_storefront::catalog::CatalogClient;
use quality_bearings_storefront::config::CatalogConfig;

use super::CommandError;

fn client() -> Result<CatalogClient, CommandError> {
    let config = CatalogConfig::from_env()?;
    tracing::debug!(base_url = %config.base_url, "Using catalog");
    Ok(CatalogClient::new(&config)?)
}

/// One-line summary used by listings.
fn product_row(product: &Product) -> String {
    format!(
        "{:>4}  {:>10}  {}  [{}]",
        product.id, product.price, product.title, product.category
    )
}

/// List catalog categories.
///
/// # Errors
///
/// Returns an error if the catalog cannot be reached.
pub async fn categories() -> Result<(), CommandError> {
    for category in client()?.list_categories().await? {
        println!("{category}");
    }
    Ok(())
}

/// List products, optionally restricted to one category.
///
/// # Errors
///
/// Returns an error if the catalog cannot be reached.
pub async fn products(category: Option<&str>) -> Result<(), CommandError> {
    let client = client()?;
    let products = match category {
        Some(category) => client.list_products_by_category(category).await?,
        None => client.list_products().await?,
    };

    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    for product in &products {
        println!("{}", product_row(product));
    }
    println!("\n{} products", products.len());
    Ok(())
}

/// Show one product in full.
///
/// # Errors
///
/// Returns an error if the product does not exist or the catalog cannot be
/// reached.
pub async fn product(id: ProductId) -> Result<(), CommandError> {
    let product = client()?.get_product(id).await?;

    println!("{}", product.title);
    println!("  id:       {}", product.id);
    println!("  price:    {}", product.price);
    println!("  category: {}", product.category);
    if let Some(rating) = product.rating {
        println!("  rating:   {:.1} ({} reviews)", rating.rate, rating.count);
    }
    println!("  image:    {}", product.image);
    if !product.description.is_empty() {
        println!("\n{}", product.description);
    }
    Ok(())
}
