//! Fake Store catalog API client.
//!
//! # Architecture
//!
//! - Plain REST over `reqwest`, JSON decoded into `quality_bearings_core` types
//! - The catalog is the source of truth: no local copy, no caching, no retry
//! - Every page load issues its own requests; failures surface to the page as
//!   a retryable error state
//!
//! # Endpoints
//!
//! ```text
//! GET {base}/products                     list_products
//! GET {base}/products/{id}                get_product
//! GET {base}/products/categories          list_categories
//! GET {base}/products/category/{name}     list_products_by_category
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use quality_bearings_storefront::catalog::CatalogClient;
//!
//! let client = CatalogClient::new(&config.catalog)?;
//! let product = client.get_product(ProductId::new(1)).await?;
//! ```

mod client;

pub use client::CatalogClient;

use thiserror::Error;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The API answered successfully but without a body.
    #[error("Empty response from {0}")]
    EmptyBody(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The configured base URL cannot carry a path.
    #[error("Invalid catalog base URL: {0}")]
    InvalidBaseUrl(String),
}

impl CatalogError {
    /// Whether this error means the requested resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
