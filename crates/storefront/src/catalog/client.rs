//! Catalog API client implementation.

use std::sync::Arc;

use quality_bearings_core::{Product, ProductId};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::CatalogError;
use crate::config::CatalogConfig;

/// Maximum number of body characters included in error logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the Fake Store catalog API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL
    /// cannot carry a path.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        if config.base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidBaseUrl(config.base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(
                "quality-bearings-storefront/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// Build an endpoint URL by appending percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET an endpoint and decode its JSON body.
    ///
    /// Returns `Ok(None)` for an empty body or a JSON `null`, which is how the
    /// catalog answers for some unknown resources. HTTP 404 maps to
    /// [`CatalogError::NotFound`].
    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<Option<T>, CatalogError> {
        let url = self.endpoint(segments)?;
        debug!(url = %url, "Catalog request");

        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(url.path().to_string()));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                url = %url,
                body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str::<Option<T>>(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e)
        })
    }

    /// GET a list endpoint; an empty body is an error.
    async fn get_list<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<Vec<T>, CatalogError> {
        self.get_json::<Vec<T>>(segments)
            .await?
            .ok_or_else(|| CatalogError::EmptyBody(format!("/{}", segments.join("/"))))
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List every product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the response is invalid.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        self.get_list(&["products"]).await
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no product has this id, or
    /// another error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let id_segment = id.to_string();
        let not_found = || CatalogError::NotFound(format!("product {id}"));

        match self.get_json::<Product>(&["products", id_segment.as_str()]).await {
            Ok(Some(product)) => Ok(product),
            Ok(None) | Err(CatalogError::NotFound(_)) => Err(not_found()),
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// List category names.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the response is invalid.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<String>, CatalogError> {
        self.get_list(&["products", "categories"]).await
    }

    /// List the products in one category.
    ///
    /// Unknown categories yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the response is invalid.
    #[instrument(skip(self), fields(category = %category))]
    pub async fn list_products_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Product>, CatalogError> {
        self.get_list(&["products", "category", category]).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(base: &str) -> CatalogClient {
        CatalogClient::new(&CatalogConfig {
            base_url: Url::parse(base).unwrap(),
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_from_root_base() {
        let url = client("https://fakestoreapi.com")
            .endpoint(&["products", "1"])
            .unwrap();
        assert_eq!(url.as_str(), "https://fakestoreapi.com/products/1");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let url = client("http://localhost:4000/api")
            .endpoint(&["products", "categories"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:4000/api/products/categories");
    }

    #[test]
    fn test_endpoint_encodes_category() {
        let url = client("https://fakestoreapi.com")
            .endpoint(&["products", "category", "men's clothing"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://fakestoreapi.com/products/category/men's%20clothing"
        );
    }

    #[test]
    fn test_endpoint_encodes_slashes_in_segments() {
        let url = client("https://fakestoreapi.com")
            .endpoint(&["products", "category", "a/b"])
            .unwrap();
        assert_eq!(url.path(), "/products/category/a%2Fb");
    }
}
