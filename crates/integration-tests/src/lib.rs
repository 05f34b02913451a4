//! Integration test harness for the Quality Bearings storefront.
//!
//! Every test gets its own fake catalog server and storefront, each bound to
//! an ephemeral port, plus a fresh cart slot under the system temp dir. No
//! external services are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p quality-bearings-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use quality_bearings_storefront::config::{CatalogConfig, StorefrontConfig};
use quality_bearings_storefront::routes;
use quality_bearings_storefront::state::AppState;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use url::Url;
use uuid::Uuid;

/// Product id the fake catalog answers with HTTP 404.
pub const MISSING_PRODUCT_ID: i32 = 404;
/// Product id the fake catalog answers with a JSON `null`.
pub const NULL_PRODUCT_ID: i32 = 998;

/// Products served by the fake catalog.
#[must_use]
pub fn fixture_products() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "title": "Fjallraven - Foldsack No. 1 Backpack, Fits 15 Laptops",
            "price": 109.95,
            "description": "Your perfect pack for everyday use and walks in the forest.",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg",
            "rating": { "rate": 3.9, "count": 120 }
        }),
        json!({
            "id": 2,
            "title": "Mens Casual Premium Slim Fit T-Shirts",
            "price": 22.3,
            "description": "Slim-fitting style, contrast raglan long sleeve.",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/71-3HjGNDUL._AC_SY879._SX._UX._SY._UY_.jpg",
            "rating": { "rate": 4.1, "count": 259 }
        }),
        json!({
            "id": 5,
            "title": "John Hardy Women's Legends Naga Gold & Silver Dragon Station Chain Bracelet",
            "price": 695,
            "description": "From our Legends Collection.",
            "category": "jewelery",
            "image": "https://fakestoreapi.com/img/71pWzhdJNwL._AC_UL640_QL65_ML3_.jpg",
            "rating": { "rate": 4.6, "count": 400 }
        }),
        json!({
            "id": 9,
            "title": "WD 2TB Elements Portable External Hard Drive - USB 3.0",
            "price": 64,
            "description": "USB 3.0 and USB 2.0 compatibility.",
            "category": "electronics",
            "image": "https://fakestoreapi.com/img/61IBBVJvSDL._AC_SY879_.jpg"
        }),
    ]
}

/// Categories served by the fake catalog.
pub const FIXTURE_CATEGORIES: &[&str] = &["electronics", "jewelery", "men's clothing", "women's clothing"];

// =============================================================================
// Fake catalog
// =============================================================================

struct FakeCatalogState {
    products: Vec<Value>,
    broken: AtomicBool,
}

type Shared = Arc<FakeCatalogState>;

/// A Fake Store API stand-in running on a local port.
pub struct FakeCatalog {
    addr: SocketAddr,
    state: Shared,
}

impl FakeCatalog {
    /// Start a fake catalog serving [`fixture_products`].
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeCatalogState {
            products: fixture_products(),
            broken: AtomicBool::new(false),
        });

        let router = Router::new()
            .route("/products", get(list_products))
            .route("/products/categories", get(list_categories))
            .route("/products/category/{category}", get(list_by_category))
            .route("/products/{id}", get(get_product))
            .with_state(Arc::clone(&state));

        let addr = serve(router).await;
        Self { addr, state }
    }

    /// Base URL to configure clients with.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("valid fake catalog URL")
    }

    /// Catalog configuration pointing at this server.
    #[must_use]
    pub fn config(&self) -> CatalogConfig {
        CatalogConfig {
            base_url: self.base_url(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Make every endpoint answer HTTP 500 (or stop doing so).
    pub fn set_broken(&self, broken: bool) {
        self.state.broken.store(broken, Ordering::SeqCst);
    }
}

fn broken(state: &FakeCatalogState) -> Option<Response> {
    state
        .broken
        .load(Ordering::SeqCst)
        .then(|| (StatusCode::INTERNAL_SERVER_ERROR, "catalog unavailable").into_response())
}

async fn list_products(State(state): State<Shared>) -> Response {
    if let Some(response) = broken(&state) {
        return response;
    }
    Json(state.products.clone()).into_response()
}

async fn list_categories(State(state): State<Shared>) -> Response {
    if let Some(response) = broken(&state) {
        return response;
    }
    Json(FIXTURE_CATEGORIES).into_response()
}

async fn list_by_category(State(state): State<Shared>, Path(category): Path<String>) -> Response {
    if let Some(response) = broken(&state) {
        return response;
    }
    let products: Vec<&Value> = state
        .products
        .iter()
        .filter(|p| p["category"] == category.as_str())
        .collect();
    Json(products).into_response()
}

/// Unknown ids get an empty 200 body, like the real service.
async fn get_product(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    if let Some(response) = broken(&state) {
        return response;
    }
    let Ok(id) = id.parse::<i64>() else {
        return (StatusCode::BAD_REQUEST, "invalid id").into_response();
    };

    if id == i64::from(MISSING_PRODUCT_ID) {
        return StatusCode::NOT_FOUND.into_response();
    }
    if id == i64::from(NULL_PRODUCT_ID) {
        return ([("content-type", "application/json")], "null").into_response();
    }

    state
        .products
        .iter()
        .find(|p| p["id"] == id)
        .map_or_else(|| StatusCode::OK.into_response(), |p| Json(p.clone()).into_response())
}

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    addr
}

// =============================================================================
// Storefront
// =============================================================================

/// A fresh cart slot path in its own temp directory.
#[must_use]
pub fn temp_cart_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("qb-integration-{}", Uuid::new_v4()))
        .join("cart.json")
}

/// Storefront configuration for `catalog` and `cart_path`.
#[must_use]
pub fn storefront_config(catalog: &Url, cart_path: &FsPath) -> StorefrontConfig {
    let vars: HashMap<&str, String> = HashMap::from([
        ("STOREFRONT_PORT", "0".to_string()),
        ("STOREFRONT_CART_PATH", cart_path.display().to_string()),
        ("CATALOG_BASE_URL", catalog.to_string()),
        ("CATALOG_TIMEOUT_SECS", "5".to_string()),
    ]);
    StorefrontConfig::from_lookup(|key| vars.get(key).cloned()).expect("valid test config")
}

/// A running storefront. It owns its cart slot until [`TestStorefront::stop`]
/// returns.
pub struct TestStorefront {
    base_url: String,
    cart_path: PathBuf,
    client: reqwest::Client,
    shutdown: oneshot::Sender<()>,
    server: JoinHandle<()>,
}

impl TestStorefront {
    /// Start a storefront backed by `catalog`, hydrating from `cart_path`.
    pub async fn spawn(catalog: &FakeCatalog, cart_path: &FsPath) -> Self {
        let config = storefront_config(&catalog.base_url(), cart_path);
        let state = AppState::new(config).expect("storefront state");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local address");
        let (shutdown, stopped) = oneshot::channel();
        let server = tokio::spawn(async move {
            axum::serve(listener, routes::app(state))
                .with_graceful_shutdown(async {
                    stopped.await.ok();
                })
                .await
                .ok();
        });

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("HTTP client");

        Self {
            base_url: format!("http://{addr}"),
            cart_path: cart_path.to_path_buf(),
            client,
            shutdown,
            server,
        }
    }

    /// Shut the server down and wait until its cart slot is released.
    pub async fn stop(self) {
        drop(self.client);
        self.shutdown.send(()).ok();
        self.server.await.expect("storefront task");
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    #[must_use]
    pub fn cart_path(&self) -> &FsPath {
        &self.cart_path
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request")
    }

    /// GET a page and return its status and body.
    pub async fn page(&self, path: &str) -> (reqwest::StatusCode, String) {
        let response = self.get(path).await;
        let status = response.status();
        (status, response.text().await.expect("response body"))
    }

    /// POST a form without following the redirect.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request")
    }

    /// The `/api/cart` JSON document.
    pub async fn cart_json(&self) -> Value {
        self.get("/api/cart")
            .await
            .json()
            .await
            .expect("cart JSON")
    }
}

/// Location header of a redirect response.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Remove a cart slot's temp directory.
pub fn cleanup(cart_path: &FsPath) {
    if let Some(dir) = cart_path.parent() {
        std::fs::remove_dir_all(dir).ok();
    }
}
