//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (catalog reachable)
//!
//! # Products
//! GET  /products               - All products
//! GET  /category/:category     - Products in a catalog category
//! GET  /:department            - Department aliases (all products)
//! GET  /product/:id            - Product detail
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (redirects back)
//! POST /cart/update            - Set quantity (redirects back)
//! POST /cart/remove            - Remove item (redirects back)
//! POST /cart/clear             - Empty the cart (redirects back)
//! POST /cart/mini-cart         - Show or hide the mini-cart (redirects back)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # API
//! GET  /api/cart               - Cart contents and totals as JSON
//! ```

pub mod cart;
pub mod home;
pub mod layout;
pub mod products;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::from_fn,
    response::Redirect,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Directory served under `/static`.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    let mut router = Router::new()
        .route("/products", get(products::index))
        .route("/category/{category}", get(products::category))
        .route("/product/{id}", get(products::show));

    for (slug, _) in products::DEPARTMENTS {
        router = router.route(&format!("/{slug}"), get(products::department));
    }

    router
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/mini-cart", post(cart::mini_cart))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Product routes
        .merge(product_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // JSON API
        .route("/api/cart", get(cart::api_cart))
}

/// Build the complete application with middleware and state.
///
/// Sentry layers are added by the binary, outside this router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the catalog.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the catalog API is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.catalog().list_categories().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Catalog not reachable");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Whether `target` is a same-site path that is safe to redirect to.
fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
}

/// Redirect to a form's `return_to` if it is local, otherwise to `fallback`.
pub(crate) fn redirect_back(return_to: Option<&str>, fallback: &str) -> Redirect {
    match return_to {
        Some(target) if is_local_path(target) => Redirect::to(target),
        _ => Redirect::to(fallback),
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::header::LOCATION, response::IntoResponse};

    use super::*;

    fn location(redirect: Redirect) -> String {
        redirect
            .into_response()
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn test_local_paths() {
        assert!(is_local_path("/cart"));
        assert!(is_local_path("/category/men's%20clothing?columns=3"));
        assert!(!is_local_path("//evil.example.com"));
        assert!(!is_local_path("https://evil.example.com"));
        assert!(!is_local_path("/\\evil.example.com"));
        assert!(!is_local_path(""));
    }

    #[test]
    fn test_redirect_back() {
        assert_eq!(location(redirect_back(Some("/products"), "/cart")), "/products");
        assert_eq!(location(redirect_back(Some("http://x.y"), "/cart")), "/cart");
        assert_eq!(location(redirect_back(None, "/cart")), "/cart");
    }
}
