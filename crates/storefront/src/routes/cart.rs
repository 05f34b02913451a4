//! Cart route handlers.
//!
//! Mutations are plain HTML form posts that redirect back to the page they
//! came from (`return_to`), so the storefront works without scripts.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::State,
    http::Uri,
    response::{IntoResponse, Redirect},
};
use quality_bearings_core::{Cart, CartLineItem, Price, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::layout::LayoutView;
use super::redirect_back;
use crate::error::{AppError, Result, cart_breadcrumb};
use crate::filters;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: i32,
    pub title: String,
    pub category: String,
    pub image: String,
    pub sku: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    /// The decrement button only shows above one; removal is explicit.
    pub can_decrement: bool,
    pub decrement_quantity: u32,
    pub increment_quantity: u32,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&CartLineItem> for CartItemView {
    fn from(line: &CartLineItem) -> Self {
        Self {
            id: line.id.as_i32(),
            title: line.title.clone(),
            category: line.category.clone(),
            image: line.image.clone(),
            sku: sku(line),
            quantity: line.quantity,
            price: line.price.to_string(),
            line_price: line.line_total().to_string(),
            can_decrement: line.quantity > 1,
            decrement_quantity: line.quantity.saturating_sub(1),
            increment_quantity: line.quantity.saturating_add(1),
        }
    }
}

/// Display SKU: the category slugged, then the product id.
fn sku(line: &CartLineItem) -> String {
    let category: String = line
        .category
        .chars()
        .map(|c| if c == '\'' || c.is_whitespace() { '-' } else { c })
        .collect();
    format!("{}-{}", category.to_lowercase(), line.id)
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: cart.total_price().to_string(),
            item_count: cart.total_item_count(),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    pub return_to: Option<String>,
}

/// Update cart form data.
///
/// Signed so that zero and negative quantities reach the cart, which treats
/// them as removal.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: i64,
    pub return_to: Option<String>,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
    pub return_to: Option<String>,
}

/// Clear cart form data.
#[derive(Debug, Deserialize)]
pub struct ClearCartForm {
    pub return_to: Option<String>,
}

/// Mini-cart toggle form data.
#[derive(Debug, Deserialize)]
pub struct MiniCartForm {
    pub open: bool,
    pub return_to: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: LayoutView,
    pub cart: CartView,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// JSON body of `GET /api/cart`.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartLineItem>,
    pub item_count: u64,
    pub total_price: Price,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, uri))]
pub async fn show(State(state): State<AppState>, uri: Uri) -> impl IntoResponse {
    let layout = LayoutView::load(&state, &uri).await;
    let cart = CartView::from(state.cart().cart());

    CartShowTemplate { layout, cart }
}

/// Add a product to the cart.
///
/// The product is fetched from the catalog so the line carries current
/// title, price and image. Redirects to `return_to`, or to the product page
/// with the confirmation shown. A quantity of zero is rejected.
#[instrument(skip(state))]
pub async fn add(State(state): State<AppState>, Form(form): Form<AddToCartForm>) -> Result<Redirect> {
    let quantity = form.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(AppError::BadRequest("quantity must be at least 1".to_string()));
    }

    let product = state.catalog().get_product(form.product_id).await?;
    state.cart().add_item(&product, quantity);

    cart_breadcrumb(
        "Added item",
        &[("product_id", product.id.to_string()), ("quantity", quantity.to_string())],
    );

    let fallback = format!("/product/{}?added=1", product.id);
    Ok(redirect_back(form.return_to.as_deref(), &fallback))
}

/// Set a line's quantity; zero or less removes it.
#[instrument(skip(state))]
pub async fn update(State(state): State<AppState>, Form(form): Form<UpdateCartForm>) -> Redirect {
    state.cart().update_quantity(form.product_id, form.quantity);

    cart_breadcrumb(
        "Updated quantity",
        &[("product_id", form.product_id.to_string()), ("quantity", form.quantity.to_string())],
    );

    redirect_back(form.return_to.as_deref(), "/cart")
}

/// Remove a line from the cart.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<RemoveFromCartForm>,
) -> Redirect {
    state.cart().remove_item(form.product_id);

    cart_breadcrumb("Removed item", &[("product_id", form.product_id.to_string())]);

    redirect_back(form.return_to.as_deref(), "/cart")
}

/// Empty the cart.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>, Form(form): Form<ClearCartForm>) -> Redirect {
    state.cart().clear();
    cart_breadcrumb("Cleared cart", &[]);

    redirect_back(form.return_to.as_deref(), "/cart")
}

/// Show or hide the mini-cart drawer.
#[instrument(skip(state))]
pub async fn mini_cart(State(state): State<AppState>, Form(form): Form<MiniCartForm>) -> Redirect {
    state.cart().set_mini_cart_open(form.open);

    redirect_back(form.return_to.as_deref(), "/")
}

/// Cart count badge fragment, read from the latest cart summary.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> impl IntoResponse {
    CartCountTemplate {
        count: state.cart_summary().item_count,
    }
}

/// Cart contents and totals as JSON.
#[instrument(skip(state))]
pub async fn api_cart(State(state): State<AppState>) -> Json<CartResponse> {
    let store = state.cart();
    let cart = store.cart();

    Json(CartResponse {
        items: cart.items().to_vec(),
        item_count: cart.total_item_count(),
        total_price: cart.total_price(),
    })
}
