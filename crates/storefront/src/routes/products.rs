//! Product listing and detail route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{MatchedPath, Path, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use quality_bearings_core::{Product, ProductId, Rating};
use serde::Deserialize;
use tracing::instrument;

use super::layout::{LayoutView, current_path};
use crate::catalog::CatalogError;
use crate::filters;
use crate::state::AppState;

/// Message shown when the catalog cannot be reached.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load products. Please try again later.";

/// Department pages linked from the header, as `(slug, label)`.
///
/// The catalog has no departments, so each of these lists every product.
pub const DEPARTMENTS: &[(&str, &str)] = &[
    ("brands", "Brands"),
    ("ball-bearings", "Ball Bearings"),
    ("roller-bearings", "Roller Bearings"),
    ("housings", "Housings and Inserts"),
    ("linear", "Linear"),
    ("super-precision", "Super Precision"),
    ("spherical-plains", "Spherical Plains"),
    ("power-transmission", "Power Transmission"),
    ("maintenance-tools", "Maintenance Tools"),
    ("oil-seals", "Oil Seals"),
];

/// Listing sort options as `(value, label)`. Display only.
const SORT_OPTIONS: &[(&str, &str)] = &[
    ("featured", "Featured items"),
    ("newest", "Newest items"),
    ("best-selling", "Best selling items"),
    ("a-z", "A to Z"),
    ("z-a", "Z to A"),
    ("review", "By review"),
    ("price-asc", "Price: ascending"),
    ("price-desc", "Price: descending"),
    ("relevance", "Relevance"),
];
const DEFAULT_SORT: &str = "best-selling";

/// Page sizes offered. Display only; every product is shown.
const PER_PAGE_OPTIONS: &[u32] = &[8, 12, 20, 26, 40];
const DEFAULT_PER_PAGE: u32 = 40;

/// Grid widths offered.
const COLUMN_OPTIONS: &[u8] = &[2, 3, 4, 5];
const DEFAULT_COLUMNS: u8 = 4;

/// Brand filter sidebar as `(brand, product count)`. Display only.
const BRAND_FILTERS: &[(&str, u32)] = &[
    ("Dow Corning", 20),
    ("Kluber", 1275),
    ("Loctite", 131),
    ("Molykote", 51),
    ("Shell", 501),
    ("SKF", 165),
    ("Skydrol", 5),
];

// =============================================================================
// Views
// =============================================================================

/// Star rating display data.
#[derive(Clone)]
pub struct RatingView {
    /// Five characters of filled and empty stars.
    pub stars: String,
    pub rate: String,
    pub count: u32,
}

impl From<&Rating> for RatingView {
    fn from(rating: &Rating) -> Self {
        let filled = usize::from(rating.stars());
        Self {
            stars: format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled)),
            rate: format!("{:.1}", rating.rate),
            count: rating.count,
        }
    }
}

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub image: String,
    pub rating: Option<RatingView>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            title: product.title.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price: product.price.to_string(),
            image: product.image.clone(),
            rating: product.rating.as_ref().map(RatingView::from),
        }
    }
}

/// One option of a listing control.
#[derive(Clone)]
pub struct ChoiceView {
    pub value: String,
    pub label: String,
    pub selected: bool,
    /// Link that selects this option, keeping the other settings.
    pub href: String,
}

/// A brand in the filter sidebar.
#[derive(Clone)]
pub struct BrandFilterView {
    pub name: &'static str,
    pub count: u32,
}

// =============================================================================
// Listing settings
// =============================================================================

/// Query parameters accepted by listing pages.
///
/// Values are strings so that junk falls back to defaults instead of
/// rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub sort: Option<String>,
    pub per_page: Option<String>,
    pub columns: Option<String>,
}

/// Resolved listing settings.
///
/// Only `columns` changes what is rendered. `sort` and `per_page` are echoed
/// back into the controls and otherwise ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingSettings {
    pub sort: &'static str,
    pub per_page: u32,
    pub columns: u8,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            sort: DEFAULT_SORT,
            per_page: DEFAULT_PER_PAGE,
            columns: DEFAULT_COLUMNS,
        }
    }
}

impl ListingSettings {
    /// Resolve settings from a query, keeping only offered values.
    #[must_use]
    pub fn from_query(query: &ListingQuery) -> Self {
        let defaults = Self::default();

        let sort = query
            .sort
            .as_deref()
            .and_then(|s| SORT_OPTIONS.iter().find(|(value, _)| *value == s))
            .map_or(defaults.sort, |(value, _)| *value);
        let per_page = query
            .per_page
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .filter(|n| PER_PAGE_OPTIONS.contains(n))
            .unwrap_or(defaults.per_page);
        let columns = query
            .columns
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .filter(|n| COLUMN_OPTIONS.contains(n))
            .unwrap_or(defaults.columns);

        Self {
            sort,
            per_page,
            columns,
        }
    }

    fn href(self, path: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("sort", self.sort)
            .append_pair("per_page", &self.per_page.to_string())
            .append_pair("columns", &self.columns.to_string())
            .finish();
        format!("{path}?{query}")
    }

    fn sort_choices(self) -> Vec<ChoiceView> {
        SORT_OPTIONS
            .iter()
            .map(|(value, label)| ChoiceView {
                value: (*value).to_string(),
                label: (*label).to_string(),
                selected: *value == self.sort,
                href: String::new(),
            })
            .collect()
    }

    fn per_page_choices(self) -> Vec<ChoiceView> {
        PER_PAGE_OPTIONS
            .iter()
            .map(|n| ChoiceView {
                value: n.to_string(),
                label: n.to_string(),
                selected: *n == self.per_page,
                href: String::new(),
            })
            .collect()
    }

    fn column_choices(self, path: &str) -> Vec<ChoiceView> {
        COLUMN_OPTIONS
            .iter()
            .map(|n| ChoiceView {
                value: n.to_string(),
                label: n.to_string(),
                selected: *n == self.columns,
                href: Self {
                    columns: *n,
                    ..self
                }
                .href(path),
            })
            .collect()
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: LayoutView,
    pub heading: String,
    /// Catalog category shown in the breadcrumb, if any.
    pub category: Option<String>,
    pub products: Vec<ProductView>,
    pub columns: u8,
    pub sort_choices: Vec<ChoiceView>,
    pub per_page_choices: Vec<ChoiceView>,
    pub column_choices: Vec<ChoiceView>,
    pub brand_filters: Vec<BrandFilterView>,
    /// Path the filter form submits to.
    pub form_action: String,
    pub error: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: LayoutView,
    pub product: ProductView,
    /// Show the "added to cart" confirmation.
    pub added: bool,
}

/// Full-page error template.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub layout: LayoutView,
    pub title: String,
    pub message: String,
    /// "Try Again" link, for transient failures.
    pub retry_href: Option<String>,
    pub back_href: String,
    pub back_label: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// All products.
#[instrument(skip(state, uri))]
pub async fn index(
    State(state): State<AppState>,
    uri: Uri,
    Query(query): Query<ListingQuery>,
) -> Response {
    let products = state.catalog().list_products().await;
    render_listing(&state, &uri, &query, "All Products".to_string(), None, products).await
}

/// Products in one catalog category.
#[instrument(skip(state, uri))]
pub async fn category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    uri: Uri,
    Query(query): Query<ListingQuery>,
) -> Response {
    let products = match state.catalog().list_products_by_category(&category).await {
        Err(e) if e.is_not_found() => Ok(Vec::new()),
        other => other,
    };
    let heading = filters::title_case(&category);
    render_listing(&state, &uri, &query, heading, Some(category), products).await
}

/// Department alias: every product, under the department's name.
#[instrument(skip(state, uri))]
pub async fn department(
    State(state): State<AppState>,
    matched: MatchedPath,
    uri: Uri,
    Query(query): Query<ListingQuery>,
) -> Response {
    let slug = matched.as_str().trim_start_matches('/');
    let heading = DEPARTMENTS
        .iter()
        .find(|(s, _)| *s == slug)
        .map_or("All Products", |(_, label)| *label)
        .to_string();

    let products = state.catalog().list_products().await;
    render_listing(&state, &uri, &query, heading, None, products).await
}

async fn render_listing(
    state: &AppState,
    uri: &Uri,
    query: &ListingQuery,
    heading: String,
    category: Option<String>,
    products: Result<Vec<Product>, CatalogError>,
) -> Response {
    let settings = ListingSettings::from_query(query);
    let layout = LayoutView::load(state, uri).await;

    let (status, products, error) = match products {
        Ok(products) => (
            StatusCode::OK,
            products.iter().map(ProductView::from).collect(),
            None,
        ),
        Err(e) => {
            tracing::error!(error = %e, path = %uri.path(), "Failed to load products");
            (
                StatusCode::BAD_GATEWAY,
                Vec::new(),
                Some(LOAD_FAILED_MESSAGE.to_string()),
            )
        }
    };

    let template = ProductsIndexTemplate {
        layout,
        heading,
        category,
        products,
        columns: settings.columns,
        sort_choices: settings.sort_choices(),
        per_page_choices: settings.per_page_choices(),
        column_choices: settings.column_choices(uri.path()),
        brand_filters: BRAND_FILTERS
            .iter()
            .map(|&(name, count)| BrandFilterView { name, count })
            .collect(),
        form_action: uri.path().to_string(),
        error,
    };

    (status, template).into_response()
}

/// Query parameters for the product detail page.
#[derive(Debug, Deserialize)]
pub struct ShowQuery {
    pub added: Option<String>,
}

/// Product detail page.
///
/// Unknown or malformed ids render a 404 page; catalog failures render a
/// 502 page with a retry link.
#[instrument(skip(state, uri, query))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    uri: Uri,
    Query(query): Query<ShowQuery>,
) -> Response {
    let result = match id.parse::<ProductId>() {
        Ok(id) => state.catalog().get_product(id).await,
        Err(_) => Err(CatalogError::NotFound(format!("product {id}"))),
    };
    let layout = LayoutView::load(&state, &uri).await;

    match result {
        Ok(product) => ProductShowTemplate {
            layout,
            product: ProductView::from(&product),
            added: query.added.is_some(),
        }
        .into_response(),
        Err(e) if e.is_not_found() => (
            StatusCode::NOT_FOUND,
            ErrorTemplate {
                layout,
                title: "Product not found".to_string(),
                message: "The product you are looking for does not exist.".to_string(),
                retry_href: None,
                back_href: "/products".to_string(),
                back_label: "Back to Products".to_string(),
            },
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, product_id = %id, "Failed to load product");
            (
                StatusCode::BAD_GATEWAY,
                ErrorTemplate {
                    layout,
                    title: "Something went wrong".to_string(),
                    message: "Failed to load product. Please try again later.".to_string(),
                    retry_href: Some(current_path(&uri)),
                    back_href: "/products".to_string(),
                    back_label: "Back to Products".to_string(),
                },
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use quality_bearings_core::Price;

    use super::*;

    fn query(sort: &str, per_page: &str, columns: &str) -> ListingQuery {
        ListingQuery {
            sort: Some(sort.to_string()),
            per_page: Some(per_page.to_string()),
            columns: Some(columns.to_string()),
        }
    }

    #[test]
    fn test_listing_defaults() {
        let settings = ListingSettings::from_query(&ListingQuery::default());
        assert_eq!(settings.sort, "best-selling");
        assert_eq!(settings.per_page, 40);
        assert_eq!(settings.columns, 4);
    }

    #[test]
    fn test_listing_accepts_offered_values() {
        let settings = ListingSettings::from_query(&query("a-z", "12", "3"));
        assert_eq!(
            settings,
            ListingSettings {
                sort: "a-z",
                per_page: 12,
                columns: 3,
            }
        );
    }

    #[test]
    fn test_listing_rejects_unoffered_values() {
        let settings = ListingSettings::from_query(&query("cheapest", "1000", "9"));
        assert_eq!(settings, ListingSettings::default());

        let settings = ListingSettings::from_query(&query("", "abc", "-2"));
        assert_eq!(settings, ListingSettings::default());
    }

    #[test]
    fn test_column_links_keep_other_settings() {
        let settings = ListingSettings::from_query(&query("z-a", "20", "4"));
        let choices = settings.column_choices("/products");

        assert_eq!(choices.len(), 4);
        assert_eq!(choices[0].href, "/products?sort=z-a&per_page=20&columns=2");
        assert!(choices[2].selected);
        assert!(!choices[0].selected);
    }

    #[test]
    fn test_product_view() {
        let product = Product {
            id: ProductId::new(7),
            title: "White Gold Plated Princess".to_string(),
            price: Price::from_cents(999),
            description: String::new(),
            category: "jewelery".to_string(),
            image: "https://fakestoreapi.com/img/71YaRz.jpg".to_string(),
            rating: Some(Rating {
                rate: 3.04,
                count: 400,
            }),
        };

        let view = ProductView::from(&product);
        assert_eq!(view.id, 7);
        assert_eq!(view.price, "$9.99");

        let rating = view.rating.unwrap_or_else(|| panic!("rating expected"));
        assert_eq!(rating.stars, "★★★☆☆");
        assert_eq!(rating.rate, "3.0");
    }

    #[test]
    fn test_departments_have_unique_slugs() {
        let mut slugs: Vec<_> = DEPARTMENTS.iter().map(|(slug, _)| *slug).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), DEPARTMENTS.len());
    }
}
