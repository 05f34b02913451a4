//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use super::layout::LayoutView;
use super::products::{LOAD_FAILED_MESSAGE, ProductView};
use crate::filters;
use crate::state::AppState;

/// Number of products shown on the home page.
const FEATURED_PRODUCT_COUNT: usize = 8;

/// A selling point in the features band.
#[derive(Clone)]
pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
}

const FEATURES: &[Feature] = &[
    Feature {
        title: "Super-Fast, Hassle Free Delivery",
        description: "Deliveries within 1-3 days, with all sea & duties paid within Canada. \
                      The price you see online is the price you pay.",
    },
    Feature {
        title: "Unrivalled Customer Service",
        description: "With over 75 years industry experience, you can trust Quality Bearings Online.",
    },
    Feature {
        title: "Multi-Award-Winning",
        description: "Winners Of The Queen's Award For Enterprise For International Trade 2023 \
                      | Lloyds Bank Employer Of The Year.",
    },
    Feature {
        title: "World Renowned Brands",
        description: "Quality verified products from the world's leading brands such as SKF, \
                      Kluber, Timken, FAG and many more.",
    },
];

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: LayoutView,
    pub featured: Vec<ProductView>,
    pub features: &'static [Feature],
    pub error: Option<String>,
}

/// Display the home page.
#[instrument(skip(state, uri))]
pub async fn home(State(state): State<AppState>, uri: Uri) -> Response {
    let products = state.catalog().list_products().await;
    let layout = LayoutView::load(&state, &uri).await;

    let (status, featured, error) = match products {
        Ok(products) => (
            StatusCode::OK,
            products
                .iter()
                .take(FEATURED_PRODUCT_COUNT)
                .map(ProductView::from)
                .collect(),
            None,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load featured products");
            (
                StatusCode::BAD_GATEWAY,
                Vec::new(),
                Some(LOAD_FAILED_MESSAGE.to_string()),
            )
        }
    };

    (
        status,
        HomeTemplate {
            layout,
            featured,
            features: FEATURES,
            error,
        },
    )
        .into_response()
}
