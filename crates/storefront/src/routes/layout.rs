//! Data shared by every full page: header navigation, cart badge and the
//! mini-cart drawer.

use axum::http::Uri;

use super::cart::CartView;
use super::products::DEPARTMENTS;
use crate::state::AppState;

/// A header navigation link.
#[derive(Clone)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

/// Layout data rendered by `base.html`.
#[derive(Clone)]
pub struct LayoutView {
    /// Catalog categories for the category menu. Empty if they failed to load.
    pub categories: Vec<String>,
    /// Fixed department links.
    pub departments: Vec<NavLink>,
    /// Units in the cart, for the header badge.
    pub cart_count: u64,
    pub mini_cart_open: bool,
    pub mini_cart: CartView,
    /// Path and query of the current page, used as `return_to` by forms.
    pub current_path: String,
}

impl LayoutView {
    /// Build the layout for the page at `uri`.
    ///
    /// Categories are fetched from the catalog on every page; a failure only
    /// hides the category menu.
    pub async fn load(state: &AppState, uri: &Uri) -> Self {
        let categories = match state.catalog().list_categories().await {
            Ok(categories) => categories,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load categories for header");
                Vec::new()
            }
        };

        let (mini_cart_open, mini_cart) = {
            let store = state.cart();
            (store.is_mini_cart_open(), CartView::from(store.cart()))
        };

        Self {
            categories,
            departments: department_links(),
            cart_count: state.cart_summary().item_count,
            mini_cart_open,
            mini_cart,
            current_path: current_path(uri),
        }
    }
}

fn department_links() -> Vec<NavLink> {
    DEPARTMENTS
        .iter()
        .map(|(slug, label)| NavLink {
            label: (*label).to_string(),
            href: format!("/{slug}"),
        })
        .collect()
}

/// Path and query of `uri`, or `/` if it has none.
pub(crate) fn current_path(uri: &Uri) -> String {
    uri.path_and_query()
        .map_or_else(|| "/".to_string(), ToString::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_current_path_keeps_query() {
        let uri: Uri = "/category/jewelery?columns=3".parse().unwrap();
        assert_eq!(current_path(&uri), "/category/jewelery?columns=3");
    }

    #[test]
    fn test_department_links() {
        let links = department_links();
        assert_eq!(links.len(), DEPARTMENTS.len());
        assert_eq!(links[1].href, "/ball-bearings");
        assert_eq!(links[1].label, "Ball Bearings");
    }
}
