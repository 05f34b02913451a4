//! Errors returned by the cart form and JSON handlers.
//!
//! Page handlers render their own error pages from [`CatalogError`]. Handlers
//! that answer a form post return [`AppError`], which reports upstream
//! failures to Sentry and turns into a plain-text response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::catalog::CatalogError;

/// Failure of a cart request.
#[derive(Debug, Error)]
pub enum AppError {
    /// The product behind the request could not be fetched.
    #[error("catalog request failed: {0}")]
    Catalog(#[from] CatalogError),

    /// The submitted form was well-formed but not acceptable.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(CatalogError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Catalog(_) => StatusCode::BAD_GATEWAY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Cart request failed");
        }

        // Upstream details stay in the logs
        let body = match &self {
            Self::Catalog(CatalogError::NotFound(what)) => format!("Not found: {what}"),
            Self::Catalog(_) => "The product catalog is unavailable".to_string(),
            Self::BadRequest(reason) => format!("Bad request: {reason}"),
        };

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Leave a Sentry breadcrumb for a cart change.
///
/// Later error reports then show what the shopper did to the cart first.
pub fn cart_breadcrumb(message: &str, fields: &[(&str, String)]) {
    let data = fields
        .iter()
        .map(|(key, value)| ((*key).to_string(), serde_json::Value::from(value.as_str())))
        .collect();

    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some("cart".to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        data,
        ..Default::default()
    });
}
