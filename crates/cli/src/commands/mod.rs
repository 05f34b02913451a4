//! CLI command implementations.

pub mod cart;
pub mod catalog;

use std::path::PathBuf;

use quality_bearings_storefront::cart::StorageError;
use quality_bearings_storefront::catalog::CatalogError;
use quality_bearings_storefront::config::ConfigError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog request failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Cart slot could not be written.
    #[error("Cart storage error: {0}")]
    Storage(#[from] StorageError),

    /// A running storefront owns the cart slot.
    #[error(
        "The cart at {} is held by a running storefront; stop it or use the web cart",
        .0.display()
    )]
    CartInUse(PathBuf),
}
