//! Quality Bearings CLI - catalog browsing and cart management.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! qb-cli categories
//! qb-cli products --category electronics
//! qb-cli product 3
//!
//! # Manage the cart the storefront serves
//! qb-cli cart add 3 --quantity 2
//! qb-cli cart update 3 5
//! qb-cli cart remove 3
//! qb-cli cart show
//! qb-cli cart clear
//! ```
//!
//! # Commands
//!
//! - `categories` - List catalog categories
//! - `products` - List products, optionally in one category
//! - `product` - Show one product
//! - `cart` - Inspect or change the cart slot

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use quality_bearings_core::ProductId;
use quality_bearings_storefront::config::DEFAULT_CART_PATH;

mod commands;

#[derive(Parser)]
#[command(name = "qb-cli")]
#[command(author, version, about = "Quality Bearings CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog categories
    Categories,
    /// List products
    Products {
        /// Only list products in this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show a single product
    Product {
        /// Product id
        id: ProductId,
    },
    /// Inspect or change the cart
    Cart {
        /// Cart storage slot shared with the storefront
        #[arg(long, env = "STOREFRONT_CART_PATH", default_value = DEFAULT_CART_PATH)]
        cart_path: PathBuf,

        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Add a product, fetching its details from the catalog
    Add {
        /// Product id
        id: ProductId,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity; zero or less removes it
    Update {
        /// Product id
        id: ProductId,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Product id
        id: ProductId,
    },
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), commands::CommandError> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Categories => commands::catalog::categories().await?,
        Commands::Products { category } => {
            commands::catalog::products(category.as_deref()).await?;
        }
        Commands::Product { id } => commands::catalog::product(id).await?,
        Commands::Cart { cart_path, action } => match action {
            CartAction::Show => commands::cart::show(&cart_path),
            CartAction::Add { id, quantity } => {
                commands::cart::add(&cart_path, id, quantity).await?;
            }
            CartAction::Update { id, quantity } => {
                commands::cart::update(&cart_path, id, quantity)?;
            }
            CartAction::Remove { id } => commands::cart::remove(&cart_path, id)?,
            CartAction::Clear => commands::cart::clear(&cart_path)?,
        },
    }
    Ok(())
}
