//! Rocket Shoes cart CLI.
//!
//! A thin UI layer over [`CartStore`]: every invocation restores the saved
//! cart, applies at most one operation, and prints the resulting cart plus any
//! notices the operation produced.
//!
//! # Usage
//!
//! ```bash
//! # Show the saved cart
//! rocket-shoes-cart show
//!
//! # Add one unit of product 10
//! rocket-shoes-cart add 10
//!
//! # Set product 10 to three units
//! rocket-shoes-cart update 10 3
//!
//! # Drop product 10 from the cart
//! rocket-shoes-cart remove 10
//! ```
//!
//! Configuration comes from the environment; see [`config`](rocket_shoes_storefront::config).

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use rocket_shoes_core::{Cart, ProductId};
use rocket_shoes_storefront::config::StorefrontConfig;
use rocket_shoes_storefront::{CartStore, CollectingSink, FileStore, StockClient, telemetry};

#[derive(Parser)]
#[command(name = "rocket-shoes-cart")]
#[command(author, version, about = "Rocket Shoes shopping cart")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set a product's quantity
    Update {
        /// Product ID
        product_id: ProductId,

        /// New quantity (values below 1 are ignored)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = telemetry::init_sentry(&config);
    telemetry::init_tracing();

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let stock = StockClient::new(&config.stock)?;
    let storage = FileStore::open(&config.storage.dir)?;
    let sink = Arc::new(CollectingSink::new());
    let store = CartStore::load(stock, storage, Arc::clone(&sink), config.storage.key.clone());

    match cli.command {
        Commands::Show => {}
        Commands::Add { product_id } => store.add_product(product_id).await,
        Commands::Remove { product_id } => store.remove_product(product_id).await,
        Commands::Update { product_id, amount } => {
            store.update_product_amount(product_id, amount).await;
        }
    }

    for notice in sink.drain() {
        eprintln!("! {notice}");
    }
    print_cart(&store.cart().await);

    Ok(())
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }

    for item in cart {
        println!(
            "{:>6}  {:<40}  {:>3} x {:>10} = {:>10}",
            item.id,
            item.title,
            item.amount,
            item.price.to_string(),
            item.line_total().to_string(),
        );
    }
    println!(
        "{} item(s), subtotal {}",
        cart.item_count(),
        cart.subtotal()
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_needs_no_environment() {
        let err = Cli::try_parse_from(["rocket-shoes-cart", "--help"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_update_accepts_negative_amount() {
        let cli = Cli::try_parse_from(["rocket-shoes-cart", "update", "10", "-1"]).unwrap();
        match cli.command {
            Commands::Update { product_id, amount } => {
                assert_eq!(product_id, ProductId::new(10));
                assert_eq!(amount, -1);
            }
            _ => panic!("expected update command"),
        }
    }
}
