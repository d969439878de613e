//! Integration tests for Rocket Shoes.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocket-shoes-integration-tests
//! ```
//!
//! No external services are needed: the stock API is served by a `wiremock`
//! server and the cart is persisted to a temporary directory.
//!
//! # Test Categories
//!
//! - `stock_client` - HTTP client behavior against the stock API
//! - `cart_flow` - `CartStore` end to end with real HTTP and file storage

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use rocket_shoes_storefront::config::StockApiConfig;
use rocket_shoes_storefront::{CartStore, CollectingSink, FileStore, StockClient};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Cart store wired to real HTTP and file storage.
pub type TestCartStore = CartStore<StockClient, FileStore, Arc<CollectingSink>>;

/// Storage key used by the tests.
pub const CART_KEY: &str = "@RocketShoes:cart";

/// Serve `GET /stock/{id}` with the given amount.
pub async fn mount_stock(server: &MockServer, id: i32, amount: i64) {
    Mock::given(method("GET"))
        .and(path(format!("/stock/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": id, "amount": amount })))
        .mount(server)
        .await;
}

/// Serve `GET /stock/{id}` as a bare `{ "amount": ... }` body.
pub async fn mount_stock_amount_only(server: &MockServer, id: i32, amount: i64) {
    Mock::given(method("GET"))
        .and(path(format!("/stock/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "amount": amount })))
        .mount(server)
        .await;
}

/// Serve `GET /products/{id}` with a sneaker named after the id.
pub async fn mount_product(server: &MockServer, id: i32, price: f64) {
    Mock::given(method("GET"))
        .and(path(format!("/products/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "title": format!("Tênis {id}"),
            "price": price,
            "image": format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis{id}.jpg"),
        })))
        .mount(server)
        .await;
}

/// Stock client pointed at `server`.
///
/// # Panics
///
/// Panics if the mock server URI is not a valid base URL.
#[must_use]
pub fn stock_client(server: &MockServer) -> StockClient {
    let config = StockApiConfig::new(&server.uri()).expect("mock server URI is a valid URL");
    StockClient::new(&config).expect("Failed to create stock client")
}

/// Open a cart store persisting into `dir`.
///
/// # Panics
///
/// Panics if the storage directory cannot be created.
#[must_use]
pub fn open_cart(
    server: &MockServer,
    dir: &std::path::Path,
) -> (TestCartStore, Arc<CollectingSink>) {
    let storage = FileStore::open(dir).expect("Failed to open cart storage");
    let sink = Arc::new(CollectingSink::new());
    let store = CartStore::load(stock_client(server), storage, Arc::clone(&sink), CART_KEY);
    (store, sink)
}
