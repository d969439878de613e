//! Stock and product lookups against the catalog API.
//!
//! # Architecture
//!
//! - [`StockService`] is the seam the cart store depends on
//! - [`StockClient`] implements it over HTTP with `reqwest`
//! - Product metadata is cached in memory via `moka`; stock never is
//!
//! # API
//!
//! - `GET {base}/stock/{id}` returns `{ "id": 1, "amount": 3 }`
//! - `GET {base}/products/{id}` returns `{ "id": 1, "title": "...", "price": 179.9, "image": "..." }`
//!
//! # Example
//!
//! ```rust,ignore
//! use rocket_shoes_storefront::stock::{StockClient, StockService};
//!
//! let client = StockClient::new(&config.stock)?;
//!
//! let stock = client.stock(ProductId::new(1)).await?;
//! if stock.covers(2) {
//!     let product = client.product(ProductId::new(1)).await?;
//! }
//! ```

mod client;

pub use client::StockClient;

use async_trait::async_trait;
use rocket_shoes_core::{Product, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when talking to the stock API.
#[derive(Debug, Error)]
pub enum StockError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API has no record of the product.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Source of truth for stock levels and product metadata.
#[async_trait]
pub trait StockService: Send + Sync {
    /// Units of `id` currently available.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails for any reason.
    async fn stock(&self, id: ProductId) -> Result<Stock, StockError>;

    /// Metadata (title, price, image) for `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails for any reason.
    async fn product(&self, id: ProductId) -> Result<Product, StockError>;
}

#[async_trait]
impl<T: StockService + ?Sized> StockService for std::sync::Arc<T> {
    async fn stock(&self, id: ProductId) -> Result<Stock, StockError> {
        (**self).stock(id).await
    }

    async fn product(&self, id: ProductId) -> Result<Product, StockError> {
        (**self).product(id).await
    }
}
