//! Catalog types returned by the stock API.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Product metadata as served by `GET /products/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Display title. Some catalog feeds call this `name`.
    #[serde(alias = "name")]
    pub title: String,
    pub price: Price,
    /// Image URL.
    pub image: String,
}

/// Available stock as served by `GET /stock/{id}`.
///
/// Only `amount` is guaranteed; some stock feeds omit the id.
///
/// `amount` is signed: the stock service may report oversold products as
/// negative stock, and nothing here should reject that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub amount: i64,
}

impl Stock {
    /// Whether at least `quantity` units can be sold.
    #[must_use]
    pub fn covers(&self, quantity: u32) -> bool {
        self.amount >= i64::from(quantity)
    }
}
