//! Cart error handling with Sentry integration.
//!
//! Cart operations fail internally with a typed [`CartError`], but no error
//! ever crosses the [`CartStore`](crate::cart_store::CartStore) boundary. Each
//! failure is reported (logged, and captured to Sentry when it is a fault
//! rather than a shopper-level outcome) and then converted into the
//! [`Notice`] the shopper sees.

use rocket_shoes_core::{CartInvariantError, ProductId};
use thiserror::Error;

use crate::notify::Notice;
use crate::stock::StockError;
use crate::storage::StorageError;

/// The cart operation an error happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOperation {
    Add,
    Remove,
    Update,
}

impl CartOperation {
    /// Notice for a failure that has no more specific message.
    #[must_use]
    pub const fn failure_notice(self) -> Notice {
        match self {
            Self::Add => Notice::AddFailed,
            Self::Remove => Notice::RemoveFailed,
            Self::Update => Notice::UpdateFailed,
        }
    }
}

impl std::fmt::Display for CartOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Remove => write!(f, "remove"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// Why a cart operation did not commit.
#[derive(Debug, Error)]
pub enum CartError {
    /// Stock cannot cover the requested quantity.
    #[error("Out of stock: requested {requested}, available {available}")]
    OutOfStock { requested: u32, available: i64 },

    /// The product has no line item.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// The requested amount does not fit a line item quantity.
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    /// The new cart would break an invariant.
    #[error("Cart invariant violated: {0}")]
    Invariant(#[from] CartInvariantError),

    /// Stock API lookup failed.
    #[error("Stock error: {0}")]
    Stock(#[from] StockError),

    /// Persisting the cart failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serializing the cart failed.
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CartError {
    /// The notice shown to the shopper when `operation` fails with this error.
    #[must_use]
    pub const fn notice(&self, operation: CartOperation) -> Notice {
        match self {
            Self::OutOfStock { .. } => Notice::OutOfStock,
            _ => operation.failure_notice(),
        }
    }

    /// Whether this is a fault worth tracking, as opposed to an expected
    /// shopper-level outcome.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(
            self,
            Self::Stock(_) | Self::Storage(_) | Self::Encode(_) | Self::Invariant(_)
        )
    }

    /// Log this error and capture faults to Sentry.
    pub fn report(&self, operation: CartOperation, product_id: ProductId) {
        if self.is_fault() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                operation = %operation,
                product_id = %product_id,
                sentry_event_id = %event_id,
                "Cart operation failed"
            );
        } else {
            tracing::warn!(
                error = %self,
                operation = %operation,
                product_id = %product_id,
                "Cart operation rejected"
            );
        }
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
