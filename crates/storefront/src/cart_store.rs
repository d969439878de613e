//! Shopper cart state with stock validation and persistence.
//!
//! [`CartStore`] owns the in-memory [`Cart`] and is the only thing allowed to
//! change it. Every mutation follows the same commit order:
//!
//! 1. validate against the stock API
//! 2. build the new cart
//! 3. write it to the [`PersistentStore`]
//! 4. swap it into memory
//!
//! If any step fails the operation is a no-op: the previous cart stays both in
//! memory and in storage, and the shopper gets a [`Notice`](crate::notify::Notice)
//! instead of an error.
//!
//! Mutations hold the cart lock for their whole duration, including the stock
//! API round-trips, so two quick `add_product` calls for the same new product
//! cannot both append a line item.

use std::sync::Arc;

use rocket_shoes_core::{Cart, LineItem, Price, ProductId};
use tokio::sync::Mutex;
use tracing::instrument;

use crate::error::{CartError, CartOperation, Result};
use crate::notify::NotificationSink;
use crate::stock::StockService;
use crate::storage::PersistentStore;
use crate::telemetry::add_breadcrumb;

/// Cart state container for one shopper session.
///
/// Cheap to clone; clones share the same cart.
pub struct CartStore<S, P, N> {
    inner: Arc<CartStoreInner<S, P, N>>,
}

struct CartStoreInner<S, P, N> {
    stock: S,
    storage: P,
    sink: N,
    key: String,
    cart: Mutex<Cart>,
}

impl<S, P, N> Clone for CartStore<S, P, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, P, N> CartStore<S, P, N>
where
    S: StockService,
    P: PersistentStore,
    N: NotificationSink,
{
    /// Create a store, restoring the cart saved under `key`.
    ///
    /// A missing, unreadable, or malformed saved cart yields an empty cart;
    /// the problem is logged and never returned.
    pub fn load(stock: S, storage: P, sink: N, key: impl Into<String>) -> Self {
        let key = key.into();
        let cart = restore_cart(&storage, &key);

        Self {
            inner: Arc::new(CartStoreInner {
                stock,
                storage,
                sink,
                key,
                cart: Mutex::new(cart),
            }),
        }
    }

    /// Snapshot of the current cart.
    pub async fn cart(&self) -> Cart {
        self.inner.cart.lock().await.clone()
    }

    /// Total number of units in the cart.
    pub async fn item_count(&self) -> u64 {
        self.inner.cart.lock().await.item_count()
    }

    /// Sum of all line totals.
    pub async fn subtotal(&self) -> Price {
        self.inner.cart.lock().await.subtotal()
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart is bumped by one through
    /// [`update_product_amount`](Self::update_product_amount) rules. A new
    /// product is appended with amount 1 if stock allows.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) {
        let mut cart = self.inner.cart.lock().await;

        if let Some(existing) = cart.get(product_id) {
            let amount = i64::from(existing.amount) + 1;
            self.update_locked(&mut cart, product_id, amount).await;
            return;
        }

        let outcome = self
            .added(&cart, product_id)
            .await
            .and_then(|next| self.commit(&mut cart, next));

        match outcome {
            Ok(()) => {
                tracing::info!(items = cart.len(), "Added product to cart");
                let id = product_id.to_string();
                add_breadcrumb("cart", "Added product", Some(&[("product_id", id.as_str())]));
            }
            Err(e) => self.fail(&e, CartOperation::Add, product_id),
        }
    }

    /// Remove a product's line item entirely.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) {
        let mut cart = self.inner.cart.lock().await;

        let outcome = cart
            .without(product_id)
            .map_err(|_| CartError::NotInCart(product_id))
            .and_then(|next| self.commit(&mut cart, next));

        match outcome {
            Ok(()) => {
                tracing::info!(items = cart.len(), "Removed product from cart");
                let id = product_id.to_string();
                add_breadcrumb("cart", "Removed product", Some(&[("product_id", id.as_str())]));
            }
            Err(e) => self.fail(&e, CartOperation::Remove, product_id),
        }
    }

    /// Set a product's quantity to exactly `amount`.
    ///
    /// Amounts below 1 are ignored without a notice; use
    /// [`remove_product`](Self::remove_product) to drop a line item.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_product_amount(&self, product_id: ProductId, amount: i64) {
        let mut cart = self.inner.cart.lock().await;
        self.update_locked(&mut cart, product_id, amount).await;
    }

    async fn update_locked(&self, cart: &mut Cart, product_id: ProductId, amount: i64) {
        if amount < 1 {
            tracing::debug!(amount, "Ignoring non-positive amount");
            return;
        }

        let outcome = self
            .updated(cart, product_id, amount)
            .await
            .and_then(|next| self.commit(cart, next));

        match outcome {
            Ok(()) => {
                tracing::info!(amount, "Changed product quantity");
                let (id, amount) = (product_id.to_string(), amount.to_string());
                add_breadcrumb(
                    "cart",
                    "Changed product quantity",
                    Some(&[("product_id", id.as_str()), ("amount", amount.as_str())]),
                );
            }
            Err(e) => self.fail(&e, CartOperation::Update, product_id),
        }
    }

    /// Cart with one unit of a new product appended.
    async fn added(&self, cart: &Cart, product_id: ProductId) -> Result<Cart> {
        let stock = self.inner.stock.stock(product_id).await?;
        if !stock.covers(1) {
            return Err(CartError::OutOfStock {
                requested: 1,
                available: stock.amount,
            });
        }

        let product = self.inner.stock.product(product_id).await?;
        let mut item = LineItem::new(product);
        // the cart is keyed by the id the shopper asked for
        item.id = product_id;

        Ok(cart.with_item(item)?)
    }

    /// Cart with a product's amount changed, if stock covers it.
    async fn updated(&self, cart: &Cart, product_id: ProductId, amount: i64) -> Result<Cart> {
        let requested = u32::try_from(amount).map_err(|_| CartError::InvalidAmount(amount))?;

        if !cart.contains(product_id) {
            return Err(CartError::NotInCart(product_id));
        }

        let stock = self.inner.stock.stock(product_id).await?;
        if !stock.covers(requested) {
            return Err(CartError::OutOfStock {
                requested,
                available: stock.amount,
            });
        }

        Ok(cart.with_amount(product_id, requested)?)
    }

    /// Persist `next`, then make it the current cart.
    fn commit(&self, cart: &mut Cart, next: Cart) -> Result<()> {
        let payload = serde_json::to_string(&next)?;
        self.inner.storage.set(&self.inner.key, &payload)?;
        *cart = next;
        Ok(())
    }

    fn fail(&self, error: &CartError, operation: CartOperation, product_id: ProductId) {
        error.report(operation, product_id);
        self.inner.sink.notify(error.notice(operation));
    }
}

/// Read the saved cart, falling back to empty on any problem.
fn restore_cart<P: PersistentStore>(storage: &P, key: &str) -> Cart {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(e) => {
            tracing::warn!(error = %e, key = %key, "Failed to read saved cart, starting empty");
            return Cart::new();
        }
    };

    match serde_json::from_str::<Cart>(&raw) {
        Ok(cart) => {
            tracing::info!(items = cart.len(), key = %key, "Restored saved cart");
            cart
        }
        Err(e) => {
            tracing::warn!(error = %e, key = %key, "Saved cart is malformed, starting empty");
            Cart::new()
        }
    }
}
