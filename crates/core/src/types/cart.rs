//! The shopping cart and its line items.
//!
//! A [`Cart`] is an ordered list of [`LineItem`]s, kept in the order products
//! were first added. Two invariants hold for every `Cart` value:
//!
//! - at most one line item per [`ProductId`]
//! - every line item has `amount >= 1`
//!
//! Mutations never happen in place. Each one builds a new `Cart`, so a caller
//! can persist the result first and only then swap it in, leaving the old
//! cart untouched if persisting fails.
//!
//! The serialized form is a plain JSON array of line items. Deserialization
//! goes through [`Cart::from_items`], so a stored payload that breaks either
//! invariant is rejected instead of silently loaded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// Errors raised when an operation would break a cart invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CartInvariantError {
    /// The product already has a line item.
    #[error("product {0} is already in the cart")]
    DuplicateProduct(ProductId),

    /// Line items must have an amount of at least one.
    #[error("product {0} has a non-positive amount")]
    NonPositiveAmount(ProductId),

    /// The product has no line item.
    #[error("product {0} is not in the cart")]
    MissingProduct(ProductId),
}

/// One product-and-quantity entry in the cart.
///
/// Product metadata is copied from the stock API when the item is added and is
/// not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub image: String,
    pub amount: u32,
}

impl LineItem {
    /// Create a line item with a single unit of `product`.
    #[must_use]
    pub fn new(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            amount: 1,
        }
    }

    /// Price of this line (`price * amount`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.amount)
    }
}

/// Ordered collection of line items for one shopper session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from line items, checking both invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if a product appears twice or any amount is zero.
    pub fn from_items(items: Vec<LineItem>) -> Result<Self, CartInvariantError> {
        for (index, item) in items.iter().enumerate() {
            if item.amount == 0 {
                return Err(CartInvariantError::NonPositiveAmount(item.id));
            }
            if items.iter().take(index).any(|earlier| earlier.id == item.id) {
                return Err(CartInvariantError::DuplicateProduct(item.id));
            }
        }
        Ok(Self { items })
    }

    /// Iterate over line items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line item for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether the product has a line item.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Total number of units across all line items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// A copy of this cart with `item` appended.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is already in the cart or the item has
    /// a zero amount.
    pub fn with_item(&self, item: LineItem) -> Result<Self, CartInvariantError> {
        if item.amount == 0 {
            return Err(CartInvariantError::NonPositiveAmount(item.id));
        }
        if self.contains(item.id) {
            return Err(CartInvariantError::DuplicateProduct(item.id));
        }
        let mut items = self.items.clone();
        items.push(item);
        Ok(Self { items })
    }

    /// A copy of this cart with the product's amount set to `amount`.
    ///
    /// The line item keeps its position.
    ///
    /// # Errors
    ///
    /// Returns an error if `amount` is zero or the product is not in the cart.
    pub fn with_amount(&self, id: ProductId, amount: u32) -> Result<Self, CartInvariantError> {
        if amount == 0 {
            return Err(CartInvariantError::NonPositiveAmount(id));
        }
        let mut items = self.items.clone();
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(CartInvariantError::MissingProduct(id))?;
        item.amount = amount;
        Ok(Self { items })
    }

    /// A copy of this cart without the product's line item.
    ///
    /// Remaining items keep their relative order.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not in the cart.
    pub fn without(&self, id: ProductId) -> Result<Self, CartInvariantError> {
        let position = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(CartInvariantError::MissingProduct(id))?;
        let mut items = self.items.clone();
        items.remove(position);
        Ok(Self { items })
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = CartInvariantError;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i32, amount: u32) -> LineItem {
        LineItem {
            id: ProductId::new(id),
            title: format!("Shoe {id}"),
            price: Price::from_cents(10_000 + i64::from(id)),
            image: format!("https://cdn.example/shoes/{id}.jpg"),
            amount,
        }
    }

    fn ids(cart: &Cart) -> Vec<i32> {
        cart.iter().map(|item| item.id.as_i32()).collect()
    }

    #[test]
    fn test_from_items_rejects_duplicates() {
        let result = Cart::from_items(vec![item(1, 1), item(2, 1), item(1, 3)]);
        assert_eq!(
            result,
            Err(CartInvariantError::DuplicateProduct(ProductId::new(1)))
        );
    }

    #[test]
    fn test_from_items_rejects_zero_amount() {
        let result = Cart::from_items(vec![item(1, 0)]);
        assert_eq!(
            result,
            Err(CartInvariantError::NonPositiveAmount(ProductId::new(1)))
        );
    }

    #[test]
    fn test_with_item_appends_at_end() {
        let cart = Cart::from_items(vec![item(3, 1)]).unwrap();
        let cart = cart.with_item(item(1, 1)).unwrap();
        assert_eq!(ids(&cart), vec![3, 1]);
    }

    #[test]
    fn test_with_item_rejects_existing_product() {
        let cart = Cart::from_items(vec![item(3, 1)]).unwrap();
        assert!(cart.with_item(item(3, 1)).is_err());
    }

    #[test]
    fn test_with_amount_keeps_position() {
        let cart = Cart::from_items(vec![item(1, 1), item(2, 1), item(3, 1)]).unwrap();
        let updated = cart.with_amount(ProductId::new(2), 5).unwrap();

        assert_eq!(ids(&updated), vec![1, 2, 3]);
        assert_eq!(updated.get(ProductId::new(2)).unwrap().amount, 5);
        // original is untouched
        assert_eq!(cart.get(ProductId::new(2)).unwrap().amount, 1);
    }

    #[test]
    fn test_with_amount_missing_product() {
        let cart = Cart::new();
        assert_eq!(
            cart.with_amount(ProductId::new(9), 2),
            Err(CartInvariantError::MissingProduct(ProductId::new(9)))
        );
    }

    #[test]
    fn test_without_preserves_order() {
        let cart = Cart::from_items(vec![item(1, 1), item(2, 4), item(3, 1)]).unwrap();
        let cart = cart.without(ProductId::new(1)).unwrap();
        assert_eq!(ids(&cart), vec![2, 3]);
        assert_eq!(cart.get(ProductId::new(2)).unwrap().amount, 4);
    }

    #[test]
    fn test_without_missing_product() {
        let cart = Cart::from_items(vec![item(1, 1)]).unwrap();
        assert!(cart.without(ProductId::new(2)).is_err());
    }

    #[test]
    fn test_totals() {
        let cart = Cart::from_items(vec![
            LineItem {
                price: Price::from_cents(17990),
                ..item(1, 2)
            },
            LineItem {
                price: Price::from_cents(13990),
                ..item(2, 1)
            },
        ])
        .unwrap();

        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal(), Price::from_cents(49970));
        assert_eq!(cart.subtotal().to_string(), "$499.70");
    }

    #[test]
    fn test_serde_round_trip() {
        let cart = Cart::from_items(vec![item(10, 2), item(20, 1)]).unwrap();
        let json = serde_json::to_string(&cart).unwrap();
        let decoded: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, cart);
    }

    #[test]
    fn test_serialized_shape() {
        let cart = Cart::from_items(vec![LineItem {
            id: ProductId::new(1),
            title: "Tênis de Caminhada Leve Confortável".to_string(),
            price: Price::from_cents(17990),
            image: "https://cdn.example/1.jpg".to_string(),
            amount: 2,
        }])
        .unwrap();

        let value = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{
                "id": 1,
                "title": "Tênis de Caminhada Leve Confortável",
                "price": 179.9,
                "image": "https://cdn.example/1.jpg",
                "amount": 2
            }])
        );
    }

    #[test]
    fn test_deserialize_rejects_duplicate_ids() {
        let json = r#"[
            {"id": 1, "title": "a", "price": 1.0, "image": "", "amount": 1},
            {"id": 1, "title": "a", "price": 1.0, "image": "", "amount": 2}
        ]"#;
        assert!(serde_json::from_str::<Cart>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_negative_amount() {
        let json = r#"[{"id": 1, "title": "a", "price": 1.0, "image": "", "amount": -1}]"#;
        assert!(serde_json::from_str::<Cart>(json).is_err());
    }
}
