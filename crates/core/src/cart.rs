//! Cart, saved-for-later and wishlist lists.
//!
//! A shopper's three item lists live together in one [`CartDocument`]. Every
//! operation mutates the document in memory; the caller persists all three
//! lists back as whole-list replacements.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ProductId;

/// Errors from cart operations that target a specific row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The product is not in the list the operation reads from.
    #[error("item {0} is not in the {1}")]
    ItemNotFound(ProductId, ListKind),
}

/// Which of the three lists an operation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Cart,
    Saved,
    Wishlist,
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Cart => "cart",
            Self::Saved => "saved items",
            Self::Wishlist => "wishlist",
        })
    }
}

/// Product snapshot taken when an item enters a list.
///
/// Name, price and image are copied from the catalog at that moment and are
/// not refreshed if the catalog changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
}

/// A row in the cart or wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub quantity: u32,
}

impl CartItem {
    fn from_snapshot(item: ItemSnapshot, quantity: u32) -> Self {
        Self {
            id: item.id,
            name: item.name,
            price: item.price,
            image: item.image,
            quantity,
        }
    }

    fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            image: self.image.clone(),
        }
    }

    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A cart row parked for later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedItem {
    #[serde(flatten)]
    pub item: CartItem,
    pub saved_at: DateTime<Utc>,
}

/// The three item lists of one shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartDocument {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub saved_items: Vec<SavedItem>,
    #[serde(default)]
    pub wishlist: Vec<CartItem>,
}

impl CartDocument {
    /// Add one unit of a product.
    ///
    /// An existing row is incremented instead of duplicated.
    pub fn add_to_cart(&mut self, item: ItemSnapshot) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(1);
        } else {
            self.items.push(CartItem::from_snapshot(item, 1));
        }
    }

    /// Drop a cart row. Returns whether a row was removed.
    pub fn remove_from_cart(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    /// Set the quantity of a cart row; anything below one removes the row.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the product is not in the cart.
    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) -> Result<(), CartError> {
        if quantity < 1 {
            if !self.remove_from_cart(id) {
                return Err(CartError::ItemNotFound(id, ListKind::Cart));
            }
            return Ok(());
        }

        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(CartError::ItemNotFound(id, ListKind::Cart))?;
        item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        Ok(())
    }

    /// Empty the cart. Saved items and the wishlist are untouched.
    pub fn clear_cart(&mut self) {
        self.items.clear();
    }

    /// Move a cart row, quantity included, to the saved list.
    ///
    /// Saving a product that is already saved replaces the older entry.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the product is not in the cart.
    pub fn save_for_later(&mut self, id: ProductId, now: DateTime<Utc>) -> Result<(), CartError> {
        let position = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or(CartError::ItemNotFound(id, ListKind::Cart))?;
        let item = self.items.remove(position);

        self.saved_items.retain(|s| s.item.id != id);
        self.saved_items.push(SavedItem {
            item,
            saved_at: now,
        });
        Ok(())
    }

    /// Move a saved row back into the cart with add-to-cart semantics.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the product is not saved.
    pub fn move_to_cart(&mut self, id: ProductId) -> Result<(), CartError> {
        let position = self
            .saved_items
            .iter()
            .position(|s| s.item.id == id)
            .ok_or(CartError::ItemNotFound(id, ListKind::Saved))?;
        let saved = self.saved_items.remove(position);
        self.add_to_cart(saved.item.snapshot());
        Ok(())
    }

    /// Add a product to the wishlist unless it is already there.
    ///
    /// Returns whether the wishlist changed.
    pub fn add_to_wishlist(&mut self, item: ItemSnapshot) -> bool {
        if self.wishlist.iter().any(|w| w.id == item.id) {
            return false;
        }
        self.wishlist.push(CartItem::from_snapshot(item, 1));
        true
    }

    /// Drop a wishlist row. Returns whether a row was removed.
    pub fn remove_from_wishlist(&mut self, id: ProductId) -> bool {
        let before = self.wishlist.len();
        self.wishlist.retain(|w| w.id != id);
        self.wishlist.len() != before
    }

    /// Take a row out of the cart and put the product on the wishlist.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the product is not in the cart.
    pub fn move_to_wishlist(&mut self, id: ProductId) -> Result<(), CartError> {
        let item = self
            .items
            .iter()
            .find(|i| i.id == id)
            .map(CartItem::snapshot)
            .ok_or(CartError::ItemNotFound(id, ListKind::Cart))?;
        self.remove_from_cart(id);
        self.add_to_wishlist(item);
        Ok(())
    }

    /// Number of units in the cart.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of line totals in the cart.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn snapshot(id: i32, price: &str) -> ItemSnapshot {
        ItemSnapshot {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: price.parse().unwrap(),
            image: format!("https://cdn.example.com/{id}.jpg"),
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_add_existing_item_increments_quantity() {
        let mut doc = CartDocument::default();
        doc.add_to_cart(snapshot(1, "10.00"));
        doc.add_to_cart(snapshot(1, "10.00"));
        doc.add_to_cart(snapshot(2, "5.00"));

        assert_eq!(doc.items.len(), 2);
        assert_eq!(doc.items[0].quantity, 2);
        assert_eq!(doc.items[1].quantity, 1);
        assert_eq!(doc.total_items(), 3);
        assert_eq!(doc.total_price(), "25.00".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_update_quantity_below_one_removes_row() {
        let mut doc = CartDocument::default();
        doc.add_to_cart(snapshot(1, "3.50"));
        doc.update_quantity(ProductId::new(1), 4).unwrap();
        assert_eq!(doc.items[0].quantity, 4);

        doc.update_quantity(ProductId::new(1), 0).unwrap();
        assert!(doc.items.is_empty());
    }

    #[test]
    fn test_update_quantity_negative_removes_row() {
        let mut doc = CartDocument::default();
        doc.add_to_cart(snapshot(1, "3.50"));
        doc.update_quantity(ProductId::new(1), -3).unwrap();
        assert!(doc.items.is_empty());
    }

    #[test]
    fn test_update_quantity_missing_item() {
        let mut doc = CartDocument::default();
        let err = doc.update_quantity(ProductId::new(9), 2).unwrap_err();
        assert_eq!(err, CartError::ItemNotFound(ProductId::new(9), ListKind::Cart));
    }

    #[test]
    fn test_remove_absent_item_is_noop() {
        let mut doc = CartDocument::default();
        doc.add_to_cart(snapshot(1, "1.00"));
        assert!(!doc.remove_from_cart(ProductId::new(2)));
        assert!(doc.remove_from_cart(ProductId::new(1)));
        assert!(doc.items.is_empty());
    }

    #[test]
    fn test_clear_cart_keeps_other_lists() {
        let mut doc = CartDocument::default();
        doc.add_to_cart(snapshot(1, "1.00"));
        doc.add_to_cart(snapshot(2, "1.00"));
        doc.save_for_later(ProductId::new(2), at(0)).unwrap();
        doc.add_to_wishlist(snapshot(3, "1.00"));

        doc.clear_cart();
        assert!(doc.items.is_empty());
        assert_eq!(doc.saved_items.len(), 1);
        assert_eq!(doc.wishlist.len(), 1);
    }

    #[test]
    fn test_save_for_later_and_back() {
        let mut doc = CartDocument::default();
        doc.add_to_cart(snapshot(1, "2.00"));
        doc.add_to_cart(snapshot(1, "2.00"));

        doc.save_for_later(ProductId::new(1), at(100)).unwrap();
        assert!(doc.items.is_empty());
        assert_eq!(doc.saved_items[0].saved_at, at(100));
        assert_eq!(doc.saved_items[0].item.quantity, 2);
        assert_eq!(doc.total_items(), 0);

        doc.move_to_cart(ProductId::new(1)).unwrap();
        assert!(doc.saved_items.is_empty());
        assert_eq!(doc.items.len(), 1);
        assert_eq!(doc.items[0].quantity, 1);
    }

    #[test]
    fn test_move_to_cart_increments_existing_row() {
        let mut doc = CartDocument::default();
        doc.add_to_cart(snapshot(1, "2.00"));
        doc.save_for_later(ProductId::new(1), at(1)).unwrap();
        doc.add_to_cart(snapshot(1, "2.00"));

        doc.move_to_cart(ProductId::new(1)).unwrap();
        assert_eq!(doc.items.len(), 1);
        assert_eq!(doc.items[0].quantity, 2);
    }

    #[test]
    fn test_resaving_replaces_saved_entry() {
        let mut doc = CartDocument::default();
        doc.add_to_cart(snapshot(1, "2.00"));
        doc.save_for_later(ProductId::new(1), at(1)).unwrap();
        doc.add_to_cart(snapshot(1, "2.00"));
        doc.save_for_later(ProductId::new(1), at(2)).unwrap();

        assert_eq!(doc.saved_items.len(), 1);
        assert_eq!(doc.saved_items[0].saved_at, at(2));
    }

    #[test]
    fn test_move_to_cart_missing() {
        let mut doc = CartDocument::default();
        assert!(matches!(
            doc.move_to_cart(ProductId::new(4)),
            Err(CartError::ItemNotFound(_, ListKind::Saved))
        ));
    }

    #[test]
    fn test_wishlist_has_no_duplicates() {
        let mut doc = CartDocument::default();
        assert!(doc.add_to_wishlist(snapshot(5, "9.99")));
        assert!(!doc.add_to_wishlist(snapshot(5, "9.99")));
        assert_eq!(doc.wishlist.len(), 1);
        assert_eq!(doc.wishlist[0].quantity, 1);

        assert!(doc.remove_from_wishlist(ProductId::new(5)));
        assert!(!doc.remove_from_wishlist(ProductId::new(5)));
    }

    #[test]
    fn test_move_to_wishlist() {
        let mut doc = CartDocument::default();
        doc.add_to_cart(snapshot(7, "4.00"));
        doc.add_to_cart(snapshot(7, "4.00"));

        doc.move_to_wishlist(ProductId::new(7)).unwrap();
        assert!(doc.items.is_empty());
        assert_eq!(doc.wishlist.len(), 1);
        assert_eq!(doc.wishlist[0].quantity, 1);

        assert!(doc.move_to_wishlist(ProductId::new(7)).is_err());
    }

    #[test]
    fn test_saved_item_serializes_flat() {
        let mut doc = CartDocument::default();
        doc.add_to_cart(snapshot(1, "2.00"));
        doc.save_for_later(ProductId::new(1), at(0)).unwrap();

        let value = serde_json::to_value(&doc.saved_items[0]).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["quantity"], 1);
        assert!(value.get("saved_at").is_some());
    }

    #[test]
    fn test_missing_lists_deserialize_empty() {
        let doc: CartDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc, CartDocument::default());
    }
}
