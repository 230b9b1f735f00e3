//! Shopping cart.
//!
//! A cart holds at most one line per product and at most one coupon. Lines
//! keep a snapshot of the product at the time it was added, so a stored
//! cart renders without the catalog.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, Product};
use crate::coupon::{Coupon, CouponError, Discount, validate_coupon};
use crate::types::ProductId;

/// Cart subtotal at which standard shipping becomes free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(200, 0, 0, false, 0);

/// Most units a single line may hold.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Cart mutation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Produto não encontrado: {0}")]
    UnknownProduct(String),
    #[error("Produto esgotado: {0}")]
    OutOfStock(String),
    #[error("Quantidade inválida")]
    InvalidQuantity,
}

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Unit price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// The coupon applied to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub code: String,
    pub discount: Discount,
}

impl From<&Coupon> for AppliedCoupon {
    fn from(coupon: &Coupon) -> Self {
        Self {
            code: coupon.code.to_string(),
            discount: coupon.discount,
        }
    }
}

/// A visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub coupon: Option<AppliedCoupon>,
}

impl Cart {
    /// Add `quantity` of a product, merging with an existing line.
    ///
    /// The line is clamped to [`MAX_LINE_QUANTITY`].
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        if let Some(item) = self.item_mut(product.id.as_str()) {
            item.quantity = item.quantity.saturating_add(quantity).min(MAX_LINE_QUANTITY);
        } else {
            self.items.push(CartItem {
                product: product.clone(),
                quantity: quantity.min(MAX_LINE_QUANTITY),
            });
        }
    }

    /// Look up a product in the catalog and add it.
    ///
    /// # Errors
    ///
    /// Fails for unknown or out-of-stock products, for a zero quantity and
    /// when the line would exceed [`MAX_LINE_QUANTITY`].
    pub fn add_from_catalog(
        &mut self,
        catalog: &Catalog,
        product_id: &str,
        quantity: u32,
    ) -> Result<(), CartError> {
        let current = self.get_item(product_id).map_or(0, |item| item.quantity);
        if quantity == 0 || current.saturating_add(quantity) > MAX_LINE_QUANTITY {
            return Err(CartError::InvalidQuantity);
        }
        let product = catalog
            .by_id(product_id)
            .ok_or_else(|| CartError::UnknownProduct(product_id.to_string()))?;
        if !product.in_stock() {
            return Err(CartError::OutOfStock(product.name.clone()));
        }
        self.add_item(product, quantity);
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: &str) {
        self.items.retain(|item| item.product.id.as_str() != product_id);
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] above [`MAX_LINE_QUANTITY`];
    /// the line is left unchanged.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> Result<(), CartError> {
        if quantity > MAX_LINE_QUANTITY {
            return Err(CartError::InvalidQuantity);
        }
        if quantity == 0 {
            self.remove_item(product_id);
        } else if let Some(item) = self.item_mut(product_id) {
            item.quantity = quantity;
        }
        Ok(())
    }

    /// Increase a line by one, stopping at [`MAX_LINE_QUANTITY`].
    pub fn increment(&mut self, product_id: &str) {
        if let Some(item) = self.item_mut(product_id) {
            item.quantity = item.quantity.saturating_add(1).min(MAX_LINE_QUANTITY);
        }
    }

    /// Decrease a line by one, removing it at quantity 1.
    pub fn decrement(&mut self, product_id: &str) {
        match self.get_item(product_id).map(|item| item.quantity) {
            Some(0 | 1) => self.remove_item(product_id),
            Some(_) => {
                if let Some(item) = self.item_mut(product_id) {
                    item.quantity -= 1;
                }
            }
            None => {}
        }
    }

    /// Empty the cart and drop the coupon.
    pub fn clear(&mut self) {
        self.items.clear();
        self.coupon = None;
    }

    pub fn apply_coupon(&mut self, coupon: &Coupon) {
        self.coupon = Some(coupon.into());
    }

    pub fn remove_coupon(&mut self) {
        self.coupon = None;
    }

    /// Drop the applied coupon if the current subtotal no longer qualifies.
    ///
    /// # Errors
    ///
    /// Returns why the coupon was dropped.
    pub fn recheck_coupon(&mut self) -> Result<(), CouponError> {
        let Some(applied) = &self.coupon else {
            return Ok(());
        };
        if let Err(e) = validate_coupon(&applied.code, self.subtotal()) {
            self.coupon = None;
            return Err(e);
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |total, item| total.saturating_add(item.quantity))
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Coupon discount over the current subtotal.
    #[must_use]
    pub fn discount_total(&self) -> Decimal {
        self.coupon
            .as_ref()
            .map_or(Decimal::ZERO, |c| c.discount.apply_to(self.subtotal()))
    }

    /// Subtotal minus discount, never negative.
    #[must_use]
    pub fn total(&self) -> Decimal {
        (self.subtotal() - self.discount_total()).max(Decimal::ZERO)
    }

    #[must_use]
    pub fn get_item(&self, product_id: &str) -> Option<&CartItem> {
        self.items
            .iter()
            .find(|item| item.product.id.as_str() == product_id)
    }

    fn item_mut(&mut self, product_id: &str) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|item| item.product.id.as_str() == product_id)
    }

    /// Ids of the products in the cart.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.items.iter().map(|item| item.product.id.clone()).collect()
    }

    /// Whether the cart holds `product_id`.
    #[must_use]
    pub fn contains(&self, product_id: &str) -> bool {
        self.get_item(product_id).is_some()
    }
}

/// Progress toward free shipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FreeShippingProgress {
    /// Amount still missing, zero once qualified.
    pub remaining: Decimal,
    /// Percent of the threshold reached, capped at 100.
    pub percent: u32,
    pub qualifies: bool,
}

impl FreeShippingProgress {
    #[must_use]
    pub fn for_subtotal(subtotal: Decimal) -> Self {
        let remaining = (FREE_SHIPPING_THRESHOLD - subtotal).max(Decimal::ZERO);
        let percent = (subtotal * Decimal::ONE_HUNDRED / FREE_SHIPPING_THRESHOLD)
            .round()
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        Self {
            remaining,
            percent: percent.to_u32().unwrap_or(100),
            qualifies: subtotal >= FREE_SHIPPING_THRESHOLD,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{DEFAULT_INSTALLMENTS, installment};

    fn product(catalog: &Catalog, id: &str) -> Product {
        catalog.by_id(id).unwrap().clone()
    }

    #[test]
    fn test_add_merges_lines() {
        let catalog = Catalog::new();
        let mut cart = Cart::default();
        let khamrah = product(&catalog, "7");

        cart.add_item(&khamrah, 1);
        cart.add_item(&khamrah, 2);

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.subtotal(), Decimal::from(807));
    }

    #[test]
    fn test_add_from_catalog_rejects_unknown_and_out_of_stock() {
        let catalog = Catalog::new();
        let mut cart = Cart::default();

        assert_eq!(
            cart.add_from_catalog(&catalog, "999", 1),
            Err(CartError::UnknownProduct("999".into()))
        );
        assert!(matches!(
            cart.add_from_catalog(&catalog, "1", 1),
            Err(CartError::OutOfStock(_))
        ));
        assert_eq!(
            cart.add_from_catalog(&catalog, "7", 0),
            Err(CartError::InvalidQuantity)
        );
        assert!(cart.add_from_catalog(&catalog, "7", 1).is_ok());
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let catalog = Catalog::new();
        let mut cart = Cart::default();
        cart.add_item(&product(&catalog, "7"), 2);

        cart.update_quantity("7", 5).unwrap();
        assert_eq!(cart.get_item("7").unwrap().quantity, 5);

        cart.update_quantity("7", 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_line_quantity_is_capped() {
        let catalog = Catalog::new();
        let mut cart = Cart::default();

        assert_eq!(
            cart.add_from_catalog(&catalog, "7", u32::MAX),
            Err(CartError::InvalidQuantity)
        );
        assert!(cart.is_empty());

        cart.add_from_catalog(&catalog, "7", MAX_LINE_QUANTITY).unwrap();
        assert_eq!(
            cart.add_from_catalog(&catalog, "7", 1),
            Err(CartError::InvalidQuantity)
        );
        assert_eq!(
            cart.update_quantity("7", MAX_LINE_QUANTITY + 1),
            Err(CartError::InvalidQuantity)
        );
        cart.increment("7");
        assert_eq!(cart.get_item("7").unwrap().quantity, MAX_LINE_QUANTITY);

        cart.add_item(&product(&catalog, "8"), u32::MAX);
        assert_eq!(cart.get_item("8").unwrap().quantity, MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_total_items_saturates() {
        let catalog = Catalog::new();
        let mut cart = Cart::default();
        for (id, quantity) in [("7", u32::MAX), ("8", 1)] {
            cart.items.push(CartItem {
                product: product(&catalog, id),
                quantity,
            });
        }
        assert_eq!(cart.total_items(), u32::MAX);
    }

    #[test]
    fn test_increment_and_decrement() {
        let catalog = Catalog::new();
        let mut cart = Cart::default();
        cart.add_item(&product(&catalog, "7"), 1);

        cart.increment("7");
        assert_eq!(cart.get_item("7").unwrap().quantity, 2);

        cart.decrement("7");
        assert_eq!(cart.get_item("7").unwrap().quantity, 1);

        cart.decrement("7");
        assert!(!cart.contains("7"));

        // Missing lines are ignored.
        cart.increment("7");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_percent_coupon_total() {
        let catalog = Catalog::new();
        let mut cart = Cart::default();
        cart.add_item(&product(&catalog, "7"), 2);
        let coupon = validate_coupon("BEMVINDO10", cart.subtotal()).unwrap();
        cart.apply_coupon(coupon);

        assert_eq!(cart.subtotal(), Decimal::from(538));
        assert_eq!(cart.discount_total(), Decimal::new(538, 1));
        assert_eq!(cart.total(), Decimal::new(4842, 1));
    }

    #[test]
    fn test_first_purchase_coupon_worked_example() {
        let catalog = Catalog::new();
        let mut cart = Cart::default();
        let ana = product(&catalog, "15");
        assert_eq!(ana.price, Decimal::from(279));
        cart.add_item(&ana, 2);

        let coupon = validate_coupon("PRIMEIRA20", cart.subtotal()).unwrap();
        cart.apply_coupon(coupon);

        assert_eq!(cart.subtotal(), Decimal::from(558));
        assert_eq!(cart.discount_total(), Decimal::new(1116, 1));
        assert_eq!(cart.total(), Decimal::new(4464, 1));
        assert_eq!(installment(cart.total(), DEFAULT_INSTALLMENTS), Decimal::from(38));
    }

    #[test]
    fn test_removing_coupon_restores_total() {
        let catalog = Catalog::new();
        let mut cart = Cart::default();
        cart.add_item(&product(&catalog, "7"), 2);
        let before = cart.total();

        cart.apply_coupon(validate_coupon("BEMVINDO10", cart.subtotal()).unwrap());
        assert!(cart.total() < before);

        cart.remove_coupon();
        assert_eq!(cart.coupon, None);
        assert_eq!(cart.total(), before);
    }

    #[test]
    fn test_recheck_drops_coupon_below_minimum() {
        let catalog = Catalog::new();
        let mut cart = Cart::default();
        cart.add_item(&product(&catalog, "7"), 2);
        cart.apply_coupon(validate_coupon("PRIMEIRA20", cart.subtotal()).unwrap());
        assert_eq!(cart.recheck_coupon(), Ok(()));
        assert!(cart.coupon.is_some());

        cart.decrement("7");
        assert_eq!(
            cart.recheck_coupon(),
            Err(CouponError::MinimumNotMet {
                minimum: Decimal::from(300)
            })
        );
        assert_eq!(cart.coupon, None);
        assert_eq!(cart.total(), Decimal::from(269));

        // No coupon, nothing to check.
        assert_eq!(cart.recheck_coupon(), Ok(()));
    }

    #[test]
    fn test_total_never_negative() {
        let catalog = Catalog::new();
        let mut cart = Cart::default();
        cart.add_item(&product(&catalog, "7"), 1);
        cart.coupon = Some(AppliedCoupon {
            code: "BIG".into(),
            discount: Discount::Amount(Decimal::from(1000)),
        });
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_clear_drops_coupon() {
        let catalog = Catalog::new();
        let mut cart = Cart::default();
        cart.add_item(&product(&catalog, "7"), 1);
        cart.apply_coupon(validate_coupon("PIX5", Decimal::ZERO).unwrap());
        cart.clear();
        assert_eq!(cart, Cart::default());
    }

    #[test]
    fn test_cart_survives_json() {
        let catalog = Catalog::new();
        let mut cart = Cart::default();
        cart.add_item(&product(&catalog, "8"), 1);
        cart.apply_coupon(validate_coupon("PIX5", Decimal::ZERO).unwrap());

        let json = serde_json::to_string(&cart).unwrap();
        let back: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_free_shipping_progress() {
        let halfway = FreeShippingProgress::for_subtotal(Decimal::from(100));
        assert_eq!(halfway.remaining, Decimal::from(100));
        assert_eq!(halfway.percent, 50);
        assert!(!halfway.qualifies);

        let over = FreeShippingProgress::for_subtotal(Decimal::from(538));
        assert_eq!(over.remaining, Decimal::ZERO);
        assert_eq!(over.percent, 100);
        assert!(over.qualifies);
    }
}
