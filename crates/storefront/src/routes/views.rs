//! Display data shared by several pages.
//!
//! Money stays as [`Decimal`] and is formatted in templates with the `brl`
//! filter.

use rust_decimal::Decimal;

use essence_arabe_core::account::CustomerOrder;
use essence_arabe_core::cart::FreeShippingProgress;
use essence_arabe_core::checkout::PaymentMethod;
use essence_arabe_core::upsell::{UpsellOffer, UpsellType};
use essence_arabe_core::{Cart, CartItem, Catalog, DEFAULT_INSTALLMENTS, Product, installment};

/// Product card data for listings and shelves.
#[derive(Clone)]
pub struct ProductCard {
    pub id: String,
    pub url: String,
    pub name: String,
    pub brand: String,
    pub audience: &'static str,
    pub size_ml: u32,
    pub inspired_by: Option<String>,
    pub price: Decimal,
    pub installment: Decimal,
    pub rating: String,
    pub reviews_count: u32,
    pub image: String,
    pub in_stock: bool,
    pub is_best_seller: bool,
    pub is_new: bool,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            url: format!("/p/{}", product.slug),
            name: product.name.clone(),
            brand: product.brand.clone(),
            audience: product.audience.label(),
            size_ml: product.size_ml,
            inspired_by: product.inspired_by.clone(),
            price: product.price,
            installment: installment(product.price, DEFAULT_INSTALLMENTS),
            rating: product.rating.to_string().replace('.', ","),
            reviews_count: product.reviews_count,
            image: product.image.clone(),
            in_stock: product.in_stock(),
            is_best_seller: product.is_best_seller,
            is_new: product.is_new,
        }
    }
}

/// Convert a list of catalog products into cards.
pub fn cards<'a>(products: impl IntoIterator<Item = &'a Product>) -> Vec<ProductCard> {
    products.into_iter().map(ProductCard::from).collect()
}

/// Upsell offer data for shelves and banners.
#[derive(Clone)]
pub struct OfferCard {
    pub id: &'static str,
    pub is_bundle: bool,
    pub title: &'static str,
    pub subtitle: Option<&'static str>,
    pub badge: Option<&'static str>,
    pub image: Option<&'static str>,
    pub cta: &'static str,
    pub description: Option<&'static str>,
    pub target_names: Vec<String>,
    pub base: Decimal,
    pub price: Decimal,
    pub savings: Decimal,
    pub has_savings: bool,
}

impl OfferCard {
    #[must_use]
    pub fn new(offer: &UpsellOffer, catalog: &Catalog) -> Self {
        let pricing = offer.pricing(catalog);
        Self {
            id: offer.id,
            is_bundle: offer.kind == UpsellType::Bundle,
            title: offer.title,
            subtitle: offer.subtitle,
            badge: offer.ui.badge,
            image: offer.ui.image,
            cta: offer.ui.cta_text,
            description: offer.ui.description,
            target_names: offer
                .target_ids
                .iter()
                .filter_map(|id| catalog.title_of(id))
                .map(ToString::to_string)
                .collect(),
            base: pricing.base,
            price: pricing.price,
            savings: pricing.savings,
            has_savings: pricing.savings > Decimal::ZERO,
        }
    }

    /// Cards for a list of offers.
    #[must_use]
    pub fn all(offers: &[&UpsellOffer], catalog: &Catalog) -> Vec<Self> {
        offers.iter().map(|offer| Self::new(offer, catalog)).collect()
    }
}

/// One cart line.
#[derive(Clone)]
pub struct CartLineView {
    pub product_id: String,
    pub url: String,
    pub name: String,
    pub brand: String,
    pub size_ml: u32,
    pub image: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product.id.to_string(),
            url: format!("/p/{}", item.product.slug),
            name: item.product.name.clone(),
            brand: item.product.brand.clone(),
            size_ml: item.product.size_ml,
            image: item.product.image.clone(),
            quantity: item.quantity,
            unit_price: item.product.price,
            line_total: item.line_total(),
        }
    }
}

/// Applied coupon summary.
#[derive(Clone)]
pub struct CouponView {
    pub code: String,
    pub label: String,
}

/// Cart contents and totals.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub has_discount: bool,
    pub total: Decimal,
    pub installment: Decimal,
    pub coupon: Option<CouponView>,
    pub shipping: FreeShippingProgress,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let discount = cart.discount_total();
        Self {
            lines: cart.items.iter().map(CartLineView::from).collect(),
            item_count: cart.total_items(),
            subtotal: cart.subtotal(),
            discount,
            has_discount: discount > Decimal::ZERO,
            total: cart.total(),
            installment: installment(cart.total(), DEFAULT_INSTALLMENTS),
            coupon: cart.coupon.as_ref().map(|c| CouponView {
                code: c.code.clone(),
                label: c.discount.label(),
            }),
            shipping: FreeShippingProgress::for_subtotal(cart.subtotal()),
        }
    }
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// One purchased line.
#[derive(Clone)]
pub struct OrderItemView {
    pub name: String,
    pub qty: u32,
    pub price: Decimal,
    pub line_total: Decimal,
}

/// A placed order.
#[derive(Clone)]
pub struct OrderView {
    pub code: String,
    pub status_code: &'static str,
    pub status_label: &'static str,
    pub total: Decimal,
    pub item_count: u32,
    pub placed_at: String,
    pub items: Vec<OrderItemView>,
    pub customer_name: Option<String>,
    pub address: Option<String>,
    pub city_line: Option<String>,
    pub payment: Option<&'static str>,
    pub tracking_code: Option<String>,
    pub tracking_url: Option<String>,
}

impl From<&CustomerOrder> for OrderView {
    fn from(order: &CustomerOrder) -> Self {
        let tracking = order.tracking.as_ref();
        Self {
            code: order.order_code.clone(),
            status_code: order.status.code(),
            status_label: order.status.label(),
            total: order.total,
            item_count: order.item_count(),
            placed_at: order.created_at.format("%d/%m/%Y %H:%M").to_string(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemView {
                    name: item.name.clone(),
                    qty: item.qty,
                    price: item.price,
                    line_total: item.price * Decimal::from(item.qty),
                })
                .collect(),
            customer_name: order.contact.as_ref().map(|c| c.full_name.clone()),
            address: order.delivery.as_ref().map(|d| match &d.address_line2 {
                Some(extra) => format!("{}, {extra}", d.address_line1),
                None => d.address_line1.clone(),
            }),
            city_line: order.delivery.as_ref().map(|d| {
                format!("{} - {}, {}/{}", d.neighborhood, d.cep, d.city, d.state)
            }),
            payment: order
                .payment
                .as_ref()
                .and_then(|p| p.method.parse::<PaymentMethod>().ok())
                .map(PaymentMethod::label),
            tracking_code: tracking.and_then(|t| t.code.clone()),
            tracking_url: tracking.and_then(|t| t.url.clone()),
        }
    }
}

/// A `<select>` or checkbox option.
#[derive(Clone)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl OptionView {
    pub fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use essence_arabe_core::upsell::offer;

    use super::*;

    #[test]
    fn test_product_card_formats_rating_and_url() {
        let catalog = Catalog::new();
        let card = ProductCard::from(catalog.by_id("7").unwrap());
        assert_eq!(card.url, "/p/khamrah-lattafa");
        assert!(card.rating.contains(','));
        assert_eq!(card.installment, Decimal::from(23));
    }

    #[test]
    fn test_bundle_offer_card_shows_savings() {
        let catalog = Catalog::new();
        let card = OfferCard::new(offer("BUNDLE_KIT_DOCES").unwrap(), &catalog);
        assert!(card.is_bundle);
        assert_eq!(card.price, Decimal::from(519));
        assert_eq!(card.savings, Decimal::from(49));
        assert_eq!(card.target_names, vec!["Khamrah", "Khamrah Qahwa"]);
    }

    #[test]
    fn test_cart_view_totals() {
        let catalog = Catalog::new();
        let mut cart = Cart::default();
        cart.add_from_catalog(&catalog, "7", 1).unwrap();

        let view = CartView::from(&cart);
        assert_eq!(view.item_count, 1);
        assert_eq!(view.total, Decimal::from(269));
        assert!(view.shipping.qualifies);
        assert!(view.coupon.is_none());
    }
}
