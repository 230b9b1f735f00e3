//! Upsell offers and eligibility rules.
//!
//! Offers are static. Which ones a visitor sees depends on the page
//! ([`UpsellContext`]), the cart, and the product being viewed; see
//! [`eligible_offers`].

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::FREE_SHIPPING_THRESHOLD;
use crate::catalog::{Catalog, Product};
use crate::types::{ProductId, round_cents};

/// Kind of offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpsellType {
    OrderBump,
    Bundle,
    Upgrade,
    PostPurchase,
}

/// Page an offer is shown on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpsellContext {
    Pdp,
    Cart,
    Checkout,
    ThankYou,
}

impl UpsellContext {
    /// Storage code, e.g. `THANK_YOU`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Pdp => "PDP",
            Self::Cart => "CART",
            Self::Checkout => "CHECKOUT",
            Self::ThankYou => "THANK_YOU",
        }
    }
}

impl std::fmt::Display for UpsellContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for UpsellContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PDP" => Ok(Self::Pdp),
            "CART" => Ok(Self::Cart),
            "CHECKOUT" => Ok(Self::Checkout),
            "THANK_YOU" => Ok(Self::ThankYou),
            _ => Err(format!("invalid upsell context: {s}")),
        }
    }
}

/// Visitor interaction with an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpsellAction {
    Impression,
    Click,
    Accept,
    Decline,
}

impl std::str::FromStr for UpsellAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IMPRESSION" => Ok(Self::Impression),
            "CLICK" => Ok(Self::Click),
            "ACCEPT" => Ok(Self::Accept),
            "DECLINE" => Ok(Self::Decline),
            _ => Err(format!("invalid upsell action: {s}")),
        }
    }
}

/// How an offer is priced relative to its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferDiscount {
    /// Percentage off the combined target price.
    Percent(Decimal),
    /// Fixed amount off the combined target price.
    Fixed(Decimal),
    /// The targets together cost exactly this.
    BundlePrice(Decimal),
}

impl OfferDiscount {
    /// Offer price for a base price, rounded to cents.
    #[must_use]
    pub fn price_for(self, base: Decimal) -> Decimal {
        let price = match self {
            Self::Percent(value) => base * (Decimal::ONE - value / Decimal::ONE_HUNDRED),
            Self::Fixed(value) => (base - value).max(Decimal::ZERO),
            Self::BundlePrice(price) => price,
        };
        round_cents(price)
    }
}

/// Conditions under which an offer may be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eligibility {
    pub min_cart_total: Option<Decimal>,
    pub requires_product_id: Option<&'static str>,
    pub exclude_if_in_cart: &'static [&'static str],
    /// Carried for display only.
    pub max_uses: Option<u32>,
}

impl Eligibility {
    const NONE: Self = Self {
        min_cart_total: None,
        requires_product_id: None,
        exclude_if_in_cart: &[],
        max_uses: None,
    };
}

/// Presentation copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsellUi {
    pub badge: Option<&'static str>,
    pub image: Option<&'static str>,
    pub cta_text: &'static str,
    pub description: Option<&'static str>,
}

/// A static upsell offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsellOffer {
    pub id: &'static str,
    pub kind: UpsellType,
    pub title: &'static str,
    pub subtitle: Option<&'static str>,
    /// Catalog product ids or add-on ids.
    pub target_ids: &'static [&'static str],
    pub discount: Option<OfferDiscount>,
    pub eligibility: Eligibility,
    pub priority: u8,
    pub ui: UpsellUi,
    /// Minutes the offer stays open after the order is placed.
    pub time_limit_minutes: Option<i64>,
}

/// Why an offer could not be accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OfferError {
    #[error("Oferta não encontrada: {0}")]
    NotFound(String),
    #[error("Oferta expirada")]
    Expired,
    #[error("Oferta indisponível")]
    NotEligible,
}

/// Offer price breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OfferPricing {
    /// Combined regular price of the targets.
    pub base: Decimal,
    pub price: Decimal,
    pub savings: Decimal,
}

impl UpsellOffer {
    /// Price the offer against current catalog and add-on prices.
    ///
    /// Unknown targets contribute nothing to the base.
    #[must_use]
    pub fn pricing(&self, catalog: &Catalog) -> OfferPricing {
        let base: Decimal = self
            .target_ids
            .iter()
            .filter_map(|id| catalog.price_of(id))
            .sum();
        let price = self.discount.map_or(base, |d| d.price_for(base));
        OfferPricing {
            base,
            price,
            savings: (base - price).max(Decimal::ZERO),
        }
    }

    /// Catalog products among the targets, in target order.
    #[must_use]
    pub fn catalog_targets<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Product> {
        self.target_ids
            .iter()
            .filter_map(|id| catalog.by_id(id))
            .collect()
    }

    #[must_use]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_minutes.map(Duration::minutes)
    }

    /// When the offer closes for an order placed at `placed_at`.
    #[must_use]
    pub fn expires_at(&self, placed_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.time_limit().map(|limit| placed_at + limit)
    }

    /// Seconds left before expiry, `None` for open-ended offers.
    #[must_use]
    pub fn seconds_left(&self, placed_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at(placed_at)
            .map(|expires| (expires - now).num_seconds().max(0))
    }

    /// Reject acceptance after the offer has expired.
    ///
    /// # Errors
    ///
    /// Returns [`OfferError::Expired`] once `now` reaches the expiry time.
    pub fn ensure_open(&self, placed_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), OfferError> {
        match self.expires_at(placed_at) {
            Some(expires) if now >= expires => Err(OfferError::Expired),
            _ => Ok(()),
        }
    }
}

/// Offer display limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsellConfig {
    pub free_shipping_threshold: Decimal,
    pub max_pdp: usize,
    pub max_cart: usize,
    pub max_checkout: usize,
    pub max_thank_you: usize,
}

impl UpsellConfig {
    /// Maximum offers rendered in `context`.
    #[must_use]
    pub const fn max_offers(&self, context: UpsellContext) -> usize {
        match context {
            UpsellContext::Pdp => self.max_pdp,
            UpsellContext::Cart => self.max_cart,
            UpsellContext::Checkout => self.max_checkout,
            UpsellContext::ThankYou => self.max_thank_you,
        }
    }
}

pub const UPSELL_CONFIG: UpsellConfig = UpsellConfig {
    free_shipping_threshold: FREE_SHIPPING_THRESHOLD,
    max_pdp: 4,
    max_cart: 3,
    max_checkout: 1,
    max_thank_you: 1,
};

/// Id of the checkout order bump offer.
pub const ORDER_BUMP_OFFER_ID: &str = "BUMP_DECANT_10ML";
/// Id of the one-time offer on the confirmation page.
pub const POST_PURCHASE_OFFER_ID: &str = "OTO_SECOND_PERFUME";

pub static OFFERS: [UpsellOffer; 4] = [
    UpsellOffer {
        id: ORDER_BUMP_OFFER_ID,
        kind: UpsellType::OrderBump,
        title: "Decant Exclusivo",
        subtitle: Some("Experimente antes de comprar o frasco completo"),
        target_ids: &["DECANT_5ML_KHAMRAH"],
        discount: Some(OfferDiscount::Percent(Decimal::from_parts(15, 0, 0, false, 0))),
        eligibility: Eligibility {
            min_cart_total: Some(Decimal::ONE_HUNDRED),
            exclude_if_in_cart: &["DECANT_5ML_KHAMRAH"],
            ..Eligibility::NONE
        },
        priority: 10,
        ui: UpsellUi {
            badge: Some("Oferta Especial"),
            image: Some("https://images.unsplash.com/photo-1612817288484-6f916840f6f6?w=200&h=200&fit=crop"),
            cta_text: "Adicionar com 15% OFF",
            description: Some("Entrega junto no mesmo pacote"),
        },
        time_limit_minutes: None,
    },
    UpsellOffer {
        id: "BUNDLE_KIT_DOCES",
        kind: UpsellType::Bundle,
        title: "Kit Doces Árabe",
        subtitle: Some("Khamrah + Khamrah Qahwa - Economize R$ 49"),
        target_ids: &["7", "8"],
        discount: Some(OfferDiscount::BundlePrice(Decimal::from_parts(519, 0, 0, false, 0))),
        eligibility: Eligibility {
            min_cart_total: Some(Decimal::ZERO),
            exclude_if_in_cart: &["7", "8"],
            ..Eligibility::NONE
        },
        priority: 8,
        ui: UpsellUi {
            badge: Some("Economize R$ 49"),
            image: Some("https://images.unsplash.com/photo-1541643600914-78b084683601?w=200&h=200&fit=crop"),
            cta_text: "Quero esse combo",
            description: Some("2 perfumes por um preço especial"),
        },
        time_limit_minutes: None,
    },
    UpsellOffer {
        id: "BUNDLE_KIT_AMADEIRADO",
        kind: UpsellType::Bundle,
        title: "Kit Amadeirado Premium",
        subtitle: Some("Al Noble Safeer + Vulcan Sable - Economize R$ 59"),
        target_ids: &["17", "30"],
        discount: Some(OfferDiscount::BundlePrice(Decimal::from_parts(669, 0, 0, false, 0))),
        eligibility: Eligibility {
            min_cart_total: Some(Decimal::ZERO),
            exclude_if_in_cart: &["17", "30"],
            ..Eligibility::NONE
        },
        priority: 7,
        ui: UpsellUi {
            badge: Some("Economize R$ 59"),
            image: Some("https://images.unsplash.com/photo-1595425970377-c9700292b1c4?w=200&h=200&fit=crop"),
            cta_text: "Adicionar kit",
            description: Some("Perfeito para quem ama fragrâncias intensas"),
        },
        time_limit_minutes: None,
    },
    UpsellOffer {
        id: POST_PURCHASE_OFFER_ID,
        kind: UpsellType::PostPurchase,
        title: "Segundo Perfume com 10% OFF",
        subtitle: Some("Oferta relâmpago - Válida por 10 minutos"),
        target_ids: &["7"],
        discount: Some(OfferDiscount::Percent(Decimal::TEN)),
        eligibility: Eligibility {
            min_cart_total: Some(Decimal::ZERO),
            max_uses: Some(1),
            ..Eligibility::NONE
        },
        priority: 9,
        ui: UpsellUi {
            badge: Some("Oferta Relâmpago"),
            image: Some("https://images.unsplash.com/photo-1541643600914-78b084683601?w=200&h=200&fit=crop"),
            cta_text: "Adicionar com desconto",
            description: Some("Oferta única desta compra"),
        },
        time_limit_minutes: Some(10),
    },
];

/// Look up an offer by id.
#[must_use]
pub fn offer(id: &str) -> Option<&'static UpsellOffer> {
    OFFERS.iter().find(|o| o.id == id)
}

/// Whether an offer passes the cart and product rules.
///
/// A zero minimum counts as no minimum. An offer whose targets are all in
/// the cart already is never shown.
#[must_use]
pub fn is_offer_eligible(
    offer: &UpsellOffer,
    cart_total: Decimal,
    cart_product_ids: &[ProductId],
    current_product_id: Option<&str>,
) -> bool {
    let rules = &offer.eligibility;
    let in_cart = |id: &str| cart_product_ids.iter().any(|p| p.as_str() == id);

    if let Some(minimum) = rules.min_cart_total
        && !minimum.is_zero()
        && cart_total < minimum
    {
        return false;
    }

    if let Some(required) = rules.requires_product_id
        && current_product_id != Some(required)
    {
        return false;
    }

    if rules.exclude_if_in_cart.iter().any(|id| in_cart(id)) {
        return false;
    }

    !offer.target_ids.iter().all(|id| in_cart(id))
}

/// Offers to render in `context`, highest priority first.
#[must_use]
pub fn eligible_offers(
    context: UpsellContext,
    cart_total: Decimal,
    cart_product_ids: &[ProductId],
    current_product_id: Option<&str>,
) -> Vec<&'static UpsellOffer> {
    let mut offers: Vec<&'static UpsellOffer> = OFFERS
        .iter()
        .filter(|offer| match (offer.kind, context) {
            (UpsellType::PostPurchase, UpsellContext::ThankYou) => true,
            (UpsellType::PostPurchase, _) | (_, UpsellContext::ThankYou) => false,
            _ => is_offer_eligible(offer, cart_total, cart_product_ids, current_product_id),
        })
        .collect();

    offers.sort_by(|a, b| b.priority.cmp(&a.priority));
    offers.truncate(UPSELL_CONFIG.max_offers(context));
    offers
}
