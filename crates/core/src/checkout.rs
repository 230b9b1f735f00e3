//! Multi-step checkout.
//!
//! The visitor walks four steps (contact, delivery, payment, review). Each
//! valid submission is saved into a [`CheckoutDraft`] and moves the draft
//! one step forward; nothing skips ahead. Placing the order turns the cart
//! and the draft into a [`CustomerOrder`].

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::{
    ContactSnapshot, CustomerOrder, DeliverySnapshot, OrderItem, PaymentSnapshot,
};
use crate::cart::{Cart, FREE_SHIPPING_THRESHOLD};
use crate::catalog::{Catalog, add_on};
use crate::types::{DEFAULT_INSTALLMENTS, OfferId, OrderStatus, installment};
use crate::upsell::{UpsellOffer, offer};
use crate::validate::{
    FieldErrors, digits_only, format_cep, format_phone, is_valid_cep, is_valid_email,
    is_valid_phone,
};

/// Add-on charged when the order bump is ticked without a live offer.
pub const DEFAULT_ORDER_BUMP_ADD_ON: &str = "DECANT_5ML_KHAMRAH";

/// Checkout steps in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Contact,
    Delivery,
    Payment,
    Review,
}

impl CheckoutStep {
    pub const ALL: [Self; 4] = [Self::Contact, Self::Delivery, Self::Payment, Self::Review];

    /// 1-based position.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Contact => 1,
            Self::Delivery => 2,
            Self::Payment => 3,
            Self::Review => 4,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Contact => "Contato",
            Self::Delivery => "Entrega",
            Self::Payment => "Pagamento",
            Self::Review => "Revisão",
        }
    }

    /// Following step; the review step is last.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Contact => Self::Delivery,
            Self::Delivery => Self::Payment,
            Self::Payment | Self::Review => Self::Review,
        }
    }

    /// Previous step, `None` on the first.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Contact => None,
            Self::Delivery => Some(Self::Contact),
            Self::Payment => Some(Self::Delivery),
            Self::Review => Some(Self::Payment),
        }
    }
}

/// Delivery options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShippingMethod {
    #[default]
    #[serde(rename = "EXPRESS_24H")]
    Express,
    #[serde(rename = "STANDARD")]
    Standard,
}

impl ShippingMethod {
    pub const ALL: [Self; 2] = [Self::Express, Self::Standard];

    /// Form value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Express => "express",
            Self::Standard => "standard",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Express => "Expresso 24/48h",
            Self::Standard => "Normal",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Express => "Entrega rápida em até 48 horas",
            Self::Standard => "Entrega em 5 a 7 dias úteis",
        }
    }

    /// Listed price before the free-shipping rule.
    #[must_use]
    pub const fn base_price(self) -> Decimal {
        match self {
            Self::Express => Decimal::from_parts(15, 0, 0, false, 0),
            Self::Standard => Decimal::TEN,
        }
    }

    /// Price for a cart subtotal. Standard shipping is free from the threshold.
    #[must_use]
    pub fn cost(self, subtotal: Decimal) -> Decimal {
        match self {
            Self::Standard if subtotal >= FREE_SHIPPING_THRESHOLD => Decimal::ZERO,
            _ => self.base_price(),
        }
    }
}

impl std::str::FromStr for ShippingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "express" | "EXPRESS_24H" => Ok(Self::Express),
            "standard" | "normal" | "STANDARD" => Ok(Self::Standard),
            _ => Err(format!("invalid shipping method: {s}")),
        }
    }
}

/// Payment options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    #[default]
    Pix,
    Card,
}

impl PaymentMethod {
    pub const ALL: [Self; 2] = [Self::Pix, Self::Card];

    /// Form value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pix => "pix",
            Self::Card => "card",
        }
    }

    /// Storage code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Pix => "PIX",
            Self::Card => "CARD",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pix => "PIX",
            Self::Card => "Cartão de Crédito",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Pix => "Aprovação imediata",
            Self::Card => "Parcelamento em até 12x",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pix" => Ok(Self::Pix),
            "card" => Ok(Self::Card),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutContact {
    pub full_name: String,
    pub whatsapp: String,
    pub email: String,
    #[serde(default)]
    pub wants_whatsapp_updates: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutDelivery {
    pub cep: String,
    /// Street name.
    pub address: String,
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub reference: Option<String>,
    pub shipping_method: ShippingMethod,
}

impl CheckoutDelivery {
    /// Street and number on one line.
    #[must_use]
    pub fn address_line1(&self) -> String {
        format!("{}, {}", self.address, self.number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutPayment {
    pub method: PaymentMethod,
}

/// Whether the checkout add-on was ticked, and under which offer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutOrderBump {
    pub enabled: bool,
    #[serde(default)]
    pub offer_id: Option<OfferId>,
}

impl CheckoutOrderBump {
    /// Line title and price when enabled.
    #[must_use]
    pub fn line(&self, catalog: &Catalog) -> Option<(String, Decimal)> {
        if !self.enabled {
            return None;
        }
        if let Some(live) = self.offer_id.as_ref().and_then(|id| offer(id.as_str())) {
            let title = live
                .target_ids
                .first()
                .and_then(|id| catalog.title_of(id))
                .unwrap_or(live.title);
            return Some((title.to_string(), live.pricing(catalog).price));
        }
        add_on(DEFAULT_ORDER_BUMP_ADD_ON).map(|a| (a.title.to_string(), a.price))
    }

    #[must_use]
    pub fn value(&self, catalog: &Catalog) -> Decimal {
        self.line(catalog).map_or(Decimal::ZERO, |(_, price)| price)
    }
}

/// In-progress checkout state, saved on every submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutDraft {
    #[serde(default)]
    pub contact: Option<CheckoutContact>,
    #[serde(default)]
    pub delivery: Option<CheckoutDelivery>,
    #[serde(default)]
    pub payment: Option<CheckoutPayment>,
    #[serde(default)]
    pub order_bump: Option<CheckoutOrderBump>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub accept_terms: bool,
    #[serde(default)]
    pub step: CheckoutStep,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CheckoutDraft {
    /// Stamp a save: `created_at` once, `updated_at` every time.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.created_at.get_or_insert(now);
        self.updated_at = Some(now);
    }

    /// Go back one step. Returns `false` on the first step.
    pub fn back(&mut self, now: DateTime<Utc>) -> bool {
        let Some(previous) = self.step.previous() else {
            return false;
        };
        self.step = previous;
        self.touch(now);
        true
    }

    /// Save the contact step and advance.
    pub fn submit_contact(&mut self, contact: CheckoutContact, now: DateTime<Utc>) {
        self.contact = Some(contact);
        self.step = CheckoutStep::Contact.next();
        self.touch(now);
    }

    /// Save the delivery step and advance.
    pub fn submit_delivery(&mut self, delivery: CheckoutDelivery, now: DateTime<Utc>) {
        self.delivery = Some(delivery);
        self.step = CheckoutStep::Delivery.next();
        self.touch(now);
    }

    /// Save the payment step with the order-bump choice and advance.
    pub fn submit_payment(
        &mut self,
        payment: CheckoutPayment,
        order_bump: CheckoutOrderBump,
        now: DateTime<Utc>,
    ) {
        self.payment = Some(payment);
        self.order_bump = Some(order_bump);
        self.step = CheckoutStep::Payment.next();
        self.touch(now);
    }

    /// Save review-step notes and terms acceptance.
    pub fn submit_review(&mut self, notes: &str, accept_terms: bool, now: DateTime<Utc>) {
        let notes = notes.trim();
        self.notes = (!notes.is_empty()).then(|| notes.to_string());
        self.accept_terms = accept_terms;
        self.touch(now);
    }

    /// The step the visitor may view: the stored one, pulled back to the
    /// first step whose data is missing.
    #[must_use]
    pub fn current_step(&self) -> CheckoutStep {
        let reachable = if self.contact.is_none() {
            CheckoutStep::Contact
        } else if self.delivery.is_none() {
            CheckoutStep::Delivery
        } else if self.payment.is_none() {
            CheckoutStep::Payment
        } else {
            CheckoutStep::Review
        };
        self.step.min(reachable)
    }

    /// Totals for the cart with this draft's shipping and order bump.
    #[must_use]
    pub fn totals(&self, cart: &Cart, catalog: &Catalog) -> OrderTotals {
        let subtotal = cart.subtotal();
        let shipping = self
            .delivery
            .as_ref()
            .map_or(Decimal::ZERO, |d| d.shipping_method.cost(subtotal));
        let order_bump = self
            .order_bump
            .as_ref()
            .map_or(Decimal::ZERO, |b| b.value(catalog));
        OrderTotals::new(cart, shipping, order_bump)
    }
}

/// Price breakdown shown in the order summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub order_bump: Decimal,
    pub total: Decimal,
    /// Monthly amount over the default installment count.
    pub installment: Decimal,
}

impl OrderTotals {
    #[must_use]
    pub fn new(cart: &Cart, shipping: Decimal, order_bump: Decimal) -> Self {
        let total = cart.total() + shipping + order_bump;
        Self {
            subtotal: cart.subtotal(),
            discount: cart.discount_total(),
            shipping,
            order_bump,
            total,
            installment: installment(total, DEFAULT_INSTALLMENTS),
        }
    }
}

/// Contact step form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub wants_whatsapp_updates: Option<String>,
}

impl ContactForm {
    /// Validate into the saved contact.
    ///
    /// # Errors
    ///
    /// Returns field-scoped errors for every failing field.
    pub fn parse(&self) -> Result<CheckoutContact, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = self.name.trim();
        let email = self.email.trim();

        errors.check(
            name.chars().count() >= 2,
            "name",
            "Nome deve ter pelo menos 2 caracteres",
        );
        errors.check(is_valid_email(email), "email", "Email inválido");
        errors.check(is_valid_phone(&self.phone), "phone", "Telefone inválido");

        errors.into_result(CheckoutContact {
            full_name: name.to_string(),
            whatsapp: format_phone(&self.phone),
            email: email.to_string(),
            wants_whatsapp_updates: self.wants_whatsapp_updates.is_some(),
        })
    }
}

/// Delivery step form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeliveryForm {
    pub cep: String,
    pub address: String,
    pub number: String,
    #[serde(default)]
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub shipping_method: String,
}

impl DeliveryForm {
    /// Validate into the saved delivery.
    ///
    /// # Errors
    ///
    /// Returns field-scoped errors for every failing field.
    pub fn parse(&self) -> Result<CheckoutDelivery, FieldErrors> {
        let mut errors = FieldErrors::new();
        let trimmed_len = |s: &str| s.trim().chars().count();

        errors.check(is_valid_cep(&self.cep), "cep", "CEP inválido");
        errors.check(
            trimmed_len(&self.address) >= 5,
            "address",
            "Endereço deve ter pelo menos 5 caracteres",
        );
        errors.check(trimmed_len(&self.number) >= 1, "number", "Número é obrigatório");
        errors.check(
            trimmed_len(&self.neighborhood) >= 2,
            "neighborhood",
            "Bairro é obrigatório",
        );
        errors.check(trimmed_len(&self.city) >= 2, "city", "Cidade é obrigatória");
        errors.check(
            trimmed_len(&self.state) == 2,
            "state",
            "Estado deve ter 2 caracteres",
        );
        let shipping_method = self.shipping_method.parse::<ShippingMethod>();
        errors.check(
            shipping_method.is_ok(),
            "shipping_method",
            "Selecione uma forma de entrega",
        );

        let optional = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        errors.into_result(CheckoutDelivery {
            cep: format_cep(&self.cep),
            address: self.address.trim().to_string(),
            number: self.number.trim().to_string(),
            complement: optional(&self.complement),
            neighborhood: self.neighborhood.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_uppercase(),
            reference: optional(&self.reference),
            shipping_method: shipping_method.unwrap_or_default(),
        })
    }
}

/// Payment step form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentForm {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub add_order_bump: Option<String>,
}

impl PaymentForm {
    /// Validate into the saved payment and order-bump choice.
    ///
    /// `bump_offer` is the order-bump offer shown on the page, if any.
    ///
    /// # Errors
    ///
    /// Returns a field error for an unknown payment method.
    pub fn parse(
        &self,
        bump_offer: Option<&UpsellOffer>,
    ) -> Result<(CheckoutPayment, CheckoutOrderBump), FieldErrors> {
        let mut errors = FieldErrors::new();
        let method = self.method.parse::<PaymentMethod>();
        errors.check(method.is_ok(), "method", "Selecione uma forma de pagamento");

        let enabled = self.add_order_bump.is_some();
        errors.into_result((
            CheckoutPayment {
                method: method.unwrap_or_default(),
            },
            CheckoutOrderBump {
                enabled,
                offer_id: bump_offer
                    .filter(|_| enabled)
                    .map(|o| OfferId::new(o.id)),
            },
        ))
    }
}

/// Result of the mocked postal-code lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CepLookup {
    pub cep: String,
    pub address: &'static str,
    pub neighborhood: &'static str,
    pub city: &'static str,
    pub state: &'static str,
}

/// Mocked postal-code lookup: any valid CEP resolves to the same address.
#[must_use]
pub fn lookup_cep(cep: &str) -> Option<CepLookup> {
    is_valid_cep(cep).then(|| CepLookup {
        cep: format_cep(cep),
        address: "Rua Exemplo",
        neighborhood: "Centro",
        city: "São Paulo",
        state: "SP",
    })
}

/// Why an order could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Seu carrinho está vazio")]
    EmptyCart,
    #[error("Você precisa aceitar os termos para finalizar")]
    TermsNotAccepted,
    #[error("Etapa incompleta: {}", .0.label())]
    Incomplete(CheckoutStep),
}

/// New order code: `EA-YYYYMMDD-XXXX` with a random 4-digit suffix.
///
/// Codes are not checked for collisions.
pub fn generate_order_code<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
    format!(
        "EA-{}-{:04}",
        now.format("%Y%m%d"),
        rng.random_range(0..10_000_u32)
    )
}

/// Turn the cart and a completed draft into an order.
///
/// The caller records the order and clears cart and draft.
///
/// # Errors
///
/// Fails when the cart is empty, a step is missing, or terms were not
/// accepted.
pub fn place_order<R: Rng + ?Sized>(
    cart: &Cart,
    draft: &CheckoutDraft,
    catalog: &Catalog,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<CustomerOrder, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let contact = draft
        .contact
        .as_ref()
        .ok_or(CheckoutError::Incomplete(CheckoutStep::Contact))?;
    let delivery = draft
        .delivery
        .as_ref()
        .ok_or(CheckoutError::Incomplete(CheckoutStep::Delivery))?;
    let payment = draft
        .payment
        .as_ref()
        .ok_or(CheckoutError::Incomplete(CheckoutStep::Payment))?;
    if !draft.accept_terms {
        return Err(CheckoutError::TermsNotAccepted);
    }

    let mut items: Vec<OrderItem> = cart
        .items
        .iter()
        .map(|item| OrderItem {
            name: item.product.name.clone(),
            qty: item.quantity,
            price: item.product.price,
            image: Some(item.product.image.clone()),
        })
        .collect();
    if let Some((name, price)) = draft.order_bump.as_ref().and_then(|b| b.line(catalog)) {
        items.push(OrderItem {
            name,
            qty: 1,
            price,
            image: None,
        });
    }

    let totals = draft.totals(cart, catalog);
    Ok(CustomerOrder {
        order_code: generate_order_code(now, rng),
        status: OrderStatus::Confirmado,
        total: totals.total,
        items,
        created_at: now,
        tracking: None,
        contact: Some(ContactSnapshot {
            full_name: contact.full_name.clone(),
            whatsapp: digits_only(&contact.whatsapp),
            email: Some(contact.email.clone()).filter(|e| !e.is_empty()),
        }),
        delivery: Some(DeliverySnapshot {
            address_line1: delivery.address_line1(),
            address_line2: delivery.complement.clone(),
            neighborhood: delivery.neighborhood.clone(),
            city: delivery.city.clone(),
            state: delivery.state.clone(),
            cep: delivery.cep.clone(),
        }),
        payment: Some(PaymentSnapshot {
            method: payment.method.code().to_string(),
        }),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::upsell::ORDER_BUMP_OFFER_ID;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn contact_form() -> ContactForm {
        ContactForm {
            name: "Ana Souza".into(),
            email: "ana@example.com".into(),
            phone: "11999998888".into(),
            wants_whatsapp_updates: Some("on".into()),
        }
    }

    fn delivery_form(method: &str) -> DeliveryForm {
        DeliveryForm {
            cep: "01310100".into(),
            address: "Avenida Paulista".into(),
            number: "1000".into(),
            complement: "Apto 12".into(),
            neighborhood: "Bela Vista".into(),
            city: "São Paulo".into(),
            state: "sp".into(),
            reference: String::new(),
            shipping_method: method.into(),
        }
    }

    fn cart_with(catalog: &Catalog, id: &str, qty: u32) -> Cart {
        let mut cart = Cart::default();
        cart.add_from_catalog(catalog, id, qty).unwrap();
        cart
    }

    fn complete_draft(method: &str, bump: bool) -> CheckoutDraft {
        let mut draft = CheckoutDraft::default();
        draft.submit_contact(contact_form().parse().unwrap(), now());
        draft.submit_delivery(delivery_form(method).parse().unwrap(), now());
        let (payment, order_bump) = PaymentForm {
            method: "pix".into(),
            add_order_bump: bump.then(|| "on".into()),
        }
        .parse(offer(ORDER_BUMP_OFFER_ID))
        .unwrap();
        draft.submit_payment(payment, order_bump, now());
        draft
    }

    #[test]
    fn test_contact_form_errors() {
        let form = ContactForm {
            name: "A".into(),
            email: "ana@".into(),
            phone: "123".into(),
            wants_whatsapp_updates: None,
        };
        let errors = form.parse().unwrap_err();
        assert_eq!(errors.get("name"), Some("Nome deve ter pelo menos 2 caracteres"));
        assert_eq!(errors.get("email"), Some("Email inválido"));
        assert_eq!(errors.get("phone"), Some("Telefone inválido"));
    }

    #[test]
    fn test_delivery_form_errors() {
        let form = DeliveryForm {
            cep: "0131".into(),
            address: "Rua".into(),
            number: String::new(),
            neighborhood: "B".into(),
            city: "S".into(),
            state: "SPX".into(),
            shipping_method: "drone".into(),
            ..DeliveryForm::default()
        };
        let errors = form.parse().unwrap_err();
        for field in ["cep", "address", "number", "neighborhood", "city", "state", "shipping_method"] {
            assert!(errors.get(field).is_some(), "{field} should fail");
        }
    }

    #[test]
    fn test_delivery_form_normalizes() {
        let delivery = delivery_form("normal").parse().unwrap();
        assert_eq!(delivery.cep, "01310-100");
        assert_eq!(delivery.state, "SP");
        assert_eq!(delivery.shipping_method, ShippingMethod::Standard);
        assert_eq!(delivery.address_line1(), "Avenida Paulista, 1000");
        assert_eq!(delivery.reference, None);
    }

    #[test]
    fn test_steps_advance_and_go_back() {
        let mut draft = CheckoutDraft::default();
        assert_eq!(draft.current_step(), CheckoutStep::Contact);
        assert!(!draft.back(now()));

        draft.submit_contact(contact_form().parse().unwrap(), now());
        assert_eq!(draft.current_step(), CheckoutStep::Delivery);

        assert!(draft.back(now() + Duration::minutes(1)));
        assert_eq!(draft.current_step(), CheckoutStep::Contact);
        assert_eq!(draft.created_at, Some(now()));
        assert_eq!(draft.updated_at, Some(now() + Duration::minutes(1)));
    }

    #[test]
    fn test_current_step_never_skips_missing_data() {
        let draft = CheckoutDraft {
            step: CheckoutStep::Review,
            ..CheckoutDraft::default()
        };
        assert_eq!(draft.current_step(), CheckoutStep::Contact);
    }

    #[test]
    fn test_standard_shipping_free_over_threshold() {
        assert_eq!(ShippingMethod::Standard.cost(Decimal::from(199)), Decimal::TEN);
        assert_eq!(ShippingMethod::Standard.cost(Decimal::from(200)), Decimal::ZERO);
        assert_eq!(ShippingMethod::Express.cost(Decimal::from(500)), Decimal::from(15));
    }

    #[test]
    fn test_totals_include_shipping_and_bump() {
        let catalog = Catalog::new();
        let cart = cart_with(&catalog, "7", 1);
        let draft = complete_draft("express", true);

        let totals = draft.totals(&cart, &catalog);
        assert_eq!(totals.subtotal, Decimal::from(269));
        assert_eq!(totals.shipping, Decimal::from(15));
        assert_eq!(totals.order_bump, Decimal::new(2542, 2));
        assert_eq!(totals.total, Decimal::new(30942, 2));
        assert_eq!(totals.installment, Decimal::from(26));
    }

    #[test]
    fn test_bump_without_offer_uses_add_on_price() {
        let catalog = Catalog::new();
        let bump = CheckoutOrderBump {
            enabled: true,
            offer_id: None,
        };
        assert_eq!(bump.value(&catalog), Decimal::new(2990, 2));
        assert_eq!(CheckoutOrderBump::default().value(&catalog), Decimal::ZERO);
    }

    #[test]
    fn test_place_order_requirements() {
        let catalog = Catalog::new();
        let mut rng = StdRng::seed_from_u64(1);
        let cart = cart_with(&catalog, "7", 1);

        assert_eq!(
            place_order(&Cart::default(), &complete_draft("express", false), &catalog, now(), &mut rng),
            Err(CheckoutError::EmptyCart)
        );
        assert_eq!(
            place_order(&cart, &CheckoutDraft::default(), &catalog, now(), &mut rng),
            Err(CheckoutError::Incomplete(CheckoutStep::Contact))
        );
        assert_eq!(
            place_order(&cart, &complete_draft("express", false), &catalog, now(), &mut rng),
            Err(CheckoutError::TermsNotAccepted)
        );
    }

    #[test]
    fn test_place_order_builds_confirmed_order() {
        let catalog = Catalog::new();
        let mut rng = StdRng::seed_from_u64(1);
        let cart = cart_with(&catalog, "7", 2);
        let mut draft = complete_draft("standard", true);
        draft.submit_review("  ", true, now());

        let order = place_order(&cart, &draft, &catalog, now(), &mut rng).unwrap();

        assert!(order.order_code.starts_with("EA-20260301-"));
        assert_eq!(order.order_code.len(), "EA-20260301-0000".len());
        assert_eq!(order.status, OrderStatus::Confirmado);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[1].name, "Amostra 5ml - Khamrah");
        // 538 + free standard shipping + 25.42 bump
        assert_eq!(order.total, Decimal::new(56342, 2));
        assert_eq!(order.contact.as_ref().unwrap().whatsapp, "11999998888");
        assert_eq!(order.payment.as_ref().unwrap().method, "PIX");
        assert_eq!(draft.notes, None);
    }

    #[test]
    fn test_lookup_cep() {
        let found = lookup_cep("01310100").unwrap();
        assert_eq!(found.cep, "01310-100");
        assert_eq!(found.city, "São Paulo");
        assert!(lookup_cep("123").is_none());
    }

    #[test]
    fn test_order_code_suffix_is_four_digits() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let code = generate_order_code(now(), &mut rng);
            let suffix = code.strip_prefix("EA-20260301-").unwrap();
            assert_eq!(suffix.len(), 4);
            assert!(suffix.bytes().all(|b| b.is_ascii_digit()));
        }
    }
}
