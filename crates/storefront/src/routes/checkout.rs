//! Checkout route handlers.
//!
//! The checkout is a four-step form (contact, delivery, payment, review)
//! backed by a draft saved on every submission. Every step posts to its own
//! route, which either saves and redirects back to `/checkout` or re-renders
//! the step with inline field errors.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use essence_arabe_core::account::{CustomerData, CustomerProfile};
use essence_arabe_core::checkout::{
    CheckoutDraft, CheckoutError, CheckoutStep, ContactForm, DeliveryForm, OrderTotals,
    PaymentForm, PaymentMethod, ShippingMethod, place_order,
};
use essence_arabe_core::upsell::{
    UpsellAction, UpsellContext, UpsellOffer, UpsellType, eligible_offers,
};
use essence_arabe_core::validate::FieldErrors;
use essence_arabe_core::{Cart, Catalog};

use super::layout::Layout;
use super::views::{CartView, OfferCard};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::Flash;
use crate::services::tracking::TrackedEvent;
use crate::services::{CartStore, CustomerStore, DraftStore, FlashStore, UpsellTracker};
use crate::state::AppState;

const CHECKOUT_PATH: &str = "/checkout";
const CART_PATH: &str = "/carrinho";

/// Review step form data.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub accept_terms: Option<String>,
}

/// Step indicator entry.
pub struct StepView {
    pub number: u8,
    pub label: &'static str,
    pub done: bool,
    pub active: bool,
}

/// Shipping choice on the delivery step.
pub struct ShippingOptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub price: Decimal,
    pub is_free: bool,
    pub selected: bool,
}

/// Payment choice on the payment step.
pub struct PaymentOptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub selected: bool,
}

/// Field values echoed back into the forms.
#[derive(Debug, Clone, Default)]
pub struct CheckoutValues {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub wants_whatsapp_updates: bool,
    pub cep: String,
    pub address: String,
    pub number: String,
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub reference: String,
    pub shipping_method: String,
    pub payment_method: String,
    pub add_order_bump: bool,
    pub notes: String,
    pub accept_terms: bool,
}

impl CheckoutValues {
    /// Values from the saved draft, falling back to the visitor's profile
    /// and default address.
    fn from_draft(
        draft: &CheckoutDraft,
        profile: Option<&CustomerProfile>,
        customer: &CustomerData,
    ) -> Self {
        let mut values = Self {
            wants_whatsapp_updates: true,
            shipping_method: ShippingMethod::Standard.as_str().to_string(),
            payment_method: PaymentMethod::Pix.as_str().to_string(),
            ..Self::default()
        };

        if let Some(contact) = &draft.contact {
            values.name.clone_from(&contact.full_name);
            values.email.clone_from(&contact.email);
            values.phone.clone_from(&contact.whatsapp);
            values.wants_whatsapp_updates = contact.wants_whatsapp_updates;
        } else if let Some(profile) = profile {
            values.name.clone_from(&profile.full_name);
            values.email = profile.email.clone().unwrap_or_default();
            values.phone.clone_from(&profile.whatsapp);
        }

        if let Some(delivery) = &draft.delivery {
            values.cep.clone_from(&delivery.cep);
            values.address.clone_from(&delivery.address);
            values.number.clone_from(&delivery.number);
            values.complement = delivery.complement.clone().unwrap_or_default();
            values.neighborhood.clone_from(&delivery.neighborhood);
            values.city.clone_from(&delivery.city);
            values.state.clone_from(&delivery.state);
            values.reference = delivery.reference.clone().unwrap_or_default();
            values.shipping_method = delivery.shipping_method.as_str().to_string();
        } else if let Some(address) = customer.default_address() {
            values.cep.clone_from(&address.cep);
            values.address.clone_from(&address.address_line1);
            values.complement = address.address_line2.clone().unwrap_or_default();
            values.neighborhood.clone_from(&address.neighborhood);
            values.city.clone_from(&address.city);
            values.state.clone_from(&address.state);
            values.reference = address.reference.clone().unwrap_or_default();
        }

        if let Some(payment) = &draft.payment {
            values.payment_method = payment.method.as_str().to_string();
        }
        values.add_order_bump = draft.order_bump.as_ref().is_some_and(|b| b.enabled);
        values.notes = draft.notes.clone().unwrap_or_default();
        values.accept_terms = draft.accept_terms;
        values
    }

    fn with_contact(mut self, form: &ContactForm) -> Self {
        self.name.clone_from(&form.name);
        self.email.clone_from(&form.email);
        self.phone.clone_from(&form.phone);
        self.wants_whatsapp_updates = form.wants_whatsapp_updates.is_some();
        self
    }

    fn with_delivery(mut self, form: &DeliveryForm) -> Self {
        self.cep.clone_from(&form.cep);
        self.address.clone_from(&form.address);
        self.number.clone_from(&form.number);
        self.complement.clone_from(&form.complement);
        self.neighborhood.clone_from(&form.neighborhood);
        self.city.clone_from(&form.city);
        self.state.clone_from(&form.state);
        self.reference.clone_from(&form.reference);
        self.shipping_method.clone_from(&form.shipping_method);
        self
    }

    fn with_payment(mut self, form: &PaymentForm) -> Self {
        self.payment_method.clone_from(&form.method);
        self.add_order_bump = form.add_order_bump.is_some();
        self
    }
}

/// Saved data summarized on the review step.
pub struct ReviewView {
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: String,
    pub city_line: String,
    pub shipping: &'static str,
    pub payment: &'static str,
    pub order_bump_title: Option<String>,
    pub order_bump_price: Decimal,
}

impl ReviewView {
    fn new(draft: &CheckoutDraft, catalog: &Catalog) -> Option<Self> {
        let contact = draft.contact.as_ref()?;
        let delivery = draft.delivery.as_ref()?;
        let payment = draft.payment.as_ref()?;
        let bump = draft.order_bump.as_ref().and_then(|b| b.line(catalog));
        Some(Self {
            contact_name: contact.full_name.clone(),
            contact_email: contact.email.clone(),
            contact_phone: contact.whatsapp.clone(),
            address: match &delivery.complement {
                Some(extra) => format!("{}, {extra}", delivery.address_line1()),
                None => delivery.address_line1(),
            },
            city_line: format!(
                "{} - {}, {}/{}",
                delivery.neighborhood, delivery.cep, delivery.city, delivery.state
            ),
            shipping: delivery.shipping_method.label(),
            payment: payment.method.label(),
            order_bump_price: bump.as_ref().map_or(Decimal::ZERO, |(_, price)| *price),
            order_bump_title: bump.map(|(title, _)| title),
        })
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub step: u8,
    pub steps: Vec<StepView>,
    pub values: CheckoutValues,
    pub errors: FieldErrors,
    pub shipping_options: Vec<ShippingOptionView>,
    pub payment_options: Vec<PaymentOptionView>,
    pub order_bump: Option<OfferCard>,
    pub review: Option<ReviewView>,
    pub cart: CartView,
    pub totals: OrderTotals,
}

/// The order-bump offer for the checkout, if the cart qualifies.
fn order_bump_offer(cart: &Cart) -> Option<&'static UpsellOffer> {
    eligible_offers(
        UpsellContext::Checkout,
        cart.subtotal(),
        &cart.product_ids(),
        None,
    )
    .into_iter()
    .find(|offer| offer.kind == UpsellType::OrderBump)
}

fn render(
    state: &AppState,
    layout: Layout,
    cart: &Cart,
    draft: &CheckoutDraft,
    step: CheckoutStep,
    values: CheckoutValues,
    errors: FieldErrors,
) -> CheckoutTemplate {
    let catalog = state.catalog();
    let subtotal = cart.subtotal();

    CheckoutTemplate {
        layout,
        step: step.number(),
        steps: CheckoutStep::ALL
            .into_iter()
            .map(|s| StepView {
                number: s.number(),
                label: s.label(),
                done: s < step,
                active: s == step,
            })
            .collect(),
        shipping_options: ShippingMethod::ALL
            .into_iter()
            .map(|m| ShippingOptionView {
                value: m.as_str(),
                label: m.label(),
                description: m.description(),
                price: m.cost(subtotal),
                is_free: m.cost(subtotal).is_zero(),
                selected: values.shipping_method.parse::<ShippingMethod>().ok() == Some(m),
            })
            .collect(),
        payment_options: PaymentMethod::ALL
            .into_iter()
            .map(|m| PaymentOptionView {
                value: m.as_str(),
                label: m.label(),
                description: m.description(),
                selected: values.payment_method.parse::<PaymentMethod>().ok() == Some(m),
            })
            .collect(),
        order_bump: order_bump_offer(cart).map(|offer| OfferCard::new(offer, catalog)),
        review: (step == CheckoutStep::Review)
            .then(|| ReviewView::new(draft, catalog))
            .flatten(),
        cart: CartView::from(cart),
        totals: draft.totals(cart, catalog),
        values,
        errors,
    }
}

/// Re-render a step with field errors.
fn invalid(template: CheckoutTemplate) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
}

/// Display the current checkout step.
///
/// An empty cart redirects to the cart page.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    layout: Layout,
    OptionalAuth(profile): OptionalAuth,
    cart: CartStore,
    draft: DraftStore,
    customer: CustomerStore,
    tracker: UpsellTracker,
) -> Response {
    let cart = cart.load().await;
    if cart.is_empty() {
        return Redirect::to(CART_PATH).into_response();
    }
    let draft = draft.load().await;
    let step = draft.current_step();
    let values = CheckoutValues::from_draft(&draft, profile.as_ref(), &customer.load().await);

    if step == CheckoutStep::Payment
        && let Some(offer) = order_bump_offer(&cart)
    {
        tracker
            .impressions(state.now(), &[offer], UpsellContext::Checkout, cart.subtotal())
            .await;
    }

    render(&state, layout, &cart, &draft, step, values, FieldErrors::new()).into_response()
}

/// Save the contact step.
#[instrument(skip_all)]
pub async fn submit_contact(
    State(state): State<AppState>,
    layout: Layout,
    OptionalAuth(profile): OptionalAuth,
    cart: CartStore,
    draft: DraftStore,
    customer: CustomerStore,
    Form(form): Form<ContactForm>,
) -> Response {
    let current_cart = cart.load().await;
    if current_cart.is_empty() {
        return Redirect::to(CART_PATH).into_response();
    }
    let mut current = draft.load().await;

    match form.parse() {
        Ok(contact) => {
            current.submit_contact(contact, state.now());
            draft.save(&current).await;
            Redirect::to(CHECKOUT_PATH).into_response()
        }
        Err(errors) => {
            let values = CheckoutValues::from_draft(&current, profile.as_ref(), &customer.load().await)
                .with_contact(&form);
            invalid(render(
                &state,
                layout,
                &current_cart,
                &current,
                CheckoutStep::Contact,
                values,
                errors,
            ))
        }
    }
}

/// Save the delivery step.
#[instrument(skip_all)]
pub async fn submit_delivery(
    State(state): State<AppState>,
    layout: Layout,
    OptionalAuth(profile): OptionalAuth,
    cart: CartStore,
    draft: DraftStore,
    customer: CustomerStore,
    Form(form): Form<DeliveryForm>,
) -> Response {
    let current_cart = cart.load().await;
    if current_cart.is_empty() {
        return Redirect::to(CART_PATH).into_response();
    }
    let mut current = draft.load().await;

    match form.parse() {
        Ok(delivery) => {
            current.submit_delivery(delivery, state.now());
            draft.save(&current).await;
            Redirect::to(CHECKOUT_PATH).into_response()
        }
        Err(errors) => {
            let values = CheckoutValues::from_draft(&current, profile.as_ref(), &customer.load().await)
                .with_delivery(&form);
            invalid(render(
                &state,
                layout,
                &current_cart,
                &current,
                CheckoutStep::Delivery,
                values,
                errors,
            ))
        }
    }
}

/// Save the payment step and the order-bump choice.
#[instrument(skip_all)]
pub async fn submit_payment(
    State(state): State<AppState>,
    layout: Layout,
    OptionalAuth(profile): OptionalAuth,
    cart: CartStore,
    draft: DraftStore,
    customer: CustomerStore,
    tracker: UpsellTracker,
    Form(form): Form<PaymentForm>,
) -> Response {
    let current_cart = cart.load().await;
    if current_cart.is_empty() {
        return Redirect::to(CART_PATH).into_response();
    }
    let mut current = draft.load().await;
    let bump_offer = order_bump_offer(&current_cart);

    match form.parse(bump_offer) {
        Ok((payment, bump)) => {
            let now = state.now();
            if let Some(offer_id) = bump.offer_id.as_ref() {
                tracker
                    .track(
                        now,
                        TrackedEvent::new(offer_id.as_str(), UpsellAction::Accept, UpsellContext::Checkout)
                            .with_cart_value(current_cart.subtotal()),
                    )
                    .await;
            }
            current.submit_payment(payment, bump, now);
            draft.save(&current).await;
            Redirect::to(CHECKOUT_PATH).into_response()
        }
        Err(errors) => {
            let values = CheckoutValues::from_draft(&current, profile.as_ref(), &customer.load().await)
                .with_payment(&form);
            invalid(render(
                &state,
                layout,
                &current_cart,
                &current,
                CheckoutStep::Payment,
                values,
                errors,
            ))
        }
    }
}

/// Save review notes and terms acceptance without placing the order.
#[instrument(skip(state, draft))]
pub async fn submit_review(
    State(state): State<AppState>,
    draft: DraftStore,
    Form(form): Form<ReviewForm>,
) -> Redirect {
    draft
        .update(|d| d.submit_review(&form.notes, form.accept_terms.is_some(), state.now()))
        .await;
    Redirect::to(CHECKOUT_PATH)
}

/// Go back one step.
#[instrument(skip(state, draft))]
pub async fn back(State(state): State<AppState>, draft: DraftStore) -> Redirect {
    draft
        .update(|d| {
            let step = d.current_step();
            d.step = step;
            d.back(state.now())
        })
        .await;
    Redirect::to(CHECKOUT_PATH)
}

/// Place the order.
///
/// On success the order joins the visitor's history, cart and draft are
/// cleared, and the visitor lands on the confirmation page.
#[instrument(skip(state, cart, draft, customer, flash))]
pub async fn place(
    State(state): State<AppState>,
    cart: CartStore,
    draft: DraftStore,
    customer: CustomerStore,
    flash: FlashStore,
    Form(form): Form<ReviewForm>,
) -> Redirect {
    let now = state.now();
    let current_cart = cart.load().await;
    let mut current = draft.load().await;
    current.submit_review(&form.notes, form.accept_terms.is_some(), now);

    let placed = place_order(&current_cart, &current, state.catalog(), now, &mut rand::rng());
    match placed {
        Ok(order) => {
            let code = order.order_code.clone();
            tracing::info!(order_code = %code, total = %order.total, items = order.item_count(), "Order placed");
            add_breadcrumb("checkout", "Order placed", Some(&[("order_code", code.as_str())]));

            customer.update(|data| data.add_order(order)).await;
            cart.clear().await;
            draft.clear().await;
            Redirect::to(&format!("/pedido/{code}"))
        }
        Err(CheckoutError::EmptyCart) => Redirect::to(CART_PATH),
        Err(e) => {
            tracing::info!(error = %e, "Order rejected");
            draft.save(&current).await;
            flash.set(Flash::error(e.to_string())).await;
            Redirect::to(CHECKOUT_PATH)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use essence_arabe_core::checkout::CheckoutContact;

    use super::*;

    #[test]
    fn test_values_prefill_from_profile() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let profile = essence_arabe_core::account::login_profile("ana@example.com", "x", now).unwrap();
        let values = CheckoutValues::from_draft(
            &CheckoutDraft::default(),
            Some(&profile),
            &CustomerData::default(),
        );
        assert_eq!(values.email, "ana@example.com");
        assert_eq!(values.shipping_method, "standard");
        assert_eq!(values.payment_method, "pix");
        assert!(values.wants_whatsapp_updates);
    }

    #[test]
    fn test_draft_values_win_over_profile() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let profile = essence_arabe_core::account::login_profile("ana@example.com", "x", now).unwrap();
        let mut draft = CheckoutDraft::default();
        draft.submit_contact(
            CheckoutContact {
                full_name: "Maria Silva".into(),
                whatsapp: "(11) 98888-7777".into(),
                email: "maria@example.com".into(),
                wants_whatsapp_updates: false,
            },
            now,
        );
        let values = CheckoutValues::from_draft(&draft, Some(&profile), &CustomerData::default());
        assert_eq!(values.name, "Maria Silva");
        assert_eq!(values.email, "maria@example.com");
        assert!(!values.wants_whatsapp_updates);
    }

    #[test]
    fn test_order_bump_needs_cart_total() {
        let catalog = Catalog::new();
        let mut cart = Cart::default();
        assert!(order_bump_offer(&cart).is_none());

        cart.add_from_catalog(&catalog, "7", 1).unwrap();
        assert_eq!(order_bump_offer(&cart).unwrap().kind, UpsellType::OrderBump);
    }
}
