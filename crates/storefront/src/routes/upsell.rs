//! Upsell offer acceptance and analytics.

use std::collections::BTreeMap;

use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::Redirect,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use essence_arabe_core::checkout::CheckoutOrderBump;
use essence_arabe_core::tracking::OfferMetrics;
use essence_arabe_core::types::OfferId;
use essence_arabe_core::upsell::{
    OfferError, UpsellAction, UpsellContext, UpsellType, is_offer_eligible, offer,
};

use crate::error::{Result, add_breadcrumb};
use crate::models::Flash;
use crate::services::tracking::TrackedEvent;
use crate::services::{CartStore, DraftStore, FlashStore, UpsellTracker};
use crate::state::AppState;

/// Offer acceptance form data.
#[derive(Debug, Deserialize)]
pub struct AcceptOfferForm {
    pub offer_id: String,
    /// Page the offer was shown on, e.g. `PDP` or `CART`.
    #[serde(default)]
    pub context: Option<String>,
    /// Product being viewed when accepted from a product page.
    #[serde(default)]
    pub product_id: Option<String>,
}

/// Event reported by the page.
#[derive(Debug, Deserialize)]
pub struct EventPayload {
    pub offer_id: String,
    pub action: UpsellAction,
    pub context: UpsellContext,
    #[serde(default)]
    pub order_code: Option<String>,
    #[serde(default)]
    pub cart_value: Option<Decimal>,
}

/// Accept an offer.
///
/// The order bump is recorded on the checkout draft; bundles and upgrades
/// add their catalog targets to the cart at catalog price.
///
/// # Errors
///
/// Returns 404 for unknown offers and 400 for offers the cart no longer
/// qualifies for. Post-purchase offers are accepted from the confirmation
/// page only.
#[instrument(skip(state, cart, draft, flash, tracker))]
pub async fn accept(
    State(state): State<AppState>,
    cart: CartStore,
    draft: DraftStore,
    flash: FlashStore,
    tracker: UpsellTracker,
    Form(form): Form<AcceptOfferForm>,
) -> Result<Redirect> {
    let accepted = offer(&form.offer_id).ok_or_else(|| OfferError::NotFound(form.offer_id.clone()))?;
    let context = form
        .context
        .as_deref()
        .and_then(|c| c.parse::<UpsellContext>().ok())
        .unwrap_or(UpsellContext::Cart);
    let now = state.now();
    let catalog = state.catalog();

    let current = cart.load().await;
    let eligible = is_offer_eligible(
        accepted,
        current.subtotal(),
        &current.product_ids(),
        form.product_id.as_deref(),
    );

    let redirect_to = match accepted.kind {
        UpsellType::PostPurchase => return Err(OfferError::NotEligible.into()),
        _ if !eligible => return Err(OfferError::NotEligible.into()),
        UpsellType::OrderBump => {
            draft
                .update(|d| {
                    d.order_bump = Some(CheckoutOrderBump {
                        enabled: true,
                        offer_id: Some(OfferId::new(accepted.id)),
                    });
                    d.touch(now);
                })
                .await;
            "/checkout"
        }
        UpsellType::Bundle | UpsellType::Upgrade => {
            cart.update(|c| {
                for product in accepted.catalog_targets(catalog) {
                    if let Err(e) = c.add_from_catalog(catalog, product.id.as_str(), 1) {
                        tracing::warn!(product_id = %product.id, error = %e, "Offer target not added");
                    }
                }
            })
            .await;
            flash
                .set(Flash::success("Oferta adicionada!").with_detail(accepted.title))
                .await;
            "/carrinho"
        }
    };

    tracker
        .track(
            now,
            TrackedEvent::new(accepted.id, UpsellAction::Accept, context)
                .with_cart_value(current.subtotal()),
        )
        .await;
    add_breadcrumb("upsell", "Offer accepted", Some(&[("offer_id", accepted.id)]));

    Ok(Redirect::to(redirect_to))
}

/// Record an interaction reported by the page.
#[instrument(skip(state, tracker))]
pub async fn record_event(
    State(state): State<AppState>,
    tracker: UpsellTracker,
    Json(payload): Json<EventPayload>,
) -> StatusCode {
    let mut event = TrackedEvent::new(payload.offer_id, payload.action, payload.context);
    if let Some(code) = payload.order_code {
        event = event.with_order(code);
    }
    if let Some(value) = payload.cart_value {
        event = event.with_cart_value(value);
    }
    tracker.track(state.now(), event).await;
    StatusCode::NO_CONTENT
}

/// Impressions, accepts and acceptance rate per offer for this visitor.
#[instrument(skip(tracker))]
pub async fn metrics(tracker: UpsellTracker) -> Json<BTreeMap<String, OfferMetrics>> {
    Json(tracker.log().await.metrics())
}
