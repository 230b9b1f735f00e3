//! Order confirmation and the one-time post-purchase offer.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use tracing::instrument;

use essence_arabe_core::upsell::{
    POST_PURCHASE_OFFER_ID, UpsellAction, UpsellContext, eligible_offers, offer,
};

use super::layout::Layout;
use super::views::{OfferCard, OrderView};
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::Flash;
use crate::services::tracking::TrackedEvent;
use crate::services::{CartStore, CustomerStore, FlashStore, UpsellTracker, whatsapp};
use crate::state::AppState;

/// Confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/confirmation.html")]
pub struct ConfirmationTemplate {
    pub layout: Layout,
    pub order: OrderView,
    pub offer: Option<OfferCard>,
    pub seconds_left: i64,
    pub upsell_whatsapp: String,
    pub inquiry_whatsapp: String,
}

/// Display the confirmation page.
///
/// The post-purchase offer is shown while its time limit, counted from the
/// order's creation, has not run out.
///
/// # Errors
///
/// Returns 404 for codes not in the visitor's history.
#[instrument(skip(state, layout, customer, tracker))]
pub async fn confirmation(
    State(state): State<AppState>,
    Path(code): Path<String>,
    layout: Layout,
    customer: CustomerStore,
    tracker: UpsellTracker,
) -> Result<impl IntoResponse> {
    let data = customer.load().await;
    let order = data
        .find_order(&code)
        .ok_or_else(|| AppError::NotFound(format!("Pedido {code}")))?;
    let now = state.now();

    let open_offer = eligible_offers(UpsellContext::ThankYou, order.total, &[], None)
        .into_iter()
        .find_map(|o| {
            let left = o.seconds_left(order.created_at, now).unwrap_or(i64::MAX);
            (left > 0).then_some((o, left))
        });
    if let Some((o, _)) = open_offer {
        tracker
            .track(
                now,
                TrackedEvent::new(o.id, UpsellAction::Impression, UpsellContext::ThankYou)
                    .with_order(order.order_code.clone())
                    .with_cart_value(order.total),
            )
            .await;
    }

    let number = &state.config().whatsapp_number;
    Ok(ConfirmationTemplate {
        layout,
        offer: open_offer.map(|(o, _)| OfferCard::new(o, state.catalog())),
        seconds_left: open_offer.map_or(0, |(_, left)| left),
        upsell_whatsapp: whatsapp::link(number, &whatsapp::post_purchase_message(&order.order_code)),
        inquiry_whatsapp: whatsapp::link(number, &whatsapp::order_inquiry_message(&order.order_code)),
        order: OrderView::from(order),
    })
}

/// Accept the post-purchase offer for an order.
///
/// Expired offers flash an error and return to the confirmation page.
///
/// # Errors
///
/// Returns 404 for unknown orders.
#[instrument(skip(state, customer, cart, flash, tracker))]
pub async fn accept_offer(
    State(state): State<AppState>,
    Path(code): Path<String>,
    customer: CustomerStore,
    cart: CartStore,
    flash: FlashStore,
    tracker: UpsellTracker,
) -> Result<Redirect> {
    let data = customer.load().await;
    let order = data
        .find_order(&code)
        .ok_or_else(|| AppError::NotFound(format!("Pedido {code}")))?;
    let post_purchase = offer(POST_PURCHASE_OFFER_ID)
        .ok_or_else(|| AppError::NotFound(POST_PURCHASE_OFFER_ID.to_string()))?;
    let now = state.now();

    if let Err(e) = post_purchase.ensure_open(order.created_at, now) {
        tracing::info!(order_code = %code, "Post-purchase offer expired");
        flash.set(Flash::error(e.to_string())).await;
        return Ok(Redirect::to(&format!("/pedido/{code}")));
    }

    let catalog = state.catalog();
    cart.update(|c| {
        for product in post_purchase.catalog_targets(catalog) {
            if let Err(e) = c.add_from_catalog(catalog, product.id.as_str(), 1) {
                tracing::warn!(product_id = %product.id, error = %e, "Offer target not added");
            }
        }
    })
    .await;
    tracker
        .track(
            now,
            TrackedEvent::new(post_purchase.id, UpsellAction::Accept, UpsellContext::ThankYou)
                .with_order(code.clone()),
        )
        .await;

    flash
        .set(Flash::success("Oferta adicionada!").with_detail(post_purchase.title))
        .await;
    Ok(Redirect::to("/carrinho"))
}
