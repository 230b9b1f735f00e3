//! Cart route handlers.
//!
//! Cart mutations are plain form posts that redirect back to the cart page.
//! Adding from a listing also answers HTMX requests with the count badge
//! fragment and an `HX-Trigger` so other elements can refresh.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use essence_arabe_core::coupon::{CouponError, validate_coupon};
use essence_arabe_core::upsell::{UpsellContext, eligible_offers};

use super::layout::Layout;
use super::views::{CartView, OfferCard};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::models::Flash;
use crate::services::{CartStore, FlashStore, UpsellTracker, whatsapp};
use crate::state::AppState;

const CART_PATH: &str = "/carrinho";

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
}

/// Form naming a single cart line.
#[derive(Debug, Deserialize)]
pub struct LineForm {
    pub product_id: String,
}

/// Set-quantity form data.
#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub product_id: String,
    pub quantity: u32,
}

/// Coupon form data.
#[derive(Debug, Deserialize)]
pub struct CouponForm {
    #[serde(default)]
    pub code: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub cart: CartView,
    pub offers: Vec<OfferCard>,
    pub whatsapp_link: Option<String>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("HX-Request")
}

/// Display the cart page with cart-context offers.
#[instrument(skip(state, layout, cart, tracker))]
pub async fn show(
    State(state): State<AppState>,
    layout: Layout,
    cart: CartStore,
    tracker: UpsellTracker,
) -> impl IntoResponse {
    let cart = cart.load().await;
    let offers = eligible_offers(
        UpsellContext::Cart,
        cart.subtotal(),
        &cart.product_ids(),
        None,
    );
    if !cart.is_empty() {
        tracker
            .impressions(state.now(), &offers, UpsellContext::Cart, cart.subtotal())
            .await;
    }

    let whatsapp_link = (!cart.is_empty()).then(|| {
        let names: Vec<&str> = cart.items.iter().map(|i| i.product.name.as_str()).collect();
        whatsapp::link(
            &state.config().whatsapp_number,
            &whatsapp::cart_abandoned_message(&names),
        )
    });

    CartShowTemplate {
        layout,
        offers: if cart.is_empty() {
            Vec::new()
        } else {
            OfferCard::all(&offers, state.catalog())
        },
        cart: CartView::from(&cart),
        whatsapp_link,
    }
}

/// Add a product to the cart.
///
/// HTMX requests get the count badge fragment; everything else is
/// redirected to the cart page.
#[instrument(skip(state, cart, flash, headers))]
pub async fn add(
    State(state): State<AppState>,
    cart: CartStore,
    flash: FlashStore,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let quantity = form.quantity.unwrap_or(1);
    let result = cart
        .update(|c| {
            c.add_from_catalog(state.catalog(), &form.product_id, quantity)
                .map(|()| c.total_items())
        })
        .await;

    match result {
        Ok(count) => {
            add_breadcrumb("cart", "Added product", Some(&[("product_id", form.product_id.as_str())]));
            if is_htmx(&headers) {
                return (
                    AppendHeaders([("HX-Trigger", "cart-updated")]),
                    CartCountTemplate { count },
                )
                    .into_response();
            }
            let name = state.catalog().title_of(&form.product_id).unwrap_or_default();
            flash
                .set(Flash::success("Adicionado ao carrinho").with_detail(name))
                .await;
        }
        Err(e) => {
            tracing::info!(product_id = %form.product_id, error = %e, "Add to cart rejected");
            flash.set(Flash::error(e.to_string())).await;
        }
    }
    Redirect::to(CART_PATH).into_response()
}

/// Flash why the applied coupon was dropped after a mutation, if it was.
async fn flash_dropped_coupon(flash: &FlashStore, dropped: Option<CouponError>) {
    if let Some(e) = dropped {
        flash
            .set(Flash::error("Cupom removido").with_detail(e.to_string()))
            .await;
    }
}

/// Increase a line by one.
#[instrument(skip(cart))]
pub async fn increment(cart: CartStore, Form(form): Form<LineForm>) -> Redirect {
    cart.update(|c| c.increment(&form.product_id)).await;
    Redirect::to(CART_PATH)
}

/// Decrease a line by one, removing it at quantity 1.
///
/// A coupon whose minimum purchase is no longer met is dropped.
#[instrument(skip(cart, flash))]
pub async fn decrement(
    cart: CartStore,
    flash: FlashStore,
    Form(form): Form<LineForm>,
) -> Redirect {
    let dropped = cart
        .update(|c| {
            c.decrement(&form.product_id);
            c.recheck_coupon().err()
        })
        .await;
    flash_dropped_coupon(&flash, dropped).await;
    Redirect::to(CART_PATH)
}

/// Set a line's quantity; zero removes it.
#[instrument(skip(cart, flash))]
pub async fn set_quantity(
    cart: CartStore,
    flash: FlashStore,
    Form(form): Form<QuantityForm>,
) -> Redirect {
    let result = cart
        .update(|c| {
            c.update_quantity(&form.product_id, form.quantity)
                .map(|()| c.recheck_coupon().err())
        })
        .await;
    match result {
        Ok(dropped) => flash_dropped_coupon(&flash, dropped).await,
        Err(e) => flash.set(Flash::error(e.to_string())).await,
    }
    Redirect::to(CART_PATH)
}

/// Remove a line.
#[instrument(skip(cart, flash))]
pub async fn remove(
    cart: CartStore,
    flash: FlashStore,
    Form(form): Form<LineForm>,
) -> Redirect {
    let dropped = cart
        .update(|c| {
            c.remove_item(&form.product_id);
            c.recheck_coupon().err()
        })
        .await;
    flash_dropped_coupon(&flash, dropped).await;
    Redirect::to(CART_PATH)
}

/// Apply a coupon code, or flash the rejection reason.
#[instrument(skip(cart, flash))]
pub async fn apply_coupon(
    cart: CartStore,
    flash: FlashStore,
    Form(form): Form<CouponForm>,
) -> Redirect {
    let message = cart
        .update(|c| match validate_coupon(&form.code, c.subtotal()) {
            Ok(coupon) => {
                c.apply_coupon(coupon);
                Flash::success("Cupom aplicado!").with_detail(coupon.discount.label())
            }
            Err(e) => Flash::error(e.to_string()),
        })
        .await;
    flash.set(message).await;
    Redirect::to(CART_PATH)
}

/// Drop the applied coupon.
#[instrument(skip(cart))]
pub async fn remove_coupon(cart: CartStore) -> Redirect {
    cart.update(essence_arabe_core::Cart::remove_coupon).await;
    Redirect::to(CART_PATH)
}

/// Cart count badge (HTMX).
#[instrument(skip(cart))]
pub async fn count(cart: CartStore) -> impl IntoResponse {
    CartCountTemplate {
        count: cart.load().await.total_items(),
    }
}
