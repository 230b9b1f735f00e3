//! Per-page chrome shared by every full-page template.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;

use crate::middleware::CspNonce;
use crate::models::Flash;
use crate::services::{AuthStore, CartStore, FlashStore, whatsapp};
use crate::state::AppState;

/// Header, footer and toast data for the base template.
///
/// Extracting a `Layout` consumes the pending flash message, so only
/// handlers that render a full page should ask for one.
pub struct Layout {
    pub nonce: String,
    pub cart_count: u32,
    pub customer_name: Option<String>,
    pub flash: Option<Flash>,
    pub whatsapp_link: String,
}

impl FromRequestParts<AppState> for Layout {
    type Rejection = <Session as FromRequestParts<AppState>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let nonce = parts
            .extensions
            .get::<CspNonce>()
            .map(|nonce| nonce.value().to_string())
            .unwrap_or_default();
        let session = Session::from_request_parts(parts, state).await?;

        let cart = CartStore::new(session.clone()).load().await;
        let auth = AuthStore::new(session.clone()).load().await;
        let flash = FlashStore::new(session).take().await;

        Ok(Self {
            nonce,
            cart_count: cart.total_items(),
            customer_name: auth.current().map(|p| p.first_name().to_string()),
            flash,
            whatsapp_link: whatsapp::link(
                &state.config().whatsapp_number,
                whatsapp::contact_message(),
            ),
        })
    }
}
