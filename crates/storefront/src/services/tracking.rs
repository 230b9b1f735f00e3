//! Upsell event recording.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tower_sessions::Session;

use essence_arabe_core::tracking::{EventLog, UpsellEvent};
use essence_arabe_core::types::OfferId;
use essence_arabe_core::upsell::{UpsellAction, UpsellContext, UpsellOffer};

use super::store::{EventStore, SessionIdStore};

/// An interaction to record, before it is stamped with time and session.
#[derive(Debug, Clone)]
pub struct TrackedEvent {
    pub offer_id: String,
    pub action: UpsellAction,
    pub context: UpsellContext,
    pub order_code: Option<String>,
    pub cart_value: Option<Decimal>,
}

impl TrackedEvent {
    #[must_use]
    pub fn new(offer_id: impl Into<String>, action: UpsellAction, context: UpsellContext) -> Self {
        Self {
            offer_id: offer_id.into(),
            action,
            context,
            order_code: None,
            cart_value: None,
        }
    }

    #[must_use]
    pub fn with_order(mut self, order_code: impl Into<String>) -> Self {
        self.order_code = Some(order_code.into());
        self
    }

    #[must_use]
    pub const fn with_cart_value(mut self, value: Decimal) -> Self {
        self.cart_value = Some(value);
        self
    }
}

/// Appends upsell events to the visitor's log.
#[derive(Clone)]
pub struct UpsellTracker {
    events: EventStore,
    session_ids: SessionIdStore,
}

impl UpsellTracker {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            events: EventStore::new(session.clone()),
            session_ids: SessionIdStore::new(session),
        }
    }

    /// Record one event.
    pub async fn track(&self, now: DateTime<Utc>, event: TrackedEvent) {
        self.track_all(now, vec![event]).await;
    }

    /// Record an impression for each rendered offer.
    pub async fn impressions(
        &self,
        now: DateTime<Utc>,
        offers: &[&UpsellOffer],
        context: UpsellContext,
        cart_value: Decimal,
    ) {
        if offers.is_empty() {
            return;
        }
        let events = offers
            .iter()
            .map(|offer| {
                TrackedEvent::new(offer.id, UpsellAction::Impression, context)
                    .with_cart_value(cart_value)
            })
            .collect();
        self.track_all(now, events).await;
    }

    /// The stored log.
    pub async fn log(&self) -> EventLog {
        self.events.load().await
    }

    async fn track_all(&self, now: DateTime<Utc>, events: Vec<TrackedEvent>) {
        let session_id = self.session_ids.get_or_create(now).await;
        tracing::debug!(count = events.len(), %session_id, "Recording upsell events");

        self.events
            .update(|log| {
                for event in events {
                    log.push(UpsellEvent {
                        ts: now,
                        session_id: session_id.clone(),
                        offer_id: OfferId::new(event.offer_id),
                        action: event.action,
                        context: event.context,
                        order_code: event.order_code,
                        cart_value: event.cart_value,
                    });
                }
            })
            .await;
    }
}

impl<S> FromRequestParts<S> for UpsellTracker
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await.map(Self::new)
    }
}
