//! Upsell event log and acceptance metrics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::OfferId;
use crate::upsell::{UpsellAction, UpsellContext};

/// Events kept per visitor; older ones are dropped first.
pub const MAX_EVENTS: usize = 100;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// One recorded interaction with an offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsellEvent {
    pub ts: DateTime<Utc>,
    pub session_id: String,
    pub offer_id: OfferId,
    pub action: UpsellAction,
    pub context: UpsellContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_value: Option<Decimal>,
}

/// Bounded, append-only event log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<UpsellEvent>,
}

/// Per-offer counters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct OfferMetrics {
    pub impressions: u32,
    pub accepts: u32,
    /// `accepts / impressions`, zero without impressions.
    pub rate: f64,
}

impl EventLog {
    /// Append an event, keeping the newest [`MAX_EVENTS`].
    pub fn push(&mut self, event: UpsellEvent) {
        self.events.push(event);
        if self.events.len() > MAX_EVENTS {
            let overflow = self.events.len() - MAX_EVENTS;
            self.events.drain(..overflow);
        }
    }

    #[must_use]
    pub fn events(&self) -> &[UpsellEvent] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Impressions, accepts and acceptance rate per offer id.
    #[must_use]
    pub fn metrics(&self) -> BTreeMap<String, OfferMetrics> {
        let mut metrics: BTreeMap<String, OfferMetrics> = BTreeMap::new();

        for event in &self.events {
            let entry = match event.action {
                UpsellAction::Impression | UpsellAction::Accept => metrics
                    .entry(event.offer_id.as_str().to_string())
                    .or_default(),
                UpsellAction::Click | UpsellAction::Decline => continue,
            };
            if event.action == UpsellAction::Impression {
                entry.impressions += 1;
            } else {
                entry.accepts += 1;
            }
        }

        for entry in metrics.values_mut() {
            entry.rate = if entry.impressions > 0 {
                f64::from(entry.accepts) / f64::from(entry.impressions)
            } else {
                0.0
            };
        }
        metrics
    }
}

/// New visitor session id: `session-<millis>-<9 base36 chars>`.
pub fn generate_session_id<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: String = (0..9)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect();
    format!("session-{}-{suffix}", now.timestamp_millis())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn event(offer: &str, action: UpsellAction) -> UpsellEvent {
        UpsellEvent {
            ts: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            session_id: "session-1".into(),
            offer_id: OfferId::new(offer),
            action,
            context: UpsellContext::Cart,
            order_code: None,
            cart_value: Some(Decimal::from(269)),
        }
    }

    #[test]
    fn test_log_keeps_last_hundred() {
        let mut log = EventLog::default();
        for i in 0..105 {
            log.push(event(&format!("OFFER_{i}"), UpsellAction::Impression));
        }
        assert_eq!(log.len(), MAX_EVENTS);
        assert_eq!(log.events()[0].offer_id.as_str(), "OFFER_5");
        assert_eq!(log.events()[99].offer_id.as_str(), "OFFER_104");
    }

    #[test]
    fn test_metrics_rate() {
        let mut log = EventLog::default();
        log.push(event("A", UpsellAction::Impression));
        log.push(event("A", UpsellAction::Impression));
        log.push(event("A", UpsellAction::Click));
        log.push(event("A", UpsellAction::Accept));
        log.push(event("B", UpsellAction::Accept));
        log.push(event("C", UpsellAction::Decline));

        let metrics = log.metrics();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics["A"].impressions, 2);
        assert_eq!(metrics["A"].accepts, 1);
        assert_eq!(metrics["A"].rate, 0.5);
        assert_eq!(metrics["B"].rate, 0.0);
    }

    #[test]
    fn test_session_id_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc.timestamp_millis_opt(1_772_366_400_000).unwrap();
        let id = generate_session_id(now, &mut rng);

        let suffix = id.strip_prefix("session-1772366400000-").unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_event_storage_format() {
        let json = serde_json::to_value(event("A", UpsellAction::Accept)).unwrap();
        assert_eq!(json["action"], "ACCEPT");
        assert_eq!(json["context"], "CART");
        assert!(json.get("order_code").is_none());
    }
}
