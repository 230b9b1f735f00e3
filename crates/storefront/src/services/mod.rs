//! Services used by the route handlers.
//!
//! # Services
//!
//! - [`store`] - Typed, session-backed visitor state (one store per key)
//! - [`tracking`] - Upsell event recording
//! - [`whatsapp`] - Outbound WhatsApp links
//! - [`latency`] - Simulated delay for mocked network calls

pub mod latency;
pub mod store;
pub mod tracking;
pub mod whatsapp;

pub use latency::Latency;
pub use store::{
    AuthStore, CartStore, CustomerStore, DraftStore, EventStore, FlashStore, SessionIdStore, Store,
};
pub use tracking::UpsellTracker;
