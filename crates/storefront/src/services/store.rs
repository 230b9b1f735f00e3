//! Session-backed visitor state.
//!
//! Each storage key has exactly one store type, and only that store reads
//! or writes the key. Reads that fail (missing value, corrupt JSON, store
//! error) log a warning and fall back to the default value. Failed writes
//! are logged and otherwise ignored so the request still completes.

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tower_sessions::Session;

use essence_arabe_core::account::{AuthState, CustomerData};
use essence_arabe_core::checkout::CheckoutDraft;
use essence_arabe_core::tracking::{EventLog, generate_session_id};
use essence_arabe_core::Cart;

use crate::models::{Flash, session_keys};

/// A value persisted under a fixed session key.
pub trait Stored: Serialize + DeserializeOwned + Default + Send + Sync {
    const KEY: &'static str;
}

impl Stored for Cart {
    const KEY: &'static str = session_keys::CART;
}

impl Stored for AuthState {
    const KEY: &'static str = session_keys::AUTH_SESSION;
}

impl Stored for CustomerData {
    const KEY: &'static str = session_keys::CUSTOMER_DATA;
}

impl Stored for CheckoutDraft {
    const KEY: &'static str = session_keys::CHECKOUT_DRAFT;
}

impl Stored for EventLog {
    const KEY: &'static str = session_keys::UPSELL_EVENTS;
}

impl Stored for Option<Flash> {
    const KEY: &'static str = session_keys::FLASH;
}

/// The visitor's analytics session id; empty until first generated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Stored for SessionId {
    const KEY: &'static str = session_keys::SESSION_ID;
}

/// Typed access to one session key.
pub struct Store<T> {
    session: Session,
    _value: PhantomData<fn() -> T>,
}

pub type CartStore = Store<Cart>;
pub type AuthStore = Store<AuthState>;
pub type CustomerStore = Store<CustomerData>;
pub type DraftStore = Store<CheckoutDraft>;
pub type EventStore = Store<EventLog>;
pub type FlashStore = Store<Option<Flash>>;
pub type SessionIdStore = Store<SessionId>;

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self::new(self.session.clone())
    }
}

impl<T> Store<T> {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self {
            session,
            _value: PhantomData,
        }
    }

    /// The underlying session, for building sibling stores.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }
}

impl<T: Stored> Store<T> {
    /// Read the value, or the default when absent or unreadable.
    pub async fn load(&self) -> T {
        match self.session.get::<T>(T::KEY).await {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!(key = T::KEY, error = %e, "Failed to read visitor state, using default");
                T::default()
            }
        }
    }

    /// Persist the value.
    pub async fn save(&self, value: &T) {
        if let Err(e) = self.session.insert(T::KEY, value).await {
            tracing::warn!(key = T::KEY, error = %e, "Failed to save visitor state");
        }
    }

    /// Delete the key.
    pub async fn clear(&self) {
        if let Err(e) = self.session.remove_value(T::KEY).await {
            tracing::warn!(key = T::KEY, error = %e, "Failed to clear visitor state");
        }
    }

    /// Load, mutate and save in one step.
    pub async fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut value = self.load().await;
        let result = f(&mut value);
        self.save(&value).await;
        result
    }
}

impl FlashStore {
    /// Queue a toast for the next rendered page.
    pub async fn set(&self, flash: Flash) {
        self.save(&Some(flash)).await;
    }

    /// Take the queued toast, if any.
    pub async fn take(&self) -> Option<Flash> {
        match self.session.remove::<Flash>(session_keys::FLASH).await {
            Ok(flash) => flash,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read flash message");
                None
            }
        }
    }
}

impl SessionIdStore {
    /// The visitor's session id, generated and saved on first use.
    pub async fn get_or_create(&self, now: DateTime<Utc>) -> String {
        let current = self.load().await;
        if !current.as_str().is_empty() {
            return current.0;
        }
        let id = SessionId(generate_session_id(now, &mut rand::rng()));
        self.save(&id).await;
        id.0
    }
}

impl<S, T> FromRequestParts<S> for Store<T>
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await.map(Self::new)
    }
}
