//! Session-related types.
//!
//! Every piece of visitor state lives in the session under one of
//! [`keys`], serialized as JSON.

use serde::{Deserialize, Serialize};

/// Session keys for visitor state.
pub mod keys {
    /// Cart lines and applied coupon.
    pub const CART: &str = "EA_CART_V1";

    /// Mocked auth session and profile.
    pub const AUTH_SESSION: &str = "EA_AUTH_SESSION_V1";

    /// Addresses, orders and preferences.
    pub const CUSTOMER_DATA: &str = "EA_CUSTOMER_DATA_V1";

    /// In-progress checkout.
    pub const CHECKOUT_DRAFT: &str = "EA_CHECKOUT_DRAFT_V1";

    /// Upsell interaction log.
    pub const UPSELL_EVENTS: &str = "EA_UPSELL_EVENTS_V1";

    /// Visitor session id used in upsell events.
    pub const SESSION_ID: &str = "EA_SESSION_ID";

    /// One-shot toast shown on the next rendered page.
    pub const FLASH: &str = "EA_FLASH";
}

/// Toast tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// A toast message carried across a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub title: String,
    #[serde(default)]
    pub detail: Option<String>,
}

impl Flash {
    #[must_use]
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            title: title.into(),
            detail: None,
        }
    }

    #[must_use]
    pub fn error(title: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            title: title.into(),
            detail: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// CSS modifier for the toast.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.kind {
            FlashKind::Success => "toast-success",
            FlashKind::Error => "toast-error",
        }
    }
}
