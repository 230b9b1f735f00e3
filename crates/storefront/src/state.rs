//! Application state shared across handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use essence_arabe_core::{Catalog, Clock, SystemClock};

use crate::config::StorefrontConfig;
use crate::services::Latency;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The catalog is built once at
/// startup; everything per-visitor lives in the session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    clock: Arc<dyn Clock>,
    latency: Latency,
}

impl AppState {
    /// Create state backed by the system clock.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create state with an explicit time source.
    #[must_use]
    pub fn with_clock(config: StorefrontConfig, clock: Arc<dyn Clock>) -> Self {
        let latency = Latency::new(config.simulated_latency);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog: Catalog::new(),
                clock,
                latency,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Current time from the configured clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    /// Delay applied to mocked network calls.
    #[must_use]
    pub fn latency(&self) -> &Latency {
        &self.inner.latency
    }
}
