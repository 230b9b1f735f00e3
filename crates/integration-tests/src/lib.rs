//! Integration tests for the Essence Árabe storefront.
//!
//! The tests build the real router (templates, sessions, middleware) and
//! drive it in-process with `tower::ServiceExt::oneshot`, so no server or
//! network is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p essence-arabe-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_pages` - Page rendering, catalog filters, security headers
//! - `cart_flow` - Cart mutations and coupons
//! - `checkout_flow` - Four-step checkout, order bump, confirmation offer
//! - `auth_account` - Mocked login, signup and the account area
//! - `upsell_api` - Offer acceptance, event tracking, CEP lookup

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use chrono::{DateTime, TimeZone, Utc};
use tower::ServiceExt;

use essence_arabe_core::FixedClock;
use essence_arabe_storefront::config::StorefrontConfig;
use essence_arabe_storefront::state::AppState;

/// A fixed instant used by every test clock.
#[must_use]
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// Response status, headers and body text.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The redirect target, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// Parse the body as JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// One visitor: a router plus the session cookie it was given.
pub struct TestClient {
    router: Router,
    clock: Arc<FixedClock>,
    cookie: Option<String>,
}

impl TestClient {
    /// A fresh visitor against a fresh app with rate limiting off and the
    /// clock pinned at [`test_now`].
    #[must_use]
    pub fn new() -> Self {
        let config = StorefrontConfig {
            rate_limit: false,
            ..StorefrontConfig::default()
        };
        let clock = Arc::new(FixedClock::new(test_now()));
        let state = AppState::with_clock(config, clock.clone());
        Self {
            router: essence_arabe_storefront::app(state),
            clock,
            cookie: None,
        }
    }

    /// The app's clock, for moving time forward.
    #[must_use]
    pub fn clock(&self) -> &FixedClock {
        &self.clock
    }

    /// Send a request, carrying and updating the session cookie.
    pub async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            && let Some(pair) = set_cookie.split(';').next()
        {
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    /// POST an urlencoded form.
    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// POST a JSON body.
    pub async fn post_json(&mut self, uri: &str, value: &serde_json::Value) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Log in with a valid email.
    pub async fn login(&mut self) -> TestResponse {
        self.post_form(
            "/entrar",
            &[("identifier", "ana@example.com"), ("password", "segredo123")],
        )
        .await
    }

    /// Add a product to the cart.
    pub async fn add_to_cart(&mut self, product_id: &str, quantity: u32) -> TestResponse {
        let quantity = quantity.to_string();
        self.post_form(
            "/carrinho/adicionar",
            &[("product_id", product_id), ("quantity", &quantity)],
        )
        .await
    }

    /// Walk contact, delivery and payment with valid data.
    pub async fn fill_checkout(&mut self, add_order_bump: bool) {
        let contact = self
            .post_form(
                "/checkout/contato",
                &[
                    ("name", "Maria Silva"),
                    ("email", "maria@example.com"),
                    ("phone", "11988887777"),
                ],
            )
            .await;
        assert_eq!(contact.location(), Some("/checkout"));

        let delivery = self
            .post_form(
                "/checkout/entrega",
                &[
                    ("cep", "01310100"),
                    ("address", "Avenida Paulista"),
                    ("number", "1000"),
                    ("complement", ""),
                    ("neighborhood", "Bela Vista"),
                    ("city", "São Paulo"),
                    ("state", "SP"),
                    ("reference", ""),
                    ("shipping_method", "standard"),
                ],
            )
            .await;
        assert_eq!(delivery.location(), Some("/checkout"));

        let mut payment = vec![("method", "pix")];
        if add_order_bump {
            payment.push(("add_order_bump", "on"));
        }
        let payment = self.post_form("/checkout/pagamento", &payment).await;
        assert_eq!(payment.location(), Some("/checkout"));
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}
