//! Content Security Policy for storefront pages.
//!
//! Scripts load from `/static` and carry a per-request nonce; styles are
//! same-origin only, so templates never use inline `style` attributes.
//! Product photos come from the image CDN.

use axum::{extract::Request, middleware::Next, response::Response};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;

/// Host serving product and offer photos.
const IMAGE_HOST: &str = "https://images.unsplash.com";

/// Per-request script nonce (128 random bits, base64).
#[derive(Clone, Debug)]
pub struct CspNonce(pub String);

impl CspNonce {
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        Self(STANDARD.encode(bytes))
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Store a fresh [`CspNonce`] in the request extensions.
///
/// Runs outside `security_headers_middleware`, which reads the nonce back
/// when the response comes through.
pub async fn csp_nonce_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(CspNonce::generate());
    next.run(request).await
}

/// The policy header value. Without a nonce only same-origin scripts run.
///
/// `connect-src 'self'` covers the add-to-cart, CEP lookup and upsell
/// event requests made by `app.js`. WhatsApp links are plain navigations
/// and need no entry.
#[must_use]
pub fn content_security_policy(nonce: Option<&str>) -> String {
    let script_src = match nonce.filter(|n| !n.is_empty()) {
        Some(n) => format!("'self' 'nonce-{n}'"),
        None => "'self'".to_string(),
    };
    [
        "default-src 'none'".to_string(),
        format!("script-src {script_src}"),
        "style-src 'self'".to_string(),
        format!("img-src 'self' {IMAGE_HOST} data:"),
        "connect-src 'self'".to_string(),
        "font-src 'self'".to_string(),
        "object-src 'none'".to_string(),
        "base-uri 'self'".to_string(),
        "form-action 'self'".to_string(),
        "frame-ancestors 'none'".to_string(),
    ]
    .join("; ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_is_random_base64() {
        let a = CspNonce::generate();
        let b = CspNonce::generate();
        assert_ne!(a.value(), b.value());
        assert_eq!(STANDARD.decode(a.value()).unwrap().len(), 16);
    }

    #[test]
    fn test_policy_carries_nonce_and_image_host() {
        let csp = content_security_policy(Some("abc123"));
        assert!(csp.contains("script-src 'self' 'nonce-abc123';"));
        assert!(csp.contains("img-src 'self' https://images.unsplash.com data:;"));
        assert!(csp.contains("style-src 'self';"));
    }

    #[test]
    fn test_policy_without_nonce() {
        let csp = content_security_policy(Some(""));
        assert!(csp.contains("script-src 'self';"));
        assert!(!csp.contains("nonce-"));
        assert!(csp.ends_with("frame-ancestors 'none'"));
    }
}
