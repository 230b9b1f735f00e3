//! Authentication extractors.
//!
//! Authentication is mocked: the visitor's [`AuthState`] lives in the
//! session and any profile stored there counts as logged in.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use essence_arabe_core::account::{AuthState, CustomerProfile};

use crate::services::AuthStore;

/// Login page path.
pub const LOGIN_PATH: &str = "/entrar";

/// Extractor that requires a logged-in visitor.
///
/// Without a profile in the session, redirects to `/entrar?next=<path>`.
///
/// ```rust,ignore
/// async fn account_home(RequireAuth(profile): RequireAuth) -> impl IntoResponse {
///     format!("Olá, {}!", profile.first_name())
/// }
/// ```
pub struct RequireAuth(pub CustomerProfile);

/// Rejection when authentication is required.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page, returning to `next` afterwards.
    RedirectToLogin { next: String },
    /// No session layer is installed.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => {
                Redirect::to(&login_redirect_url(&next)).into_response()
            }
            Self::MissingSession => {
                tracing::error!("Session layer missing for authenticated route");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// `/entrar?next=<encoded path>`.
#[must_use]
pub fn login_redirect_url(next: &str) -> String {
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(next))
}

async fn load_auth(parts: &Parts) -> Option<AuthState> {
    let session = parts.extensions.get::<Session>()?.clone();
    Some(AuthStore::new(session).load().await)
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = load_auth(parts).await.ok_or(AuthRejection::MissingSession)?;

        auth.current().cloned().map(Self).ok_or_else(|| {
            // Nested routers see a stripped URI; the original keeps `/conta`.
            let uri = parts
                .extensions
                .get::<OriginalUri>()
                .map_or(&parts.uri, |original| &original.0);
            let next = uri
                .path_and_query()
                .map_or_else(|| uri.path().to_string(), ToString::to_string);
            AuthRejection::RedirectToLogin { next }
        })
    }
}

/// Extractor that optionally gets the logged-in visitor's profile.
pub struct OptionalAuth(pub Option<CustomerProfile>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let profile = load_auth(parts)
            .await
            .and_then(|auth| auth.current().cloned());
        Ok(Self(profile))
    }
}

/// Sanitize a post-login redirect target to a local path.
///
/// The result always fits in a `Location` header.
#[must_use]
pub fn safe_next(next: Option<&str>) -> String {
    match next.map(str::trim) {
        Some(path) if is_local_path(path) => path.to_string(),
        _ => "/conta".to_string(),
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && path.is_ascii()
        && !path.chars().any(char::is_control)
}
