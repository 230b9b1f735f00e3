//! Authentication route handlers.
//!
//! Login, signup and password recovery are mocked: any well-formed
//! credential is accepted and a profile is built from the form. The
//! profile lives in the session until logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use essence_arabe_core::account::{
    LoginError, SignupForm, is_valid_recovery_identifier, login_profile,
};
use essence_arabe_core::validate::FieldErrors;

use super::layout::Layout;
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::middleware::auth::safe_next;
use crate::models::Flash;
use crate::services::{AuthStore, CustomerStore, FlashStore};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Password recovery form data.
#[derive(Debug, Deserialize)]
pub struct RecoverForm {
    #[serde(default)]
    pub identifier: String,
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub identifier: String,
    pub next: String,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub layout: Layout,
    pub full_name: String,
    pub whatsapp: String,
    pub email: String,
    pub receive_whatsapp_updates: bool,
    pub errors: FieldErrors,
}

/// Password recovery page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/recover.html")]
pub struct RecoverTemplate {
    pub layout: Layout,
    pub identifier: String,
    pub error: Option<String>,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page. Logged-in visitors go straight to `next`.
#[instrument(skip(layout, profile))]
pub async fn login_page(
    layout: Layout,
    OptionalAuth(profile): OptionalAuth,
    Query(query): Query<NextQuery>,
) -> Response {
    let next = safe_next(query.next.as_deref());
    if profile.is_some() {
        return Redirect::to(&next).into_response();
    }
    LoginTemplate {
        layout,
        identifier: String::new(),
        next,
        errors: FieldErrors::new(),
        error: None,
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    layout: Layout,
    auth: AuthStore,
    flash: FlashStore,
    Form(form): Form<LoginForm>,
) -> Response {
    state.latency().simulate().await;
    let next = safe_next(form.next.as_deref());

    match login_profile(&form.identifier, &form.password, state.now()) {
        Ok(profile) => {
            set_sentry_user(&profile.id, profile.email.as_deref());
            add_breadcrumb("auth", "Customer logged in", None);
            tracing::info!(customer_id = %profile.id, "Customer logged in");

            auth.update(|a| a.login(profile)).await;
            flash.set(Flash::success("Login realizado!")).await;
            Redirect::to(&next).into_response()
        }
        Err(e) => {
            let mut errors = FieldErrors::new();
            let error = match e {
                LoginError::MissingIdentifier => {
                    errors.add("identifier", e.to_string());
                    None
                }
                LoginError::MissingPassword => {
                    errors.add("password", e.to_string());
                    None
                }
                LoginError::InvalidCredential => {
                    Some(format!("{e}. Use um email ou WhatsApp válido."))
                }
            };
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                LoginTemplate {
                    layout,
                    identifier: form.identifier,
                    next,
                    errors,
                    error,
                },
            )
                .into_response()
        }
    }
}

/// Log out and return to the home page.
#[instrument(skip(auth, flash))]
pub async fn logout(auth: AuthStore, flash: FlashStore) -> Redirect {
    auth.update(essence_arabe_core::account::AuthState::logout)
        .await;
    clear_sentry_user();
    flash.set(Flash::success("Você saiu da sua conta")).await;
    Redirect::to("/")
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
#[instrument(skip(layout))]
pub async fn signup_page(layout: Layout) -> impl IntoResponse {
    SignupTemplate {
        layout,
        full_name: String::new(),
        whatsapp: String::new(),
        email: String::new(),
        receive_whatsapp_updates: true,
        errors: FieldErrors::new(),
    }
}

/// Handle signup form submission.
///
/// The WhatsApp-updates checkbox is stored as the customer's preference.
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    layout: Layout,
    auth: AuthStore,
    customer: CustomerStore,
    flash: FlashStore,
    Form(form): Form<SignupForm>,
) -> Response {
    state.latency().simulate().await;
    let wants_updates = form.wants_whatsapp_updates();
    let (full_name, whatsapp, email) = (
        form.full_name.clone(),
        form.whatsapp.clone(),
        form.email.clone(),
    );

    match form.into_profile(state.now()) {
        Ok(profile) => {
            set_sentry_user(&profile.id, profile.email.as_deref());
            tracing::info!(customer_id = %profile.id, "Customer signed up");

            customer
                .update(|data| data.preferences.receive_whatsapp_updates = wants_updates)
                .await;
            auth.update(|a| a.login(profile)).await;
            flash
                .set(Flash::success("Conta criada!").with_detail("Bem-vindo à Essence Árabe!"))
                .await;
            Redirect::to("/conta").into_response()
        }
        Err(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            SignupTemplate {
                layout,
                full_name,
                whatsapp,
                email,
                receive_whatsapp_updates: wants_updates,
                errors,
            },
        )
            .into_response(),
    }
}

// =============================================================================
// Password Recovery Routes
// =============================================================================

/// Display the password recovery page.
#[instrument(skip(layout))]
pub async fn recover_page(layout: Layout) -> impl IntoResponse {
    RecoverTemplate {
        layout,
        identifier: String::new(),
        error: None,
    }
}

/// Handle password recovery. Nothing is sent.
#[instrument(skip_all)]
pub async fn recover(
    State(state): State<AppState>,
    layout: Layout,
    flash: FlashStore,
    Form(form): Form<RecoverForm>,
) -> Response {
    state.latency().simulate().await;

    if is_valid_recovery_identifier(&form.identifier) {
        flash
            .set(
                Flash::success("Instruções enviadas!")
                    .with_detail("Verifique seu email ou WhatsApp."),
            )
            .await;
        return Redirect::to(crate::middleware::auth::LOGIN_PATH).into_response();
    }

    (
        StatusCode::UNPROCESSABLE_ENTITY,
        RecoverTemplate {
            layout,
            identifier: form.identifier,
            error: Some("Credencial inválida. Use um email ou WhatsApp válido.".to_string()),
        },
    )
        .into_response()
}
