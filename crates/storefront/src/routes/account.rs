//! Account route handlers.
//!
//! These routes require authentication. Profile data comes from the auth
//! session; addresses, orders and preferences from the customer store.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, RawForm, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use essence_arabe_core::OrderStatus;
use essence_arabe_core::account::{
    Address, CATEGORY_OPTIONS, CustomerData, CustomerPreferences, CustomerProfile, NewAddress,
    OrderFilter, ProfileUpdate, referral_code, referral_link,
};
use essence_arabe_core::coupon::COUPONS;
use essence_arabe_core::types::AddressLabel;
use essence_arabe_core::validate::FieldErrors;

use super::layout::Layout;
use super::views::{OptionView, OrderView};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::Flash;
use crate::services::{AuthStore, CustomerStore, FlashStore};
use crate::state::AppState;

const ADDRESSES_PATH: &str = "/conta/enderecos";
const RECENT_ORDERS: usize = 3;

// =============================================================================
// Display Types
// =============================================================================

/// Profile display and edit data.
#[derive(Clone)]
pub struct ProfileView {
    pub first_name: String,
    pub full_name: String,
    pub email: String,
    pub whatsapp: String,
    pub member_since: String,
}

impl From<&CustomerProfile> for ProfileView {
    fn from(profile: &CustomerProfile) -> Self {
        Self {
            first_name: profile.first_name().to_string(),
            full_name: profile.full_name.clone(),
            email: profile.email.clone().unwrap_or_default(),
            whatsapp: profile.whatsapp.clone(),
            member_since: profile.created_at.format("%d/%m/%Y").to_string(),
        }
    }
}

/// Saved address display data.
#[derive(Clone)]
pub struct AddressView {
    pub id: String,
    pub label: String,
    pub street: String,
    pub city_line: String,
    pub reference: Option<String>,
    pub is_default: bool,
}

impl From<&Address> for AddressView {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id.to_string(),
            label: address.label.to_string(),
            street: match &address.address_line2 {
                Some(extra) => format!("{}, {extra}", address.address_line1),
                None => address.address_line1.clone(),
            },
            city_line: format!(
                "{} - {}, {}/{}",
                address.neighborhood, address.cep, address.city, address.state
            ),
            reference: address.reference.clone(),
            is_default: address.is_default,
        }
    }
}

/// One coupon table row.
#[derive(Clone)]
pub struct CouponRow {
    pub code: &'static str,
    pub label: String,
    pub description: Option<&'static str>,
    pub min_purchase: Option<Decimal>,
}

fn address_label_options(selected: Option<AddressLabel>) -> Vec<OptionView> {
    [AddressLabel::Casa, AddressLabel::Trabalho, AddressLabel::Outro]
        .into_iter()
        .map(|label| {
            let value = label.to_string();
            OptionView::new(value.clone(), value, selected.unwrap_or_default() == label)
        })
        .collect()
}

// =============================================================================
// Templates
// =============================================================================

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/home.html")]
pub struct AccountHomeTemplate {
    pub layout: Layout,
    pub profile: ProfileView,
    pub recent_orders: Vec<OrderView>,
    pub default_address: Option<AddressView>,
    pub errors: FieldErrors,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub layout: Layout,
    pub orders: Vec<OrderView>,
    pub search: String,
    pub statuses: Vec<OptionView>,
    pub is_filtered: bool,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/order.html")]
pub struct OrderDetailTemplate {
    pub layout: Layout,
    pub code: String,
    pub order: Option<OrderView>,
}

/// Address book page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/addresses.html")]
pub struct AddressesTemplate {
    pub layout: Layout,
    pub addresses: Vec<AddressView>,
    pub labels: Vec<OptionView>,
    pub form: NewAddress,
    pub errors: FieldErrors,
}

/// Coupon list page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/coupons.html")]
pub struct CouponsTemplate {
    pub layout: Layout,
    pub coupons: Vec<CouponRow>,
}

/// Referral page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/referrals.html")]
pub struct ReferralsTemplate {
    pub layout: Layout,
    pub link: String,
    pub code: String,
}

/// Preferences page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/preferences.html")]
pub struct PreferencesTemplate {
    pub layout: Layout,
    pub receive_whatsapp_updates: bool,
    pub receive_email_updates: bool,
    pub categories: Vec<OptionView>,
}

// =============================================================================
// Form Types
// =============================================================================

/// Profile edit form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub whatsapp: String,
}

/// Order history filters.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    #[serde(default)]
    pub q: String,
    pub status: Option<String>,
}

/// Parse the preferences form. Categories repeat under one key, so the
/// body is read pair by pair; unknown categories are dropped.
#[must_use]
pub fn parse_preferences(body: &[u8]) -> CustomerPreferences {
    let mut preferences = CustomerPreferences {
        receive_whatsapp_updates: false,
        receive_email_updates: false,
        favorite_categories: Vec::new(),
    };
    for (key, value) in url::form_urlencoded::parse(body) {
        match key.as_ref() {
            "receive_whatsapp_updates" => preferences.receive_whatsapp_updates = true,
            "receive_email_updates" => preferences.receive_email_updates = true,
            "favorite_categories" => {
                if let Some(category) = CATEGORY_OPTIONS.iter().find(|c| **c == value)
                    && !preferences.favorite_categories.iter().any(|c| c == category)
                {
                    preferences.favorite_categories.push((*category).to_string());
                }
            }
            _ => {}
        }
    }
    preferences
}

// =============================================================================
// Overview
// =============================================================================

fn home_template(
    layout: Layout,
    profile: &CustomerProfile,
    data: &CustomerData,
    errors: FieldErrors,
) -> AccountHomeTemplate {
    AccountHomeTemplate {
        layout,
        profile: ProfileView::from(profile),
        recent_orders: data
            .recent_orders(RECENT_ORDERS)
            .into_iter()
            .map(OrderView::from)
            .collect(),
        default_address: data.default_address().map(AddressView::from),
        errors,
    }
}

/// Display account overview page.
#[instrument(skip_all)]
pub async fn home(
    layout: Layout,
    RequireAuth(profile): RequireAuth,
    customer: CustomerStore,
) -> impl IntoResponse {
    let data = customer.load().await;
    home_template(layout, &profile, &data, FieldErrors::new())
}

/// Update the profile from the overview form.
#[instrument(skip_all)]
pub async fn update_profile(
    State(state): State<AppState>,
    layout: Layout,
    RequireAuth(profile): RequireAuth,
    auth: AuthStore,
    customer: CustomerStore,
    flash: FlashStore,
    Form(form): Form<ProfileForm>,
) -> Response {
    match ProfileUpdate::parse(&form.full_name, &form.email, &form.whatsapp) {
        Ok(update) => {
            auth.update(|a| a.update_profile(update, state.now())).await;
            flash.set(Flash::success("Perfil atualizado")).await;
            Redirect::to("/conta").into_response()
        }
        Err(errors) => {
            let data = customer.load().await;
            let mut template = home_template(layout, &profile, &data, errors);
            template.profile.full_name = form.full_name;
            template.profile.email = form.email;
            template.profile.whatsapp = form.whatsapp;
            (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Display the order history with search and status filter.
#[instrument(skip(layout, customer, _auth))]
pub async fn orders(
    layout: Layout,
    _auth: RequireAuth,
    customer: CustomerStore,
    Query(query): Query<OrdersQuery>,
) -> impl IntoResponse {
    let status = query
        .status
        .as_deref()
        .and_then(|s| s.parse::<OrderStatus>().ok());
    let filter = OrderFilter {
        search: query.q.trim().to_string(),
        status,
    };
    let data = customer.load().await;

    OrdersTemplate {
        layout,
        orders: data
            .orders_matching(&filter)
            .into_iter()
            .map(OrderView::from)
            .collect(),
        is_filtered: !filter.search.is_empty() || status.is_some(),
        search: filter.search,
        statuses: OrderStatus::ALL
            .into_iter()
            .map(|s| OptionView::new(s.code(), s.label(), status == Some(s)))
            .collect(),
    }
}

/// Display one order. Unknown codes render a not-found message.
#[instrument(skip(layout, customer, _auth))]
pub async fn order_detail(
    layout: Layout,
    _auth: RequireAuth,
    customer: CustomerStore,
    Path(code): Path<String>,
) -> Response {
    let data = customer.load().await;
    let order = data.find_order(&code).map(OrderView::from);
    let status = if order.is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    (status, OrderDetailTemplate { layout, code, order }).into_response()
}

// =============================================================================
// Addresses
// =============================================================================

fn addresses_template(
    layout: Layout,
    data: &CustomerData,
    form: NewAddress,
    errors: FieldErrors,
) -> AddressesTemplate {
    AddressesTemplate {
        layout,
        addresses: data.addresses.iter().map(AddressView::from).collect(),
        labels: address_label_options(form.label),
        form,
        errors,
    }
}

/// Display the address book.
#[instrument(skip_all)]
pub async fn addresses(
    layout: Layout,
    _auth: RequireAuth,
    customer: CustomerStore,
) -> impl IntoResponse {
    let data = customer.load().await;
    addresses_template(layout, &data, NewAddress::default(), FieldErrors::new())
}

/// Save a new address. The first one saved becomes the default.
#[instrument(skip_all)]
pub async fn add_address(
    State(state): State<AppState>,
    layout: Layout,
    _auth: RequireAuth,
    customer: CustomerStore,
    flash: FlashStore,
    Form(form): Form<NewAddress>,
) -> Response {
    if let Err(errors) = form.validate() {
        let data = customer.load().await;
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            addresses_template(layout, &data, form, errors),
        )
            .into_response();
    }

    let now = state.now();
    let id = customer.update(|data| data.add_address(form, now)).await;
    tracing::info!(address_id = %id, "Address saved");
    flash.set(Flash::success("Endereço salvo")).await;
    Redirect::to(ADDRESSES_PATH).into_response()
}

/// Make an address the default.
#[instrument(skip(customer, flash, _auth))]
pub async fn set_default_address(
    _auth: RequireAuth,
    customer: CustomerStore,
    flash: FlashStore,
    Path(id): Path<String>,
) -> Redirect {
    customer.update(|data| data.set_default_address(&id)).await;
    flash.set(Flash::success("Endereço padrão atualizado")).await;
    Redirect::to(ADDRESSES_PATH)
}

/// Remove an address.
#[instrument(skip(customer, flash, _auth))]
pub async fn remove_address(
    _auth: RequireAuth,
    customer: CustomerStore,
    flash: FlashStore,
    Path(id): Path<String>,
) -> Redirect {
    customer.update(|data| data.remove_address(&id)).await;
    flash.set(Flash::success("Endereço removido")).await;
    Redirect::to(ADDRESSES_PATH)
}

// =============================================================================
// Coupons, referrals, preferences
// =============================================================================

/// Display the coupon table.
#[instrument(skip_all)]
pub async fn coupons(layout: Layout, _auth: RequireAuth) -> impl IntoResponse {
    CouponsTemplate {
        layout,
        coupons: COUPONS
            .iter()
            .map(|c| CouponRow {
                code: c.code,
                label: c.discount.label(),
                description: c.description,
                min_purchase: c.min_purchase,
            })
            .collect(),
    }
}

/// Display the referral link and code.
#[instrument(skip_all)]
pub async fn referrals(layout: Layout, RequireAuth(profile): RequireAuth) -> impl IntoResponse {
    ReferralsTemplate {
        layout,
        link: referral_link(Some(&profile)),
        code: referral_code(Some(&profile)),
    }
}

/// Display notification and taste preferences.
#[instrument(skip_all)]
pub async fn preferences(
    layout: Layout,
    _auth: RequireAuth,
    customer: CustomerStore,
) -> impl IntoResponse {
    let preferences = customer.load().await.preferences;
    PreferencesTemplate {
        layout,
        receive_whatsapp_updates: preferences.receive_whatsapp_updates,
        receive_email_updates: preferences.receive_email_updates,
        categories: CATEGORY_OPTIONS
            .iter()
            .map(|c| {
                let selected = preferences.favorite_categories.iter().any(|f| f == c);
                OptionView::new(*c, *c, selected)
            })
            .collect(),
    }
}

/// Save preferences.
#[instrument(skip_all)]
pub async fn update_preferences(
    _auth: RequireAuth,
    customer: CustomerStore,
    flash: FlashStore,
    RawForm(body): RawForm,
) -> Redirect {
    let preferences = parse_preferences(&body);
    customer
        .update(|data| data.update_preferences(preferences))
        .await;
    flash.set(Flash::success("Preferências salvas")).await;
    Redirect::to("/conta/preferencias")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preferences_collects_known_categories() {
        let prefs = parse_preferences(
            b"receive_email_updates=on&favorite_categories=Doce&favorite_categories=Amadeirado&favorite_categories=Inexistente&favorite_categories=Doce",
        );
        assert!(!prefs.receive_whatsapp_updates);
        assert!(prefs.receive_email_updates);
        assert_eq!(prefs.favorite_categories, vec!["Doce", "Amadeirado"]);
    }

    #[test]
    fn test_parse_preferences_empty_body_turns_everything_off() {
        let prefs = parse_preferences(b"");
        assert!(!prefs.receive_whatsapp_updates);
        assert!(prefs.favorite_categories.is_empty());
    }

    #[test]
    fn test_address_label_options_default_to_casa() {
        let options = address_label_options(None);
        assert_eq!(options.len(), 3);
        assert!(options[0].selected);
        assert!(!options[1].selected);
    }
}
