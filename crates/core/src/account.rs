//! Customer accounts: mocked authentication, profile, addresses, order
//! history and preferences.
//!
//! Nothing here talks to a backend. "Logging in" validates the shape of the
//! identifier and fabricates a profile; everything the customer saves lives
//! in their own visitor storage.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{AddressId, AddressLabel, CustomerId, OrderStatus};
use crate::validate::{
    FieldErrors, format_cep, format_phone, is_valid_cep, is_valid_email, is_valid_phone,
};

/// Display name given to profiles created through login.
pub const DEFAULT_CUSTOMER_NAME: &str = "Cliente";

const REFERRAL_BASE_URL: &str = "https://essencearabe.com/ref/";

/// Categories offered on the preferences page.
pub const CATEGORY_OPTIONS: [&str; 7] = [
    "Doce",
    "Amadeirado",
    "Fresco",
    "Árabe intenso",
    "Floral",
    "Citrico",
    "Oriental",
];

/// Login rejections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("Campo obrigatório")]
    MissingIdentifier,
    #[error("Campo obrigatório")]
    MissingPassword,
    /// Neither a valid email nor a valid phone.
    #[error("Credencial inválida")]
    InvalidCredential,
}

/// A customer's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub id: CustomerId,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub whatsapp: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomerProfile {
    /// First word of the full name, for greetings.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.full_name
            .split_whitespace()
            .next()
            .unwrap_or(DEFAULT_CUSTOMER_NAME)
    }
}

fn customer_id(now: DateTime<Utc>) -> CustomerId {
    CustomerId::new(format!("customer-{}", now.timestamp_millis()))
}

/// Authentication state of a visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub is_authenticated: bool,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
}

/// Everything stored under the auth key: session flag plus profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    pub session: AuthSession,
    #[serde(default)]
    pub profile: Option<CustomerProfile>,
}

impl AuthState {
    pub fn login(&mut self, profile: CustomerProfile) {
        self.session = AuthSession {
            is_authenticated: true,
            customer_id: Some(profile.id.clone()),
        };
        self.profile = Some(profile);
    }

    pub fn logout(&mut self) {
        *self = Self::default();
    }

    /// The profile, when logged in.
    #[must_use]
    pub fn current(&self) -> Option<&CustomerProfile> {
        if self.session.is_authenticated {
            self.profile.as_ref()
        } else {
            None
        }
    }

    /// Apply a validated profile update. Ignored when logged out.
    pub fn update_profile(&mut self, update: ProfileUpdate, now: DateTime<Utc>) {
        if let Some(profile) = self.profile.as_mut() {
            profile.full_name = update.full_name;
            profile.email = update.email;
            profile.whatsapp = update.whatsapp;
            profile.updated_at = now;
        }
    }
}

/// Accept any syntactically valid email or phone and fabricate a profile.
///
/// # Errors
///
/// Returns a [`LoginError`] for blank fields or an identifier that is
/// neither an email nor a phone.
pub fn login_profile(
    identifier: &str,
    password: &str,
    now: DateTime<Utc>,
) -> Result<CustomerProfile, LoginError> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err(LoginError::MissingIdentifier);
    }
    if password.is_empty() {
        return Err(LoginError::MissingPassword);
    }

    let is_email = is_valid_email(identifier);
    let is_phone = is_valid_phone(identifier);
    if !is_email && !is_phone {
        return Err(LoginError::InvalidCredential);
    }

    Ok(CustomerProfile {
        id: customer_id(now),
        full_name: DEFAULT_CUSTOMER_NAME.to_string(),
        email: is_email.then(|| identifier.to_string()),
        whatsapp: if is_phone {
            format_phone(identifier)
        } else {
            String::new()
        },
        created_at: now,
        updated_at: now,
    })
}

/// Whether a password-recovery identifier is acceptable.
#[must_use]
pub fn is_valid_recovery_identifier(identifier: &str) -> bool {
    let identifier = identifier.trim();
    is_valid_email(identifier) || is_valid_phone(identifier)
}

/// Submitted signup form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    pub full_name: String,
    pub whatsapp: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub receive_whatsapp_updates: Option<String>,
}

impl SignupForm {
    /// Whether the WhatsApp-updates checkbox was ticked.
    #[must_use]
    pub const fn wants_whatsapp_updates(&self) -> bool {
        self.receive_whatsapp_updates.is_some()
    }

    /// Validate and build the new profile.
    ///
    /// # Errors
    ///
    /// Returns field-scoped errors for every failing field.
    pub fn into_profile(self, now: DateTime<Utc>) -> Result<CustomerProfile, FieldErrors> {
        let mut errors = FieldErrors::new();
        let full_name = self.full_name.trim().to_string();
        let email = self.email.trim().to_string();

        errors.check(
            full_name.chars().count() >= 3,
            "full_name",
            "Nome deve ter pelo menos 3 caracteres",
        );
        errors.check(is_valid_phone(&self.whatsapp), "whatsapp", "WhatsApp inválido");
        errors.check(
            email.is_empty() || is_valid_email(&email),
            "email",
            "Email inválido",
        );
        errors.check(
            self.password.chars().count() >= 8,
            "password",
            "Senha deve ter pelo menos 8 caracteres",
        );
        errors.check(
            self.password == self.confirm_password,
            "confirm_password",
            "As senhas não coincidem",
        );

        errors.into_result(CustomerProfile {
            id: customer_id(now),
            full_name,
            email: (!email.is_empty()).then_some(email),
            whatsapp: format_phone(&self.whatsapp),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Validated profile edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub email: Option<String>,
    pub whatsapp: String,
}

impl ProfileUpdate {
    /// Validate raw form input.
    ///
    /// # Errors
    ///
    /// Returns field-scoped errors for every failing field.
    pub fn parse(full_name: &str, email: &str, whatsapp: &str) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let full_name = full_name.trim();
        let email = email.trim();

        errors.check(
            full_name.chars().count() >= 3,
            "full_name",
            "Nome deve ter pelo menos 3 caracteres",
        );
        errors.check(
            email.is_empty() || is_valid_email(email),
            "email",
            "Email inválido",
        );
        errors.check(is_valid_phone(whatsapp), "whatsapp", "WhatsApp inválido");

        errors.into_result(Self {
            full_name: full_name.to_string(),
            email: (!email.is_empty()).then(|| email.to_string()),
            whatsapp: format_phone(whatsapp),
        })
    }
}

/// A saved delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub label: AddressLabel,
    pub cep: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub reference: Option<String>,
    pub is_default: bool,
}

/// Address form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewAddress {
    #[serde(default)]
    pub label: Option<AddressLabel>,
    pub cep: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub reference: String,
}

impl NewAddress {
    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns field-scoped errors for every failing field.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(is_valid_cep(&self.cep), "cep", "CEP inválido");
        errors.check(
            !self.address_line1.trim().is_empty(),
            "address_line1",
            "Endereço obrigatório",
        );
        errors.check(
            !self.neighborhood.trim().is_empty(),
            "neighborhood",
            "Bairro obrigatório",
        );
        errors.check(!self.city.trim().is_empty(), "city", "Cidade obrigatória");
        errors.check(!self.state.trim().is_empty(), "state", "Estado obrigatório");
        errors.into_result(())
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// One purchased line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub qty: u32,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
}

/// Shipment tracking details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTracking {
    pub carrier: Option<String>,
    pub code: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSnapshot {
    pub full_name: String,
    pub whatsapp: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverySnapshot {
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub cep: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSnapshot {
    pub method: String,
}

/// A placed order as kept in the customer's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerOrder {
    pub order_code: String,
    pub status: OrderStatus,
    pub total: Decimal,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tracking: Option<OrderTracking>,
    #[serde(default)]
    pub contact: Option<ContactSnapshot>,
    #[serde(default)]
    pub delivery: Option<DeliverySnapshot>,
    #[serde(default)]
    pub payment: Option<PaymentSnapshot>,
}

impl CustomerOrder {
    /// Total units ordered.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.qty).sum()
    }
}

/// Partial order edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub tracking: Option<OrderTracking>,
}

/// Order history filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Matches order code or item name, case-insensitive.
    pub search: String,
    pub status: Option<OrderStatus>,
}

/// Notification and taste preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPreferences {
    pub receive_whatsapp_updates: bool,
    pub receive_email_updates: bool,
    pub favorite_categories: Vec<String>,
}

impl Default for CustomerPreferences {
    fn default() -> Self {
        Self {
            receive_whatsapp_updates: true,
            receive_email_updates: false,
            favorite_categories: Vec::new(),
        }
    }
}

/// Addresses, orders and preferences stored for one visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerData {
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub orders: Vec<CustomerOrder>,
    #[serde(default)]
    pub preferences: CustomerPreferences,
}

impl CustomerData {
    /// Save a validated address. The first address becomes the default.
    pub fn add_address(&mut self, address: NewAddress, now: DateTime<Utc>) -> AddressId {
        let base = format!("addr-{}", now.timestamp_millis());
        let mut id = base.clone();
        let mut n = 1;
        while self.addresses.iter().any(|a| a.id.as_str() == id) {
            n += 1;
            id = format!("{base}-{n}");
        }
        let id = AddressId::new(id);

        self.addresses.push(Address {
            id: id.clone(),
            label: address.label.unwrap_or_default(),
            cep: format_cep(&address.cep),
            address_line1: address.address_line1.trim().to_string(),
            address_line2: optional(&address.address_line2),
            neighborhood: address.neighborhood.trim().to_string(),
            city: address.city.trim().to_string(),
            state: address.state.trim().to_uppercase(),
            reference: optional(&address.reference),
            is_default: self.addresses.is_empty(),
        });
        id
    }

    /// Replace an address's fields, keeping its id and default flag.
    pub fn update_address(&mut self, id: &str, address: NewAddress) -> bool {
        let Some(existing) = self.addresses.iter_mut().find(|a| a.id.as_str() == id) else {
            return false;
        };
        existing.label = address.label.unwrap_or(existing.label);
        existing.cep = format_cep(&address.cep);
        existing.address_line1 = address.address_line1.trim().to_string();
        existing.address_line2 = optional(&address.address_line2);
        existing.neighborhood = address.neighborhood.trim().to_string();
        existing.city = address.city.trim().to_string();
        existing.state = address.state.trim().to_uppercase();
        existing.reference = optional(&address.reference);
        true
    }

    /// Remove an address. Removing the default leaves no default.
    pub fn remove_address(&mut self, id: &str) {
        self.addresses.retain(|a| a.id.as_str() != id);
    }

    /// Make `id` the only default address. Unknown ids clear every default.
    pub fn set_default_address(&mut self, id: &str) {
        for address in &mut self.addresses {
            address.is_default = address.id.as_str() == id;
        }
    }

    #[must_use]
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses.iter().find(|a| a.is_default)
    }

    /// Record a new order at the top of the history.
    pub fn add_order(&mut self, order: CustomerOrder) {
        self.orders.insert(0, order);
    }

    pub fn update_order(&mut self, order_code: &str, update: OrderUpdate) -> bool {
        let Some(order) = self.orders.iter_mut().find(|o| o.order_code == order_code) else {
            return false;
        };
        if let Some(status) = update.status {
            order.status = status;
        }
        if update.tracking.is_some() {
            order.tracking = update.tracking;
        }
        true
    }

    #[must_use]
    pub fn find_order(&self, order_code: &str) -> Option<&CustomerOrder> {
        self.orders.iter().find(|o| o.order_code == order_code)
    }

    /// Orders passing `filter`, newest first.
    #[must_use]
    pub fn orders_matching(&self, filter: &OrderFilter) -> Vec<&CustomerOrder> {
        let needle = filter.search.trim().to_lowercase();
        let mut orders: Vec<&CustomerOrder> = self
            .orders
            .iter()
            .filter(|order| {
                needle.is_empty()
                    || order.order_code.to_lowercase().contains(&needle)
                    || order
                        .items
                        .iter()
                        .any(|item| item.name.to_lowercase().contains(&needle))
            })
            .filter(|order| filter.status.is_none_or(|s| order.status == s))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    /// Most recent orders.
    #[must_use]
    pub fn recent_orders(&self, limit: usize) -> Vec<&CustomerOrder> {
        let mut orders = self.orders_matching(&OrderFilter::default());
        orders.truncate(limit);
        orders
    }

    pub fn update_preferences(&mut self, preferences: CustomerPreferences) {
        self.preferences = preferences;
    }
}

/// Shareable referral link for a profile.
#[must_use]
pub fn referral_link(profile: Option<&CustomerProfile>) -> String {
    let id = profile.map_or("guest", |p| p.id.as_str());
    format!("{REFERRAL_BASE_URL}{id}")
}

/// Referral code: `REF-` plus the last six characters of the id.
#[must_use]
pub fn referral_code(profile: Option<&CustomerProfile>) -> String {
    profile.map_or_else(
        || "REF-GUEST".to_string(),
        |p| {
            let chars: Vec<char> = p.id.as_str().chars().collect();
            let tail: String = chars[chars.len().saturating_sub(6)..].iter().collect();
            format!("REF-{}", tail.to_uppercase())
        },
    )
}
