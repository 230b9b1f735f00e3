//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;

use essence_arabe_core::types::format_brl;

/// Formats a decimal amount as reais, e.g. `R$ 1.234,56`.
///
/// Non-numeric input is rendered unchanged.
///
/// Usage in templates: `{{ coupon.minimum|brl }}`
#[askama::filter_fn]
pub fn brl(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let text = value.to_string();
    Ok(Decimal::from_str(text.trim()).map_or(text, format_brl))
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the content hash for main.css, computed at build time.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}
