//! Money helpers using decimal arithmetic.
//!
//! The store only sells in Brazilian reais, so amounts are plain
//! [`Decimal`] values in reais (not cents) and formatting follows pt-BR
//! conventions: `.` groups thousands and `,` separates cents.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency symbol prefixed by [`format_brl`].
pub const CURRENCY_SYMBOL: &str = "R$";

/// Default number of interest-free installments advertised.
pub const DEFAULT_INSTALLMENTS: u32 = 12;

/// Round an amount to cents, half away from zero.
#[must_use]
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format as currency, e.g. `R$ 1.234,56`.
#[must_use]
pub fn format_brl(value: Decimal) -> String {
    let plain = format_price(value.abs());
    if value.is_sign_negative() && !value.is_zero() {
        format!("-{CURRENCY_SYMBOL} {plain}")
    } else {
        format!("{CURRENCY_SYMBOL} {plain}")
    }
}

/// Format without the currency symbol, always with two decimals, e.g. `1.234,56`.
#[must_use]
pub fn format_price(value: Decimal) -> String {
    let rounded = round_cents(value);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped},{frac_part}")
}

/// Installment estimate: `ceil(total / installments)`, no interest.
///
/// Zero installments are treated as a single payment.
#[must_use]
pub fn installment(total: Decimal, installments: u32) -> Decimal {
    let count = Decimal::from(installments.max(1));
    (total / count).ceil()
}
