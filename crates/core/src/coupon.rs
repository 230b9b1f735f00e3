//! Discount coupons.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::format_brl;

/// How a coupon discounts the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Discount {
    /// Percentage of the subtotal (0-100).
    Percent(Decimal),
    /// Fixed amount in BRL.
    Amount(Decimal),
}

impl Discount {
    /// Discount over `subtotal`, before clamping the total at zero.
    #[must_use]
    pub fn apply_to(self, subtotal: Decimal) -> Decimal {
        match self {
            Self::Percent(value) => subtotal * value / Decimal::ONE_HUNDRED,
            Self::Amount(value) => value,
        }
    }

    /// Short label, e.g. `10% OFF` or `R$ 15,00 OFF`.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Percent(value) => format!("{}% OFF", value.normalize()),
            Self::Amount(value) => format!("{} OFF", format_brl(value)),
        }
    }
}

/// A coupon from the static table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coupon {
    pub code: &'static str,
    pub discount: Discount,
    pub description: Option<&'static str>,
    pub min_purchase: Option<Decimal>,
}

/// Why a coupon code was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    #[error("Cupom inválido")]
    NotFound,
    #[error("Compra mínima de {}", format_brl(*.minimum))]
    MinimumNotMet { minimum: Decimal },
}

/// Every coupon the store accepts.
pub static COUPONS: [Coupon; 4] = [
    Coupon {
        code: "BEMVINDO10",
        discount: Discount::Percent(Decimal::TEN),
        description: Some("10% de desconto na primeira compra"),
        min_purchase: None,
    },
    Coupon {
        code: "FRETEGRATIS",
        discount: Discount::Amount(Decimal::from_parts(15, 0, 0, false, 0)),
        description: Some("Frete grátis"),
        min_purchase: Some(Decimal::from_parts(200, 0, 0, false, 0)),
    },
    Coupon {
        code: "PIX5",
        discount: Discount::Amount(Decimal::from_parts(5, 0, 0, false, 0)),
        description: Some("R$ 5 de desconto"),
        min_purchase: None,
    },
    Coupon {
        code: "PRIMEIRA20",
        discount: Discount::Percent(Decimal::from_parts(20, 0, 0, false, 0)),
        description: Some("20% de desconto"),
        min_purchase: Some(Decimal::from_parts(300, 0, 0, false, 0)),
    },
];

/// Normalize a code as typed by the customer.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Validate `code` against the table for the given subtotal.
///
/// # Errors
///
/// Returns [`CouponError::NotFound`] for unknown codes and
/// [`CouponError::MinimumNotMet`] when the subtotal is below the coupon's
/// minimum purchase.
pub fn validate_coupon(code: &str, subtotal: Decimal) -> Result<&'static Coupon, CouponError> {
    let code = normalize_code(code);
    let coupon = COUPONS
        .iter()
        .find(|c| c.code == code)
        .ok_or(CouponError::NotFound)?;

    if let Some(minimum) = coupon.min_purchase
        && subtotal < minimum
    {
        return Err(CouponError::MinimumNotMet { minimum });
    }

    Ok(coupon)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_normalizes_code() {
        let coupon = validate_coupon("  bemvindo10 ", Decimal::from(50)).unwrap();
        assert_eq!(coupon.code, "BEMVINDO10");
    }

    #[test]
    fn test_unknown_code() {
        let err = validate_coupon("NOPE", Decimal::from(500)).unwrap_err();
        assert_eq!(err, CouponError::NotFound);
        assert_eq!(err.to_string(), "Cupom inválido");
    }

    #[test]
    fn test_minimum_purchase() {
        let err = validate_coupon("PRIMEIRA20", Decimal::from(299)).unwrap_err();
        assert_eq!(
            err,
            CouponError::MinimumNotMet {
                minimum: Decimal::from(300)
            }
        );
        assert_eq!(err.to_string(), "Compra mínima de R$ 300,00");
        assert!(validate_coupon("PRIMEIRA20", Decimal::from(300)).is_ok());
    }

    #[test]
    fn test_minimum_purchase_boundary_in_cents() {
        assert!(matches!(
            validate_coupon("PRIMEIRA20", Decimal::new(29_999, 2)),
            Err(CouponError::MinimumNotMet { .. })
        ));
        assert!(validate_coupon("PRIMEIRA20", Decimal::new(30_000, 2)).is_ok());
        assert!(validate_coupon("FRETEGRATIS", Decimal::new(19_999, 2)).is_err());
    }

    #[test]
    fn test_discount_amounts() {
        assert_eq!(
            Discount::Percent(Decimal::TEN).apply_to(Decimal::from(538)),
            Decimal::new(538, 1)
        );
        assert_eq!(
            Discount::Amount(Decimal::from(15)).apply_to(Decimal::from(538)),
            Decimal::from(15)
        );
    }

    #[test]
    fn test_discount_labels() {
        assert_eq!(Discount::Percent(Decimal::TEN).label(), "10% OFF");
        assert_eq!(Discount::Amount(Decimal::from(5)).label(), "R$ 5,00 OFF");
    }
}
