//! Enumerations shared across the storefront domain.
//!
//! Serialized names match the storage format used by the visitor stores
//! (`CONFIRMADO`, `in_stock`, ...), so values written by older sessions keep
//! deserializing.

use serde::{Deserialize, Serialize};

/// Intended audience of a fragrance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Audience {
    Masculino,
    Feminino,
    Unissex,
}

impl Audience {
    /// All audiences in display order.
    pub const ALL: [Self; 3] = [Self::Masculino, Self::Feminino, Self::Unissex];

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Masculino => "Masculino",
            Self::Feminino => "Feminino",
            Self::Unissex => "Unissex",
        }
    }
}

impl std::fmt::Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Audience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Masculino" => Ok(Self::Masculino),
            "Feminino" => Ok(Self::Feminino),
            "Unissex" => Ok(Self::Unissex),
            _ => Err(format!("invalid audience: {s}")),
        }
    }
}

/// Stock availability of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    #[default]
    InStock,
    OutOfStock,
}

impl std::str::FromStr for Availability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_stock" => Ok(Self::InStock),
            "out_of_stock" => Ok(Self::OutOfStock),
            _ => Err(format!("invalid availability: {s}")),
        }
    }
}

/// Order lifecycle status.
///
/// `Confirmado → EmSeparacao → Enviado → Entregue`, or `Cancelado`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Confirmado,
    EmSeparacao,
    Enviado,
    Entregue,
    Cancelado,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Confirmado,
        Self::EmSeparacao,
        Self::Enviado,
        Self::Entregue,
        Self::Cancelado,
    ];

    /// Storage code, e.g. `EM_SEPARACAO`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Confirmado => "CONFIRMADO",
            Self::EmSeparacao => "EM_SEPARACAO",
            Self::Enviado => "ENVIADO",
            Self::Entregue => "ENTREGUE",
            Self::Cancelado => "CANCELADO",
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Confirmado => "Confirmado",
            Self::EmSeparacao => "Em separação",
            Self::Enviado => "Enviado",
            Self::Entregue => "Entregue",
            Self::Cancelado => "Cancelado",
        }
    }

    /// The status that follows this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Confirmado => Some(Self::EmSeparacao),
            Self::EmSeparacao => Some(Self::Enviado),
            Self::Enviado => Some(Self::Entregue),
            Self::Entregue | Self::Cancelado => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Label of a saved address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AddressLabel {
    #[default]
    Casa,
    Trabalho,
    Outro,
}

impl std::fmt::Display for AddressLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Casa => write!(f, "Casa"),
            Self::Trabalho => write!(f, "Trabalho"),
            Self::Outro => write!(f, "Outro"),
        }
    }
}

impl std::str::FromStr for AddressLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Casa" => Ok(Self::Casa),
            "Trabalho" => Ok(Self::Trabalho),
            "Outro" => Ok(Self::Outro),
            _ => Err(format!("invalid address label: {s}")),
        }
    }
}
