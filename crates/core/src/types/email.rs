//! Email address type.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Same shape the checkout, login and signup forms accept.
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Why a string is not an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email obrigatório")]
    Empty,
    #[error("Email deve ter no máximo {max} caracteres")]
    TooLong { max: usize },
    #[error("Email inválido")]
    Malformed,
}

/// A customer email, as typed at checkout or login.
///
/// Only the shape is checked: one `@`, no whitespace, and a dot somewhere
/// after the `@` with text on both sides.
///
/// ```
/// use essence_arabe_core::Email;
///
/// assert!(Email::parse("cliente@essencearabe.com").is_ok());
/// assert!(Email::parse("sem-arroba").is_err());
/// assert!(Email::parse("cliente@dominio").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// RFC 5321 limit.
    pub const MAX_LENGTH: usize = 254;

    /// Parse after trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] for blank, overlong or malformed input.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !EMAIL.is_match(s) {
            return Err(EmailError::Malformed);
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
