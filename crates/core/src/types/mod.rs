//! Core types for the storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{DEFAULT_INSTALLMENTS, format_brl, format_price, installment, round_cents};
pub use status::*;
