//! Essence Árabe core: domain rules for the storefront.
//!
//! Everything here is pure: no I/O, no HTTP, no storage. The storefront
//! crate owns sessions and rendering and calls into these modules.
//!
//! # Modules
//!
//! - [`types`] - Ids, money formatting, statuses
//! - [`catalog`] - Products, collections, add-ons, search and sort
//! - [`cart`] - Cart lines, totals, free-shipping progress
//! - [`coupon`] - Coupon table and validation
//! - [`upsell`] - Offer rules and eligibility
//! - [`tracking`] - Upsell event log and metrics
//! - [`checkout`] - Checkout draft, step forms, order placement
//! - [`account`] - Mocked auth, profile, addresses, orders, preferences

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod clock;
pub mod coupon;
pub mod slug;
pub mod tracking;
pub mod types;
pub mod upsell;
pub mod validate;

pub use cart::{Cart, CartItem};
pub use catalog::{Catalog, Product};
pub use clock::{Clock, FixedClock, SystemClock};
pub use types::*;
