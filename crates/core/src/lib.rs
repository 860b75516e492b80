//! Lumina Core - shared domain types and storefront semantics.
//!
//! Used by:
//! - `storefront` - the shopper-facing HTTP service
//! - `cli` - migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. Persistence is the caller's concern; the
//! `postgres` feature only adds `sqlx` encode/decode for the ID and status
//! types.
//!
//! # Modules
//!
//! - [`types`] - type-safe IDs, emails, money helpers and order status
//! - [`cart`] - cart, saved-for-later and wishlist lists
//! - [`catalog`] - products, categories, shop filters, search and suggestions
//! - [`notifications`] - notification preference flags
//! - [`payment`] - saved payment method details and masking
//! - [`address`] - shipping address input
//! - [`profile`] - profile edits

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod cart;
pub mod catalog;
pub mod notifications;
pub mod payment;
pub mod profile;
pub mod types;

pub use address::{AddressError, AddressInput};
pub use cart::{CartDocument, CartError, CartItem, ItemSnapshot, ListKind, SavedItem};
pub use catalog::{Category, Product};
pub use notifications::{Channel, NotificationError, NotificationKind, NotificationSettings};
pub use payment::{CardBrand, PaymentDetails, PaymentMethodError};
pub use profile::{ProfileError, ProfileUpdate};
pub use types::*;
