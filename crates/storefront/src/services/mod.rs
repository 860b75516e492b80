//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Email/password registration and login
//! - `catalog` - Cached bulk catalog reads
//! - `cart` - Cart, saved-for-later and wishlist mutations

pub mod auth;
pub mod cart;
pub mod catalog;
