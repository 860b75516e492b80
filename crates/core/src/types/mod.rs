//! Core value types for Lumina.
//!
//! Type-safe wrappers for IDs, emails, money and statuses.

pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{format_price, savings_percent};
pub use status::OrderStatus;
