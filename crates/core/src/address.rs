//! Shipping address input.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Address fields as submitted by the shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInput {
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

fn required(value: &str, field: &'static str) -> Result<String, AddressError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AddressError::MissingField(field));
    }
    Ok(trimmed.to_owned())
}

impl AddressInput {
    /// Trim all fields and check the required ones.
    ///
    /// Phone is optional and may come back empty.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::MissingField`] for the first blank required
    /// field.
    pub fn validated(&self) -> Result<Self, AddressError> {
        Ok(Self {
            full_name: required(&self.full_name, "full name")?,
            phone: self.phone.trim().to_owned(),
            address: required(&self.address, "address")?,
            city: required(&self.city, "city")?,
            state: required(&self.state, "state")?,
            postal_code: required(&self.postal_code, "postal code")?,
            country: required(&self.country, "country")?,
            is_default: self.is_default,
        })
    }
}
