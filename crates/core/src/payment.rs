//! Saved payment methods.
//!
//! Details are a tagged union keyed by `type`. Nothing here talks to a payment
//! processor; the stored values are what the shopper typed, minus surrounding
//! whitespace, and are only ever returned masked.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from payment method validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentMethodError {
    /// A required field was missing or blank.
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Card network, guessed from the leading digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
}

impl CardBrand {
    /// Guess the network from the first digit of the card number.
    ///
    /// ```
    /// use lumina_core::payment::CardBrand;
    ///
    /// assert_eq!(CardBrand::guess("5500 0000 0000 0004"), CardBrand::Mastercard);
    /// assert_eq!(CardBrand::guess("4111111111111111"), CardBrand::Visa);
    /// ```
    #[must_use]
    pub fn guess(card_number: &str) -> Self {
        match card_number.trim_start().chars().next() {
            Some('5') => Self::Mastercard,
            Some('3') => Self::Amex,
            Some('6') => Self::Discover,
            _ => Self::Visa,
        }
    }
}

impl std::fmt::Display for CardBrand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Visa => "Visa",
            Self::Mastercard => "Mastercard",
            Self::Amex => "Amex",
            Self::Discover => "Discover",
        })
    }
}

/// Payment method details as submitted and stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PaymentDetails {
    Card {
        card_number: String,
        card_holder: String,
        expiry_date: String,
        /// Filled in by [`PaymentDetails::validated`]; client values are ignored.
        #[serde(default)]
        card_brand: Option<CardBrand>,
    },
    Upi {
        upi_id: String,
        provider: String,
    },
    Netbanking {
        bank_name: String,
        account_number: String,
        account_holder: String,
    },
    Wallet {
        wallet_name: String,
        wallet_id: String,
    },
}

fn required(value: String, field: &'static str) -> Result<String, PaymentMethodError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PaymentMethodError::MissingField(field));
    }
    Ok(trimmed.to_owned())
}

/// `•••• 4242` style mask over the last four non-space characters.
fn mask(value: &str) -> String {
    let visible: Vec<char> = value.chars().filter(|c| !c.is_whitespace()).collect();
    let tail: String = visible
        .iter()
        .skip(visible.len().saturating_sub(4))
        .collect();
    format!("•••• {tail}")
}

impl PaymentDetails {
    /// The `type` tag, as stored.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Card { .. } => "card",
            Self::Upi { .. } => "upi",
            Self::Netbanking { .. } => "netbanking",
            Self::Wallet { .. } => "wallet",
        }
    }

    /// Trim every field, reject blanks, and derive the card brand.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentMethodError::MissingField`] naming the first blank
    /// field.
    pub fn validated(self) -> Result<Self, PaymentMethodError> {
        Ok(match self {
            Self::Card {
                card_number,
                card_holder,
                expiry_date,
                ..
            } => {
                let card_number = required(card_number, "card number")?;
                let card_brand = Some(CardBrand::guess(&card_number));
                Self::Card {
                    card_number,
                    card_holder: required(card_holder, "card holder")?,
                    expiry_date: required(expiry_date, "expiry date")?,
                    card_brand,
                }
            }
            Self::Upi { upi_id, provider } => Self::Upi {
                upi_id: required(upi_id, "UPI ID")?,
                provider: required(provider, "provider")?,
            },
            Self::Netbanking {
                bank_name,
                account_number,
                account_holder,
            } => Self::Netbanking {
                bank_name: required(bank_name, "bank name")?,
                account_number: required(account_number, "account number")?,
                account_holder: required(account_holder, "account holder")?,
            },
            Self::Wallet {
                wallet_name,
                wallet_id,
            } => Self::Wallet {
                wallet_name: required(wallet_name, "wallet name")?,
                wallet_id: required(wallet_id, "wallet ID")?,
            },
        })
    }

    /// Copy safe to send back to the browser: card and account numbers are
    /// reduced to their last four characters.
    #[must_use]
    pub fn masked(&self) -> Self {
        match self {
            Self::Card {
                card_number,
                card_holder,
                expiry_date,
                card_brand,
            } => Self::Card {
                card_number: mask(card_number),
                card_holder: card_holder.clone(),
                expiry_date: expiry_date.clone(),
                card_brand: card_brand.or_else(|| Some(CardBrand::guess(card_number))),
            },
            Self::Netbanking {
                bank_name,
                account_number,
                account_holder,
            } => Self::Netbanking {
                bank_name: bank_name.clone(),
                account_number: mask(account_number),
                account_holder: account_holder.clone(),
            },
            other => other.clone(),
        }
    }
}
