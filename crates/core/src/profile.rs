//! Profile edits.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("display name is required")]
    MissingDisplayName,
    #[error("display name must be at most {max} characters")]
    DisplayNameTooLong { max: usize },
}

/// Editable profile fields. Email is not editable here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    /// ISO date (`YYYY-MM-DD`).
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

impl ProfileUpdate {
    pub const MAX_DISPLAY_NAME: usize = 100;

    /// Trim text fields and require a display name.
    ///
    /// # Errors
    ///
    /// Returns a [`ProfileError`] when the display name is blank or too long.
    pub fn validated(&self) -> Result<Self, ProfileError> {
        let display_name = self.display_name.trim();
        if display_name.is_empty() {
            return Err(ProfileError::MissingDisplayName);
        }
        if display_name.chars().count() > Self::MAX_DISPLAY_NAME {
            return Err(ProfileError::DisplayNameTooLong {
                max: Self::MAX_DISPLAY_NAME,
            });
        }
        Ok(Self {
            display_name: display_name.to_owned(),
            phone: self.phone.trim().to_owned(),
            address: self.address.trim().to_owned(),
            birth_date: self.birth_date,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_required() {
        let update = ProfileUpdate {
            display_name: "  ".into(),
            ..ProfileUpdate::default()
        };
        assert_eq!(update.validated(), Err(ProfileError::MissingDisplayName));
    }

    #[test]
    fn test_birth_date_parses_iso() {
        let update: ProfileUpdate =
            serde_json::from_str(r#"{"display_name":" Sam ","birth_date":"1990-04-01"}"#).unwrap();
        let update = update.validated().unwrap();
        assert_eq!(update.display_name, "Sam");
        assert_eq!(update.birth_date, NaiveDate::from_ymd_opt(1990, 4, 1));
    }

    #[test]
    fn test_bad_birth_date_rejected() {
        assert!(
            serde_json::from_str::<ProfileUpdate>(r#"{"display_name":"S","birth_date":"04/01/1990"}"#)
                .is_err()
        );
    }
}
