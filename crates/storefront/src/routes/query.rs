//! Query-string helpers for filter parameters.
//!
//! Filters may repeat a key (`categories=a&categories=b`) or pack several
//! values into one comma-separated value (`categories=a,b`). Both spellings
//! produce the same list.

use std::str::FromStr;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;

use crate::error::AppError;

/// Raw query pairs in request order.
#[derive(Debug, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Wrap already-decoded pairs.
    #[must_use]
    pub const fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    /// The first non-blank value for `key`, trimmed.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.trim())
            .find(|v| !v.is_empty())
    }

    /// Every value for `key`, splitting on commas and dropping blanks.
    #[must_use]
    pub fn list(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .flat_map(|(_, v)| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect()
    }

    /// Parse the first value for `key`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` naming the parameter when the value
    /// does not parse.
    pub fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>, AppError> {
        self.first(key)
            .map(|raw| {
                raw.parse()
                    .map_err(|_| AppError::BadRequest(format!("invalid value for {key}: {raw}")))
            })
            .transpose()
    }

    /// Parse every value for `key`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` on the first value that does not parse.
    pub fn parse_list<T: FromStr>(&self, key: &str) -> Result<Vec<T>, AppError> {
        self.list(key)
            .into_iter()
            .map(|raw| {
                raw.parse()
                    .map_err(|_| AppError::BadRequest(format!("invalid value for {key}: {raw}")))
            })
            .collect()
    }

    /// `true` for `true`, `1`, `yes` or `on`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.first(key)
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"))
    }
}

impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::BadRequest("Invalid query string".to_string()))?;
        Ok(Self::from_pairs(pairs))
    }
}
