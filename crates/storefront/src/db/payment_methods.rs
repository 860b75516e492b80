//! Saved payment method repository.
//!
//! Details are stored as tagged JSON. Default handling matches addresses:
//! one default per shopper, cleared on the others in the same transaction.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use lumina_core::{PaymentDetails, PaymentMethodId, UserId};

use super::RepositoryError;

/// A stored payment method.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    #[serde(flatten)]
    pub details: PaymentDetails,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentMethod {
    /// Copy with card and account numbers masked, for responses.
    #[must_use]
    pub fn masked(&self) -> Self {
        Self {
            details: self.details.masked(),
            ..self.clone()
        }
    }
}

#[derive(sqlx::FromRow)]
struct PaymentMethodRow {
    id: PaymentMethodId,
    details: Json<PaymentDetails>,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PaymentMethodRow> for PaymentMethod {
    fn from(row: PaymentMethodRow) -> Self {
        Self {
            id: row.id,
            details: row.details.0,
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for payment method database operations.
pub struct PaymentMethodRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentMethodRepository<'a> {
    /// Create a new payment method repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All of a shopper's payment methods, default first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails or stored
    /// details do not decode.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<PaymentMethod>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentMethodRow>(
            r"
            SELECT id, details, is_default, created_at, updated_at
            FROM storefront.payment_methods
            WHERE user_id = $1
            ORDER BY is_default DESC, created_at ASC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(PaymentMethod::from).collect())
    }

    /// Add a payment method. Details must already be validated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        details: &PaymentDetails,
        is_default: bool,
    ) -> Result<PaymentMethod, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        if is_default {
            clear_default(&mut tx, user_id, None).await?;
        }

        let row = sqlx::query_as::<_, PaymentMethodRow>(
            r"
            INSERT INTO storefront.payment_methods (user_id, details, is_default)
            VALUES ($1, $2, $3)
            RETURNING id, details, is_default, created_at, updated_at
            ",
        )
        .bind(user_id)
        .bind(Json(details))
        .bind(is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Replace a payment method's details and default flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the method does not exist or
    /// belongs to another user.
    pub async fn update(
        &self,
        user_id: UserId,
        id: PaymentMethodId,
        details: &PaymentDetails,
        is_default: bool,
    ) -> Result<PaymentMethod, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        if is_default {
            clear_default(&mut tx, user_id, Some(id)).await?;
        }

        let row = sqlx::query_as::<_, PaymentMethodRow>(
            r"
            UPDATE storefront.payment_methods
            SET details = $3, is_default = $4, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING id, details, is_default, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(user_id)
        .bind(Json(details))
        .bind(is_default)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Delete a payment method.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the method does not exist or
    /// belongs to another user.
    pub async fn delete(&self, user_id: UserId, id: PaymentMethodId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM storefront.payment_methods WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Number of payment methods on file.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM storefront.payment_methods WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }
}

async fn clear_default(
    conn: &mut PgConnection,
    user_id: UserId,
    except: Option<PaymentMethodId>,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        UPDATE storefront.payment_methods
        SET is_default = false, updated_at = now()
        WHERE user_id = $1 AND is_default AND id IS DISTINCT FROM $2
        ",
    )
    .bind(user_id)
    .bind(except)
    .execute(conn)
    .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_payment_method_serializes_flat() {
        let method = PaymentMethod {
            id: PaymentMethodId::new(3),
            details: PaymentDetails::Card {
                card_number: "4242424242424242".to_owned(),
                card_holder: "Ada".to_owned(),
                expiry_date: "12/29".to_owned(),
                card_brand: None,
            },
            is_default: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(method.masked()).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["type"], "card");
        assert_eq!(json["card_number"], "•••• 4242");
        assert_eq!(json["card_brand"], "Visa");
        assert_eq!(json["is_default"], true);
    }
}
