//! Per-user document: profile extras, item lists and notification flags.
//!
//! The three item lists and the notification settings are JSONB columns
//! that are always written back whole. Writers lock the row first so two
//! requests for the same shopper serialise.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use lumina_core::{CartDocument, CartItem, NotificationSettings, ProfileUpdate, SavedItem, UserId};

use super::RepositoryError;

/// Everything stored for a shopper outside the `users` row.
#[derive(Debug, Clone, Serialize)]
pub struct UserDocument {
    pub user_id: UserId,
    pub phone: String,
    pub address: String,
    pub birth_date: Option<NaiveDate>,
    pub lists: CartDocument,
    pub notification_settings: NotificationSettings,
}

impl UserDocument {
    fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            phone: String::new(),
            address: String::new(),
            birth_date: None,
            lists: CartDocument::default(),
            notification_settings: NotificationSettings::default(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ListsRow {
    cart: Json<Vec<CartItem>>,
    saved_items: Json<Vec<SavedItem>>,
    wishlist: Json<Vec<CartItem>>,
}

impl From<ListsRow> for CartDocument {
    fn from(row: ListsRow) -> Self {
        Self {
            items: row.cart.0,
            saved_items: row.saved_items.0,
            wishlist: row.wishlist.0,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    user_id: UserId,
    phone: String,
    address: String,
    birth_date: Option<NaiveDate>,
    #[sqlx(flatten)]
    lists: ListsRow,
    notification_settings: Json<NotificationSettings>,
}

/// Repository for user documents.
pub struct DocumentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DocumentRepository<'a> {
    /// Create a new document repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load a shopper's document. A missing row reads as an empty document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails or a stored
    /// list does not decode.
    pub async fn get(&self, user_id: UserId) -> Result<UserDocument, RepositoryError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT user_id, phone, address, birth_date,
                   cart, saved_items, wishlist, notification_settings
            FROM storefront.user_documents
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map_or_else(
            || UserDocument::empty(user_id),
            |r| UserDocument {
                user_id: r.user_id,
                phone: r.phone,
                address: r.address,
                birth_date: r.birth_date,
                lists: r.lists.into(),
                notification_settings: r.notification_settings.0,
            },
        ))
    }

    /// Read-modify-write the item lists under a row lock.
    ///
    /// `apply` runs inside the transaction; if it fails nothing is written.
    /// Returns the lists as committed along with `apply`'s output.
    ///
    /// # Errors
    ///
    /// Returns `apply`'s error, or a `RepositoryError` converted into `E`.
    pub async fn modify_lists<T, E, F>(
        &self,
        user_id: UserId,
        apply: F,
    ) -> Result<(CartDocument, T), E>
    where
        F: FnOnce(&mut CartDocument) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        ensure_row(&mut tx, user_id).await?;

        let row = sqlx::query_as::<_, ListsRow>(
            r"
            SELECT cart, saved_items, wishlist
            FROM storefront.user_documents
            WHERE user_id = $1
            FOR UPDATE
            ",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        let mut lists = CartDocument::from(row);
        let output = apply(&mut lists)?;

        sqlx::query(
            r"
            UPDATE storefront.user_documents
            SET cart = $2, saved_items = $3, wishlist = $4, updated_at = $5
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .bind(Json(&lists.items))
        .bind(Json(&lists.saved_items))
        .bind(Json(&lists.wishlist))
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        tx.commit().await.map_err(RepositoryError::from)?;
        Ok((lists, output))
    }

    /// Read-modify-write the notification settings under a row lock.
    ///
    /// # Errors
    ///
    /// Returns `apply`'s error, or a `RepositoryError` converted into `E`.
    pub async fn modify_notifications<T, E, F>(
        &self,
        user_id: UserId,
        apply: F,
    ) -> Result<(NotificationSettings, T), E>
    where
        F: FnOnce(&mut NotificationSettings) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        ensure_row(&mut tx, user_id).await?;

        let Json(mut settings): Json<NotificationSettings> = sqlx::query_scalar(
            r"
            SELECT notification_settings
            FROM storefront.user_documents
            WHERE user_id = $1
            FOR UPDATE
            ",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        let output = apply(&mut settings)?;

        sqlx::query(
            r"
            UPDATE storefront.user_documents
            SET notification_settings = $2, updated_at = $3
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .bind(Json(&settings))
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        tx.commit().await.map_err(RepositoryError::from)?;
        Ok((settings, output))
    }

    /// Save profile edits: display name on the user, the rest on the document.
    ///
    /// The update must already be validated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let updated = sqlx::query(
            "UPDATE storefront.users SET display_name = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(user_id)
        .bind(&update.display_name)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            r"
            INSERT INTO storefront.user_documents (user_id, phone, address, birth_date, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET phone = EXCLUDED.phone,
                address = EXCLUDED.address,
                birth_date = EXCLUDED.birth_date,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(user_id)
        .bind(&update.phone)
        .bind(&update.address)
        .bind(update.birth_date)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

/// Create the document row if an older account never got one.
async fn ensure_row(conn: &mut PgConnection, user_id: UserId) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO storefront.user_documents (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(())
}
