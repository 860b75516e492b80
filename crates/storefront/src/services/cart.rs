//! Cart, saved-for-later and wishlist operations.
//!
//! Every mutation is one locked read-modify-write of the shopper's document
//! (see [`DocumentRepository::modify_lists`]). Item name, price and image for
//! additions come from the catalog, never from the request.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use lumina_core::{CartDocument, CartError, ItemSnapshot, ProductId, UserId};

use crate::db::{DocumentRepository, RepositoryError};
use crate::services::catalog::CatalogService;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartServiceError {
    /// The row is not in the list being changed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The product does not exist or is no longer sold.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Cart service for one request.
pub struct CartService<'a> {
    documents: DocumentRepository<'a>,
    catalog: &'a CatalogService,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, catalog: &'a CatalogService) -> Self {
        Self {
            documents: DocumentRepository::new(pool),
            catalog,
        }
    }

    /// Current lists.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Repository` if the document cannot be read.
    pub async fn lists(&self, user_id: UserId) -> Result<CartDocument, CartServiceError> {
        Ok(self.documents.get(user_id).await?.lists)
    }

    async fn snapshot(&self, product_id: ProductId) -> Result<ItemSnapshot, CartServiceError> {
        self.catalog
            .active_product(product_id)
            .await?
            .map(|p| p.snapshot())
            .ok_or(CartServiceError::ProductNotFound(product_id))
    }

    async fn modify<F>(&self, user_id: UserId, apply: F) -> Result<CartDocument, CartServiceError>
    where
        F: FnOnce(&mut CartDocument) -> Result<(), CartServiceError>,
    {
        let (lists, ()) = self.documents.modify_lists(user_id, apply).await?;
        Ok(lists)
    }

    /// Add one unit of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::ProductNotFound` for unknown or inactive products.
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartDocument, CartServiceError> {
        let item = self.snapshot(product_id).await?;
        self.modify(user_id, |lists| {
            lists.add_to_cart(item);
            Ok(())
        })
        .await
    }

    /// Set a cart row's quantity; below one removes the row.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Cart` if the product is not in the cart.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartDocument, CartServiceError> {
        self.modify(user_id, |lists| {
            Ok(lists.update_quantity(product_id, quantity)?)
        })
        .await
    }

    /// Remove a cart row. Removing an absent row succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Repository` on database failure.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartDocument, CartServiceError> {
        self.modify(user_id, |lists| {
            lists.remove_from_cart(product_id);
            Ok(())
        })
        .await
    }

    /// Empty the cart. Saved items and the wishlist are kept.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Repository` on database failure.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, user_id: UserId) -> Result<CartDocument, CartServiceError> {
        self.modify(user_id, |lists| {
            lists.clear_cart();
            Ok(())
        })
        .await
    }

    /// Park a cart row in saved-for-later.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Cart` if the product is not in the cart.
    #[instrument(skip(self))]
    pub async fn save_for_later(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartDocument, CartServiceError> {
        let now = Utc::now();
        self.modify(user_id, |lists| Ok(lists.save_for_later(product_id, now)?))
            .await
    }

    /// Bring a saved row back into the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Cart` if the product is not saved.
    #[instrument(skip(self))]
    pub async fn move_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartDocument, CartServiceError> {
        self.modify(user_id, |lists| Ok(lists.move_to_cart(product_id)?))
            .await
    }

    /// Move a cart row to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Cart` if the product is not in the cart.
    #[instrument(skip(self))]
    pub async fn move_to_wishlist(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartDocument, CartServiceError> {
        self.modify(user_id, |lists| Ok(lists.move_to_wishlist(product_id)?))
            .await
    }

    /// Add a product to the wishlist unless it is already there.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::ProductNotFound` for unknown or inactive products.
    #[instrument(skip(self))]
    pub async fn add_to_wishlist(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartDocument, CartServiceError> {
        let item = self.snapshot(product_id).await?;
        self.modify(user_id, |lists| {
            lists.add_to_wishlist(item);
            Ok(())
        })
        .await
    }

    /// Remove a wishlist row. Removing an absent row succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Repository` on database failure.
    #[instrument(skip(self))]
    pub async fn remove_from_wishlist(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartDocument, CartServiceError> {
        self.modify(user_id, |lists| {
            lists.remove_from_wishlist(product_id);
            Ok(())
        })
        .await
    }
}
