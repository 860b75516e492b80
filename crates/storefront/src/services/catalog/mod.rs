//! Catalog service.
//!
//! Loads every product and category in bulk and keeps each collection in a
//! `moka` cache. Entries expire by TTL only; there is no explicit
//! invalidation from the catalog side.

mod cache;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use lumina_core::{Category, Product, ProductId};

use cache::{CacheKey, CacheValue};

use crate::db::{CatalogRepository, RepositoryError};

/// Read-through catalog cache.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    pool: PgPool,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogService {
    /// Create a catalog service whose entries live for `ttl`.
    #[must_use]
    pub fn new(pool: PgPool, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(2).time_to_live(ttl).build();

        Self {
            inner: Arc::new(CatalogServiceInner { pool, cache }),
        }
    }

    /// Every product, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the catalog has to be loaded and the
    /// query fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, RepositoryError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products = Arc::new(CatalogRepository::new(&self.inner.pool).all_products().await?);
        debug!(count = products.len(), "Loaded products");
        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }

    /// Every category, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the catalog has to be loaded and the
    /// query fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Arc<Vec<Category>>, RepositoryError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = Arc::new(
            CatalogRepository::new(&self.inner.pool)
                .all_categories()
                .await?,
        );
        debug!(count = categories.len(), "Loaded categories");
        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;
        Ok(categories)
    }

    /// An active product by ID. Inactive products read as missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the catalog cannot be loaded.
    pub async fn active_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products().await?;
        Ok(products
            .iter()
            .find(|p| p.id == id && p.is_active)
            .cloned())
    }
}
