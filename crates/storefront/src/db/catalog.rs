//! Catalog repository. Read-only from the storefront's side.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use lumina_core::{Category, CategoryId, Product, ProductId};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    discount_price: Option<Decimal>,
    images: Vec<String>,
    category: String,
    subcategory: Option<String>,
    brand: Option<String>,
    features: Vec<String>,
    specifications: Json<BTreeMap<String, String>>,
    is_featured: bool,
    is_active: bool,
    in_stock: bool,
    rating: Option<Decimal>,
    review_count: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            discount_price: row.discount_price,
            images: row.images,
            category: row.category,
            subcategory: row.subcategory,
            brand: row.brand,
            features: row.features,
            specifications: row.specifications.0,
            is_featured: row.is_featured,
            is_active: row.is_active,
            in_stock: row.in_stock,
            rating: row.rating,
            review_count: row.review_count,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    slug: String,
    description: String,
    parent_id: Option<CategoryId>,
    image: Option<String>,
    product_count: Option<i32>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            parent_id: row.parent_id,
            image: row.image,
            product_count: row.product_count,
        }
    }
}

/// Repository for catalog reads.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every product, active or not, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, discount_price, images, category,
                   subcategory, brand, features, specifications, is_featured,
                   is_active, in_stock, rating, review_count, created_at
            FROM storefront.products
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Every category in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, slug, description, parent_id, image, product_count
            FROM storefront.categories
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }
}
