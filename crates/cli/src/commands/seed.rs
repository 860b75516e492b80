//! Seed the storefront catalog from a YAML file.
//!
//! ```yaml
//! categories:
//!   - { name: Audio, slug: audio, description: "Speakers and headphones" }
//!   - { name: Earbuds, slug: earbuds, parent: audio }
//! products:
//!   - name: Studio Headphones
//!     price: "199.00"
//!     category: audio
//!     features: [wireless, noise-cancelling]
//! orders:
//!   - { email: shopper@example.com, total: "199.00", status: delivered, item_count: 1 }
//! ```
//!
//! Parents must be listed before their children. Orders are optional
//! fixtures for shoppers that already exist; unknown emails are skipped.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use tracing::{error, info, warn};

use lumina_core::{CategoryId, Email, OrderStatus};

use super::{CommandError, connect};

const fn yes() -> bool {
    true
}

/// Top-level seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
    #[serde(default)]
    pub orders: Vec<SeedOrder>,
}

/// A category row. `parent` is the parent's slug.
#[derive(Debug, Deserialize)]
pub struct SeedCategory {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub image: Option<String>,
    pub parent: Option<String>,
}

/// A product row. `category` and `subcategory` are category slugs.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub brand: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "yes")]
    pub is_active: bool,
    #[serde(default = "yes")]
    pub in_stock: bool,
    pub rating: Option<Decimal>,
    pub review_count: Option<i32>,
}

/// An order fixture for an existing shopper.
#[derive(Debug, Deserialize)]
pub struct SeedOrder {
    pub email: String,
    pub total: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub item_count: i32,
    pub placed_at: Option<DateTime<Utc>>,
}

/// Rows written by one seeding run.
#[derive(Debug, Default)]
pub struct SeedResult {
    pub categories: usize,
    pub products: usize,
    pub orders: usize,
    pub orders_skipped: usize,
}

/// Check a seed file for problems the database would reject or silently
/// accept. Returns one message per problem.
#[must_use]
pub fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut slugs = HashSet::new();

    for category in &seed.categories {
        if category.name.trim().is_empty() {
            errors.push(format!("category {}: name is required", category.slug));
        }
        if let Some(parent) = &category.parent
            && !slugs.contains(parent.as_str())
        {
            errors.push(format!(
                "category {}: parent {parent} must be listed before it",
                category.slug
            ));
        }
        if !slugs.insert(category.slug.as_str()) {
            errors.push(format!("category {}: duplicate slug", category.slug));
        }
    }

    let five = Decimal::from(5);
    for product in &seed.products {
        let name = &product.name;
        if name.trim().is_empty() {
            errors.push("product with empty name".to_string());
        }
        if !slugs.contains(product.category.as_str()) {
            errors.push(format!("product {name}: unknown category {}", product.category));
        }
        if let Some(sub) = &product.subcategory
            && !slugs.contains(sub.as_str())
        {
            errors.push(format!("product {name}: unknown subcategory {sub}"));
        }
        if product.price.is_sign_negative() {
            errors.push(format!("product {name}: negative price"));
        }
        if product.discount_price.is_some_and(|d| d >= product.price) {
            errors.push(format!(
                "product {name}: discount price must be below the price"
            ));
        }
        if product
            .rating
            .is_some_and(|r| r.is_sign_negative() || r > five)
        {
            errors.push(format!("product {name}: rating must be between 0 and 5"));
        }
    }

    for order in &seed.orders {
        if Email::parse(&order.email).is_err() {
            errors.push(format!("order: invalid email {}", order.email));
        }
    }

    errors
}

/// Load a catalog seed file into the storefront database.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or a database write fails. Nothing is written unless every row is.
pub async fn catalog(file_path: &str, clear_existing: bool) -> Result<(), CommandError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading catalog from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: file_path.to_string(),
            source,
        })?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    info!(
        categories = seed.categories.len(),
        products = seed.products.len(),
        orders = seed.orders.len(),
        "Parsed seed file"
    );

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CommandError::Validation(errors.len()));
    }

    let pool = connect().await?;
    let result = seed_catalog(&pool, &seed, clear_existing).await?;

    info!("Seeding complete!");
    info!("  Categories inserted: {}", result.categories);
    info!("  Products inserted: {}", result.products);
    info!("  Orders inserted: {}", result.orders);
    if result.orders_skipped > 0 {
        warn!("  Orders skipped (unknown shopper): {}", result.orders_skipped);
    }

    Ok(())
}

/// Write a validated seed file in one transaction.
async fn seed_catalog(
    pool: &PgPool,
    seed: &SeedFile,
    clear_existing: bool,
) -> Result<SeedResult, CommandError> {
    let mut tx = pool.begin().await?;
    let mut result = SeedResult::default();

    if clear_existing {
        info!("Clearing existing catalog");
        sqlx::query("DELETE FROM storefront.products")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM storefront.categories")
            .execute(&mut *tx)
            .await?;
    }

    let mut category_ids: HashMap<&str, CategoryId> = HashMap::new();
    for category in &seed.categories {
        let parent_id = category
            .parent
            .as_deref()
            .and_then(|slug| category_ids.get(slug).copied());

        let id: CategoryId = sqlx::query_scalar(
            r"
            INSERT INTO storefront.categories (name, slug, description, parent_id, image)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (slug) DO UPDATE
                SET name = EXCLUDED.name,
                    description = EXCLUDED.description,
                    parent_id = EXCLUDED.parent_id,
                    image = EXCLUDED.image
            RETURNING id
            ",
        )
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(parent_id)
        .bind(&category.image)
        .fetch_one(&mut *tx)
        .await?;

        category_ids.insert(category.slug.as_str(), id);
        result.categories += 1;
    }

    for product in &seed.products {
        insert_product(&mut tx, product).await?;
        result.products += 1;
    }

    refresh_product_counts(&mut tx).await?;

    for order in &seed.orders {
        if insert_order(&mut tx, order).await? {
            result.orders += 1;
        } else {
            warn!(email = %order.email, "No shopper with this email; order skipped");
            result.orders_skipped += 1;
        }
    }

    tx.commit().await?;
    Ok(result)
}

async fn insert_product(conn: &mut PgConnection, product: &SeedProduct) -> Result<(), CommandError> {
    sqlx::query(
        r"
        INSERT INTO storefront.products
            (name, description, price, discount_price, images, category, subcategory,
             brand, features, specifications, is_featured, is_active, in_stock,
             rating, review_count)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        ",
    )
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.discount_price)
    .bind(&product.images)
    .bind(&product.category)
    .bind(&product.subcategory)
    .bind(&product.brand)
    .bind(&product.features)
    .bind(Json(&product.specifications))
    .bind(product.is_featured)
    .bind(product.is_active)
    .bind(product.in_stock)
    .bind(product.rating)
    .bind(product.review_count)
    .execute(conn)
    .await?;
    Ok(())
}

/// Recount active products per category, counting subcategory filings too.
async fn refresh_product_counts(conn: &mut PgConnection) -> Result<(), CommandError> {
    sqlx::query(
        r"
        UPDATE storefront.categories c
        SET product_count = (
            SELECT COUNT(*)::INTEGER
            FROM storefront.products p
            WHERE p.is_active AND (p.category = c.slug OR p.subcategory = c.slug)
        )
        ",
    )
    .execute(conn)
    .await?;
    Ok(())
}

/// Insert an order for the shopper with this email. `false` if there is none.
async fn insert_order(conn: &mut PgConnection, order: &SeedOrder) -> Result<bool, CommandError> {
    let inserted = sqlx::query(
        r"
        INSERT INTO storefront.orders (user_id, placed_at, total, status, item_count)
        SELECT id, COALESCE($2, now()), $3, $4, $5
        FROM storefront.users
        WHERE email = $1
        ",
    )
    .bind(order.email.trim().to_lowercase())
    .bind(order.placed_at)
    .bind(order.total)
    .bind(order.status)
    .bind(order.item_count)
    .execute(conn)
    .await?;
    Ok(inserted.rows_affected() > 0)
}

/// Show row counts for the catalog and shopper tables.
///
/// # Errors
///
/// Returns an error if the database connection fails.
pub async fn stats() -> Result<(), CommandError> {
    let pool = connect().await?;

    let count = |sql: &'static str| {
        let pool = pool.clone();
        async move { sqlx::query_scalar::<_, i64>(sql).fetch_one(&pool).await }
    };

    let categories = count("SELECT COUNT(*) FROM storefront.categories").await?;
    let products = count("SELECT COUNT(*) FROM storefront.products").await?;
    let active = count("SELECT COUNT(*) FROM storefront.products WHERE is_active").await?;
    let users = count("SELECT COUNT(*) FROM storefront.users").await?;
    let orders = count("SELECT COUNT(*) FROM storefront.orders").await?;

    info!("Storefront Statistics");
    info!("=====================");
    info!("Categories: {categories}");
    info!("Products: {products} ({active} active)");
    info!("Shoppers: {users}");
    info!("Orders: {orders}");

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SEED: &str = r#"
categories:
  - { name: Audio, slug: audio }
  - { name: Earbuds, slug: earbuds, parent: audio }
products:
  - name: Studio Headphones
    price: "199.00"
    discount_price: "149.00"
    category: audio
    features: [wireless]
    rating: "4.5"
  - name: Sport Buds
    price: "59.99"
    category: audio
    subcategory: earbuds
    in_stock: false
"#;

    #[test]
    fn test_parse_seed_file() {
        let seed: SeedFile = serde_yaml::from_str(SEED).unwrap();
        assert_eq!(seed.categories.len(), 2);
        assert_eq!(seed.products.len(), 2);
        assert!(seed.orders.is_empty());

        let buds = seed.products.get(1).unwrap();
        assert!(buds.is_active);
        assert!(!buds.in_stock);
        assert_eq!(buds.price, Decimal::new(5999, 2));
    }

    #[test]
    fn test_valid_seed_has_no_errors() {
        let seed: SeedFile = serde_yaml::from_str(SEED).unwrap();
        assert!(validate(&seed).is_empty());
    }

    #[test]
    fn test_child_before_parent_is_rejected() {
        let seed: SeedFile = serde_yaml::from_str(
            r"
categories:
  - { name: Earbuds, slug: earbuds, parent: audio }
  - { name: Audio, slug: audio }
",
        )
        .unwrap();
        let errors = validate(&seed);
        assert_eq!(errors.len(), 1);
        assert!(errors.first().unwrap().contains("parent audio"));
    }

    #[test]
    fn test_product_problems_are_reported() {
        let seed: SeedFile = serde_yaml::from_str(
            r#"
categories:
  - { name: Audio, slug: audio }
products:
  - { name: Ghost, price: "10", category: video }
  - { name: Upside Down, price: "10", discount_price: "12", category: audio }
  - { name: Overrated, price: "10", category: audio, rating: "5.5" }
orders:
  - { email: not-an-email, total: "10" }
"#,
        )
        .unwrap();
        let errors = validate(&seed);
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| e.contains("unknown category video")));
        assert!(errors.iter().any(|e| e.contains("discount price")));
        assert!(errors.iter().any(|e| e.contains("rating")));
        assert!(errors.iter().any(|e| e.contains("invalid email")));
    }
}
