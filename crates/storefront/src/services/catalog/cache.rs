//! Cache types for the bulk catalog.

use std::sync::Arc;

use lumina_core::{Category, Product};

/// Cache key: one entry per collection.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<Vec<Product>>),
    Categories(Arc<Vec<Category>>),
}
