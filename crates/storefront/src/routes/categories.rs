//! Category route handlers.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::instrument;

use lumina_core::catalog;
use lumina_core::{Category, Product};

use crate::error::{AppError, Result};
use crate::routes::extract::AppPath;
use crate::state::AppState;

/// A category with the products filed under it.
#[derive(Debug, Serialize)]
pub struct CategoryDetail<'a> {
    pub category: &'a Category,
    pub subcategories: Vec<&'a Category>,
    pub products: Vec<&'a Product>,
}

/// Top-level categories.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = state.catalog().categories().await?;
    Ok(Json(
        catalog::top_level_categories(&categories).cloned().collect(),
    ))
}

/// One category, its children and its active products.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
) -> Result<Response> {
    let categories = state.catalog().categories().await?;
    let category = categories
        .iter()
        .find(|c| c.slug == slug)
        .ok_or_else(|| AppError::NotFound(format!("Category {slug} not found")))?;

    let products = state.catalog().products().await?;
    let detail = CategoryDetail {
        category,
        subcategories: categories
            .iter()
            .filter(|c| c.parent_id == Some(category.id))
            .collect(),
        products: catalog::products_in_category(&products, &slug).collect(),
    };

    Ok(Json(detail).into_response())
}
