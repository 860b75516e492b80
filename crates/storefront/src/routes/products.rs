//! Product listing, product detail and shop route handlers.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::instrument;

use lumina_core::catalog::{self, FilterFacets, ShopQuery, ShopSort};
use lumina_core::{Product, ProductId};

use crate::error::{AppError, Result};
use crate::routes::extract::AppPath;
use crate::routes::query::QueryParams;
use crate::state::AppState;

/// Product detail with the computed saving.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub savings_percent: Option<u32>,
}

/// Shop listing response.
#[derive(Debug, Serialize)]
pub struct ShopResponse<'a> {
    pub products: Vec<&'a Product>,
    pub total: usize,
    pub sort_by: ShopSort,
}

/// Active products in catalog order.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.catalog().products().await?;
    Ok(Json(catalog::active_products(&products).cloned().collect()))
}

/// Product detail page data.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    AppPath(id): AppPath<ProductId>,
) -> Result<Json<ProductDetail>> {
    let product = state
        .catalog()
        .active_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))?;

    let savings_percent = product.savings_percent();
    Ok(Json(ProductDetail {
        product,
        savings_percent,
    }))
}

/// Build shop filters from the query string.
fn shop_query(params: &QueryParams) -> Result<ShopQuery> {
    let defaults = ShopQuery::default();
    Ok(ShopQuery {
        q: params.first("q").map(String::from),
        categories: params.list("categories"),
        min_price: params.parse("min_price")?.unwrap_or(defaults.min_price),
        max_price: params.parse("max_price")?.unwrap_or(defaults.max_price),
        features: params.list("features"),
        sort_by: params.parse("sort_by")?.unwrap_or(defaults.sort_by),
    })
}

/// Filtered and sorted shop listing.
#[instrument(skip(state, params))]
pub async fn shop(
    State(state): State<AppState>,
    params: QueryParams,
) -> Result<Response> {
    let query = shop_query(&params)?;
    let products = state.catalog().products().await?;
    let matches = catalog::shop(&products, &query);

    let response = ShopResponse {
        total: matches.len(),
        products: matches,
        sort_by: query.sort_by,
    };
    Ok(Json(response).into_response())
}

/// Categories, features and brands for the shop filter panel.
#[instrument(skip(state))]
pub async fn facets(State(state): State<AppState>) -> Result<Response> {
    let products = state.catalog().products().await?;
    let categories = state.catalog().categories().await?;
    let facets = FilterFacets::collect(&products, &categories);
    Ok(Json(facets).into_response())
}
