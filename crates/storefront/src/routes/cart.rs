//! Cart, saved-for-later and wishlist route handlers.
//!
//! Every handler needs a signed-in shopper. Mutations answer with the
//! updated lists so clients never have to refetch.

use axum::{
    Json,
    extract::State,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lumina_core::{CartDocument, CartItem, ProductId, SavedItem, format_price};

use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::routes::extract::{AppJson, AppPath};
use crate::services::cart::CartService;
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Body for adding a product to a list.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
}

/// Body for changing a cart row's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

/// Cart page data.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub saved_items: Vec<SavedItem>,
    pub total_items: u64,
    pub total_price: Decimal,
    /// `total_price` formatted for display (`$25.00`).
    pub total_display: String,
    pub wishlist_count: usize,
}

impl From<CartDocument> for CartView {
    fn from(lists: CartDocument) -> Self {
        let total_price = lists.total_price();
        Self {
            total_items: lists.total_items(),
            total_price,
            total_display: format_price(total_price),
            wishlist_count: lists.wishlist.len(),
            items: lists.items,
            saved_items: lists.saved_items,
        }
    }
}

/// Wishlist page data.
#[derive(Debug, Serialize)]
pub struct WishlistView {
    pub items: Vec<CartItem>,
}

impl From<CartDocument> for WishlistView {
    fn from(lists: CartDocument) -> Self {
        Self {
            items: lists.wishlist,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Cart, saved items and totals.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartView>> {
    let lists = CartService::new(state.pool(), state.catalog())
        .lists(user.id)
        .await?;
    Ok(Json(lists.into()))
}

/// Add one unit of a product.
#[instrument(skip(state, user, body), fields(user_id = %user.id, product_id = %body.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(body): AppJson<AddItemRequest>,
) -> Result<Json<CartView>> {
    let lists = CartService::new(state.pool(), state.catalog())
        .add_to_cart(user.id, body.product_id)
        .await?;
    let product_id = body.product_id.to_string();
    add_breadcrumb(
        "cart",
        "added to cart",
        Some(&[("product_id", product_id.as_str())]),
    );
    Ok(Json(lists.into()))
}

/// Set a row's quantity. Zero or less removes the row.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(product_id): AppPath<ProductId>,
    AppJson(body): AppJson<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let lists = CartService::new(state.pool(), state.catalog())
        .update_quantity(user.id, product_id, body.quantity)
        .await?;
    Ok(Json(lists.into()))
}

/// Remove a row.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(product_id): AppPath<ProductId>,
) -> Result<Json<CartView>> {
    let lists = CartService::new(state.pool(), state.catalog())
        .remove_from_cart(user.id, product_id)
        .await?;
    Ok(Json(lists.into()))
}

/// Empty the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartView>> {
    let lists = CartService::new(state.pool(), state.catalog())
        .clear_cart(user.id)
        .await?;
    Ok(Json(lists.into()))
}

/// Park a row in saved-for-later.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn save_for_later(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(product_id): AppPath<ProductId>,
) -> Result<Json<CartView>> {
    let lists = CartService::new(state.pool(), state.catalog())
        .save_for_later(user.id, product_id)
        .await?;
    Ok(Json(lists.into()))
}

/// Bring a saved row back into the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn move_to_cart(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(product_id): AppPath<ProductId>,
) -> Result<Json<CartView>> {
    let lists = CartService::new(state.pool(), state.catalog())
        .move_to_cart(user.id, product_id)
        .await?;
    Ok(Json(lists.into()))
}

/// Move a cart row to the wishlist.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn move_to_wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(product_id): AppPath<ProductId>,
) -> Result<Json<CartView>> {
    let lists = CartService::new(state.pool(), state.catalog())
        .move_to_wishlist(user.id, product_id)
        .await?;
    Ok(Json(lists.into()))
}

// =============================================================================
// Wishlist
// =============================================================================

/// Wishlist rows.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<WishlistView>> {
    let lists = CartService::new(state.pool(), state.catalog())
        .lists(user.id)
        .await?;
    Ok(Json(lists.into()))
}

/// Add a product to the wishlist.
#[instrument(skip(state, user, body), fields(user_id = %user.id, product_id = %body.product_id))]
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(body): AppJson<AddItemRequest>,
) -> Result<Json<WishlistView>> {
    let lists = CartService::new(state.pool(), state.catalog())
        .add_to_wishlist(user.id, body.product_id)
        .await?;
    Ok(Json(lists.into()))
}

/// Remove a product from the wishlist.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(product_id): AppPath<ProductId>,
) -> Result<Json<WishlistView>> {
    let lists = CartService::new(state.pool(), state.catalog())
        .remove_from_wishlist(user.id, product_id)
        .await?;
    Ok(Json(lists.into()))
}
