//! HTTP route handlers for storefront.
//!
//! Every route speaks JSON. Errors render as `{"error": "<message>"}`.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness
//! GET    /health/ready                    - Readiness (database)
//!
//! # Auth (strict rate limit)
//! POST   /auth/register                   - Create account and sign in
//! POST   /auth/login                      - Sign in
//! POST   /auth/logout                     - Sign out
//! GET    /auth/me                         - Current shopper
//!
//! # Catalog
//! GET    /products                        - Active products
//! GET    /products/{id}                   - Product detail
//! GET    /shop                            - Filtered shop listing
//! GET    /shop/facets                     - Filter panel options
//! GET    /categories                      - Top-level categories
//! GET    /categories/{slug}               - Category with its products
//! GET    /search                          - Search with filters
//! GET    /search/suggest                  - Search-as-you-type
//!
//! # Cart and wishlist (requires auth)
//! GET    /cart                            - Cart, saved items, totals
//! DELETE /cart                            - Clear cart
//! POST   /cart/items                      - Add product
//! PATCH  /cart/items/{product_id}         - Set quantity
//! DELETE /cart/items/{product_id}         - Remove row
//! POST   /cart/items/{product_id}/save-for-later
//! POST   /cart/items/{product_id}/move-to-wishlist
//! POST   /cart/saved/{product_id}/move-to-cart
//! GET    /wishlist
//! POST   /wishlist/items
//! DELETE /wishlist/items/{product_id}
//!
//! # Account (requires auth)
//! GET    /account                         - Overview
//! GET    /account/profile                 - Profile
//! PUT    /account/profile                 - Save profile
//! GET    /account/orders                  - Order history
//! GET    /account/addresses               - Address list
//! POST   /account/addresses               - Add address
//! PUT    /account/addresses/{id}          - Replace address
//! DELETE /account/addresses/{id}          - Delete address
//! GET    /account/payment-methods         - Masked payment methods
//! POST   /account/payment-methods         - Add payment method
//! PUT    /account/payment-methods/{id}    - Replace payment method
//! DELETE /account/payment-methods/{id}    - Delete payment method
//! GET    /account/notifications           - Notification preferences
//! POST   /account/notifications/toggle    - Flip one preference
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod extract;
pub mod health;
pub mod products;
pub mod query;
pub mod search;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the health check routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product and shop routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/shop", get(products::shop))
        .route("/shop/facets", get(products::facets))
        .route("/categories", get(categories::index))
        .route("/categories/{slug}", get(categories::show))
        .route("/search", get(search::search))
        .route("/search/suggest", get(search::suggest))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route(
            "/items/{product_id}",
            axum::routing::patch(cart::update).delete(cart::remove),
        )
        .route(
            "/items/{product_id}/save-for-later",
            post(cart::save_for_later),
        )
        .route(
            "/items/{product_id}/move-to-wishlist",
            post(cart::move_to_wishlist),
        )
        .route("/saved/{product_id}/move-to-cart", post(cart::move_to_cart))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::wishlist))
        .route("/items", post(cart::add_to_wishlist))
        .route(
            "/items/{product_id}",
            axum::routing::delete(cart::remove_from_wishlist),
        )
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    use axum::routing::put;

    Router::new()
        .route("/", get(account::index))
        .route(
            "/profile",
            get(account::profile).put(account::update_profile),
        )
        .route("/orders", get(account::orders))
        .route(
            "/addresses",
            get(account::addresses).post(account::create_address),
        )
        .route(
            "/addresses/{id}",
            put(account::update_address).delete(account::delete_address),
        )
        .route(
            "/payment-methods",
            get(account::payment_methods).post(account::create_payment_method),
        )
        .route(
            "/payment-methods/{id}",
            put(account::update_payment_method).delete(account::delete_payment_method),
        )
        .route("/notifications", get(account::notifications))
        .route(
            "/notifications/toggle",
            post(account::toggle_notification),
        )
}

/// Create all routes for the storefront.
///
/// Health checks are not rate limited. Auth endpoints get the strict
/// limiter; everything else shares the general one.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .merge(catalog_routes())
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/account", account_routes())
        .layer(api_rate_limiter());

    Router::new()
        .merge(health_routes())
        .nest("/auth", auth_routes().layer(auth_rate_limiter()))
        .merge(api)
}
