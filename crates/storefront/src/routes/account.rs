//! Account route handlers.
//!
//! Profile, order history, addresses, payment methods and notification
//! preferences. All handlers require a signed-in shopper.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lumina_core::{
    AddressId, AddressInput, Channel, Email, NotificationKind, NotificationSettings,
    PaymentDetails, PaymentMethodId, ProfileUpdate, UserId,
};

use crate::db::{
    Address, AddressRepository, DocumentRepository, Order, OrderRepository, PaymentMethod,
    PaymentMethodRepository, RepositoryError, UserDocument,
};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::routes::extract::{AppJson, AppPath};
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Orders shown on the account overview.
const RECENT_ORDERS: i64 = 3;

// =============================================================================
// Response Types
// =============================================================================

/// Profile data merged from the user row and the user document.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
    pub phone: String,
    pub address: String,
    pub birth_date: Option<NaiveDate>,
    pub member_since: DateTime<Utc>,
}

impl ProfileView {
    fn new(user: User, document: &UserDocument) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            phone: document.phone.clone(),
            address: document.address.clone(),
            birth_date: document.birth_date,
            member_since: user.created_at,
        }
    }
}

/// An order with its short display reference.
#[derive(Debug, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub reference: String,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            reference: format!("#{}", order.id.short_ref()),
            order,
        }
    }
}

/// Counters for the account overview.
#[derive(Debug, Serialize)]
pub struct AccountCounts {
    pub orders: i64,
    pub addresses: i64,
    pub payment_methods: i64,
    pub cart_items: u64,
    pub wishlist_items: usize,
}

/// Account overview.
#[derive(Debug, Serialize)]
pub struct AccountOverview {
    pub profile: ProfileView,
    pub recent_orders: Vec<OrderView>,
    pub counts: AccountCounts,
}

/// Body for saving a payment method.
#[derive(Debug, Deserialize)]
pub struct PaymentMethodRequest {
    #[serde(flatten)]
    pub details: PaymentDetails,
    #[serde(default)]
    pub is_default: bool,
}

/// Body for flipping one notification flag.
#[derive(Debug, Deserialize)]
pub struct ToggleNotificationRequest {
    pub channel: Channel,
    pub kind: NotificationKind,
}

// =============================================================================
// Overview, Profile and Orders
// =============================================================================

/// Account overview: profile, recent orders and counters.
#[instrument(skip(state, current), fields(user_id = %current.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<AccountOverview>> {
    let pool = state.pool();
    let auth = AuthService::new(pool);
    let documents = DocumentRepository::new(pool);
    let orders = OrderRepository::new(pool);
    let addresses = AddressRepository::new(pool);
    let payment_methods = PaymentMethodRepository::new(pool);

    let user = auth.get_user(current.id).await?;
    let (document, recent, order_count, address_count, payment_method_count) = tokio::try_join!(
        documents.get(current.id),
        orders.for_user(current.id, Some(RECENT_ORDERS)),
        orders.count(current.id),
        addresses.count(current.id),
        payment_methods.count(current.id),
    )?;

    let counts = AccountCounts {
        orders: order_count,
        addresses: address_count,
        payment_methods: payment_method_count,
        cart_items: document.lists.total_items(),
        wishlist_items: document.lists.wishlist.len(),
    };

    Ok(Json(AccountOverview {
        profile: ProfileView::new(user, &document),
        recent_orders: recent.into_iter().map(OrderView::from).collect(),
        counts,
    }))
}

/// Current profile.
#[instrument(skip(state, current), fields(user_id = %current.id))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<ProfileView>> {
    let user = AuthService::new(state.pool()).get_user(current.id).await?;
    let document = DocumentRepository::new(state.pool()).get(current.id).await?;
    Ok(Json(ProfileView::new(user, &document)))
}

/// Save profile edits.
#[instrument(skip(state, current, body), fields(user_id = %current.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    AppJson(body): AppJson<ProfileUpdate>,
) -> Result<Json<ProfileView>> {
    let update = body.validated()?;
    DocumentRepository::new(state.pool())
        .update_profile(current.id, &update)
        .await?;
    add_breadcrumb("account", "profile updated", None);

    profile(State(state), RequireAuth(current)).await
}

/// Full order history, newest first.
#[instrument(skip(state, current), fields(user_id = %current.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Vec<OrderView>>> {
    let orders = OrderRepository::new(state.pool())
        .for_user(current.id, None)
        .await?;
    Ok(Json(orders.into_iter().map(OrderView::from).collect()))
}

// =============================================================================
// Addresses
// =============================================================================

/// Saved addresses, default first.
#[instrument(skip(state, current), fields(user_id = %current.id))]
pub async fn addresses(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Vec<Address>>> {
    let addresses = AddressRepository::new(state.pool()).list(current.id).await?;
    Ok(Json(addresses))
}

/// Save a new address.
#[instrument(skip(state, current, body), fields(user_id = %current.id))]
pub async fn create_address(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    AppJson(body): AppJson<AddressInput>,
) -> Result<(StatusCode, Json<Address>)> {
    let input = body.validated()?;
    let address = AddressRepository::new(state.pool())
        .create(current.id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// Replace an address.
#[instrument(skip(state, current, body), fields(user_id = %current.id))]
pub async fn update_address(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    AppPath(id): AppPath<AddressId>,
    AppJson(body): AppJson<AddressInput>,
) -> Result<Json<Address>> {
    let input = body.validated()?;
    let address = AddressRepository::new(state.pool())
        .update(current.id, id, &input)
        .await
        .map_err(|e| not_found_as(e, "Address not found"))?;
    Ok(Json(address))
}

/// Delete an address.
#[instrument(skip(state, current), fields(user_id = %current.id))]
pub async fn delete_address(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    AppPath(id): AppPath<AddressId>,
) -> Result<StatusCode> {
    AddressRepository::new(state.pool())
        .delete(current.id, id)
        .await
        .map_err(|e| not_found_as(e, "Address not found"))?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Payment Methods
// =============================================================================

/// Saved payment methods with numbers masked.
#[instrument(skip(state, current), fields(user_id = %current.id))]
pub async fn payment_methods(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Vec<PaymentMethod>>> {
    let methods = PaymentMethodRepository::new(state.pool())
        .list(current.id)
        .await?;
    Ok(Json(methods.iter().map(PaymentMethod::masked).collect()))
}

/// Save a new payment method.
#[instrument(skip(state, current, body), fields(user_id = %current.id, kind = body.details.kind()))]
pub async fn create_payment_method(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    AppJson(body): AppJson<PaymentMethodRequest>,
) -> Result<(StatusCode, Json<PaymentMethod>)> {
    let details = body.details.validated()?;
    let method = PaymentMethodRepository::new(state.pool())
        .create(current.id, &details, body.is_default)
        .await?;
    add_breadcrumb(
        "account",
        "payment method added",
        Some(&[("kind", method.details.kind())]),
    );
    Ok((StatusCode::CREATED, Json(method.masked())))
}

/// Replace a payment method.
#[instrument(skip(state, current, body), fields(user_id = %current.id))]
pub async fn update_payment_method(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    AppPath(id): AppPath<PaymentMethodId>,
    AppJson(body): AppJson<PaymentMethodRequest>,
) -> Result<Json<PaymentMethod>> {
    let details = body.details.validated()?;
    let method = PaymentMethodRepository::new(state.pool())
        .update(current.id, id, &details, body.is_default)
        .await
        .map_err(|e| not_found_as(e, "Payment method not found"))?;
    Ok(Json(method.masked()))
}

/// Delete a payment method.
#[instrument(skip(state, current), fields(user_id = %current.id))]
pub async fn delete_payment_method(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    AppPath(id): AppPath<PaymentMethodId>,
) -> Result<StatusCode> {
    PaymentMethodRepository::new(state.pool())
        .delete(current.id, id)
        .await
        .map_err(|e| not_found_as(e, "Payment method not found"))?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Notifications
// =============================================================================

/// Notification preferences.
#[instrument(skip(state, current), fields(user_id = %current.id))]
pub async fn notifications(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<NotificationSettings>> {
    let document = DocumentRepository::new(state.pool()).get(current.id).await?;
    Ok(Json(document.notification_settings))
}

/// Flip one preference and return the new settings.
#[instrument(skip(state, current), fields(user_id = %current.id))]
pub async fn toggle_notification(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    AppJson(body): AppJson<ToggleNotificationRequest>,
) -> Result<Json<NotificationSettings>> {
    let (settings, enabled) = DocumentRepository::new(state.pool())
        .modify_notifications(current.id, |settings| {
            settings
                .toggle(body.channel, body.kind)
                .map_err(AppError::from)
        })
        .await?;

    tracing::info!(
        channel = %body.channel,
        kind = %body.kind,
        enabled,
        "notification preference changed"
    );
    Ok(Json(settings))
}

/// Give repository `NotFound` a message naming the record.
fn not_found_as(err: RepositoryError, message: &str) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound(message.to_string()),
        other => AppError::Database(other),
    }
}
