//! Purchase ledger route handlers.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use tienda_core::Purchase;

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::PurchaseReceipt;
use crate::services::CheckoutService;
use crate::state::AppState;

/// Record a purchase. Users may only buy for themselves; administrators may
/// record purchases for anyone.
#[instrument(skip(state, user, purchase), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(purchase): Json<Purchase>,
) -> Result<(StatusCode, Json<PurchaseReceipt>)> {
    if purchase.user_id != user.id && !user.role.is_admin() {
        return Err(AppError::Forbidden(
            "Purchases can only be made for your own account".to_string(),
        ));
    }

    let receipt = CheckoutService::new(state.db()).submit(&purchase).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Purchases made by the logged-in user.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<PurchaseReceipt>>> {
    Ok(Json(state.db().purchases().list_for_user(user.id).await?))
}
