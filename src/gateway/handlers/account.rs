//! Balance lookup handler.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::Account;
use crate::gateway::state::AppState;
use crate::gateway::types::ApiError;

/// Balance lookup by account and currency.
///
/// GET /account/{account_id}/{currency}
#[utoipa::path(
    get,
    path = "/account/{account_id}/{currency}",
    params(
        ("account_id" = String, Path, description = "User account id"),
        ("currency" = String, Path, description = "Currency code")
    ),
    responses(
        (status = 200, description = "Account balance", body = Account, content_type = "application/json"),
        (status = 400, description = "Invalid currency or account id"),
        (status = 404, description = "Account not found")
    ),
    tag = "Read"
)]
pub async fn get_account_balance(
    State(state): State<AppState>,
    Path((account_id, currency)): Path<(String, String)>,
) -> Result<Json<Account>, ApiError> {
    let account = state.repo.get_account_balance(&currency, &account_id).await?;

    Ok(Json(account))
}
