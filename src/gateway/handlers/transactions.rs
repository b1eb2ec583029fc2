//! Transaction lookup handlers.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::{Transaction, WalletError};
use crate::gateway::state::AppState;
use crate::gateway::types::ApiError;

/// Single ledger entry lookup.
///
/// GET /transactions/{tx_id}
///
/// The route the read cache fronts: a committed entry never changes, so
/// its projection is safe to serve from cache. An unparseable id
/// identifies nothing and reports not-found.
#[utoipa::path(
    get,
    path = "/transactions/{tx_id}",
    params(
        ("tx_id" = i64, Path, description = "Ledger entry id")
    ),
    responses(
        (status = 200, description = "Ledger entry", body = Transaction, content_type = "application/json"),
        (status = 404, description = "Transaction not found")
    ),
    tag = "Read"
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(tx_id): Path<String>,
) -> Result<Json<Transaction>, ApiError> {
    let tx_id: i64 = tx_id
        .trim()
        .parse()
        .map_err(|_| WalletError::TransactionNotFound)?;

    let tx = state.repo.get_transaction(tx_id).await?;

    Ok(Json(tx))
}

/// Per-account transaction history, newest first.
///
/// GET /transactions/{account_id}/{currency}
#[utoipa::path(
    get,
    path = "/transactions/{account_id}/{currency}",
    params(
        ("account_id" = String, Path, description = "User account id"),
        ("currency" = String, Path, description = "Currency code")
    ),
    responses(
        (status = 200, description = "Transaction history, empty array when none", body = [Transaction], content_type = "application/json"),
        (status = 400, description = "Invalid currency or account id")
    ),
    tag = "Read"
)]
pub async fn get_transactions(
    State(state): State<AppState>,
    Path((account_id, currency)): Path<(String, String)>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let transactions = state.repo.get_transactions(&currency, &account_id).await?;

    Ok(Json(transactions))
}
