//! Money-movement handlers: deposit, withdraw, transfer.
//!
//! All three rewrite into the engine's canonical transfer. Deposits and
//! withdrawals put the company account on the opposite side; the transfer
//! endpoint forbids the company account entirely. Policy violations are
//! rejected here, before the engine runs.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::api::{
    is_company_account, DepositRequest, EntryType, Transaction, TransferRequest, WalletError,
    WithdrawRequest, COMPANY_ACCOUNT_ID,
};
use crate::gateway::state::AppState;
use crate::gateway::types::ApiError;
use crate::ledger::validation::MAX_IDEMPOTENCY_KEY_LEN;

const IDEMPOTENCY_KEY_HEADER: &str = "X-Idempotency-Key";

/// Every mutating endpoint requires a caller-supplied idempotency key,
/// bounded by the `group_id` column width.
fn require_idempotency_key(headers: &HeaderMap) -> Result<String, ApiError> {
    let key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .unwrap_or("");

    if key.is_empty() {
        return Err(WalletError::MissingIdempotencyKey.into());
    }

    if key.len() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(ApiError::bad_request(format!(
            "idempotency key exceeds {MAX_IDEMPOTENCY_KEY_LEN} characters"
        )));
    }

    Ok(key.to_string())
}

/// Pick the caller-relevant half out of the committed pair.
fn select_entry(entries: Vec<Transaction>, entry_type: EntryType) -> Result<Transaction, ApiError> {
    entries
        .into_iter()
        .find(|tx| tx.entry_type == entry_type)
        .ok_or_else(|| WalletError::IncompleteTransaction.into())
}

/// Deposit into a user account from the company account.
///
/// POST /deposit
#[utoipa::path(
    post,
    path = "/deposit",
    request_body = DepositRequest,
    params(
        ("X-Idempotency-Key" = String, Header, description = "Caller-supplied idempotency key, at most 50 characters")
    ),
    responses(
        (status = 201, description = "Deposit committed, CREDIT half returned", body = Transaction, content_type = "application/json"),
        (status = 400, description = "Malformed request, missing idempotency key, or company account named"),
        (status = 422, description = "Duplicate idempotency key")
    ),
    tag = "Movement"
)]
pub async fn deposit(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let idempotency_key = require_idempotency_key(&headers)?;

    let request: DepositRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::bad_request("failed to decode deposit request"))?;

    if request.account_id.trim().is_empty() || request.currency.trim().is_empty() {
        return Err(WalletError::InvalidRequest.into());
    }

    if is_company_account(&request.account_id) {
        return Err(WalletError::CompanyAccount.into());
    }

    let payload = TransferRequest {
        from_account_id: COMPANY_ACCOUNT_ID.to_string(),
        to_account_id: request.account_id.trim().to_string(),
        currency: request.currency.trim().to_string(),
        amount: request.amount,
        remarks: request.remarks.trim().to_string(),
    };

    let entries = state.repo.transfer(&payload, &idempotency_key).await?;
    let receipt = select_entry(entries, EntryType::Credit)?;

    tracing::info!(account = %receipt.account_id, amount = %receipt.amount, "deposit committed");
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Withdraw from a user account into the company account.
///
/// POST /withdraw
#[utoipa::path(
    post,
    path = "/withdraw",
    request_body = WithdrawRequest,
    params(
        ("X-Idempotency-Key" = String, Header, description = "Caller-supplied idempotency key, at most 50 characters")
    ),
    responses(
        (status = 201, description = "Withdrawal committed, DEBIT half returned", body = Transaction, content_type = "application/json"),
        (status = 400, description = "Malformed request, missing idempotency key, or company account named"),
        (status = 422, description = "Insufficient balance or duplicate idempotency key")
    ),
    tag = "Movement"
)]
pub async fn withdraw(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let idempotency_key = require_idempotency_key(&headers)?;

    let request: WithdrawRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::bad_request("failed to decode withdrawal request"))?;

    if request.account_id.trim().is_empty() || request.currency.trim().is_empty() {
        return Err(WalletError::InvalidRequest.into());
    }

    if is_company_account(&request.account_id) {
        return Err(WalletError::CompanyAccount.into());
    }

    let payload = TransferRequest {
        from_account_id: request.account_id.trim().to_string(),
        to_account_id: COMPANY_ACCOUNT_ID.to_string(),
        currency: request.currency.trim().to_string(),
        amount: request.amount,
        remarks: request.remarks.trim().to_string(),
    };

    let entries = state.repo.transfer(&payload, &idempotency_key).await?;
    let receipt = select_entry(entries, EntryType::Debit)?;

    tracing::info!(account = %receipt.account_id, amount = %receipt.amount, "withdrawal committed");
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Transfer between two user accounts.
///
/// POST /transfer
///
/// The company account is not a legal party here; deposits and
/// withdrawals are the only ways to touch it.
#[utoipa::path(
    post,
    path = "/transfer",
    request_body = TransferRequest,
    params(
        ("X-Idempotency-Key" = String, Header, description = "Caller-supplied idempotency key, at most 50 characters")
    ),
    responses(
        (status = 201, description = "Transfer committed, DEBIT and CREDIT halves returned", body = [Transaction], content_type = "application/json"),
        (status = 400, description = "Malformed request, same account on both sides, or company account named"),
        (status = 422, description = "Insufficient balance or duplicate idempotency key")
    ),
    tag = "Movement"
)]
pub async fn transfer(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Vec<Transaction>>), ApiError> {
    let idempotency_key = require_idempotency_key(&headers)?;

    let request: TransferRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::bad_request("failed to decode transfer request"))?;

    if request.from_account_id.trim().is_empty()
        || request.to_account_id.trim().is_empty()
        || request.currency.trim().is_empty()
    {
        return Err(WalletError::InvalidRequest.into());
    }

    if request
        .from_account_id
        .trim()
        .eq_ignore_ascii_case(request.to_account_id.trim())
    {
        return Err(WalletError::SameAccountIds.into());
    }

    if is_company_account(&request.from_account_id) || is_company_account(&request.to_account_id) {
        return Err(WalletError::CompanyAccount.into());
    }

    let payload = TransferRequest {
        from_account_id: request.from_account_id.trim().to_string(),
        to_account_id: request.to_account_id.trim().to_string(),
        currency: request.currency.trim().to_string(),
        amount: request.amount,
        remarks: request.remarks.trim().to_string(),
    };

    let entries = state.repo.transfer(&payload, &idempotency_key).await?;

    tracing::info!(
        from = %payload.from_account_id,
        to = %payload.to_account_id,
        amount = %payload.amount,
        "transfer committed"
    );
    Ok((StatusCode::CREATED, Json(entries)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn headers_with_key(key: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            IDEMPOTENCY_KEY_HEADER,
            HeaderValue::from_str(key).unwrap(),
        );
        headers
    }

    #[test]
    fn missing_idempotency_key_is_rejected() {
        let err = require_idempotency_key(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "missing idempotency key");
    }

    #[test]
    fn blank_idempotency_key_is_rejected() {
        let err = require_idempotency_key(&headers_with_key("   ")).unwrap_err();
        assert_eq!(err.message, "missing idempotency key");
    }

    #[test]
    fn overlong_idempotency_key_is_rejected() {
        let key = "k".repeat(MAX_IDEMPOTENCY_KEY_LEN + 1);
        let err = require_idempotency_key(&headers_with_key(&key)).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn idempotency_key_is_trimmed() {
        let key = require_idempotency_key(&headers_with_key(" k1 ")).unwrap();
        assert_eq!(key, "k1");
    }

    #[test]
    fn select_entry_finds_the_requested_half() {
        let entry = |entry_type| Transaction {
            tx_id: 1,
            account_id: "User1".to_string(),
            entry_type,
            amount: dec!(1),
            currency: "USD".to_string(),
            running_balance: dec!(1),
            remarks: String::new(),
            time: Utc::now(),
        };

        let picked =
            select_entry(vec![entry(EntryType::Debit), entry(EntryType::Credit)], EntryType::Credit)
                .unwrap();
        assert_eq!(picked.entry_type, EntryType::Credit);

        let missing = select_entry(vec![entry(EntryType::Debit)], EntryType::Credit);
        assert!(missing.is_err());
    }
}
