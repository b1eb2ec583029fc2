//! Wire types and the error taxonomy shared by the server, the typed
//! clients, and the tests.
//!
//! Amounts and balances are [`rust_decimal::Decimal`] everywhere. They
//! serialize as decimal strings so JSON round-trips never lose precision.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Reserved counterparty account for deposits and withdrawals. The only
/// account allowed to hold a negative balance. Compared case-insensitively.
pub const COMPANY_ACCOUNT_ID: &str = "company";

/// Returns true when `account_id` names the company (house) account.
pub fn is_company_account(account_id: &str) -> bool {
    account_id.trim().eq_ignore_ascii_case(COMPANY_ACCOUNT_ID)
}

/// Side of a double-entry ledger pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryType {
    Debit,
    Credit,
}

impl EntryType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::Debit => "DEBIT",
            EntryType::Credit => "CREDIT",
        }
    }

    /// The other half of a pair.
    pub fn opposite(self) -> EntryType {
        match self {
            EntryType::Debit => EntryType::Credit,
            EntryType::Credit => EntryType::Debit,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEBIT" => Ok(EntryType::Debit),
            "CREDIT" => Ok(EntryType::Credit),
            other => Err(WalletError::Unexpected(format!(
                "unknown entry type: {other}"
            ))),
        }
    }
}

/// Balance projection of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Account {
    #[serde(rename = "account")]
    pub account_id: String,
    pub currency: String,
    /// Exact decimal, serialized as a string.
    pub balance: Decimal,
}

/// One half of a double-entry pair, joined to its owning account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub tx_id: i64,
    /// The owning account's user id, not the surrogate database id.
    pub account_id: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub amount: Decimal,
    pub currency: String,
    /// The owning account's balance at read time. Not a historical
    /// balance-after-this-entry snapshot.
    pub running_balance: Decimal,
    pub remarks: String,
    pub time: DateTime<Utc>,
}

/// Canonical money-movement request handed to the transfer engine.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransferRequest {
    pub from_account_id: String,
    pub to_account_id: String,
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub remarks: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DepositRequest {
    pub currency: String,
    /// Destination account.
    pub account_id: String,
    pub amount: Decimal,
    #[serde(default)]
    pub remarks: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawRequest {
    pub currency: String,
    /// Source account.
    pub account_id: String,
    pub amount: Decimal,
    #[serde(default)]
    pub remarks: String,
}

/// Error body returned by every failing endpoint. `error_code` mirrors the
/// HTTP status for machine consumers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error_code: i32,
    pub message: String,
}

/// Domain error taxonomy. Classified at the engine boundary and mapped to
/// HTTP statuses by the gateway.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("invalid request")]
    InvalidRequest,

    #[error("invalid currency")]
    InvalidCurrency,

    #[error("invalid account id")]
    InvalidAccountId,

    #[error("invalid amount")]
    InvalidAmount,

    #[error("negative amount")]
    NegativeAmount,

    #[error("same account ids")]
    SameAccountIds,

    #[error("cannot use company account")]
    CompanyAccount,

    #[error("missing idempotency key")]
    MissingIdempotencyKey,

    #[error("account not found")]
    AccountNotFound,

    #[error("transaction not found")]
    TransactionNotFound,

    #[error("insufficient balance")]
    InsufficientBalance,

    #[error("duplicate transaction")]
    DuplicateTransaction,

    #[error("transaction did not complete")]
    IncompleteTransaction,

    #[error("transfer failed")]
    TransferFailed,

    #[error("unhandled database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn entry_type_round_trips_through_strings() {
        assert_eq!(EntryType::Debit.as_str(), "DEBIT");
        assert_eq!("CREDIT".parse::<EntryType>().unwrap(), EntryType::Credit);
        assert!("credit".parse::<EntryType>().is_err());
    }

    #[test]
    fn entry_type_opposite() {
        assert_eq!(EntryType::Debit.opposite(), EntryType::Credit);
        assert_eq!(EntryType::Credit.opposite(), EntryType::Debit);
    }

    #[test]
    fn company_account_matching_is_case_insensitive() {
        assert!(is_company_account("company"));
        assert!(is_company_account("COMPANY"));
        assert!(is_company_account("  Company "));
        assert!(!is_company_account("company2"));
    }

    #[test]
    fn account_serializes_balance_as_decimal_string() {
        let account = Account {
            account_id: "User1".to_string(),
            currency: "USD".to_string(),
            balance: dec!(100.50),
        };
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["account"], "User1");
        assert_eq!(json["balance"], "100.50");
    }

    #[test]
    fn transfer_request_accepts_string_amounts() {
        let req: TransferRequest = serde_json::from_str(
            r#"{"from_account_id":"a","to_account_id":"b","amount":"0.0000000001","currency":"USD"}"#,
        )
        .unwrap();
        assert_eq!(req.amount, dec!(0.0000000001));
        assert_eq!(req.remarks, "");
    }

    #[test]
    fn transaction_serializes_type_field() {
        let tx = Transaction {
            tx_id: 7,
            account_id: "User1".to_string(),
            entry_type: EntryType::Credit,
            amount: dec!(1.25),
            currency: "USD".to_string(),
            running_balance: dec!(1.25),
            remarks: String::new(),
            time: Utc::now(),
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "CREDIT");
        assert_eq!(json["amount"], "1.25");
    }
}
