//! Repository trait for ledger access.
//!
//! The HTTP gateway consumes only this capability set, which keeps the
//! handlers testable against an in-memory implementation and leaves the
//! storage engine swappable.

use async_trait::async_trait;

use crate::api::{Account, Transaction, TransferRequest, WalletError};

/// Capability set of the ledger: one write primitive and three reads.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Execute a double-entry transfer. On success returns the created
    /// pair, DEBIT half first.
    async fn transfer(
        &self,
        request: &TransferRequest,
        idempotency_key: &str,
    ) -> Result<Vec<Transaction>, WalletError>;

    /// Balance lookup by currency and user id. The company account reports
    /// a zero balance before its first transfer; any other missing account
    /// is `AccountNotFound`.
    async fn get_account_balance(
        &self,
        currency: &str,
        account_id: &str,
    ) -> Result<Account, WalletError>;

    /// Single ledger entry by id, joined to its owning account.
    async fn get_transaction(&self, tx_id: i64) -> Result<Transaction, WalletError>;

    /// Per-account history, newest first. An empty list is a valid result.
    async fn get_transactions(
        &self,
        currency: &str,
        account_id: &str,
    ) -> Result<Vec<Transaction>, WalletError>;
}
