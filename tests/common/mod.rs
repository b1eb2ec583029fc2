//! In-memory ledger implementation for API tests.
//!
//! Mirrors the engine's observable semantics (validation order, error
//! kinds, double-entry bookkeeping, idempotency) behind a mutex instead
//! of a database, so the gateway can be exercised without PostgreSQL.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use walletd::api::{
    is_company_account, Account, EntryType, Transaction, TransferRequest, WalletError,
};
use walletd::ledger::validation::{
    normalize_account_id, normalize_currency, validate_currency_and_account,
};
use walletd::ledger::Repository;

struct StoredEntry {
    tx_id: i64,
    user_id: String,
    currency: String,
    entry_type: EntryType,
    amount: Decimal,
    remarks: String,
    time: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    // (user_id, currency) -> balance
    balances: HashMap<(String, String), Decimal>,
    entries: Vec<StoredEntry>,
    groups: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryRepository {
    inner: Mutex<Inner>,
    next_tx_id: AtomicI64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> i64 {
        self.next_tx_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn project(inner: &Inner, entry: &StoredEntry) -> Transaction {
        let balance = inner
            .balances
            .get(&(entry.user_id.clone(), entry.currency.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO);

        Transaction {
            tx_id: entry.tx_id,
            account_id: entry.user_id.clone(),
            entry_type: entry.entry_type,
            amount: entry.amount,
            currency: entry.currency.clone(),
            running_balance: balance,
            remarks: entry.remarks.clone(),
            time: entry.time,
        }
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn transfer(
        &self,
        request: &TransferRequest,
        idempotency_key: &str,
    ) -> Result<Vec<Transaction>, WalletError> {
        let currency = normalize_currency(&request.currency);
        let from_account_id = normalize_account_id(&request.from_account_id);
        let to_account_id = normalize_account_id(&request.to_account_id);
        let remarks = request.remarks.trim().to_string();
        let amount = request.amount;

        validate_currency_and_account(&currency, &from_account_id)?;
        validate_currency_and_account(&currency, &to_account_id)?;

        if from_account_id.eq_ignore_ascii_case(&to_account_id) {
            return Err(WalletError::SameAccountIds);
        }

        if amount.is_zero() {
            return Err(WalletError::InvalidAmount);
        }

        if amount.is_sign_negative() {
            return Err(WalletError::NegativeAmount);
        }

        let mut inner = self.inner.lock().unwrap();

        if inner.groups.contains(idempotency_key) {
            return Err(WalletError::DuplicateTransaction);
        }

        let src_key = (from_account_id.clone(), currency.clone());
        let dst_key = (to_account_id.clone(), currency.clone());

        let src_balance = inner.balances.get(&src_key).copied().unwrap_or(Decimal::ZERO);
        if src_balance < amount && !is_company_account(&from_account_id) {
            return Err(WalletError::InsufficientBalance);
        }

        *inner.balances.entry(src_key).or_insert(Decimal::ZERO) -= amount;
        *inner.balances.entry(dst_key).or_insert(Decimal::ZERO) += amount;
        inner.groups.insert(idempotency_key.to_string());

        let now = Utc::now();
        let debit = StoredEntry {
            tx_id: self.next_id(),
            user_id: from_account_id,
            currency: currency.clone(),
            entry_type: EntryType::Debit,
            amount,
            remarks: remarks.clone(),
            time: now,
        };
        let credit = StoredEntry {
            tx_id: self.next_id(),
            user_id: to_account_id,
            currency,
            entry_type: EntryType::Credit,
            amount,
            remarks,
            time: now,
        };

        let pair = vec![
            Self::project(&inner, &debit),
            Self::project(&inner, &credit),
        ];
        inner.entries.push(debit);
        inner.entries.push(credit);

        Ok(pair)
    }

    async fn get_account_balance(
        &self,
        currency: &str,
        account_id: &str,
    ) -> Result<Account, WalletError> {
        let currency = normalize_currency(currency);
        let account_id = normalize_account_id(account_id);
        validate_currency_and_account(&currency, &account_id)?;

        let inner = self.inner.lock().unwrap();
        match inner
            .balances
            .get(&(account_id.clone(), currency.clone()))
            .copied()
        {
            Some(balance) => Ok(Account {
                account_id,
                currency,
                balance,
            }),
            None if is_company_account(&account_id) => Ok(Account {
                account_id,
                currency,
                balance: Decimal::ZERO,
            }),
            None => Err(WalletError::AccountNotFound),
        }
    }

    async fn get_transaction(&self, tx_id: i64) -> Result<Transaction, WalletError> {
        let inner = self.inner.lock().unwrap();
        inner
            .entries
            .iter()
            .find(|entry| entry.tx_id == tx_id)
            .map(|entry| Self::project(&inner, entry))
            .ok_or(WalletError::TransactionNotFound)
    }

    async fn get_transactions(
        &self,
        currency: &str,
        account_id: &str,
    ) -> Result<Vec<Transaction>, WalletError> {
        let currency = normalize_currency(currency);
        let account_id = normalize_account_id(account_id);
        validate_currency_and_account(&currency, &account_id)?;

        let inner = self.inner.lock().unwrap();
        let mut transactions: Vec<Transaction> = inner
            .entries
            .iter()
            .filter(|entry| entry.user_id == account_id && entry.currency == currency)
            .map(|entry| Self::project(&inner, entry))
            .collect();

        // Ids are allocated in insertion order, so id-descending is
        // newest-first even for same-timestamp pairs.
        transactions.sort_by_key(|tx| std::cmp::Reverse(tx.tx_id));
        Ok(transactions)
    }
}
