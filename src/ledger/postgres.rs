//! PostgreSQL ledger store and transfer engine.
//!
//! The database is the single ordering authority. All balance mutations
//! happen inside one transaction under `FOR NO KEY UPDATE` row locks, so
//! concurrent transfers over a shared account serialize on that account's
//! row while disjoint pairs proceed in parallel. Cancellation is the usual
//! tokio story: dropping a request future drops the open [`sqlx`]
//! transaction, which rolls it back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;

use crate::api::{
    is_company_account, Account, EntryType, Transaction, TransferRequest, WalletError,
};
use crate::ledger::repository::Repository;
use crate::ledger::validation::{
    normalize_account_id, normalize_currency, validate_currency_and_account,
};

/// Ledger repository backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

/// Joined projection row shared by every transaction read.
#[derive(sqlx::FromRow)]
struct EntryRow {
    id: i64,
    user_id: String,
    currency: String,
    amount: Decimal,
    debit_credit: String,
    balance: Decimal,
    description: String,
    created_at: DateTime<Utc>,
}

impl EntryRow {
    fn into_transaction(self) -> Result<Transaction, WalletError> {
        Ok(Transaction {
            tx_id: self.id,
            account_id: self.user_id,
            entry_type: self.debit_credit.parse()?,
            amount: self.amount,
            currency: self.currency,
            running_balance: self.balance,
            remarks: self.description,
            time: self.created_at,
        })
    }
}

const SELECT_ENTRY: &str = r#"
    SELECT transactions.id, accounts.user_id, accounts.currency,
           transactions.amount, transactions.debit_credit,
           accounts.balance, transactions.description, transactions.created_at
    FROM transactions
    JOIN accounts ON transactions.account_id = accounts.id
"#;

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ensure the account row exists before it can be locked. A no-op
    /// update on conflict so `RETURNING` always yields the surrogate id.
    async fn upsert_account(&self, user_id: &str, currency: &str) -> Result<i64, WalletError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO accounts (user_id, currency)
            VALUES ($1, $2)
            ON CONFLICT (user_id, currency)
            DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(currency)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Read back the freshly committed pair, DEBIT half first.
    async fn transactions_by_ids(
        &self,
        debit_id: i64,
        credit_id: i64,
    ) -> Result<Vec<Transaction>, WalletError> {
        let rows: Vec<EntryRow> =
            sqlx::query_as(&format!("{SELECT_ENTRY} WHERE transactions.id IN ($1, $2)"))
                .bind(debit_id)
                .bind(credit_id)
                .fetch_all(&self.pool)
                .await?;

        let mut entries = rows
            .into_iter()
            .map(EntryRow::into_transaction)
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|tx| tx.entry_type == EntryType::Credit);

        if entries.len() != 2 {
            return Err(WalletError::IncompleteTransaction);
        }

        Ok(entries)
    }
}

/// A unique violation on (group_id, debit_credit, account_id) is the
/// database telling us this idempotency key was already spent.
fn classify_insert_error(err: sqlx::Error) -> WalletError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            WalletError::DuplicateTransaction
        }
        _ => WalletError::Database(err),
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn transfer(
        &self,
        request: &TransferRequest,
        idempotency_key: &str,
    ) -> Result<Vec<Transaction>, WalletError> {
        let currency = normalize_currency(&request.currency);
        let from_account_id = normalize_account_id(&request.from_account_id);
        let to_account_id = normalize_account_id(&request.to_account_id);
        let remarks = request.remarks.trim();
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

        // Cheap fast-fail; the unique constraint on the pair inserts below
        // remains the authoritative replay guard.
        let existing: i64 =
            sqlx::query_scalar("SELECT count(1) FROM transactions WHERE group_id = $1")
                .bind(idempotency_key)
                .fetch_one(&self.pool)
                .await?;
        if existing > 0 {
            return Err(WalletError::DuplicateTransaction);
        }

        self.upsert_account(&from_account_id, &currency).await?;
        self.upsert_account(&to_account_id, &currency).await?;

        let mut tx = self.pool.begin().await?;

        // Lock the source row and check coverage. The company account is
        // the only one allowed to go negative.
        let (src_id, src_balance): (i64, Decimal) = sqlx::query_as(
            r#"
            SELECT id, balance FROM accounts
            WHERE user_id = $1 AND currency = $2
            FOR NO KEY UPDATE
            "#,
        )
        .bind(&from_account_id)
        .bind(&currency)
        .fetch_one(&mut *tx)
        .await?;

        let allow_negative = is_company_account(&from_account_id);
        if src_balance < amount && !allow_negative {
            return Err(WalletError::InsufficientBalance);
        }

        let (dst_id, _dst_balance): (i64, Decimal) = sqlx::query_as(
            r#"
            SELECT id, balance FROM accounts
            WHERE user_id = $1 AND currency = $2
            FOR NO KEY UPDATE
            "#,
        )
        .bind(&to_account_id)
        .bind(&currency)
        .fetch_one(&mut *tx)
        .await?;

        let debit_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO transactions (account_id, amount, debit_credit, description, group_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(src_id)
        .bind(amount)
        .bind(EntryType::Debit.as_str())
        .bind(remarks)
        .bind(idempotency_key)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_insert_error)?;

        let credit_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO transactions (account_id, amount, debit_credit, description, group_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(dst_id)
        .bind(amount)
        .bind(EntryType::Credit.as_str())
        .bind(remarks)
        .bind(idempotency_key)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_insert_error)?;

        let new_src_balance: Decimal = sqlx::query_scalar(
            "UPDATE accounts SET balance = balance + $1 WHERE id = $2 RETURNING balance",
        )
        .bind(-amount)
        .bind(src_id)
        .fetch_one(&mut *tx)
        .await?;

        // Re-check after the write. The row lock already serializes
        // writers; this catches anything it did not.
        if new_src_balance.is_sign_negative() && !allow_negative {
            return Err(WalletError::InsufficientBalance);
        }

        sqlx::query("UPDATE accounts SET balance = balance + $1 WHERE id = $2")
            .bind(amount)
            .bind(dst_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            from = %from_account_id,
            to = %to_account_id,
            %currency,
            %amount,
            group_id = %idempotency_key,
            "transfer committed"
        );

        self.transactions_by_ids(debit_id, credit_id).await
    }

    async fn get_account_balance(
        &self,
        currency: &str,
        account_id: &str,
    ) -> Result<Account, WalletError> {
        let currency = normalize_currency(currency);
        let account_id = normalize_account_id(account_id);
        validate_currency_and_account(&currency, &account_id)?;

        let balance: Option<Decimal> = sqlx::query_scalar(
            "SELECT balance FROM accounts WHERE user_id = $1 AND currency = $2",
        )
        .bind(&account_id)
        .bind(&currency)
        .fetch_optional(&self.pool)
        .await?;

        match balance {
            Some(balance) => Ok(Account {
                account_id,
                currency,
                balance,
            }),
            // The company account materializes on first debit; until then
            // its balance reads as zero.
            None if is_company_account(&account_id) => Ok(Account {
                account_id,
                currency,
                balance: Decimal::ZERO,
            }),
            None => Err(WalletError::AccountNotFound),
        }
    }

    async fn get_transaction(&self, tx_id: i64) -> Result<Transaction, WalletError> {
        let row: Option<EntryRow> =
            sqlx::query_as(&format!("{SELECT_ENTRY} WHERE transactions.id = $1"))
                .bind(tx_id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => row.into_transaction(),
            None => Err(WalletError::TransactionNotFound),
        }
    }

    async fn get_transactions(
        &self,
        currency: &str,
        account_id: &str,
    ) -> Result<Vec<Transaction>, WalletError> {
        let currency = normalize_currency(currency);
        let account_id = normalize_account_id(account_id);
        validate_currency_and_account(&currency, &account_id)?;

        let rows: Vec<EntryRow> = sqlx::query_as(&format!(
            r#"{SELECT_ENTRY}
            WHERE accounts.currency = $1 AND accounts.user_id = $2
            ORDER BY transactions.created_at DESC, transactions.id DESC
            "#
        ))
        .bind(&currency)
        .bind(&account_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EntryRow::into_transaction).collect()
    }
}
