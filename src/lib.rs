//! walletd - Double-entry wallet service
//!
//! A transactional wallet over PostgreSQL: every deposit, withdrawal and
//! peer-to-peer transfer is a double-entry pair committed atomically under
//! row locks, keyed by a caller-supplied idempotency token.
//!
//! # Modules
//!
//! - [`api`] - Wire types and the error taxonomy
//! - [`config`] - Environment-backed configuration
//! - [`db`] - PostgreSQL connection pool
//! - [`migration`] - Forward-only schema migration runner
//! - [`ledger`] - Ledger store, transfer engine, and read paths
//! - [`gateway`] - HTTP surface and redis read cache
//! - [`client`] - Typed remote clients
//! - [`retry`] - Client-side retry helper

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod migration;
pub mod retry;

// Convenient re-exports at crate root
pub use api::{Account, EntryType, Transaction, TransferRequest, WalletError, COMPANY_ACCOUNT_ID};
pub use config::Config;
pub use db::Database;
pub use ledger::{PostgresRepository, Repository};
pub use migration::Migrator;
