//! The ledger core: the repository capability set, field validation, and
//! the PostgreSQL store + transfer engine.

pub mod postgres;
pub mod repository;
pub mod validation;

pub use postgres::PostgresRepository;
pub use repository::Repository;
