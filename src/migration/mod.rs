//! Forward-only schema migration runner.
//!
//! Globs `*.up.sql` files from the configured directory, applies them in
//! lexicographic order, and records each applied file name in a
//! `migrations` table. Already-recorded files are skipped, so running the
//! migrator at every startup is safe. Each file is applied in its own
//! transaction together with its bookkeeping row.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sqlx::postgres::PgPool;

const CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS migrations (
        id SERIAL NOT NULL,
        name VARCHAR(255) NOT NULL,
        created_at TIMESTAMP(3) NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (id)
    )
"#;

const UP_SUFFIX: &str = ".up.sql";

pub struct Migrator {
    pool: PgPool,
    migration_path: PathBuf,
}

impl Migrator {
    pub fn new(pool: PgPool, migration_path: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            migration_path: migration_path.into(),
        }
    }

    /// Apply all pending migrations.
    pub async fn up(&self) -> Result<()> {
        sqlx::query(CREATE_MIGRATIONS_TABLE)
            .execute(&self.pool)
            .await
            .context("failed to create migrations table")?;

        let files = migration_files(&self.migration_path)?;
        tracing::info!("found {} migrations", files.len());

        for file in files {
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .context("migration file has a non-UTF-8 name")?
                .to_string();

            if self.applied(&name).await? {
                tracing::info!(migration = %name, "skipping applied migration");
                continue;
            }

            self.apply(&file, &name)
                .await
                .with_context(|| format!("failed to apply migration {name}"))?;
            tracing::info!(migration = %name, "migration applied");
        }

        Ok(())
    }

    async fn applied(&self, name: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM migrations WHERE name = $1")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .context("failed to query applied migrations")?;

        Ok(count > 0)
    }

    async fn apply(&self, file: &Path, name: &str) -> Result<()> {
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;

        let mut tx = self.pool.begin().await?;

        sqlx::raw_sql(&content).execute(&mut *tx).await?;
        sqlx::query("INSERT INTO migrations (name) VALUES ($1)")
            .bind(name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

/// List `*.up.sql` files under `dir`, sorted lexicographically by name.
fn migration_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read migration path {}", dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(UP_SUFFIX))
        })
        .collect();

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("walletd-migrations-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn lists_only_up_migrations_in_order() {
        let dir = scratch_dir("order");
        std::fs::write(dir.join("0002_transactions.up.sql"), "SELECT 1").unwrap();
        std::fs::write(dir.join("0001_accounts.up.sql"), "SELECT 1").unwrap();
        std::fs::write(dir.join("0001_accounts.down.sql"), "SELECT 1").unwrap();
        std::fs::write(dir.join("README.md"), "not sql").unwrap();

        let files = migration_files(&dir).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["0001_accounts.up.sql", "0002_transactions.up.sql"]
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = std::env::temp_dir().join("walletd-migrations-does-not-exist");
        assert!(migration_files(&dir).is_err());
    }
}
