use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;

use walletd::config::Config;
use walletd::db::Database;
use walletd::gateway::cache::ResponseCache;
use walletd::gateway::handlers::health::Pinger;
use walletd::gateway::{self, AppState};
use walletd::ledger::PostgresRepository;
use walletd::logging::init_logging;
use walletd::migration::Migrator;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    let _guard = init_logging(&config.log);
    tracing::info!(git_hash = env!("GIT_HASH"), "starting walletd");

    let db = Arc::new(
        Database::connect(&config.database_url())
            .await
            .context("failed to connect to database")?,
    );
    db.health_check()
        .await
        .context("failed to reach database")?;

    Migrator::new(db.pool().clone(), &config.migration_path)
        .up()
        .await
        .context("failed to migrate database")?;
    tracing::info!("database migrated successfully");

    let cache = match &config.redis_address {
        Some(address) if config.cache_enabled => Some(
            ResponseCache::connect(address, config.cache_expiry)
                .await
                .context("failed to connect to redis")?,
        ),
        _ => None,
    };

    let repo = Arc::new(PostgresRepository::new(db.pool().clone()));
    let state = AppState::new(repo, vec![db.clone() as Arc<dyn Pinger>], cache);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");

    // The server drains on its own once the oneshot fires; the select below
    // bounds that drain with a hard timeout.
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(gateway::run_server(listener, state, async {
        let _ = shutdown_rx.await;
    }));

    tokio::select! {
        _ = gateway::shutdown_signal() => {
            tracing::info!("shutting down");
            let _ = shutdown_tx.send(());

            match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut server).await {
                Ok(Ok(Ok(()))) => tracing::info!("http server stopped"),
                Ok(Ok(Err(err))) => tracing::error!(error = %err, "http server failed"),
                Ok(Err(err)) => tracing::error!(error = %err, "http server task failed"),
                Err(_) => tracing::warn!("shutdown drain timed out"),
            }
        }
        result = &mut server => {
            match result {
                Ok(Ok(())) => tracing::info!("http server stopped"),
                Ok(Err(err)) => tracing::error!(error = %err, "http server failed"),
                Err(err) => tracing::error!(error = %err, "http server task failed"),
            }
        }
    }

    db.close().await;
    tracing::info!("gracefully stopped");

    Ok(())
}
