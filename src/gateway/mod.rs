//! HTTP gateway: routing, request shaping, and the read cache.

pub mod cache;
pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the full route table.
///
/// The read cache fronts only the single-transaction lookup; balances and
/// history are mutable and always come from the store, and POST routes
/// never touch the cache at all.
pub fn router(state: AppState) -> Router {
    let cached_routes = Router::new()
        .route(
            "/transactions/{tx_id}",
            get(handlers::transactions::get_transaction),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            cache::cache_read_through,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/account/{account_id}/{currency}",
            get(handlers::account::get_account_balance),
        )
        .route(
            "/transactions/{account_id}/{currency}",
            get(handlers::transactions::get_transactions),
        )
        .merge(cached_routes)
        .route("/deposit", post(handlers::movement::deposit))
        .route("/withdraw", post(handlers::movement::withdraw))
        .route("/transfer", post(handlers::movement::transfer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the gateway until the `shutdown` future resolves, then stop
/// accepting and drain in-flight requests.
pub async fn run_server(
    listener: TcpListener,
    state: AppState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolve on the first shutdown signal (SIGINT, SIGTERM, SIGHUP or
/// SIGQUIT).
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt =
        signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    let mut terminate =
        signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut hangup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");
    let mut quit = signal(SignalKind::quit()).expect("failed to install SIGQUIT handler");

    tokio::select! {
        _ = interrupt.recv() => {},
        _ = terminate.recv() => {},
        _ = hangup.recv() => {},
        _ = quit.recv() => {},
    }

    tracing::info!("shutdown signal received");
}
