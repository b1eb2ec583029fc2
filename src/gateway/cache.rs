//! Redis-backed read-through cache for immutable GET responses.
//!
//! Keyed by the full request URI. Only `GET` requests are ever served
//! from or written to the cache, and only 200 responses are stored. The
//! cache is non-authoritative: any redis failure degrades to the store.

use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use redis::AsyncCommands;

use crate::gateway::state::AppState;
use crate::gateway::types::ApiError;

/// Responses larger than this are served uncached rather than buffered.
const MAX_CACHEABLE_BODY: usize = 1 << 20;

static X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Handle to the redis response cache. Cheap to clone.
#[derive(Clone)]
pub struct ResponseCache {
    conn: redis::aio::ConnectionManager,
    ttl: Duration,
}

impl ResponseCache {
    /// Connect to redis at `address` (`host:port`).
    pub async fn connect(address: &str, ttl: Duration) -> anyhow::Result<Self> {
        let client = redis::Client::open(format!("redis://{address}"))?;
        let conn = client.get_connection_manager().await?;

        tracing::info!(%address, "redis cache connected");
        Ok(Self { conn, ttl })
    }

    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<Vec<u8>>>(key).await {
            Ok(cached) => cached,
            Err(err) => {
                tracing::warn!(error = %err, "cache get failed");
                None
            }
        }
    }

    async fn put(&self, key: &str, body: &[u8]) {
        let mut conn = self.conn.clone();
        if let Err(err) = conn
            .set_ex::<_, _, ()>(key, body, self.ttl.as_secs())
            .await
        {
            tracing::warn!(error = %err, "cache set failed");
        }
    }
}

/// Middleware implementing the read-through. Apply only to routes whose
/// responses are immutable (single-transaction lookups).
pub async fn cache_read_through(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(cache) = state.cache.clone() else {
        return next.run(req).await;
    };

    if req.method() != Method::GET {
        return next.run(req).await;
    }

    let key = req.uri().to_string();

    if let Some(cached) = cache.get(&key).await {
        let mut response = Response::new(Body::from(cached));
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
            .headers_mut()
            .insert(X_CACHE.clone(), HeaderValue::from_static("HIT"));
        return response;
    }

    let response = next.run(req).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    match axum::body::to_bytes(body, MAX_CACHEABLE_BODY).await {
        Ok(bytes) => {
            cache.put(&key, &bytes).await;
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(err) => {
            // The body was consumed and cannot be replayed.
            tracing::error!(error = %err, "failed to buffer response for caching");
            ApiError::internal("transfer failed").into_response()
        }
    }
}
