use std::sync::Arc;

use crate::gateway::cache::ResponseCache;
use crate::gateway::handlers::health::Pinger;
use crate::ledger::Repository;

/// Shared gateway state. The repository is the only authority the
/// handlers talk to; the cache is strictly non-authoritative.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    /// Dependencies pinged by the health endpoint.
    pub pingers: Arc<Vec<Arc<dyn Pinger>>>,
    /// Read-through cache for immutable GET responses, when enabled.
    pub cache: Option<ResponseCache>,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn Repository>,
        pingers: Vec<Arc<dyn Pinger>>,
        cache: Option<ResponseCache>,
    ) -> Self {
        Self {
            repo,
            pingers: Arc::new(pingers),
            cache,
        }
    }
}
