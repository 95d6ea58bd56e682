use builder_ledger::{Allowlist, TradeCache};
use std::sync::Arc;

/// Shared by every handler.
pub struct AppState {
    pub cache: TradeCache,
}

impl AppState {
    pub fn new(cache: TradeCache) -> Self {
        Self { cache }
    }

    pub fn allowlist(&self) -> &Allowlist {
        self.cache.allowlist()
    }
}

pub type SharedState = Arc<AppState>;
