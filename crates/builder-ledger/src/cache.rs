//! In-memory cache of the last fetched and filtered trade envelope
//!
//! The dashboard re-fetches at most once per TTL. When a fetch fails the last
//! good envelope is served instead (however old it is); only when nothing has
//! ever been fetched does the caller get `None`.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::addresses::Allowlist;
use crate::bitquery::{DEFAULT_LIMIT, save_run_log};
use crate::filter::filter_trades_by_addresses;
use crate::payload::TradeEnvelope;
use crate::source::TradeSource;

pub const CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Clone)]
struct Snapshot {
    envelope: Arc<TradeEnvelope>,
    fetched_at: DateTime<Utc>,
    fetched_instant: Instant,
}

/// A cached envelope handed to callers.
#[derive(Debug, Clone)]
pub struct CachedTrades {
    pub envelope: Arc<TradeEnvelope>,
    pub fetched_at: DateTime<Utc>,
    pub age: Duration,
    /// Set when a fetch was attempted, failed, and this older envelope was served instead
    pub stale: bool,
}

impl Snapshot {
    fn view(&self, stale: bool) -> CachedTrades {
        CachedTrades {
            envelope: Arc::clone(&self.envelope),
            fetched_at: self.fetched_at,
            age: self.fetched_instant.elapsed(),
            stale,
        }
    }
}

/// Explicit cache object: a trade source, the address filter, and one cached snapshot.
///
/// Concurrent refreshes are not coalesced; the last one to finish wins.
pub struct TradeCache {
    source: Box<dyn TradeSource>,
    allowlist: Arc<Allowlist>,
    limit: usize,
    ttl: Duration,
    dump_path: Option<PathBuf>,
    slot: RwLock<Option<Snapshot>>,
}

impl TradeCache {
    pub fn new(source: Box<dyn TradeSource>, allowlist: Arc<Allowlist>) -> Self {
        Self {
            source,
            allowlist,
            limit: DEFAULT_LIMIT,
            ttl: CACHE_TTL,
            dump_path: None,
            slot: RwLock::new(None),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Also write every successfully fetched envelope to `path`.
    pub fn with_dump_path(mut self, path: Option<PathBuf>) -> Self {
        self.dump_path = path;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn allowlist(&self) -> &Allowlist {
        &self.allowlist
    }

    /// Cached envelope without ever touching the network.
    pub async fn read(&self) -> Option<CachedTrades> {
        let slot = self.slot.read().await;
        match slot.as_ref() {
            Some(snapshot) => {
                let view = snapshot.view(false);
                info!("[cache] Using cached data for filtering (age: {:.1}s)", view.age.as_secs_f64());
                Some(view)
            }
            None => {
                info!("[cache] No cached data available for filtering");
                None
            }
        }
    }

    /// Cached envelope if younger than the TTL, otherwise a fresh fetch.
    pub async fn read_or_refresh(&self) -> Option<CachedTrades> {
        {
            let slot = self.slot.read().await;
            if let Some(snapshot) = slot.as_ref() {
                let age = snapshot.fetched_instant.elapsed();
                if age < self.ttl {
                    info!("[cache] Using cached data (age: {:.1}s)", age.as_secs_f64());
                    return Some(snapshot.view(false));
                }
            }
        }
        self.refresh().await
    }

    /// Fetch regardless of cache age. Falls back to the stale snapshot on failure.
    pub async fn force_refresh(&self) -> Option<CachedTrades> {
        self.refresh().await
    }

    async fn refresh(&self) -> Option<CachedTrades> {
        info!("[cache] Fetching fresh data from API...");

        match self.source.fetch_trades(self.limit).await {
            Ok(envelope) => {
                let fetched = envelope.len();
                let filtered = filter_trades_by_addresses(envelope, &self.allowlist);
                info!(
                    "[cache] Cached {} of {} trades touching {} builders",
                    filtered.len(),
                    fetched,
                    self.allowlist.len()
                );

                if let Some(path) = &self.dump_path
                    && let Err(e) = save_run_log(&filtered, path)
                {
                    warn!("[cache] Failed to write run log: {:#}", e);
                }

                let snapshot = Snapshot {
                    envelope: Arc::new(filtered),
                    fetched_at: Utc::now(),
                    fetched_instant: Instant::now(),
                };
                let view = snapshot.view(false);
                *self.slot.write().await = Some(snapshot);
                Some(view)
            }
            Err(e) => {
                error!("[cache] Error fetching data: {}", e);
                let slot = self.slot.read().await;
                let fallback = slot.as_ref().map(|snapshot| snapshot.view(true));
                if fallback.is_some() {
                    warn!("[cache] Using stale cache as fallback");
                }
                fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FetchError;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns the same envelope every time and counts calls.
    struct CountingSource {
        trades: Vec<Value>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TradeSource for CountingSource {
        async fn fetch_trades(&self, _limit: usize) -> Result<TradeEnvelope, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TradeEnvelope::new(self.trades.clone()))
        }
    }

    fn builder_trade() -> Value {
        json!({"joinTransactionBalances": [{"TokenBalance": {"Address": crate::DEFAULT_BUILDERS[0]}}]})
    }

    fn counting(trades: Vec<Value>) -> (TradeCache, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            trades,
            calls: Arc::clone(&calls),
        };
        (TradeCache::new(Box::new(source), Arc::new(Allowlist::default())), calls)
    }

    #[tokio::test]
    async fn read_never_fetches() {
        let (cache, calls) = counting(vec![builder_trade()]);
        assert!(cache.read().await.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fresh_cache_is_reused_within_ttl() {
        let (cache, calls) = counting(vec![builder_trade(), json!({"joinTransactionBalances": []})]);

        let first = cache.read_or_refresh().await.unwrap();
        assert_eq!(first.envelope.len(), 1, "non-builder trades are filtered before caching");
        let second = cache.read_or_refresh().await.unwrap();
        assert!(Arc::ptr_eq(&first.envelope, &second.envelope));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(cache.read().await.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_or_forced_refetches() {
        let (cache, calls) = counting(vec![builder_trade()]);
        let cache = cache.with_ttl(Duration::ZERO);

        cache.read_or_refresh().await.unwrap();
        cache.read_or_refresh().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        cache.force_refresh().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
