//! Builder ledger: DEX trade statistics for known Ethereum block-builder addresses.
//!
//! Trades are pulled from the Bitquery streaming GraphQL API, narrowed to the
//! builder allowlist, cached in memory, and folded into per-builder per-block
//! profit summaries for the web dashboard.

pub mod addresses;
pub mod balances;
pub mod bitquery;
pub mod builder_trades;
pub mod cache;
pub mod coerce;
pub mod config;
pub mod filter;
pub mod payload;
pub mod source;
pub mod stats;
pub mod trade;

pub use addresses::{Allowlist, AllowlistError, DEFAULT_BUILDERS};
pub use bitquery::BitqueryClient;
pub use builder_trades::{ProjectedTrade, process_builder_trades, trades_for_address};
pub use cache::{CachedTrades, TradeCache};
pub use config::{Config, FileConfig};
pub use filter::filter_trades_by_addresses;
pub use payload::{ShapeError, TradeEnvelope};
pub use source::{FetchError, TradeSource};
pub use stats::{DashboardStats, calculate_stats, calculate_stats_from_value};
