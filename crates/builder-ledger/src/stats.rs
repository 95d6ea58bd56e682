//! Dashboard statistics
//!
//! One pass over the filtered trades builds the global tallies and a
//! (builder, block) table of profit and balance movement; a reduction step then
//! sorts, truncates, and rolls the table up into one summary per builder.

use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::Value;

use crate::addresses::Allowlist;
use crate::payload::locate_trades;
use crate::trade::TradeRecord;

/// Rows kept in the per-address tables.
pub const TOP_ADDRESSES: usize = 10;

/// Running balance/profit totals for one token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TokenTotals {
    pub balance_change: f64,
    pub profit_usd: f64,
}

impl TokenTotals {
    fn add(&mut self, balance_change: f64, profit_usd: f64) {
        self.balance_change += balance_change;
        self.profit_usd += profit_usd;
    }
}

/// One builder's activity within one block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlockSummary {
    pub block_number: String,
    pub block_time: String,
    pub total_profit_usd: f64,
    pub total_balance_change: f64,
    pub transaction_count: usize,
    /// Keyed by `"Name (SYM)"`, first-seen order
    pub tokens: IndexMap<String, TokenTotals>,
}

/// One builder's activity across all blocks in the payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuilderSummary {
    /// Allowlist casing
    pub address: String,
    pub total_profit_usd: f64,
    pub total_balance_change: f64,
    pub total_transactions: usize,
    pub total_blocks: usize,
    pub tokens: IndexMap<String, TokenTotals>,
    /// Per-block detail in first-seen order
    pub blocks: Vec<BlockSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressSummary {
    pub address: String,
    pub count: usize,
    pub total_balance_change: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressCount {
    pub address: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolCount {
    pub protocol: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}

impl DateRange {
    fn observe(&mut self, time: &str) {
        if self.earliest.as_deref().is_none_or(|e| time < e) {
            self.earliest = Some(time.to_string());
        }
        if self.latest.as_deref().is_none_or(|l| time > l) {
            self.latest = Some(time.to_string());
        }
    }
}

/// How many balance entries went up vs down (unchanged entries count in neither).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BalanceDirections {
    pub increases: usize,
    pub decreases: usize,
}

/// Everything the dashboard page shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_transactions: usize,
    pub total_value_usd: f64,
    pub unique_addresses_count: usize,
    pub unique_blocks_count: usize,
    /// Top addresses by entry count
    pub transactions_by_address: Vec<AddressCount>,
    /// Top addresses by absolute balance change
    pub address_summary: Vec<AddressSummary>,
    pub transactions_by_reason: IndexMap<String, usize>,
    pub date_range: DateRange,
    pub balance_changes: BalanceDirections,
    /// Sorted by count, descending
    pub dex_protocols: Vec<ProtocolCount>,
    /// Sorted by total USD profit, descending
    pub builder_summary: Vec<BuilderSummary>,
}

/// (builder, block) table. Builders keyed by lowercase address.
#[derive(Debug, Default)]
struct BlockTable {
    rows: IndexMap<String, IndexMap<String, BlockSummary>>,
}

impl BlockTable {
    /// Find or create the summary for `(builder, block_number)`.
    /// A new row is stamped with the block number and time of the trade that created it.
    fn upsert(&mut self, builder: &str, block_number: &str, block_time: &str) -> &mut BlockSummary {
        let blocks = self.rows.entry(builder.to_string()).or_default();
        match blocks.entry(block_number.to_string()) {
            Entry::Occupied(row) => row.into_mut(),
            Entry::Vacant(slot) => slot.insert(BlockSummary {
                block_number: block_number.to_string(),
                block_time: block_time.to_string(),
                ..BlockSummary::default()
            }),
        }
    }

    fn into_builder_summaries(self, allowlist: &Allowlist) -> Vec<BuilderSummary> {
        self.rows
            .into_iter()
            .map(|(builder, blocks)| {
                let mut summary = BuilderSummary {
                    address: allowlist.display(&builder).to_string(),
                    total_profit_usd: 0.0,
                    total_balance_change: 0.0,
                    total_transactions: 0,
                    total_blocks: blocks.len(),
                    tokens: IndexMap::new(),
                    blocks: Vec::with_capacity(blocks.len()),
                };
                for block in blocks.into_values() {
                    for (token, totals) in &block.tokens {
                        summary
                            .tokens
                            .entry(token.clone())
                            .or_default()
                            .add(totals.balance_change, totals.profit_usd);
                    }
                    summary.total_profit_usd += block.total_profit_usd;
                    summary.total_balance_change += block.total_balance_change;
                    summary.total_transactions += block.transaction_count;
                    summary.blocks.push(block);
                }
                summary
            })
            .collect()
    }
}

#[derive(Debug, Default)]
struct AddressTally {
    count: usize,
    balance_change: f64,
}

/// Fold a trade list into dashboard statistics.
///
/// `total_transactions` counts every element of `trades`; non-object elements
/// contribute nothing else.
pub fn calculate_stats(trades: &[Value], allowlist: &Allowlist) -> DashboardStats {
    let mut stats = DashboardStats {
        total_transactions: trades.len(),
        ..DashboardStats::default()
    };

    let mut unique_addresses: IndexSet<String> = IndexSet::new();
    let mut unique_blocks: IndexSet<String> = IndexSet::new();
    let mut by_address: IndexMap<String, AddressTally> = IndexMap::new();
    let mut protocols: IndexMap<String, usize> = IndexMap::new();
    let mut table = BlockTable::default();

    for trade in trades.iter().filter_map(TradeRecord::from_value) {
        stats.total_value_usd += trade.value_usd();
        *protocols.entry(trade.protocol.clone()).or_default() += 1;

        let has_block = !trade.block_number.is_empty();
        let mut counted: IndexSet<String> = IndexSet::new();

        for entry in &trade.balances {
            let balance_change = entry.balance_change();
            let profit_usd = entry.profit_usd();

            if !entry.address.is_empty() {
                unique_addresses.insert(entry.address.clone());
                let tally = by_address.entry(entry.address.clone()).or_default();
                tally.count += 1;
                tally.balance_change += balance_change;
            }

            if let Some(code) = &entry.reason_code {
                *stats.transactions_by_reason.entry(code.clone()).or_default() += 1;
            }

            if entry.post_balance > entry.pre_balance {
                stats.balance_changes.increases += 1;
            } else if entry.post_balance < entry.pre_balance {
                stats.balance_changes.decreases += 1;
            }

            let address_lower = entry.address_lower();
            if !has_block || !allowlist.contains_lower(&address_lower) {
                continue;
            }

            let block = table.upsert(&address_lower, &trade.block_number, &trade.block_time);
            block.total_profit_usd += profit_usd;
            block.total_balance_change += balance_change;
            block
                .tokens
                .entry(entry.currency.token_key())
                .or_default()
                .add(balance_change, profit_usd);

            // A trade counts once per builder, however many of its entries match.
            if counted.insert(address_lower) {
                block.transaction_count += 1;
            }
        }

        if !trade.block_time.is_empty() {
            stats.date_range.observe(&trade.block_time);
        }
        if has_block {
            unique_blocks.insert(trade.block_number.clone());
        }
    }

    stats.unique_addresses_count = unique_addresses.len();
    stats.unique_blocks_count = unique_blocks.len();

    let mut address_summary: Vec<AddressSummary> = by_address
        .iter()
        .map(|(address, tally)| AddressSummary {
            address: address.clone(),
            count: tally.count,
            total_balance_change: tally.balance_change,
        })
        .collect();
    address_summary.sort_by(|a, b| b.total_balance_change.abs().total_cmp(&a.total_balance_change.abs()));
    address_summary.truncate(TOP_ADDRESSES);
    stats.address_summary = address_summary;

    let mut counts: Vec<AddressCount> = by_address
        .into_iter()
        .map(|(address, tally)| AddressCount {
            address,
            count: tally.count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_ADDRESSES);
    stats.transactions_by_address = counts;

    let mut dex_protocols: Vec<ProtocolCount> = protocols
        .into_iter()
        .map(|(protocol, count)| ProtocolCount { protocol, count })
        .collect();
    dex_protocols.sort_by(|a, b| b.count.cmp(&a.count));
    stats.dex_protocols = dex_protocols;

    let mut builders = table.into_builder_summaries(allowlist);
    builders.sort_by(|a, b| b.total_profit_usd.total_cmp(&a.total_profit_usd));
    stats.builder_summary = builders;

    stats
}

/// [`calculate_stats`] over a raw API response.
///
/// Returns `None` when the response lacks the `data.EVM` structure, which is
/// distinct from a well-formed response with no trades.
pub fn calculate_stats_from_value(response: &Value, allowlist: &Allowlist) -> Option<DashboardStats> {
    let trades = locate_trades(response).ok()?;
    Some(calculate_stats(trades, allowlist))
}
