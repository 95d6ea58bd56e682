//! Narrow a trade envelope to trades touching a set of addresses.

use serde_json::Value;

use crate::addresses::Allowlist;
use crate::balances::BalanceContainer;
use crate::payload::TradeEnvelope;

/// Does any balance entry of `trade` belong to an address on `addresses`?
///
/// Entries with a blank address never match.
pub fn trade_involves(trade: &Value, addresses: &Allowlist) -> bool {
    BalanceContainer::of_trade(trade)
        .entries()
        .iter()
        .any(|entry| !entry.address.is_empty() && addresses.contains(&entry.address))
}

/// Keep only the trades where at least one balance entry's address is on `addresses`.
///
/// Non-object trades and trades without readable balance entries are dropped.
/// Surviving trades keep their order.
pub fn filter_trades_by_addresses(envelope: TradeEnvelope, addresses: &Allowlist) -> TradeEnvelope {
    let kept = envelope
        .into_trades()
        .into_iter()
        .filter(|trade| trade.is_object() && trade_involves(trade, addresses))
        .collect();
    TradeEnvelope::new(kept)
}
