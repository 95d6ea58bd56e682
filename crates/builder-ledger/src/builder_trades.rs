//! Per-builder trade listing.

use serde::Serialize;
use serde_json::Value;

use crate::balances::BalanceContainer;
use crate::trade::{Currency, TradeLeg, TradeRecord};

/// One balance movement of the target address within a trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuilderBalanceChange {
    pub currency: Currency,
    pub pre_balance: f64,
    pub post_balance: f64,
    pub balance_change: f64,
    pub profit_usd: f64,
    /// Empty when the API gave none
    pub reason_code: String,
}

/// A trade reshaped for the builder page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedTrade {
    pub tx_hash: String,
    pub block_number: String,
    pub block_time: String,
    pub buy: TradeLeg,
    pub sell: TradeLeg,
    pub dex_protocol: String,
    pub balance_changes: Vec<BuilderBalanceChange>,
}

/// Trades with at least one balance entry for `address` (case-insensitive), in order.
pub fn trades_for_address<'a>(trades: &'a [Value], address: &str) -> Vec<&'a Value> {
    let address_lower = address.to_lowercase();
    if address_lower.is_empty() {
        return Vec::new();
    }

    trades
        .iter()
        .filter(|trade| {
            BalanceContainer::of_trade(trade)
                .entries()
                .iter()
                .any(|entry| entry.is_address(&address_lower))
        })
        .collect()
}

/// Reshape trades already known to involve `address` into display records.
///
/// One record per object trade; only the target's own balance entries are kept.
/// No aggregation across trades happens here.
pub fn process_builder_trades<'a, I>(trades: I, address: &str) -> Vec<ProjectedTrade>
where
    I: IntoIterator<Item = &'a Value>,
{
    let address_lower = address.to_lowercase();
    if address_lower.is_empty() {
        return Vec::new();
    }

    trades
        .into_iter()
        .filter_map(TradeRecord::from_value)
        .map(|trade| {
            let balance_changes = trade
                .balances
                .iter()
                .filter(|entry| entry.is_address(&address_lower))
                .map(|entry| {
                    let mut currency = entry.currency.clone();
                    currency.name = currency.display_name().to_string();
                    BuilderBalanceChange {
                        currency,
                        pre_balance: entry.pre_balance,
                        post_balance: entry.post_balance,
                        balance_change: entry.balance_change(),
                        profit_usd: entry.profit_usd(),
                        reason_code: entry.reason_code.clone().unwrap_or_default(),
                    }
                })
                .collect();

            ProjectedTrade {
                tx_hash: trade.tx_hash,
                block_number: trade.block_number,
                block_time: trade.block_time,
                buy: trade.buy,
                sell: trade.sell,
                dex_protocol: trade.protocol,
                balance_changes,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TARGET: &str = "0xdadb0d80178819f2319190d340ce9a924f783711";

    fn sample_trade(hash: &str, addresses: &[&str]) -> Value {
        let joins: Vec<Value> = addresses
            .iter()
            .map(|a| {
                json!({"TokenBalance": {
                    "Address": a,
                    "Currency": {"Symbol": "WETH", "SmartContract": "0xc02a"},
                    "PreBalance": "1",
                    "PostBalance": "1.25",
                    "PreBalanceInUSD": "2000",
                    "PostBalanceInUSD": "2500",
                    "BalanceChangeReasonCode": "fee"
                }})
            })
            .collect();
        json!({
            "Transaction": {"Hash": hash},
            "Block": {"Number": "19000001", "Time": "2024-02-01T10:00:00Z"},
            "Trade": {
                "Buy": {"Amount": "3", "AmountInUSD": "6000", "Price": "0.0005", "PriceInUSD": "1",
                        "Currency": {"Name": "USD Coin", "Symbol": "USDC", "SmartContract": "0xa0b8"}},
                "Sell": {"Amount": "bogus"}
            },
            "joinTransactionBalances": joins,
        })
    }

    #[test]
    fn matches_address_case_insensitively() {
        let trades = vec![
            sample_trade("0x1", &["0xother"]),
            sample_trade("0x2", &["0xDADB0D80178819F2319190D340CE9A924F783711"]),
            sample_trade("0x3", &["0xother", TARGET]),
        ];
        let hits = trades_for_address(&trades, TARGET);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0]["Transaction"]["Hash"], "0x2");
        assert!(trades_for_address(&trades, "").is_empty());
    }

    #[test]
    fn projects_legs_and_own_balances_only() {
        let trades = vec![sample_trade("0xabc", &["0xother", TARGET, TARGET])];
        let projected = process_builder_trades(&trades, &TARGET.to_uppercase());
        assert_eq!(projected.len(), 1);

        let t = &projected[0];
        assert_eq!(t.tx_hash, "0xabc");
        assert_eq!(t.block_number, "19000001");
        assert_eq!(t.dex_protocol, "Unknown");
        assert_eq!(t.buy.amount_usd, 6000.0);
        assert_eq!(t.buy.currency.symbol, "USDC");
        assert_eq!(t.sell.amount, 0.0);
        assert_eq!(t.sell.currency, Currency::default());

        assert_eq!(t.balance_changes.len(), 2);
        let change = &t.balance_changes[0];
        assert_eq!(change.currency.name, "Unknown");
        assert_eq!(change.currency.smart_contract, "0xc02a");
        assert_eq!(change.balance_change, 0.25);
        assert_eq!(change.profit_usd, 500.0);
        assert_eq!(change.reason_code, "fee");
    }

    #[test]
    fn skips_non_objects_and_handles_empty_input() {
        let trades = vec![json!("junk"), sample_trade("0x1", &[TARGET])];
        assert_eq!(process_builder_trades(&trades, TARGET).len(), 1);
        assert!(process_builder_trades(&trades, "").is_empty());
        assert!(process_builder_trades(&[], TARGET).is_empty());
    }
}
