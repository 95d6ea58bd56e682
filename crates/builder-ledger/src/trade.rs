//! Typed view over one raw `DEXTrades` record.

use serde::Serialize;
use serde_json::Value;

use crate::balances::{BalanceEntry, balance_entries};
use crate::coerce::{child_object, coerce_f64, coerce_str, field, object};

pub const UNKNOWN: &str = "Unknown";

/// Currency descriptor. Missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Currency {
    pub name: String,
    pub symbol: String,
    pub smart_contract: String,
}

impl Currency {
    pub fn from_value(value: Option<&Value>) -> Self {
        let currency = object(value);
        Self {
            name: coerce_str(field(currency, "Name"), ""),
            symbol: coerce_str(field(currency, "Symbol"), ""),
            smart_contract: coerce_str(field(currency, "SmartContract"), ""),
        }
    }

    /// Name, or `"Unknown"` when blank.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { UNKNOWN } else { &self.name }
    }

    /// Bucket key for per-token totals: `"Name (SYM)"`, or the bare name without a symbol.
    pub fn token_key(&self) -> String {
        if self.symbol.is_empty() {
            self.display_name().to_string()
        } else {
            format!("{} ({})", self.display_name(), self.symbol)
        }
    }
}

/// Buy or Sell side of a trade.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TradeLeg {
    pub amount: f64,
    pub amount_usd: f64,
    pub price: f64,
    pub price_usd: f64,
    pub currency: Currency,
}

impl TradeLeg {
    pub fn from_value(value: Option<&Value>) -> Self {
        let leg = object(value);
        Self {
            amount: coerce_f64(field(leg, "Amount")),
            amount_usd: coerce_f64(field(leg, "AmountInUSD")),
            price: coerce_f64(field(leg, "Price")),
            price_usd: coerce_f64(field(leg, "PriceInUSD")),
            currency: Currency::from_value(field(leg, "Currency")),
        }
    }
}

/// The fields of a trade the dashboard reads, with every lookup already defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub tx_hash: String,
    /// Opaque block token; empty when missing
    pub block_number: String,
    /// ISO-8601-ish timestamp; empty when missing
    pub block_time: String,
    pub buy: TradeLeg,
    pub sell: TradeLeg,
    pub protocol: String,
    pub balances: Vec<BalanceEntry>,
}

impl TradeRecord {
    /// Parse a raw trade. Returns `None` for anything that is not a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let trade = value.as_object()?;
        let block = child_object(Some(trade), "Block");
        let transaction = child_object(Some(trade), "Transaction");
        let info = child_object(Some(trade), "Trade");
        let dex = child_object(info, "Dex");

        Some(Self {
            tx_hash: coerce_str(field(transaction, "Hash"), ""),
            block_number: coerce_str(field(block, "Number"), ""),
            block_time: coerce_str(field(block, "Time"), ""),
            buy: TradeLeg::from_value(field(info, "Buy")),
            sell: TradeLeg::from_value(field(info, "Sell")),
            protocol: coerce_str(field(dex, "ProtocolName"), UNKNOWN),
            balances: balance_entries(value),
        })
    }

    /// Trade value in USD: the larger of the two legs.
    pub fn value_usd(&self) -> f64 {
        self.buy.amount_usd.max(self.sell.amount_usd)
    }
}
