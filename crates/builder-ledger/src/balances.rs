//! Token balance changes attached to a trade.
//!
//! The `joinTransactionBalances` join is not stable in shape: Bitquery usually
//! returns a list, but a single join comes back as a bare object and some
//! responses key the joins by index. [`BalanceContainer`] detects which one we
//! got and every consumer (filter, stats, per-builder view) reads entries
//! through it.

use serde_json::{Map, Value};

use crate::coerce::{coerce_f64, coerce_str, object};
use crate::trade::Currency;

/// Trade field holding the balance joins.
pub const BALANCES_KEY: &str = "joinTransactionBalances";

/// Join field holding the balance change itself.
pub const TOKEN_BALANCE_KEY: &str = "TokenBalance";

/// Shape of a trade's balance join container.
#[derive(Debug, Clone, Copy)]
pub enum BalanceContainer<'a> {
    /// `[ {TokenBalance: ..}, .. ]`
    Sequence(&'a [Value]),
    /// `{TokenBalance: ..}`
    Single(&'a Value),
    /// `{"0": {TokenBalance: ..}, "1": ..}`
    Keyed(&'a Map<String, Value>),
    /// Missing, `null`, or a scalar.
    Absent,
}

impl<'a> BalanceContainer<'a> {
    pub fn detect(raw: Option<&'a Value>) -> Self {
        match raw {
            Some(Value::Array(items)) => Self::Sequence(items),
            Some(single @ Value::Object(map)) if map.contains_key(TOKEN_BALANCE_KEY) => Self::Single(single),
            Some(Value::Object(map)) => Self::Keyed(map),
            _ => Self::Absent,
        }
    }

    /// Container of a raw trade. Non-object trades have none.
    pub fn of_trade(trade: &'a Value) -> Self {
        Self::detect(trade.get(BALANCES_KEY))
    }

    /// Join objects in order. Non-object items are dropped.
    pub fn joins(self) -> Vec<&'a Map<String, Value>> {
        match self {
            Self::Sequence(items) => items.iter().filter_map(Value::as_object).collect(),
            Self::Single(value) => value.as_object().into_iter().collect(),
            Self::Keyed(map) => map.values().filter_map(Value::as_object).collect(),
            Self::Absent => Vec::new(),
        }
    }

    /// Parsed balance entries in order. Joins without an object `TokenBalance` are skipped.
    pub fn entries(self) -> Vec<BalanceEntry> {
        self.joins()
            .into_iter()
            .filter_map(|join| object(join.get(TOKEN_BALANCE_KEY)))
            .map(BalanceEntry::from_token_balance)
            .collect()
    }
}

/// Shorthand for `BalanceContainer::of_trade(trade).entries()`.
pub fn balance_entries(trade: &Value) -> Vec<BalanceEntry> {
    BalanceContainer::of_trade(trade).entries()
}

/// One account's balance movement for one currency within a trade.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceEntry {
    /// Address as received (casing preserved)
    pub address: String,
    pub currency: Currency,
    pub pre_balance: f64,
    pub post_balance: f64,
    pub pre_balance_usd: f64,
    pub post_balance_usd: f64,
    /// `BalanceChangeReasonCode`, when present and not null
    pub reason_code: Option<String>,
}

impl BalanceEntry {
    pub fn from_token_balance(tb: &Map<String, Value>) -> Self {
        let reason_code = match tb.get("BalanceChangeReasonCode") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };

        Self {
            address: coerce_str(tb.get("Address"), ""),
            currency: Currency::from_value(tb.get("Currency")),
            pre_balance: coerce_f64(tb.get("PreBalance")),
            post_balance: coerce_f64(tb.get("PostBalance")),
            pre_balance_usd: coerce_f64(tb.get("PreBalanceInUSD")),
            post_balance_usd: coerce_f64(tb.get("PostBalanceInUSD")),
            reason_code,
        }
    }

    /// `post - pre` in token units.
    pub fn balance_change(&self) -> f64 {
        self.post_balance - self.pre_balance
    }

    /// `post - pre` in USD.
    pub fn profit_usd(&self) -> f64 {
        self.post_balance_usd - self.pre_balance_usd
    }

    pub fn address_lower(&self) -> String {
        self.address.to_lowercase()
    }

    pub fn is_address(&self, address_lower: &str) -> bool {
        !self.address.is_empty() && self.address.to_lowercase() == address_lower
    }
}
