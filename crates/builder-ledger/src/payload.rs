//! The `{data: {EVM: {DEXTrades: [...]}}}` response envelope.

use serde_json::{Value, json};
use thiserror::Error;
use tracing::warn;

/// Why a response could not be read as a trade envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("response is not a JSON object")]
    NotObject,
    #[error("response missing 'data' key")]
    MissingData,
    #[error("response 'data' is not an object")]
    DataNotObject,
    #[error("response missing 'EVM' key")]
    MissingEvm,
    #[error("response 'EVM' is not an object")]
    EvmNotObject,
}

const TRADES_POINTER: &str = "/data/EVM/DEXTrades";

/// Locate the trade list inside a raw response.
///
/// The `data` and `EVM` levels are required. A missing or non-list
/// `DEXTrades` is read as an empty list.
pub fn locate_trades(response: &Value) -> Result<&[Value], ShapeError> {
    let root = response.as_object().ok_or(ShapeError::NotObject)?;
    let data = root
        .get("data")
        .ok_or(ShapeError::MissingData)?
        .as_object()
        .ok_or(ShapeError::DataNotObject)?;
    let evm = data
        .get("EVM")
        .ok_or(ShapeError::MissingEvm)?
        .as_object()
        .ok_or(ShapeError::EvmNotObject)?;

    Ok(evm.get("DEXTrades").and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[]))
}

/// Normalized list of raw trade records.
///
/// Held in the upstream `{data: {EVM: {DEXTrades: [...]}}}` shape so it can be
/// handed to [`crate::stats::calculate_stats_from_value`] or dumped without a
/// copy. Trades stay as JSON so each consumer can apply its own field defaults;
/// [`crate::trade::TradeRecord`] is the typed view.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeEnvelope {
    response: Value,
}

impl Default for TradeEnvelope {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl TradeEnvelope {
    pub fn new(trades: Vec<Value>) -> Self {
        let mut response = json!({"data": {"EVM": {"DEXTrades": []}}});
        if let Some(slot) = response.pointer_mut(TRADES_POINTER) {
            *slot = Value::Array(trades);
        }
        Self { response }
    }

    /// Normalize an API response, substituting an empty trade list for any
    /// shape problem instead of failing.
    pub fn from_response(mut response: Value) -> Self {
        if let Err(e) = locate_trades(&response) {
            warn!("[fetch] {e}; using an empty trade list");
            return Self::default();
        }

        match response.pointer_mut(TRADES_POINTER).map(Value::take) {
            Some(Value::Array(trades)) => Self::new(trades),
            _ => Self::default(),
        }
    }

    pub fn trades(&self) -> &[Value] {
        locate_trades(&self.response).unwrap_or(&[])
    }

    pub fn into_trades(mut self) -> Vec<Value> {
        match self.response.pointer_mut(TRADES_POINTER).map(Value::take) {
            Some(Value::Array(trades)) => trades,
            _ => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.trades().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades().is_empty()
    }

    /// The envelope in the upstream response shape.
    pub fn as_response(&self) -> &Value {
        &self.response
    }
}
