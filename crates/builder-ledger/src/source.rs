//! Where trade envelopes come from.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::payload::TradeEnvelope;

/// Hard failure talking to the trade API. Shape problems in a successful
/// response are not errors; they normalize to an empty envelope.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: reqwest::StatusCode },
    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// A source of DEX trades. Implemented by the Bitquery client; tests plug in stubs.
#[async_trait]
pub trait TradeSource: Send + Sync {
    /// Fetch up to `limit` trades.
    async fn fetch_trades(&self, limit: usize) -> Result<TradeEnvelope, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_second_timeouts_keep_their_unit() {
        let err = FetchError::Timeout {
            url: "http://localhost".to_string(),
            after: Duration::from_millis(300),
        };
        assert_eq!(err.to_string(), "request to http://localhost timed out after 300ms");
        assert!(err.is_timeout());

        let err = FetchError::Timeout {
            url: "http://localhost".to_string(),
            after: Duration::from_secs(60),
        };
        assert!(err.to_string().ends_with("after 60s"));
    }
}
