//! Bitquery streaming GraphQL client
//!
//! One POST per fetch: the latest `DEXTrades` on Ethereum mainnet with a zero
//! priority fee, joined to their token balance changes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::payload::TradeEnvelope;
use crate::source::{FetchError, TradeSource};

pub const BITQUERY_URL: &str = "https://streaming.bitquery.io/graphql";
pub const DEFAULT_LIMIT: usize = 20_000;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Field selection for each trade. Kept in one place so the query and the
/// parsers in `trade`/`balances` can be read side by side.
const TRADE_FIELDS: &str = r#"
      Block {
        Time
        Number
      }
      Fee {
        Burnt
        BurntInUSD
        EffectiveGasPrice
        EffectiveGasPriceInUSD
        GasRefund
        MinerReward
        MinerRewardInUSD
        PriorityFeePerGas
        PriorityFeePerGasInUSD
        Savings
        SavingsInUSD
        SenderFee
        SenderFeeInUSD
      }
      Receipt {
        ContractAddress
        Status
      }
      TransactionStatus {
        Success
      }
      Log {
        Signature {
          Name
        }
        SmartContract
      }
      Call {
        From
        InternalCalls
        Signature {
          Name
          Signature
        }
        To
        Value
      }
      Transaction {
        Gas
        Cost
        CostInUSD
        GasFeeCap
        GasFeeCapInUSD
        GasPrice
        GasPriceInUSD
        GasTipCap
        GasTipCapInUSD
        Index
        Nonce
        Protected
        Time
        Type
        Value
        ValueInUSD
        Hash
        From
        To
      }
      Trade {
        Buy {
          Amount
          AmountInUSD
          Buyer
          Seller
          Currency {
            Decimals
            Name
            Symbol
            SmartContract
          }
          Price
          PriceInUSD
        }
        Sell {
          Amount
          AmountInUSD
          Buyer
          Seller
          Currency {
            Name
            Symbol
            SmartContract
          }
          Price
          PriceInUSD
        }
        Dex {
          ProtocolName
          SmartContract
          OwnerAddress
        }
      }
      joinTransactionBalances(Transaction_Hash: Transaction_Hash, join: inner) {
        TokenBalance {
          Address
          BalanceChangeReasonCode
          Currency {
            Name
            Symbol
            SmartContract
          }
          PostBalance
          PostBalanceInUSD
          PreBalance
          PreBalanceInUSD
        }
        Transaction {
          Hash
        }
      }"#;

/// GraphQL document for the latest `limit` zero-priority-fee trades.
pub fn build_query(limit: usize) -> String {
    format!(
        "{{\n  EVM(dataset: realtime, network: eth) {{\n    \
         DEXTrades(limit: {{count: {limit}}}, where: {{Fee: {{PriorityFeePerGas: {{eq: \"0\"}}}}}}) {{{TRADE_FIELDS}\n    }}\n  }}\n}}"
    )
}

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: &'a str,
}

/// Authenticated Bitquery client with a shared connection pool.
pub struct BitqueryClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
    timeout: Duration,
}

impl BitqueryClient {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(2)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            token: token.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, source: reqwest::Error) -> FetchError {
        if source.is_timeout() {
            FetchError::Timeout {
                url: self.endpoint.clone(),
                after: self.timeout,
            }
        } else {
            FetchError::Transport {
                url: self.endpoint.clone(),
                source,
            }
        }
    }
}

#[async_trait]
impl TradeSource for BitqueryClient {
    async fn fetch_trades(&self, limit: usize) -> Result<TradeEnvelope, FetchError> {
        let query = build_query(limit);
        let body = GraphqlRequest {
            query: &query,
            variables: "{}",
        };

        info!("[fetch] Requesting up to {} trades from {}", limit, self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.endpoint.clone(),
                status,
            });
        }

        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        let value: Value = serde_json::from_str(&text).map_err(|e| FetchError::Decode {
            url: self.endpoint.clone(),
            reason: e.to_string(),
        })?;

        let envelope = TradeEnvelope::from_response(value);
        debug!("[fetch] Received {} trades ({} bytes)", envelope.len(), text.len());
        Ok(envelope)
    }
}

/// Write an envelope to `path` as pretty-printed JSON in the upstream response shape.
pub fn save_run_log(envelope: &TradeEnvelope, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(envelope.as_response())?;
    std::fs::write(path, json).with_context(|| format!("Failed to write run log: {}", path.display()))?;
    Ok(())
}
