//! Route behaviour against stub trade sources.

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use bl_web::routes::router;
use bl_web::state::AppState;
use builder_ledger::{Allowlist, FetchError, TradeCache, TradeEnvelope, TradeSource};
use http::{Request, StatusCode};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

const BUILDER: &str = "0x0000000000675d852C8638Df2f227949052b1208";

/// Plays back queued fetch results; times out once the queue is empty.
struct ScriptedSource {
    script: Mutex<VecDeque<Vec<Value>>>,
}

#[async_trait]
impl TradeSource for ScriptedSource {
    async fn fetch_trades(&self, _limit: usize) -> Result<TradeEnvelope, FetchError> {
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(trades) => Ok(TradeEnvelope::new(trades)),
            None => Err(FetchError::Timeout {
                url: "stub://bitquery".to_string(),
                after: Duration::from_secs(60),
            }),
        }
    }
}

fn app(script: Vec<Vec<Value>>, ttl: Duration) -> Router {
    let source = ScriptedSource {
        script: Mutex::new(script.into()),
    };
    let cache = TradeCache::new(Box::new(source), Arc::new(Allowlist::default())).with_ttl(ttl);
    router(Arc::new(AppState::new(cache)))
}

fn builder_trade() -> Value {
    json!({
        "Block": {"Number": "19500000", "Time": "2024-05-01T12:00:00Z"},
        "Transaction": {"Hash": "0xfeedfacefeedfacefeedface"},
        "Trade": {
            "Buy": {"Amount": "2", "AmountInUSD": "100", "Currency": {"Symbol": "WETH"}},
            "Sell": {"Amount": "100", "AmountInUSD": "50", "Currency": {"Symbol": "USDC"}},
            "Dex": {"ProtocolName": "uniswap_v3"},
        },
        "joinTransactionBalances": [{"TokenBalance": {
            "Address": BUILDER.to_lowercase(),
            "Currency": {"Name": "Wrapped Ether", "Symbol": "WETH"},
            "PreBalance": "0",
            "PostBalance": "10",
            "PreBalanceInUSD": "0",
            "PostBalanceInUSD": "20",
        }}],
    })
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn healthz() {
    let app = app(vec![], Duration::from_secs(300));
    assert_eq!(get(&app, "/healthz").await, (StatusCode::OK, "ok".to_string()));
}

#[tokio::test]
async fn dashboard_timeout_without_cache_shows_error_page() {
    let app = app(vec![], Duration::from_secs(300));
    let (status, body) = get(&app, "/").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("Could not fetch data from API"));
}

#[tokio::test]
async fn dashboard_renders_fresh_data() {
    let app = app(vec![vec![builder_trade()]], Duration::from_secs(300));
    let (status, body) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&format!("/builder/{}", BUILDER)));
    assert!(body.contains("$100.00"));
    assert!(body.contains("$20.00"));
    assert!(!body.contains("could not be reached"));

    // Second request within the TTL is served from cache; the empty script would time out.
    let (status, _) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn dashboard_timeout_with_stale_cache_still_renders() {
    let app = app(vec![vec![builder_trade()]], Duration::ZERO);
    assert_eq!(get(&app, "/").await.0, StatusCode::OK);

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&format!("/builder/{}", BUILDER)));
    assert!(body.contains("could not be reached"));
}

#[tokio::test]
async fn refresh_reports_outcome() {
    let app = app(vec![vec![builder_trade()]], Duration::from_secs(300));

    let (status, body) = get(&app, "/refresh").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Cache refreshed successfully!"));

    let (status, body) = get(&app, "/refresh").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("previously cached data"));
}

#[tokio::test]
async fn refresh_without_cache_fails() {
    let app = app(vec![], Duration::from_secs(300));
    let (status, body) = get(&app, "/refresh").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("Could not fetch data from API"));
}

#[tokio::test]
async fn builder_page_needs_cache_and_never_fetches() {
    let app = app(vec![vec![builder_trade()]], Duration::from_secs(300));

    let (status, body) = get(&app, &format!("/builder/{}", BUILDER)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains(r#"<a href="/">dashboard</a>"#));

    // The scripted payload was not consumed by the builder route.
    assert_eq!(get(&app, "/").await.0, StatusCode::OK);

    let (status, body) = get(&app, &format!("/builder/{}", BUILDER.to_uppercase().replace("0X", "0x"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&format!("<h1>Builder {}</h1>", BUILDER)), "heading uses allowlist casing");
    assert!(body.contains("uniswap_v3"));
    assert!(body.contains("2 WETH"));
    assert!(body.contains("Wrapped Ether (WETH)"));
}

#[tokio::test]
async fn builder_page_for_unknown_address_is_empty() {
    let app = app(vec![vec![builder_trade()]], Duration::from_secs(300));
    get(&app, "/").await;

    let (status, body) = get(&app, "/builder/0x1111111111111111111111111111111111111111").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No trades for this address"));
}

#[tokio::test]
async fn api_stats_json() {
    let app = app(vec![vec![builder_trade()]], Duration::from_secs(300));
    let (status, body) = get(&app, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["stale"], json!(false));
    assert_eq!(json["stats"]["total_value_usd"], json!(100.0));
    assert_eq!(json["stats"]["builder_summary"][0]["address"], json!(BUILDER));
    assert_eq!(json["stats"]["builder_summary"][0]["total_profit_usd"], json!(20.0));
}

#[tokio::test]
async fn api_stats_unavailable() {
    let app = app(vec![], Duration::from_secs(300));
    let (status, body) = get(&app, "/api/stats").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], json!("Could not fetch data from API"));
}
