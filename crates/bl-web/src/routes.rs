//! HTTP routes.
//!
//! `/` and `/api/stats` may fetch from the API (at most once per cache TTL),
//! `/refresh` always fetches, and `/builder/{address}` only ever reads the cache.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use builder_ledger::{
    Allowlist, CachedTrades, DashboardStats, calculate_stats_from_value, process_builder_trades, trades_for_address,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::pages::builder::builder_page;
use crate::pages::dashboard::dashboard_page;
use crate::pages::message::{FETCH_FAILED, INVALID_FORMAT, error_page, no_cache_page, refreshed_page};
use crate::state::SharedState;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/refresh", get(refresh))
        .route("/builder/{address}", get(builder))
        .route("/api/stats", get(api_stats))
        .route("/healthz", get(healthz))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn unavailable(html: String) -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, Html(html)).into_response()
}

/// Dashboard for `response`, or the invalid-format page when it lacks the `data.EVM` structure.
fn render_dashboard(response: &Value, allowlist: &Allowlist, cached: &CachedTrades) -> Response {
    match calculate_stats_from_value(response, allowlist) {
        Some(stats) => Html(dashboard_page(&stats, cached)).into_response(),
        None => {
            warn!("[server] Cached data has no data.EVM structure");
            (StatusCode::BAD_GATEWAY, Html(error_page(INVALID_FORMAT))).into_response()
        }
    }
}

async fn dashboard(State(state): State<SharedState>) -> Response {
    let Some(cached) = state.cache.read_or_refresh().await else {
        warn!("[server] No data for dashboard");
        return unavailable(error_page(FETCH_FAILED));
    };

    render_dashboard(cached.envelope.as_response(), state.allowlist(), &cached)
}

async fn refresh(State(state): State<SharedState>) -> Response {
    info!("[server] Manual cache refresh requested");
    match state.cache.force_refresh().await {
        Some(cached) => Html(refreshed_page(cached.stale)).into_response(),
        None => unavailable(error_page(FETCH_FAILED)),
    }
}

async fn builder(State(state): State<SharedState>, Path(address): Path<String>) -> Response {
    let Some(cached) = state.cache.read().await else {
        return unavailable(no_cache_page());
    };

    let matching = trades_for_address(cached.envelope.trades(), &address);
    let trades = process_builder_trades(matching, &address);
    let display = state.allowlist().display(&address);
    Html(builder_page(display, &trades, &cached)).into_response()
}

#[derive(Serialize)]
struct StatsResponse<'a> {
    fetched_at: DateTime<Utc>,
    stale: bool,
    stats: &'a DashboardStats,
}

async fn api_stats(State(state): State<SharedState>) -> Response {
    let Some(cached) = state.cache.read_or_refresh().await else {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"error": FETCH_FAILED}))).into_response();
    };

    let Some(stats) = calculate_stats_from_value(cached.envelope.as_response(), state.allowlist()) else {
        return (StatusCode::BAD_GATEWAY, Json(json!({"error": INVALID_FORMAT}))).into_response();
    };
    Json(StatsResponse {
        fetched_at: cached.fetched_at,
        stale: cached.stale,
        stats: &stats,
    })
    .into_response()
}

async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use builder_ledger::TradeEnvelope;
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Duration;

    fn cached() -> CachedTrades {
        CachedTrades {
            envelope: Arc::new(TradeEnvelope::default()),
            fetched_at: Utc::now(),
            age: Duration::ZERO,
            stale: false,
        }
    }

    #[test]
    fn structurally_invalid_data_renders_format_error() {
        let allowlist = Allowlist::default();
        for bad in [json!({"data": {}}), json!({"errors": []}), json!(null)] {
            let response = render_dashboard(&bad, &allowlist, &cached());
            assert_eq!(response.status(), StatusCode::BAD_GATEWAY, "{bad}");
        }
    }

    #[test]
    fn empty_but_well_formed_data_renders_dashboard() {
        let response = render_dashboard(&json!({"data": {"EVM": {}}}), &Allowlist::default(), &cached());
        assert_eq!(response.status(), StatusCode::OK);
    }
}
