//! Integration tests for the API Server
//!
//! Tests HTTP endpoints, health checks, metrics, and the screener payloads.

#[path = "api_server/test_utils.rs"]
mod test_utils;

use serde_json::Value;

use test_utils::TestApiServer;

#[tokio::test]
async fn health_endpoint_reports_healthy_status() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].as_u64().is_some());
    assert_eq!(body["service"], "mooviz-screener");
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_metrics() {
    let app = TestApiServer::new().await;
    let _ = app.server.get("/api/screener").await;
    let _ = app.server.get("/api/screener").await;

    let response = app.server.get("/metrics").await;
    assert_eq!(response.status_code(), 200);

    let body = response.text();
    for name in [
        "http_requests_total",
        "http_request_duration_seconds",
        "http_requests_in_flight",
        "screener_cache_hits_total 1",
        "screener_cache_rebuilds_total 1",
        "market_data_failures_total",
    ] {
        assert!(body.contains(name), "Expected {} in metrics output", name);
    }
}

#[tokio::test]
async fn screener_filters_and_ranks_default_symbols() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/api/screener").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["summary"]["total"], 3);
    assert_eq!(body["summary"]["passed"], 1);
    assert_eq!(body["summary"]["excluded"], 2);

    let filtered = body["filtered"].as_array().unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["symbol"], "KO");
    assert_eq!(filtered[0]["rsi"], 0.0);
    assert_eq!(filtered[0]["fetch_status"], "ok");

    let raw: Vec<&str> = body["raw"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["symbol"].as_str().unwrap())
        .collect();
    assert_eq!(raw, vec!["AAPL", "KO", "NVDA"]);
    assert_eq!(body["raw"][2]["fetch_status"], "unavailable");
    assert!(body["raw"][2]["price"].is_null());

    let rejected: Vec<&str> = body["rejections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["symbol"].as_str().unwrap())
        .collect();
    assert_eq!(rejected, vec!["AAPL", "NVDA"]);
}

#[tokio::test]
async fn screener_applies_query_overrides() {
    let app = TestApiServer::new().await;
    let response = app
        .server
        .get("/api/screener")
        .add_query_param("symbols", "aapl,ko")
        .add_query_param("max_valuation_ratio", "30")
        .add_query_param("max_rsi", "100")
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["criteria"]["max_valuation_ratio"], 30.0);
    let passed: Vec<&str> = body["filtered"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["symbol"].as_str().unwrap())
        .collect();
    assert_eq!(passed, vec!["AAPL", "KO"]);
}

#[tokio::test]
async fn screener_reuses_snapshot_within_ttl() {
    let app = TestApiServer::new().await;

    let first: Value = app.server.get("/api/screener").await.json();
    let second: Value = app
        .server
        .get("/api/screener")
        .add_query_param("max_rsi", "100")
        .await
        .json();

    assert_eq!(first["built_at"], second["built_at"]);
    assert_eq!(app.provider.quote_calls(), 3);
}

#[tokio::test]
async fn screener_with_no_symbols_has_nothing_to_display() {
    let app = TestApiServer::new().await;
    let response = app
        .server
        .get("/api/screener")
        .add_query_param("symbols", " , ")
        .await;
    assert_eq!(response.status_code(), 422);

    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("nothing to display"));
    assert_eq!(app.provider.quote_calls(), 0);
}

#[tokio::test]
async fn treemap_sizes_filtered_rows_by_market_cap() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/api/treemap").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["value_field"], "market_cap_billions");
    assert_eq!(body["color_field"], "change_percent");
    let nodes = body["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0]["symbol"], "KO");
    assert_eq!(nodes[0]["value"], 260.0);
    assert_eq!(nodes[0]["color"], 0.5);
}

#[tokio::test]
async fn treemap_rejects_unknown_field() {
    let app = TestApiServer::new().await;
    let response = app
        .server
        .get("/api/treemap")
        .add_query_param("value", "dividend")
        .await;
    assert_eq!(response.status_code(), 400);

    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("dividend"));
}

#[tokio::test]
async fn history_returns_bars_and_indicators() {
    let app = TestApiServer::new().await;
    let response = app.server.get("/api/history/aapl").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["symbol"], "AAPL");
    assert_eq!(body["bars"].as_array().unwrap().len(), 40);
    assert_eq!(body["indicators"]["rsi"]["kind"], "value");
    assert_eq!(body["indicators"]["rsi"]["value"], 100.0);
}

#[tokio::test]
async fn history_reports_upstream_failure() {
    let provider = test_utils::seeded_provider().with_failing_history(test_utils::symbol("KO"));
    let app = TestApiServer::with_provider(provider).await;

    let response = app.server.get("/api/history/KO").await;
    assert_eq!(response.status_code(), 502);
}

#[tokio::test]
async fn screener_rejects_non_finite_thresholds() {
    let app = TestApiServer::new().await;
    for (param, value) in [
        ("max_valuation_ratio", "NaN"),
        ("max_rsi", "NaN"),
        ("min_volume_millions", "-inf"),
    ] {
        let response = app
            .server
            .get("/api/screener")
            .add_query_param(param, value)
            .await;
        assert_eq!(response.status_code(), 400, "{}={}", param, value);

        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains(param));
    }

    let response = app
        .server
        .get("/api/treemap")
        .add_query_param("max_rsi", "NaN")
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(app.provider.quote_calls(), 0);
}
