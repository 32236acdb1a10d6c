//! HTTP endpoint server using Axum

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::cache::AggregationCache;
use crate::config::Config;
use crate::indicators::registry::{IndicatorRegistry, Rsi};
use crate::metrics::Metrics;
use crate::models::symbol::{Symbol, SymbolSet};
use crate::presentation::{JsonPresenter, Presentation, RecordField};
use crate::screener::{FilterCriteria, ScreenerPipeline};
use crate::services::market_data::MarketDataProvider;
use crate::services::yahoo::YahooMarketDataProvider;
use crate::snapshot::SnapshotBuilder;

type ApiError = (StatusCode, Json<Value>);

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub cache: Arc<AggregationCache>,
    pub indicators: Arc<IndicatorRegistry>,
    pub defaults: Arc<DashboardDefaults>,
}

/// Symbols and thresholds used when a request leaves them out.
#[derive(Clone, Debug)]
pub struct DashboardDefaults {
    pub symbols: SymbolSet,
    pub criteria: FilterCriteria,
}

impl AppState {
    /// Wire the pipeline from configuration around `provider`.
    pub fn from_config(
        config: &Config,
        provider: Arc<dyn MarketDataProvider + Send + Sync>,
        metrics: Arc<Metrics>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let builder = SnapshotBuilder::new(provider)
            .with_rsi(Rsi::new(config.rsi_period)?)
            .with_history_window(config.history)
            .with_request_timeout(config.request_timeout)
            .with_metrics(metrics.clone());
        let cache = AggregationCache::new(Arc::new(builder), config.cache_ttl)
            .with_metrics(metrics.clone());

        Ok(Self {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics,
            start_time: Arc::new(Instant::now()),
            cache: Arc::new(cache),
            indicators: Arc::new(IndicatorRegistry::with_rsi_period(config.rsi_period)?),
            defaults: Arc::new(DashboardDefaults {
                symbols: config.symbols.clone(),
                criteria: config.criteria,
            }),
        })
    }
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "mooviz-screener"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

/// Query parameters shared by the screener and treemap endpoints.
#[derive(Debug, Default, Deserialize)]
struct ScreenerQuery {
    symbols: Option<String>,
    max_valuation_ratio: Option<f64>,
    min_volume_millions: Option<f64>,
    max_rsi: Option<f64>,
    value: Option<String>,
    color: Option<String>,
}

impl ScreenerQuery {
    fn symbols(&self, defaults: &DashboardDefaults) -> SymbolSet {
        match &self.symbols {
            Some(raw) => SymbolSet::from_csv(raw),
            None => defaults.symbols.clone(),
        }
    }

    /// Query overrides on top of the defaults. Non-finite bounds are a 400.
    fn criteria(&self, defaults: &DashboardDefaults) -> Result<FilterCriteria, ApiError> {
        let criteria = FilterCriteria {
            max_valuation_ratio: self
                .max_valuation_ratio
                .unwrap_or(defaults.criteria.max_valuation_ratio),
            min_volume_millions: self
                .min_volume_millions
                .unwrap_or(defaults.criteria.min_volume_millions),
            max_rsi: self.max_rsi.unwrap_or(defaults.criteria.max_rsi),
        };
        criteria
            .validate()
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
        Ok(criteria)
    }
}

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

/// Filtered and raw tables for a symbol set
async fn screener(
    State(state): State<AppState>,
    Query(params): Query<ScreenerQuery>,
) -> Result<Json<Value>, ApiError> {
    let symbols = params.symbols(&state.defaults);
    let criteria = params.criteria(&state.defaults)?;

    let entry = state
        .cache
        .get(&symbols)
        .await
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    let records = entry.records_in_order(&symbols);
    let view = ScreenerPipeline::apply(&records, &criteria);
    let rejections: Vec<Value> = ScreenerPipeline::rejections(&records, &criteria)
        .into_iter()
        .map(|(record, why)| json!({ "symbol": record.symbol, "reason": why.to_string() }))
        .collect();

    let presenter = JsonPresenter;
    Ok(Json(json!({
        "built_at": entry.built_at,
        "age_seconds": entry.age().as_secs(),
        "criteria": criteria,
        "summary": view.summary(),
        "filtered": presenter.render_table(&view.filtered),
        "raw": presenter.render_table(&view.raw),
        "rejections": rejections,
    })))
}

/// Treemap tiles for the filtered view
async fn treemap(
    State(state): State<AppState>,
    Query(params): Query<ScreenerQuery>,
) -> Result<Json<Value>, ApiError> {
    let value: RecordField = params
        .value
        .as_deref()
        .unwrap_or("market_cap_billions")
        .parse()
        .map_err(|e: crate::presentation::UnknownField| {
            api_error(StatusCode::BAD_REQUEST, e.to_string())
        })?;
    let color: RecordField = params
        .color
        .as_deref()
        .unwrap_or("change_percent")
        .parse()
        .map_err(|e: crate::presentation::UnknownField| {
            api_error(StatusCode::BAD_REQUEST, e.to_string())
        })?;

    let symbols = params.symbols(&state.defaults);
    let criteria = params.criteria(&state.defaults)?;
    let entry = state
        .cache
        .get(&symbols)
        .await
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    let view = ScreenerPipeline::apply(&entry.records_in_order(&symbols), &criteria);
    Ok(Json(JsonPresenter.render_treemap(&view.filtered, value, color)))
}

/// Candlestick bars plus indicators for one symbol (not cached)
async fn history(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let symbol =
        Symbol::parse(&symbol).map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let series = state
        .cache
        .builder()
        .fetch_history(&symbol)
        .await
        .map_err(|e| {
            warn!(symbol = %symbol, error = %e, "History request failed for {}", symbol);
            api_error(StatusCode::BAD_GATEWAY, e.to_string())
        })?;

    let mut body = JsonPresenter.render_candlestick(&symbol, &series);
    body["indicators"] = json!(state.indicators.compute_all(&series));
    Ok(Json(body))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/screener", get(screener))
        .route("/api/treemap", get(treemap))
        .route("/api/history/{symbol}", get(history))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);
    let provider = Arc::new(YahooMarketDataProvider::new(
        &config.market_data_base_url,
        config.request_timeout,
    )?);
    let state = AppState::from_config(&config, provider, metrics)?;
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    info!(port = config.port, "HTTP server listening on port {}", config.port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        config.port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
