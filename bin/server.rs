// Sales Metrics - Web Server
// REST front-end: callers POST the raw arrays they fetched, get metrics back.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use sales_metrics::{
    aggregate_by_time, classify_stock, logging, normalize_items, normalize_transactions,
    top_entities, Granularity, MetricsEngine, RankMetric, ReportConfig, TimeWindow,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    config: Arc<ReportConfig>,
}

/// API Response wrapper
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse<T> {
    success: bool,
    data: T,
    /// Malformed fields found while normalizing the request
    #[serde(skip_serializing_if = "is_zero")]
    input_problems: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl<T> ApiResponse<T> {
    fn ok(data: T, input_problems: usize) -> Self {
        Self {
            success: true,
            data,
            input_problems,
            error: None,
        }
    }
}

impl ApiResponse<Value> {
    fn error(message: String) -> Self {
        Self {
            success: false,
            data: Value::Null,
            input_problems: 0,
            error: Some(message),
        }
    }
}

/// Body rejections go out in the same envelope as successful responses
fn reject(rejection: JsonRejection) -> Response {
    tracing::warn!(status = %rejection.status(), "rejected request body: {}", rejection.body_text());
    (rejection.status(), Json(ApiResponse::error(rejection.body_text()))).into_response()
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryRequest {
    records: Vec<Value>,
    #[serde(default)]
    items: Vec<Value>,
    rank_limit: Option<usize>,
    low_threshold: Option<u64>,
    granularity: Option<Granularity>,
    window: Option<TimeWindow>,
}

#[derive(Deserialize)]
struct TrendRequest {
    records: Vec<Value>,
    granularity: Option<Granularity>,
}

#[derive(Deserialize)]
struct TopRequest {
    records: Vec<Value>,
    metric: Option<RankMetric>,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct StockRequest {
    items: Vec<Value>,
    threshold: Option<u64>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK", 0))
}

/// POST /api/summary - Full metrics report; request fields override config
async fn post_summary(
    State(state): State<AppState>,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(json) => json,
        Err(rejection) => return reject(rejection),
    };
    let records = normalize_transactions(&req.records);
    let items = normalize_items(&req.items);

    let mut config = (*state.config).clone();
    if let Some(limit) = req.rank_limit {
        config.rank_limit = limit;
    }
    if let Some(threshold) = req.low_threshold {
        config.low_stock_threshold = threshold;
    }
    if let Some(granularity) = req.granularity {
        config.granularity = granularity;
    }
    if let Some(window) = req.window {
        config.window = window;
    }

    let report = MetricsEngine::with_config(config).report(&records.records, &items.records);
    let problems = records.problem_count() + items.problem_count();

    (StatusCode::OK, Json(ApiResponse::ok(report, problems))).into_response()
}

/// POST /api/trend - Revenue per day or month
async fn post_trend(
    State(state): State<AppState>,
    payload: Result<Json<TrendRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(json) => json,
        Err(rejection) => return reject(rejection),
    };
    let records = normalize_transactions(&req.records);
    let granularity = req.granularity.unwrap_or(state.config.granularity);
    let trend = aggregate_by_time(&records.records, granularity);

    (StatusCode::OK, Json(ApiResponse::ok(trend, records.problem_count()))).into_response()
}

/// POST /api/top - Top sellers
async fn post_top(
    State(state): State<AppState>,
    payload: Result<Json<TopRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(json) => json,
        Err(rejection) => return reject(rejection),
    };
    let records = normalize_transactions(&req.records);
    let metric = req.metric.unwrap_or(state.config.rank_metric);
    let limit = req.limit.unwrap_or(state.config.rank_limit);
    let top = top_entities(&records.records, metric, limit);

    (StatusCode::OK, Json(ApiResponse::ok(top, records.problem_count()))).into_response()
}

/// POST /api/stock - Stock bands
async fn post_stock(
    State(state): State<AppState>,
    payload: Result<Json<StockRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(json) => json,
        Err(rejection) => return reject(rejection),
    };
    let items = normalize_items(&req.items);
    let threshold = req.threshold.unwrap_or(state.config.low_stock_threshold);
    let classification = classify_stock(&items.records, threshold);

    (StatusCode::OK, Json(ApiResponse::ok(classification, items.problem_count()))).into_response()
}

fn app(config: ReportConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
    };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/summary", post(post_summary))
        .route("/trend", post(post_trend))
        .route("/top", post(post_top))
        .route("/stock", post(post_stock))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = match std::env::var("SALES_METRICS_CONFIG") {
        Ok(path) => ReportConfig::from_path(Path::new(&path))?,
        Err(_) => ReportConfig::default(),
    }
    .with_env_overrides();

    tracing::info!(?config, "report configuration");

    let addr = std::env::var("SALES_METRICS_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, "metrics server listening");

    axum::serve(listener, app(config)).await?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
