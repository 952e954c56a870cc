// src/api.rs
//! HTTP surface over `AnalysisService`. Every JSON payload carries the
//! disclaimer; analysis failures map to 400.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::bot::ExternalItem;
use crate::error::AnalysisError;
use crate::metrics::Metrics;
use crate::service::{AnalysisService, AnalyzeRequest, DEFAULT_HIGH_RISK_LIMIT, DISCLAIMER};

const SERVICE_NAME: &str = "Narrative Risk Analyzer API";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AnalysisService>,
}

impl AppState {
    pub fn new(service: AnalysisService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

pub enum ApiError {
    Analysis(AnalysisError),
    Internal(String),
}

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        ApiError::Analysis(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Analysis(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Internal(msg) => {
                warn!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(json!({ "detail": detail, "disclaimer": DISCLAIMER }))).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

fn to_value<T: serde::Serialize>(v: T) -> Result<Value, ApiError> {
    serde_json::to_value(v).map_err(|e| ApiError::Internal(e.to_string()))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/risk-summary", get(risk_summary))
        .route("/status-summary", get(status_summary))
        .route("/sentiment-summary", get(sentiment_summary))
        .route("/high-risk", get(high_risk))
        .route("/keyword-trends", get(keyword_trends))
        .route("/temporal-trends", get(temporal_trends))
        .route("/bot-detection", post(bot_detection))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Same router plus `/metrics`.
pub fn router_with_metrics(state: AppState, metrics: &Metrics) -> Router {
    router(state).merge(metrics.router())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "disclaimer": DISCLAIMER,
    }))
}

async fn analyze(State(state): State<AppState>, Json(req): Json<AnalyzeRequest>) -> ApiResult {
    let service = Arc::clone(&state.service);
    let limit = req.record_limit;
    // CPU-bound: vectorization and lexicon scans
    let result = tokio::task::spawn_blocking(move || service.analyze(&req))
        .await
        .map_err(|e| ApiError::Internal(format!("analysis task failed: {e}")))??;

    Ok(Json(json!({
        "platform": "Narrative Risk Analyzer",
        "disclaimer": DISCLAIMER,
        "records": to_value(result.processed_records(limit))?,
        "meta": to_value(&result.meta)?,
    })))
}

async fn risk_summary(State(state): State<AppState>) -> ApiResult {
    let result = state.service.last_result()?;
    Ok(Json(json!({
        "disclaimer": DISCLAIMER,
        "risk_distribution": to_value(result.risk_summary())?,
    })))
}

async fn status_summary(State(state): State<AppState>) -> ApiResult {
    let result = state.service.last_result()?;
    Ok(Json(json!({
        "disclaimer": DISCLAIMER,
        "status_distribution": to_value(result.status_summary())?,
    })))
}

async fn sentiment_summary(State(state): State<AppState>) -> ApiResult {
    let result = state.service.last_result()?;
    Ok(Json(json!({
        "disclaimer": DISCLAIMER,
        "sentiment_distribution": to_value(result.sentiment_summary())?,
    })))
}

#[derive(Debug, Deserialize)]
struct HighRiskQuery {
    limit: Option<usize>,
}

async fn high_risk(State(state): State<AppState>, Query(q): Query<HighRiskQuery>) -> ApiResult {
    let result = state.service.last_result()?;
    let limit = q.limit.unwrap_or(DEFAULT_HIGH_RISK_LIMIT);
    Ok(Json(json!({
        "disclaimer": DISCLAIMER,
        "high_risk_articles": to_value(result.high_risk_records(limit))?,
    })))
}

async fn keyword_trends(State(state): State<AppState>) -> ApiResult {
    let result = state.service.last_result()?;
    Ok(Json(json!({
        "disclaimer": DISCLAIMER,
        "keyword_frequency": to_value(result.keyword_trends())?,
    })))
}

async fn temporal_trends(State(state): State<AppState>) -> ApiResult {
    let result = state.service.last_result()?;
    Ok(Json(json!({
        "disclaimer": DISCLAIMER,
        "temporal_trends": to_value(result.temporal_trends())?,
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BotDetectionReq {
    topic: Option<String>,
    items: Vec<ExternalItem>,
}

async fn bot_detection(State(state): State<AppState>, Json(req): Json<BotDetectionReq>) -> ApiResult {
    let service = Arc::clone(&state.service);
    let result = tokio::task::spawn_blocking(move || {
        service.detect_bots(&req.items, req.topic.as_deref())
    })
    .await
    .map_err(|e| ApiError::Internal(format!("bot detection task failed: {e}")))?;

    let mut body = to_value(result)?;
    if let Value::Object(map) = &mut body {
        map.insert("disclaimer".into(), Value::String(DISCLAIMER.into()));
    }
    Ok(Json(body))
}
