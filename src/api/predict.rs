//! 予測エンドポイント群。単発・ファイル・バッチの3形態。
use std::collections::BTreeMap;

use axum::{Json, extract::Multipart, extract::State};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::ApiError;
use crate::app::AppState;
use crate::service::{BackendKind, PredictionResult};
use crate::taxonomy::Category;

#[derive(Debug, Deserialize)]
pub(crate) struct PredictRequest {
    text: String,
    #[serde(default)]
    model_type: BackendKind,
}

#[derive(Debug, Serialize)]
pub(crate) struct PredictResponse {
    category: Category,
    confidence: f64,
    confidence_scores: BTreeMap<Category, f64>,
    model_type: BackendKind,
    processing_time: f64,
}

impl From<PredictionResult> for PredictResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            category: result.category,
            confidence: result.confidence,
            confidence_scores: result.distribution,
            model_type: result.backend,
            processing_time: result.latency_seconds,
        }
    }
}

pub(crate) async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let result = run_prediction(&state, &request.text, request.model_type).await?;
    Ok(Json(result.into()))
}

/// アップロードされたテキストファイルを分類する。最初のフィールドを本文とみなす。
pub(crate) async fn predict_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    state.telemetry().metrics().file_requests_total.inc();

    let field = multipart
        .next_field()
        .await
        .map_err(|error| ApiError::bad_request(format!("invalid multipart payload: {error}")))?
        .ok_or_else(|| ApiError::bad_request("file field is missing"))?;
    let bytes = field
        .bytes()
        .await
        .map_err(|error| ApiError::bad_request(format!("failed to read uploaded file: {error}")))?;
    let text = String::from_utf8(bytes.to_vec())
        .map_err(|_| ApiError::bad_request("file must be valid UTF-8 text"))?;

    let result = run_prediction(&state, &text, BackendKind::default()).await?;
    Ok(Json(result.into()))
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum BatchEntry {
    Success(PredictResponse),
    Failure { error: String },
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchResponse {
    predictions: Vec<BatchEntry>,
    total: usize,
    successful: usize,
}

/// バッチ予測。項目ごとに独立に処理し、失敗はその項目のエラーマーカーに
/// 閉じ込める。結果は入力順。
pub(crate) async fn batch(
    State(state): State<AppState>,
    Json(requests): Json<Vec<PredictRequest>>,
) -> Result<Json<BatchResponse>, ApiError> {
    let limit = state.config().batch_limit();
    if requests.len() > limit {
        return Err(ApiError::bad_request(format!(
            "batch size {} exceeds maximum {limit}",
            requests.len()
        )));
    }
    state.telemetry().metrics().batch_requests_total.inc();

    let mut predictions = Vec::with_capacity(requests.len());
    let mut successful = 0usize;
    for request in &requests {
        match run_prediction(&state, &request.text, request.model_type).await {
            Ok(result) => {
                successful += 1;
                predictions.push(BatchEntry::Success(result.into()));
            }
            Err(error) => {
                warn!(error = %error, "batch item failed");
                predictions.push(BatchEntry::Failure {
                    error: error.to_string(),
                });
            }
        }
    }

    Ok(Json(BatchResponse {
        total: predictions.len(),
        successful,
        predictions,
    }))
}

async fn run_prediction(
    state: &AppState,
    text: &str,
    backend: BackendKind,
) -> Result<PredictionResult, crate::error::ClassifyError> {
    let outcome = state.service().predict(text, backend).await;
    match &outcome {
        Ok(result) => {
            state
                .telemetry()
                .metrics()
                .record_prediction(backend, "ok", result.latency_seconds);
        }
        Err(_) => {
            state
                .telemetry()
                .metrics()
                .record_prediction(backend, "error", 0.0);
        }
    }
    outcome
}
