use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::app::AppState;
use crate::service::BackendKind;

#[derive(Debug, Serialize)]
pub(crate) struct BackendStatus {
    fast: bool,
    semantic: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthReport {
    status: &'static str,
    model_loaded: BackendStatus,
}

/// バックエンド単位の可用性を返す。片方でも生きていれば healthy。
pub(crate) async fn report(
    State(state): State<AppState>,
) -> Result<Json<HealthReport>, (StatusCode, Json<HealthReport>)> {
    state.telemetry().record_health_probe();

    let service = state.service();
    let model_loaded = BackendStatus {
        fast: service.is_ready(BackendKind::Fast),
        semantic: service.is_ready(BackendKind::Semantic),
    };

    if model_loaded.fast || model_loaded.semantic {
        Ok(Json(HealthReport {
            status: "healthy",
            model_loaded,
        }))
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthReport {
                status: "unhealthy",
                model_loaded,
            }),
        ))
    }
}
