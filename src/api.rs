pub(crate) mod categories;
pub(crate) mod error;
pub(crate) mod health;
pub(crate) mod metrics;
pub(crate) mod predict;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::app::AppState;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::report))
        .route("/metrics", get(metrics::exporter))
        .route("/predict", post(predict::predict))
        .route("/predict-file", post(predict::predict_file))
        .route("/batch-predict", post(predict::batch))
        .route("/categories", get(categories::list))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
