/// Prometheusメトリクス定義。
use std::sync::Arc;

use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry,
};

use crate::service::BackendKind;

/// メトリクスコレクター。
#[derive(Debug, Clone)]
pub struct Metrics {
    /// backend / outcome 別の推論回数。
    pub predictions_total: IntCounterVec,
    pub batch_requests_total: IntCounter,
    pub file_requests_total: IntCounter,
    pub fast_prediction_duration: Histogram,
    pub semantic_prediction_duration: Histogram,
}

impl Metrics {
    /// 新しいメトリクスコレクターを作成する。
    ///
    /// # Errors
    /// 同名メトリクスの二重登録などで登録に失敗した場合はエラーを返す。
    pub fn new(registry: &Arc<Registry>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            predictions_total: register_int_counter_vec_with_registry!(
                Opts::new(
                    "classifier_predictions_total",
                    "Total number of prediction requests"
                ),
                &["backend", "outcome"],
                registry
            )?,
            batch_requests_total: register_int_counter_with_registry!(
                "classifier_batch_requests_total",
                "Total number of batch prediction requests",
                registry
            )?,
            file_requests_total: register_int_counter_with_registry!(
                "classifier_file_requests_total",
                "Total number of file prediction requests",
                registry
            )?,
            fast_prediction_duration: register_histogram_with_registry!(
                HistogramOpts::new(
                    "classifier_fast_prediction_duration_seconds",
                    "Latency of fast backend predictions"
                )
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
                registry
            )?,
            semantic_prediction_duration: register_histogram_with_registry!(
                HistogramOpts::new(
                    "classifier_semantic_prediction_duration_seconds",
                    "Latency of semantic backend predictions"
                )
                .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
                registry
            )?,
        })
    }

    pub fn record_prediction(&self, backend: BackendKind, outcome: &str, latency_seconds: f64) {
        self.predictions_total
            .with_label_values(&[backend.as_str(), outcome])
            .inc();
        if outcome != "ok" {
            return;
        }
        match backend {
            BackendKind::Fast => self.fast_prediction_duration.observe(latency_seconds),
            BackendKind::Semantic => self.semantic_prediction_duration.observe(latency_seconds),
        };
    }
}
