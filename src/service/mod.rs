//! 予測サービス。起動時に一度だけロードした不変のパイプラインを共有し、
//! リクエストごとに正規化→バックエンド推論→分布整形を行う。
//!
//! fast / semantic は独立した故障ドメイン。片方の初期化失敗は
//! もう片方の稼働に影響しない。
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ClassifyError;
use crate::normalize::TextNormalizer;
use crate::taxonomy::Category;
use crate::training::PipelineArtifact;

pub mod fast;
pub mod semantic;

pub use fast::FastBackend;
pub use semantic::SemanticBackend;

/// 推論バックエンドの閉じた列挙。ワイヤ上は旧実装の
/// `sklearn` / `transformer` も別名として受け付ける。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    #[serde(alias = "sklearn")]
    Fast,
    #[serde(alias = "transformer")]
    Semantic,
}

impl BackendKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Fast => "fast",
            BackendKind::Semantic => "semantic",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub category: Category,
    pub confidence: f64,
    /// 全カテゴリに1エントリずつ、総和1の分布。
    pub distribution: BTreeMap<Category, f64>,
    pub backend: BackendKind,
    pub latency_seconds: f64,
}

#[derive(Debug)]
enum Slot<T> {
    Ready(T),
    Unavailable { reason: String },
}

impl<T> Slot<T> {
    fn from_result(result: Result<T, String>, backend: BackendKind) -> Self {
        match result {
            Ok(value) => {
                info!(backend = %backend, "backend initialized");
                Slot::Ready(value)
            }
            Err(reason) => {
                warn!(backend = %backend, reason = %reason, "backend unavailable");
                Slot::Unavailable { reason }
            }
        }
    }

    fn is_ready(&self) -> bool {
        matches!(self, Slot::Ready(_))
    }
}

pub struct PredictionService {
    normalizer: TextNormalizer,
    fast: Slot<FastBackend>,
    semantic: Slot<SemanticBackend>,
    semantic_limit: Semaphore,
    request_timeout: Duration,
}

impl std::fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionService")
            .field("fast_ready", &self.fast.is_ready())
            .field("semantic_ready", &self.semantic.is_ready())
            .finish()
    }
}

impl PredictionService {
    /// 設定に従って両バックエンドをロードする。片方の失敗は警告に留め、
    /// もう片方だけで稼働を続ける。
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let artifact_path =
            PipelineArtifact::artifact_path(config.model_dir(), config.model_version());
        let fast = FastBackend::load(&artifact_path).map_err(|error| format!("{error}"));

        let semantic = if config.semantic_enabled() {
            SemanticBackend::new().map_err(|error| format!("{error:#}"))
        } else {
            Err("disabled by configuration".to_string())
        };

        Self::from_parts(
            config.max_input_chars(),
            fast,
            semantic,
            config.semantic_max_concurrency(),
            config.request_timeout(),
        )
    }

    #[must_use]
    pub fn from_parts(
        max_input_chars: usize,
        fast: Result<FastBackend, String>,
        semantic: Result<SemanticBackend, String>,
        semantic_max_concurrency: NonZeroUsize,
        request_timeout: Duration,
    ) -> Self {
        Self {
            normalizer: TextNormalizer::new(max_input_chars),
            fast: Slot::from_result(fast, BackendKind::Fast),
            semantic: Slot::from_result(semantic, BackendKind::Semantic),
            semantic_limit: Semaphore::new(semantic_max_concurrency.get()),
            request_timeout,
        }
    }

    #[must_use]
    pub fn is_ready(&self, backend: BackendKind) -> bool {
        match backend {
            BackendKind::Fast => self.fast.is_ready(),
            BackendKind::Semantic => self.semantic.is_ready(),
        }
    }

    /// テキストを分類する。
    ///
    /// # Errors
    /// 入力不正は [`ClassifyError::InvalidInput`]、バックエンド未初期化は
    /// [`ClassifyError::BackendUnavailable`]（両方未初期化なら
    /// [`ClassifyError::ModelNotLoaded`]）、時間超過は
    /// [`ClassifyError::Timeout`] を返す。
    pub async fn predict(
        &self,
        text: &str,
        backend: BackendKind,
    ) -> Result<PredictionResult, ClassifyError> {
        if !self.fast.is_ready() && !self.semantic.is_ready() {
            return Err(ClassifyError::ModelNotLoaded);
        }

        let started = Instant::now();
        let normalized = self.normalizer.normalize(text)?;

        let distribution = match backend {
            BackendKind::Fast => match &self.fast {
                Slot::Ready(fast) => fast.predict(&normalized),
                Slot::Unavailable { reason } => {
                    return Err(ClassifyError::backend_unavailable(backend, reason.clone()));
                }
            },
            BackendKind::Semantic => match &self.semantic {
                Slot::Ready(semantic) => {
                    let _permit = self.semantic_limit.acquire().await.map_err(|_| {
                        ClassifyError::backend_unavailable(backend, "semaphore closed")
                    })?;
                    match timeout(self.request_timeout, semantic.predict(normalized)).await {
                        Ok(result) => result?,
                        Err(_) => return Err(ClassifyError::Timeout(self.request_timeout)),
                    }
                }
                Slot::Unavailable { reason } => {
                    return Err(ClassifyError::backend_unavailable(backend, reason.clone()));
                }
            },
        };

        // BTreeMapは序数順なので、厳密な大なり比較で同点時に小さい序数が残る。
        let (category, confidence) = distribution.iter().fold(
            (Category::ALL[0], f64::NEG_INFINITY),
            |(best, best_score), (candidate, score)| {
                if *score > best_score {
                    (*candidate, *score)
                } else {
                    (best, best_score)
                }
            },
        );

        Ok(PredictionResult {
            category,
            confidence,
            distribution,
            backend,
            latency_seconds: started.elapsed().as_secs_f64(),
        })
    }

    /// バッチ推論。項目ごとに独立で、1件の失敗は他に波及しない。
    /// 結果は入力順を保つ。
    pub async fn predict_batch(
        &self,
        texts: &[String],
        backend: BackendKind,
    ) -> Vec<Result<PredictionResult, ClassifyError>> {
        join_all(texts.iter().map(|text| self.predict(text, backend))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_service() -> PredictionService {
        PredictionService::from_parts(
            20_000,
            Err("artifact missing".into()),
            Err("weights missing".into()),
            NonZeroUsize::new(2).expect("non-zero"),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn predict_without_any_backend_is_model_not_loaded() {
        let service = empty_service();
        let error = service
            .predict("some text", BackendKind::Fast)
            .await
            .expect_err("must fail");
        assert!(matches!(error, ClassifyError::ModelNotLoaded));
    }

    #[test]
    fn backend_kind_accepts_legacy_aliases() {
        let fast: BackendKind = serde_json::from_str("\"sklearn\"").expect("parse");
        let semantic: BackendKind = serde_json::from_str("\"transformer\"").expect("parse");
        assert_eq!(fast, BackendKind::Fast);
        assert_eq!(semantic, BackendKind::Semantic);
    }

    #[test]
    fn backend_kind_serializes_canonically() {
        assert_eq!(
            serde_json::to_string(&BackendKind::Fast).expect("serialize"),
            "\"fast\""
        );
        assert_eq!(
            serde_json::to_string(&BackendKind::Semantic).expect("serialize"),
            "\"semantic\""
        );
    }
}
