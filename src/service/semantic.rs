//! ゼロショット意味的バックエンド。事前学習済みのMNLIモデルで
//! カテゴリ仮説との含意スコアを取る。CPUで動作する。
use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use rust_bert::pipelines::zero_shot_classification::{
    ZeroShotClassificationConfig, ZeroShotClassificationModel,
};
use tokio::sync::Mutex;

use crate::error::ClassifyError;
use crate::service::BackendKind;
use crate::taxonomy::Category;

/// 含意判定の入力トークン上限。ニュース本文の先頭で十分判別できる。
const MAX_SEQUENCE_LENGTH: usize = 128;

#[derive(Clone)]
pub struct SemanticBackend {
    model: Arc<Mutex<ZeroShotClassificationModel>>,
}

impl std::fmt::Debug for SemanticBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticBackend")
            .field("model", &"<ZeroShotClassificationModel>")
            .finish()
    }
}

impl SemanticBackend {
    /// ゼロショットモデルを初期化する。初回はモデルのダウンロードが走るため
    /// 時間がかかる。初期化はブロッキングかつ重いので専用スレッドで行う。
    ///
    /// # Errors
    /// モデルの重みが取得・読み込みできない場合はエラーを返す。
    pub fn new() -> Result<Self> {
        let model = std::thread::spawn(|| {
            ZeroShotClassificationModel::new(ZeroShotClassificationConfig::default())
        })
        .join()
            .map_err(|_| anyhow::anyhow!("failed to join model creation thread"))?
            .context("failed to initialize zero-shot model")?;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
        })
    }

    /// 各カテゴリ仮説の含意スコアを取り、総和1に正規化した分布を返す。
    ///
    /// # Errors
    /// 推論スレッドの失敗やモデルエラーは
    /// [`ClassifyError::BackendUnavailable`] として返す。
    pub async fn predict(&self, text: String) -> Result<BTreeMap<Category, f64>, ClassifyError> {
        let model = Arc::clone(&self.model);

        let labels = tokio::task::spawn_blocking(move || {
            let candidate_labels: Vec<&str> = Category::ALL
                .iter()
                .map(|category| category.label())
                .collect();
            let model = model.blocking_lock();
            model.predict_multilabel(
                [text.as_str()],
                &candidate_labels,
                Some(Box::new(|label| format!("This text is about {label}."))),
                MAX_SEQUENCE_LENGTH,
            )
        })
        .await
        .map_err(|error| {
            ClassifyError::backend_unavailable(
                BackendKind::Semantic,
                format!("inference task failed: {error}"),
            )
        })?
        .map_err(|error| {
            ClassifyError::backend_unavailable(
                BackendKind::Semantic,
                format!("zero-shot inference failed: {error}"),
            )
        })?;

        let mut distribution: BTreeMap<Category, f64> = Category::ALL
            .iter()
            .map(|category| (*category, 0.0f64))
            .collect();
        for label in labels.into_iter().flatten() {
            if let Some(category) = Category::parse(&label.text) {
                distribution.insert(category, label.score);
            }
        }

        // 含意スコアはラベルごとに独立なので、カテゴリ横断で総和1に正規化する。
        let total: f64 = distribution.values().sum();
        if total > 0.0 {
            for value in distribution.values_mut() {
                *value /= total;
            }
        } else {
            let uniform = 1.0 / Category::ALL.len() as f64;
            for value in distribution.values_mut() {
                *value = uniform;
            }
        }

        Ok(distribution)
    }
}
