//! エラー分類。ユーザ起因・設定起因・サービス起因を区別する。
use std::time::Duration;

use thiserror::Error;

use crate::service::BackendKind;

#[derive(Debug, Error)]
pub enum ClassifyError {
    /// 入力テキストが空、または上限を超えている。呼び出し側が修正可能。
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// 起動時・バッチジョブの設定不備。致命的。
    #[error("configuration error: {0}")]
    Configuration(String),

    /// 学習データがカテゴリ層化に耐えない。学習ジョブのみで発生する。
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// 起動時ロードが完了する前に推論が呼ばれた。
    #[error("model not loaded")]
    ModelNotLoaded,

    /// 要求されたバックエンドが初期化に失敗している。もう一方は影響を受けない。
    #[error("{backend} backend unavailable: {reason}")]
    BackendUnavailable {
        backend: BackendKind,
        reason: String,
    },

    #[error("prediction timed out after {0:?}")]
    Timeout(Duration),

    /// モデル成果物の読み書き・検証エラー。
    #[error("artifact error: {0:#}")]
    Artifact(#[source] anyhow::Error),
}

impl ClassifyError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn backend_unavailable(backend: BackendKind, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            backend,
            reason: reason.into(),
        }
    }

    /// ユーザ入力起因（4xx相当）かどうか。
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
