//! 統計的バックエンド。永続化済みのTF-IDF + ナイーブベイズを包む。
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ClassifyError;
use crate::taxonomy::Category;
use crate::training::{MultinomialNb, PipelineArtifact, TfidfVectorizer};

#[derive(Debug)]
pub struct FastBackend {
    vectorizer: TfidfVectorizer,
    model: MultinomialNb,
}

impl FastBackend {
    /// 検証済み成果物からバックエンドを組み立てる。
    ///
    /// # Errors
    /// 成果物の語彙・行列次元が矛盾している場合は [`ClassifyError::Artifact`] を返す。
    pub fn from_artifact(artifact: PipelineArtifact) -> Result<Self, ClassifyError> {
        let vectorizer = TfidfVectorizer::from_parts(artifact.vocabulary, artifact.idf)?;
        let model = MultinomialNb::from_parts(artifact.class_log_prior, artifact.feature_log_prob)?;
        Ok(Self { vectorizer, model })
    }

    /// # Errors
    /// 成果物の読み込み・検証に失敗した場合は [`ClassifyError::Artifact`] を返す。
    pub fn load(path: &Path) -> Result<Self, ClassifyError> {
        Self::from_artifact(PipelineArtifact::load(path)?)
    }

    /// 正規化済みテキストの事後確率分布。全カテゴリに1エントリずつ。
    #[must_use]
    pub fn predict(&self, normalized: &str) -> BTreeMap<Category, f64> {
        let features = self.vectorizer.transform(normalized);
        let probabilities = self.model.predict_proba(&features);
        Category::ALL.iter().copied().zip(probabilities).collect()
    }
}
