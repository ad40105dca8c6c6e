//! 学習済みパイプラインの永続化。バージョンをキーにしたJSON成果物。
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;
use crate::taxonomy::Category;

/// 特徴抽出器と分類器のパラメータを束ねた不変の成果物。
/// ロード後に書き換えられることはなく、再学習時に丸ごと置き換える。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub version: String,
    pub trained_at: DateTime<Utc>,
    pub categories: Vec<Category>,
    pub vocabulary: Vec<String>,
    pub idf: Vec<f32>,
    pub class_log_prior: Vec<f32>,
    pub feature_log_prob: Vec<Vec<f32>>,
}

impl PipelineArtifact {
    fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.version.trim().is_empty(), "version must not be empty");
        anyhow::ensure!(
            self.categories == Category::ALL,
            "artifact categories do not match the fixed taxonomy"
        );
        anyhow::ensure!(
            self.vocabulary.len() == self.idf.len(),
            "vocabulary and idf length mismatch"
        );
        anyhow::ensure!(
            self.class_log_prior.len() == self.categories.len(),
            "class prior length mismatch"
        );
        anyhow::ensure!(
            self.feature_log_prob.len() == self.categories.len(),
            "likelihood matrix row count mismatch"
        );
        for row in &self.feature_log_prob {
            anyhow::ensure!(
                row.len() == self.vocabulary.len(),
                "likelihood row length mismatch"
            );
        }
        Ok(())
    }

    #[must_use]
    pub fn artifact_path(dir: &Path, version: &str) -> PathBuf {
        dir.join(format!("pipeline-{version}.json"))
    }

    /// 検証してからディレクトリ配下に書き出す。ファイル名はバージョン入り。
    ///
    /// # Errors
    /// 構造検証・ディレクトリ作成・書き込みに失敗した場合は
    /// [`ClassifyError::Artifact`] を返す。
    pub fn save(&self, dir: &Path) -> Result<PathBuf, ClassifyError> {
        self.validate().map_err(ClassifyError::Artifact)?;
        let path = Self::artifact_path(dir, &self.version);
        let write = || -> Result<()> {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create model directory {}", dir.display()))?;
            let raw = serde_json::to_string(self).context("failed to serialize artifact")?;
            fs::write(&path, raw)
                .with_context(|| format!("failed to write artifact {}", path.display()))?;
            Ok(())
        };
        write().map_err(ClassifyError::Artifact)?;
        Ok(path)
    }

    /// 成果物を読み込み、構造を検証する。
    ///
    /// # Errors
    /// 読み込み・パース・検証に失敗した場合は [`ClassifyError::Artifact`] を返す。
    pub fn load(path: &Path) -> Result<Self, ClassifyError> {
        let read = || -> Result<Self> {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read artifact {}", path.display()))?;
            let artifact: Self =
                serde_json::from_str(&raw).context("failed to parse artifact json")?;
            artifact.validate()?;
            Ok(artifact)
        };
        read().map_err(ClassifyError::Artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_artifact() -> PipelineArtifact {
        let vocab_size = 3;
        PipelineArtifact {
            version: "v-test".into(),
            trained_at: Utc::now(),
            categories: Category::ALL.to_vec(),
            vocabulary: vec!["alpha".into(), "beta".into(), "gamma".into()],
            idf: vec![1.0; vocab_size],
            class_log_prior: vec![-2.48; Category::ALL.len()],
            feature_log_prob: vec![vec![-1.0; vocab_size]; Category::ALL.len()],
        }
    }

    #[test]
    fn artifact_roundtrips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let artifact = minimal_artifact();

        let path = artifact.save(dir.path()).expect("save succeeds");
        assert!(path.ends_with("pipeline-v-test.json"));

        let loaded = PipelineArtifact::load(&path).expect("load succeeds");
        assert_eq!(loaded.version, artifact.version);
        assert_eq!(loaded.vocabulary, artifact.vocabulary);
    }

    #[test]
    fn wrong_category_set_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut artifact = minimal_artifact();
        artifact.categories.pop();
        assert!(matches!(
            artifact.save(dir.path()),
            Err(ClassifyError::Artifact(_))
        ));
    }

    #[test]
    fn inconsistent_matrix_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut artifact = minimal_artifact();
        artifact.feature_log_prob[0].pop();
        assert!(matches!(
            artifact.save(dir.path()),
            Err(ClassifyError::Artifact(_))
        ));
    }
}
