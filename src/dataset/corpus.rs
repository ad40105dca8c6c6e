//! コーパスファイルの読み書き。`text,category,origin` の3列CSV。
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::taxonomy::Category;

/// サンプルの出所。合成比率を監査できるよう、コーパスに明示的に残す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleOrigin {
    Real,
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub text: String,
    pub category: Category,
    pub origin: SampleOrigin,
}

impl CorpusRecord {
    #[must_use]
    pub fn real(text: String, category: Category) -> Self {
        Self {
            text,
            category,
            origin: SampleOrigin::Real,
        }
    }

    #[must_use]
    pub fn synthetic(text: String, category: Category) -> Self {
        Self {
            text,
            category,
            origin: SampleOrigin::Synthetic,
        }
    }
}

/// コーパスをCSVとして書き出す。順序は呼び出し側が保証したものを維持する。
///
/// # Errors
/// ファイル作成・シリアライズに失敗した場合はエラーを返す。
pub fn write_corpus(path: &Path, records: &[CorpusRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create corpus directory {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create corpus file {}", path.display()))?;
    for record in records {
        writer
            .serialize(record)
            .context("failed to serialize corpus record")?;
    }
    writer.flush().context("failed to flush corpus file")?;
    Ok(())
}

/// コーパスCSVを読み込む。
///
/// # Errors
/// ファイルが開けない、または行のデシリアライズに失敗した場合はエラーを返す。
pub fn read_corpus(path: &Path) -> Result<Vec<CorpusRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open corpus file {}", path.display()))?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: CorpusRecord = row.context("failed to parse corpus record")?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_roundtrips_through_csv() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("corpus.csv");
        let records = vec![
            CorpusRecord::real("markets rallied today".into(), Category::Business),
            CorpusRecord::synthetic("new vaccine trial announced".into(), Category::Health),
        ];

        write_corpus(&path, &records).expect("write succeeds");
        let loaded = read_corpus(&path).expect("read succeeds");

        assert_eq!(loaded, records);
    }
}
