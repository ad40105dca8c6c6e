//! データソースの記述と取得。ソースごとの列割り当てとラベル対応表を持つ。
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::taxonomy::Category;

/// ソース一覧のマニフェスト（YAML）。
#[derive(Debug, Clone, Deserialize)]
pub struct SourceManifest {
    pub sources: Vec<SourceDescriptor>,
}

impl SourceManifest {
    /// # Errors
    /// ファイルが読めない、またはYAMLとして解釈できない場合はエラーを返す。
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read source manifest {}", path.display()))?;
        serde_yaml::from_str(&raw).context("failed to parse source manifest")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub location: SourceLocation,
    pub format: RecordFormat,
    /// ソース固有ラベル（小文字）から正準カテゴリへの対応表。
    /// 表にないラベルのサンプルは警告つきで捨てる。推測はしない。
    pub labels: HashMap<String, Category>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLocation {
    Url(String),
    Path(PathBuf),
}

/// レコード形式。元データ側の多様なCSV/fastText形式を吸収する。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RecordFormat {
    /// ヘッダ行つきCSV。列名で text / category を指定する。
    Csv {
        text_column: String,
        category_column: String,
    },
    /// ヘッダなしCSV。複数のテキスト列は空白結合される。
    HeaderlessCsv {
        text_columns: Vec<usize>,
        category_column: usize,
    },
    /// `__label__X text...` 形式の行指向フォーマット。
    FastText,
}

/// ソースから取り出した生レコード。ラベルはまだソース固有の文字列のまま。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub text: String,
    pub label: String,
}

pub struct SourceFetcher {
    client: reqwest::Client,
}

impl SourceFetcher {
    /// # Errors
    /// HTTPクライアントの構築に失敗した場合はエラーを返す。
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build source fetch client")?;
        Ok(Self { client })
    }

    /// ソースの生コンテンツを取得する。HTTPまたはローカルファイル。
    ///
    /// # Errors
    /// ネットワークエラー、非2xx応答、ファイル読み込み失敗時はエラーを返す。
    pub async fn fetch(&self, source: &SourceDescriptor) -> Result<String> {
        match &source.location {
            SourceLocation::Url(url) => {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("failed to fetch source {}", source.name))?;
                let status = response.status();
                if !status.is_success() {
                    bail!("source {} returned status {status}", source.name);
                }
                response
                    .text()
                    .await
                    .with_context(|| format!("failed to read body of source {}", source.name))
            }
            SourceLocation::Path(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read source file {}", path.display())),
        }
    }
}

/// 生コンテンツをレコード列に展開する。
///
/// # Errors
/// CSVの構文エラーや列参照の不整合があればエラーを返す。
pub fn parse_records(raw: &str, format: &RecordFormat) -> Result<Vec<RawRecord>> {
    match format {
        RecordFormat::Csv {
            text_column,
            category_column,
        } => parse_csv(raw, text_column, category_column),
        RecordFormat::HeaderlessCsv {
            text_columns,
            category_column,
        } => parse_headerless_csv(raw, text_columns, *category_column),
        RecordFormat::FastText => Ok(parse_fasttext(raw)),
    }
}

fn parse_csv(raw: &str, text_column: &str, category_column: &str) -> Result<Vec<RawRecord>> {
    let mut reader = csv::Reader::from_reader(raw.as_bytes());
    let headers = reader.headers().context("failed to read csv headers")?;
    let text_idx = column_index(headers, text_column)?;
    let category_idx = column_index(headers, category_column)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.context("failed to read csv record")?;
        let (Some(text), Some(label)) = (row.get(text_idx), row.get(category_idx)) else {
            continue;
        };
        if text.is_empty() || label.is_empty() {
            continue;
        }
        records.push(RawRecord {
            text: text.to_string(),
            label: label.to_string(),
        });
    }
    Ok(records)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|header| header == name)
        .with_context(|| format!("column {name} not found in csv headers"))
}

fn parse_headerless_csv(
    raw: &str,
    text_columns: &[usize],
    category_column: usize,
) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(raw.as_bytes());

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.context("failed to read csv record")?;
        let Some(label) = row.get(category_column) else {
            continue;
        };
        let text = text_columns
            .iter()
            .filter_map(|idx| row.get(*idx))
            .collect::<Vec<_>>()
            .join(" ");
        if text.trim().is_empty() || label.is_empty() {
            continue;
        }
        records.push(RawRecord {
            text,
            label: label.to_string(),
        });
    }
    Ok(records)
}

fn parse_fasttext(raw: &str) -> Vec<RawRecord> {
    const LABEL_PREFIX: &str = "__label__";

    raw.lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = line.strip_prefix(LABEL_PREFIX)?;
            let (label, text) = rest.split_once(' ')?;
            if label.is_empty() || text.trim().is_empty() {
                return None;
            }
            Some(RawRecord {
                text: text.trim().to_string(),
                label: label.to_string(),
            })
        })
        .collect()
}
