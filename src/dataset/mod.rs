//! 学習コーパスの構築。取得・ラベル正規化・重複排除・補強を担う。
//!
//! ソース単位の失敗は警告して読み飛ばすベストエフォート方式。
//! 全ソースが失敗して実サンプルがゼロの場合のみ致命的エラーとする。
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Duration;

use rustc_hash::FxHashMap;
use tracing::{info, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::error::ClassifyError;
use crate::normalize::TextNormalizer;
use crate::taxonomy::Category;

pub mod augment;
pub mod corpus;
pub mod source;

pub use corpus::{CorpusRecord, SampleOrigin, read_corpus, write_corpus};
pub use source::{RecordFormat, SourceDescriptor, SourceFetcher, SourceLocation, SourceManifest};

#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub min_text_length: usize,
    pub max_text_length: usize,
    /// 補強後に各カテゴリが最低限持つべきサンプル数。
    pub category_floor: usize,
    pub augment_seed: u64,
    pub source_timeout: Duration,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            min_text_length: 50,
            max_text_length: 20_000,
            category_floor: 200,
            augment_seed: 42,
            source_timeout: Duration::from_secs(30),
        }
    }
}

/// 構築結果の内訳。合成比率の監査に使う。
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    pub sources_succeeded: usize,
    pub sources_failed: usize,
    pub dropped_unmapped: usize,
    pub dropped_length: usize,
    pub dropped_duplicates: usize,
    pub real_samples: usize,
    pub synthetic_samples: usize,
}

#[derive(Debug)]
pub struct BuiltCorpus {
    pub records: Vec<CorpusRecord>,
    pub stats: BuildStats,
}

pub struct DatasetBuilder {
    normalizer: TextNormalizer,
    fetcher: SourceFetcher,
    config: DatasetConfig,
}

impl DatasetBuilder {
    /// # Errors
    /// HTTPクライアントが構築できない場合は [`ClassifyError::Configuration`] を返す。
    pub fn new(config: DatasetConfig) -> Result<Self, ClassifyError> {
        let fetcher = SourceFetcher::new(config.source_timeout)
            .map_err(|error| ClassifyError::configuration(format!("{error:#}")))?;
        Ok(Self {
            normalizer: TextNormalizer::new(config.max_text_length),
            fetcher,
            config,
        })
    }

    /// 全ソースを順に処理し、正規化・重複排除・補強済みのコーパスを返す。
    ///
    /// 出力順は安定: 実サンプルがソース宣言順、その後に合成サンプルが
    /// カテゴリ序数順で続く。
    ///
    /// # Errors
    /// ソース一覧が空、全ソースが失敗、または補強テンプレート空間が
    /// 枯渇した場合は [`ClassifyError::Configuration`] を返す。
    pub async fn build(&self, sources: &[SourceDescriptor]) -> Result<BuiltCorpus, ClassifyError> {
        if sources.is_empty() {
            return Err(ClassifyError::configuration("source list is empty"));
        }

        let mut stats = BuildStats::default();
        let mut seen: FxHashMap<u64, usize> = FxHashMap::default();
        let mut records = Vec::new();

        for descriptor in sources {
            match self.ingest_source(descriptor).await {
                Ok(raw_records) => {
                    stats.sources_succeeded += 1;
                    self.merge_source(descriptor, raw_records, &mut seen, &mut records, &mut stats);
                }
                Err(error) => {
                    stats.sources_failed += 1;
                    warn!(source = %descriptor.name, error = %error, "skipping failed source");
                }
            }
        }

        if records.is_empty() {
            return Err(ClassifyError::configuration(
                "no samples collected: all sources failed or were empty",
            ));
        }
        stats.real_samples = records.len();

        self.augment_sparse_categories(&mut seen, &mut records, &mut stats)?;

        info!(
            sources_succeeded = stats.sources_succeeded,
            sources_failed = stats.sources_failed,
            real = stats.real_samples,
            synthetic = stats.synthetic_samples,
            dropped_unmapped = stats.dropped_unmapped,
            dropped_length = stats.dropped_length,
            dropped_duplicates = stats.dropped_duplicates,
            "corpus build finished"
        );

        Ok(BuiltCorpus { records, stats })
    }

    async fn ingest_source(
        &self,
        descriptor: &SourceDescriptor,
    ) -> anyhow::Result<Vec<source::RawRecord>> {
        let raw = self.fetcher.fetch(descriptor).await?;
        source::parse_records(&raw, &descriptor.format)
    }

    fn merge_source(
        &self,
        descriptor: &SourceDescriptor,
        raw_records: Vec<source::RawRecord>,
        seen: &mut FxHashMap<u64, usize>,
        records: &mut Vec<CorpusRecord>,
        stats: &mut BuildStats,
    ) {
        let mut accepted = 0usize;
        for raw in raw_records {
            let Some(category) = descriptor.labels.get(&raw.label.to_lowercase()).copied() else {
                stats.dropped_unmapped += 1;
                warn!(source = %descriptor.name, label = %raw.label, "dropping unmapped label");
                continue;
            };

            let normalized = self.normalizer.normalize_raw(&raw.text);
            let length = normalized.chars().count();
            if length < self.config.min_text_length || length > self.config.max_text_length {
                stats.dropped_length += 1;
                continue;
            }

            // 重複は後勝ち: 位置は初出のまま、内容を後発ソースで上書きする。
            let fingerprint = xxh3_64(normalized.as_bytes());
            match seen.entry(fingerprint) {
                Entry::Occupied(occupied) => {
                    stats.dropped_duplicates += 1;
                    records[*occupied.get()] = CorpusRecord::real(normalized, category);
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(records.len());
                    records.push(CorpusRecord::real(normalized, category));
                    accepted += 1;
                }
            }
        }
        info!(source = %descriptor.name, accepted, "source merged");
    }

    fn augment_sparse_categories(
        &self,
        seen: &mut FxHashMap<u64, usize>,
        records: &mut Vec<CorpusRecord>,
        stats: &mut BuildStats,
    ) -> Result<(), ClassifyError> {
        let mut counts: HashMap<Category, usize> = HashMap::new();
        for record in records.iter() {
            *counts.entry(record.category).or_default() += 1;
        }

        for category in Category::ALL {
            let current = counts.get(&category).copied().unwrap_or(0);
            if current >= self.config.category_floor {
                continue;
            }
            let mut needed = self.config.category_floor - current;
            let pool = augment::candidates(category, self.config.augment_seed);
            let mut generated = 0usize;

            for candidate in pool {
                if needed == 0 {
                    break;
                }
                let normalized = self.normalizer.normalize_raw(&candidate);
                let fingerprint = xxh3_64(normalized.as_bytes());
                if let Entry::Vacant(vacant) = seen.entry(fingerprint) {
                    vacant.insert(records.len());
                    records.push(CorpusRecord::synthetic(normalized, category));
                    needed -= 1;
                    generated += 1;
                }
            }

            if needed > 0 {
                return Err(ClassifyError::configuration(format!(
                    "synthetic template space exhausted for {category}: {needed} samples short of floor"
                )));
            }
            if generated > 0 {
                stats.synthetic_samples += generated;
                info!(category = %category, generated, "augmented sparse category");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(floor: usize) -> DatasetBuilder {
        DatasetBuilder::new(DatasetConfig {
            category_floor: floor,
            ..DatasetConfig::default()
        })
        .expect("builder constructs")
    }

    #[tokio::test]
    async fn empty_source_list_is_a_configuration_error() {
        let error = builder(10).build(&[]).await.expect_err("must fail");
        assert!(matches!(error, ClassifyError::Configuration(_)));
    }

    #[tokio::test]
    async fn augmentation_meets_the_category_floor() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("seed.csv");
        std::fs::write(
            &path,
            "category,text\n\
             business,Shares of regional exporters climbed after upbeat forecasts today\n\
             business,Quarterly results lifted confidence across manufacturing supply chains\n",
        )
        .expect("write source");

        let descriptor = SourceDescriptor {
            name: "seed".into(),
            location: SourceLocation::Path(path),
            format: RecordFormat::Csv {
                text_column: "text".into(),
                category_column: "category".into(),
            },
            labels: HashMap::from([("business".to_string(), Category::Business)]),
        };

        let built = builder(20)
            .build(std::slice::from_ref(&descriptor))
            .await
            .expect("build succeeds");

        for category in Category::ALL {
            let count = built
                .records
                .iter()
                .filter(|record| record.category == category)
                .count();
            assert!(count >= 20, "{category} below floor: {count}");
        }
        assert_eq!(built.stats.real_samples, 2);
        assert_eq!(built.stats.synthetic_samples, 12 * 20 - 2);
    }

    #[tokio::test]
    async fn duplicate_texts_collapse_to_one() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dupes.csv");
        std::fs::write(
            &path,
            "category,text\n\
             business,The same business headline repeated for deduplication checks\n\
             business,THE SAME business headline REPEATED for deduplication checks\n\
             business,A different business headline that should be kept separately\n",
        )
        .expect("write source");

        let descriptor = SourceDescriptor {
            name: "dupes".into(),
            location: SourceLocation::Path(path),
            format: RecordFormat::Csv {
                text_column: "text".into(),
                category_column: "category".into(),
            },
            labels: HashMap::from([("business".to_string(), Category::Business)]),
        };

        let built = builder(1)
            .build(std::slice::from_ref(&descriptor))
            .await
            .expect("build succeeds");

        assert_eq!(built.stats.real_samples, 2);
        assert_eq!(built.stats.dropped_duplicates, 1);
    }

    #[tokio::test]
    async fn duplicate_across_sources_keeps_the_last_seen_label() {
        let dir = tempfile::tempdir().expect("tempdir");
        let shared_text = "Central bank commentary moved both equity and bond markets sharply";
        let first_path = dir.path().join("first.csv");
        let second_path = dir.path().join("second.csv");
        std::fs::write(&first_path, format!("category,text\nbusiness,{shared_text}\n"))
            .expect("write first source");
        std::fs::write(&second_path, format!("category,text\nmarkets,{shared_text}\n"))
            .expect("write second source");

        let sources = vec![
            SourceDescriptor {
                name: "first".into(),
                location: SourceLocation::Path(first_path),
                format: RecordFormat::Csv {
                    text_column: "text".into(),
                    category_column: "category".into(),
                },
                labels: HashMap::from([("business".to_string(), Category::Business)]),
            },
            SourceDescriptor {
                name: "second".into(),
                location: SourceLocation::Path(second_path),
                format: RecordFormat::Csv {
                    text_column: "text".into(),
                    category_column: "category".into(),
                },
                labels: HashMap::from([("markets".to_string(), Category::Finance)]),
            },
        ];

        let built = builder(1).build(&sources).await.expect("build succeeds");

        let survivors: Vec<_> = built
            .records
            .iter()
            .filter(|record| record.origin == SampleOrigin::Real)
            .collect();
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].category, Category::Finance);
    }
}
