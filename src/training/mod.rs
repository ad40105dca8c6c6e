//! モデル学習ジョブ。コーパスから学習済みパイプライン成果物と評価レポートを作る。
use chrono::Utc;
use rayon::prelude::*;
use tracing::info;

use crate::dataset::CorpusRecord;
use crate::error::ClassifyError;
use crate::normalize::TextNormalizer;
use crate::taxonomy::Category;

pub mod artifact;
pub mod evaluation;
pub mod naive_bayes;
pub mod split;
pub mod vectorizer;

pub use artifact::PipelineArtifact;
pub use evaluation::{EvaluationReport, MetricsCalculator};
pub use naive_bayes::{MultinomialNb, argmax};
pub use split::stratified_split;
pub use vectorizer::TfidfVectorizer;

#[derive(Debug, Clone)]
pub struct TrainerConfig {
    pub test_ratio: f32,
    pub seed: u64,
    pub max_features: usize,
    pub nb_alpha: f32,
    pub version: String,
    /// 正規化の安全弁。コーパスは正規化済みのはずだが、変換は冪等なので再適用する。
    pub max_text_length: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            seed: 42,
            max_features: 1000,
            nb_alpha: 1.0,
            version: "v1".to_string(),
            max_text_length: 20_000,
        }
    }
}

#[derive(Debug)]
pub struct TrainingOutcome {
    pub artifact: PipelineArtifact,
    pub report: EvaluationReport,
}

/// コーパス全体を層化分割し、学習側でTF-IDFとナイーブベイズを適合、
/// 評価側でレポートを作る。
///
/// # Errors
/// コーパスが空、カテゴリごとのサンプルが層化に足りない、または
/// 特徴抽出が不可能な場合はエラーを返す。
pub fn train(
    records: &[CorpusRecord],
    config: &TrainerConfig,
) -> Result<TrainingOutcome, ClassifyError> {
    if records.is_empty() {
        return Err(ClassifyError::InsufficientData("corpus is empty".into()));
    }

    let normalizer = TextNormalizer::new(config.max_text_length);
    let documents: Vec<String> = records
        .iter()
        .map(|record| normalizer.normalize_raw(&record.text))
        .collect();
    let labels: Vec<usize> = records
        .iter()
        .map(|record| record.category.ordinal())
        .collect();

    let split = stratified_split(&labels, config.test_ratio, config.seed)?;
    info!(
        train = split.train.len(),
        test = split.test.len(),
        "corpus split for training"
    );

    let train_documents: Vec<String> = split
        .train
        .iter()
        .map(|index| documents[*index].clone())
        .collect();
    let train_labels: Vec<usize> = split.train.iter().map(|index| labels[*index]).collect();

    let vectorizer = TfidfVectorizer::fit(&train_documents, config.max_features)?;
    let train_rows: Vec<Vec<f32>> = train_documents
        .par_iter()
        .map(|document| vectorizer.transform(document))
        .collect();
    let model = MultinomialNb::fit(
        &train_rows,
        &train_labels,
        Category::ALL.len(),
        config.nb_alpha,
    )?;

    let predictions: Vec<(Category, Category)> = split
        .test
        .par_iter()
        .map(|index| {
            let features = vectorizer.transform(&documents[*index]);
            let predicted = Category::ALL[argmax(&model.predict_proba(&features))];
            (records[*index].category, predicted)
        })
        .collect();

    let mut calculator = MetricsCalculator::new();
    for (expected, predicted) in predictions {
        calculator.push(expected, predicted);
    }
    let report = calculator.finalize(split.train.len(), split.test.len());
    info!(
        accuracy = report.accuracy,
        macro_f1 = report.macro_f1,
        vocabulary = vectorizer.dimension(),
        "training evaluation finished"
    );

    let artifact = PipelineArtifact {
        version: config.version.clone(),
        trained_at: Utc::now(),
        categories: Category::ALL.to_vec(),
        vocabulary: vectorizer.vocabulary().to_vec(),
        idf: vectorizer.idf().to_vec(),
        class_log_prior: model.class_log_prior().to_vec(),
        feature_log_prob: model.feature_log_prob().to_vec(),
    };

    Ok(TrainingOutcome { artifact, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::augment;

    /// 補強テンプレートから小さな学習コーパスを決定的に作る。
    fn toy_corpus(per_category: usize) -> Vec<CorpusRecord> {
        let mut records = Vec::new();
        for category in Category::ALL {
            for text in augment::candidates(category, 42)
                .into_iter()
                .take(per_category)
            {
                records.push(CorpusRecord::synthetic(text.to_lowercase(), category));
            }
        }
        records
    }

    #[test]
    fn training_produces_a_valid_artifact() {
        let records = toy_corpus(12);
        let outcome = train(&records, &TrainerConfig::default()).expect("training succeeds");

        assert_eq!(outcome.artifact.categories, Category::ALL);
        assert_eq!(
            outcome.artifact.vocabulary.len(),
            outcome.artifact.idf.len()
        );
        assert_eq!(
            outcome.report.train_size + outcome.report.test_size,
            records.len()
        );
        // 語彙が分離したトイコーパスなので精度はほぼ完全になるはず。
        assert!(outcome.report.accuracy > 0.8, "{}", outcome.report.accuracy);
    }

    #[test]
    fn empty_corpus_is_rejected() {
        let error = train(&[], &TrainerConfig::default()).expect_err("must fail");
        assert!(matches!(error, ClassifyError::InsufficientData(_)));
    }

    #[test]
    fn undersized_categories_are_rejected() {
        let mut records = toy_corpus(12);
        // 1カテゴリだけ2件まで間引いて層化を壊す。
        records.retain(|record| record.category != Category::World);
        let mut world = Vec::new();
        for text in augment::candidates(Category::World, 42).into_iter().take(2) {
            world.push(CorpusRecord::synthetic(
                text.to_lowercase(),
                Category::World,
            ));
        }
        records.extend(world);

        let error = train(&records, &TrainerConfig::default()).expect_err("must fail");
        assert!(matches!(error, ClassifyError::InsufficientData(_)));
    }
}
