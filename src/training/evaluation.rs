//! 評価用の分類メトリクス集計。
use std::collections::BTreeMap;

use serde::Serialize;

use crate::taxonomy::Category;

#[derive(Debug, Default, Clone, Copy)]
struct LabelStats {
    true_positive: f32,
    false_positive: f32,
    false_negative: f32,
    support: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LabelMetrics {
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
    pub support: usize,
}

/// 学習ジョブが成果物の隣に書き出す評価レポート。
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub accuracy: f32,
    pub macro_precision: f32,
    pub macro_recall: f32,
    pub macro_f1: f32,
    pub train_size: usize,
    pub test_size: usize,
    pub per_category: BTreeMap<Category, LabelMetrics>,
}

/// 正解と予測のペアを集計する。
#[derive(Debug, Default)]
pub struct MetricsCalculator {
    per_label: BTreeMap<Category, LabelStats>,
    total_samples: usize,
    correct_samples: usize,
}

impl MetricsCalculator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, expected: Category, predicted: Category) {
        self.total_samples += 1;
        if expected == predicted {
            self.correct_samples += 1;
            let stats = self.per_label.entry(expected).or_default();
            stats.true_positive += 1.0;
            stats.support += 1;
            return;
        }

        let expected_stats = self.per_label.entry(expected).or_default();
        expected_stats.false_negative += 1.0;
        expected_stats.support += 1;
        self.per_label.entry(predicted).or_default().false_positive += 1.0;
    }

    #[must_use]
    pub fn finalize(&self, train_size: usize, test_size: usize) -> EvaluationReport {
        let mut per_category = BTreeMap::new();
        let mut precision_sum = 0.0;
        let mut recall_sum = 0.0;
        let mut f1_sum = 0.0;

        // 評価セットに登場しないカテゴリも0値で載せ、レポートの列を固定する。
        for category in Category::ALL {
            let stats = self.per_label.get(&category).copied().unwrap_or_default();
            let precision = if stats.true_positive + stats.false_positive > 0.0 {
                stats.true_positive / (stats.true_positive + stats.false_positive)
            } else {
                0.0
            };
            let recall = if stats.true_positive + stats.false_negative > 0.0 {
                stats.true_positive / (stats.true_positive + stats.false_negative)
            } else {
                0.0
            };
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            precision_sum += precision;
            recall_sum += recall;
            f1_sum += f1;
            per_category.insert(
                category,
                LabelMetrics {
                    precision,
                    recall,
                    f1,
                    support: stats.support,
                },
            );
        }

        let label_count = Category::ALL.len() as f32;
        EvaluationReport {
            accuracy: if self.total_samples > 0 {
                self.correct_samples as f32 / self.total_samples as f32
            } else {
                0.0
            },
            macro_precision: precision_sum / label_count,
            macro_recall: recall_sum / label_count,
            macro_f1: f1_sum / label_count,
            train_size,
            test_size,
            per_category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions_score_one() {
        let mut calculator = MetricsCalculator::new();
        calculator.push(Category::Sports, Category::Sports);
        calculator.push(Category::Business, Category::Business);

        let report = calculator.finalize(8, 2);
        assert!((report.accuracy - 1.0).abs() < 1e-6);
        assert_eq!(report.per_category[&Category::Sports].support, 1);
        assert!((report.per_category[&Category::Sports].f1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn misclassification_counts_against_both_labels() {
        let mut calculator = MetricsCalculator::new();
        calculator.push(Category::Sports, Category::Business);

        let report = calculator.finalize(4, 1);
        assert!((report.accuracy - 0.0).abs() < 1e-6);
        assert!((report.per_category[&Category::Sports].recall - 0.0).abs() < 1e-6);
        assert!((report.per_category[&Category::Business].precision - 0.0).abs() < 1e-6);
    }

    #[test]
    fn report_always_lists_every_category() {
        let calculator = MetricsCalculator::new();
        let report = calculator.finalize(0, 0);
        assert_eq!(report.per_category.len(), 12);
    }
}
