//! 多項ナイーブベイズ分類器。ラプラス平滑化つき。
use crate::error::ClassifyError;

#[derive(Debug, Clone)]
pub struct MultinomialNb {
    class_log_prior: Vec<f32>,
    /// `[class][feature]` の対数尤度行列。
    feature_log_prob: Vec<Vec<f32>>,
}

impl MultinomialNb {
    /// 特徴行列とクラス割り当てから学習する。
    ///
    /// # Errors
    /// 行列が空・次元不一致・範囲外クラス・サンプルゼロのクラスがある場合は
    /// エラーを返す。
    pub fn fit(
        rows: &[Vec<f32>],
        classes: &[usize],
        class_count: usize,
        alpha: f32,
    ) -> Result<Self, ClassifyError> {
        if rows.is_empty() || rows.len() != classes.len() {
            return Err(ClassifyError::InsufficientData(format!(
                "feature rows ({}) and class labels ({}) must be non-empty and equal",
                rows.len(),
                classes.len()
            )));
        }
        let feature_dim = rows[0].len();
        if rows.iter().any(|row| row.len() != feature_dim) {
            return Err(ClassifyError::InsufficientData(
                "feature rows have inconsistent dimensions".into(),
            ));
        }
        if let Some(class) = classes.iter().find(|class| **class >= class_count) {
            return Err(ClassifyError::InsufficientData(format!(
                "class index {class} out of range for {class_count} classes"
            )));
        }

        let mut class_counts = vec![0usize; class_count];
        let mut feature_sums = vec![vec![0.0f32; feature_dim]; class_count];
        for (row, class) in rows.iter().zip(classes) {
            class_counts[*class] += 1;
            for (sum, value) in feature_sums[*class].iter_mut().zip(row) {
                *sum += value;
            }
        }
        if let Some(empty) = class_counts.iter().position(|count| *count == 0) {
            return Err(ClassifyError::InsufficientData(format!(
                "class {empty} has no training samples"
            )));
        }

        let total = rows.len() as f32;
        let class_log_prior = class_counts
            .iter()
            .map(|count| (*count as f32 / total).ln())
            .collect();

        let feature_log_prob = feature_sums
            .into_iter()
            .map(|sums| {
                let smoothed_total: f32 = sums.iter().sum::<f32>() + alpha * feature_dim as f32;
                sums.into_iter()
                    .map(|sum| ((sum + alpha) / smoothed_total).ln())
                    .collect()
            })
            .collect();

        Ok(Self {
            class_log_prior,
            feature_log_prob,
        })
    }

    /// 永続化されたパラメータから復元する。
    ///
    /// # Errors
    /// 事前確率と尤度行列の次元が一致しない場合は [`ClassifyError::Artifact`] を返す。
    pub fn from_parts(
        class_log_prior: Vec<f32>,
        feature_log_prob: Vec<Vec<f32>>,
    ) -> Result<Self, ClassifyError> {
        if class_log_prior.len() != feature_log_prob.len() {
            return Err(ClassifyError::Artifact(anyhow::anyhow!(
                "prior length {} does not match likelihood rows {}",
                class_log_prior.len(),
                feature_log_prob.len()
            )));
        }
        let feature_dim = feature_log_prob.first().map_or(0, Vec::len);
        if feature_log_prob.iter().any(|row| row.len() != feature_dim) {
            return Err(ClassifyError::Artifact(anyhow::anyhow!(
                "likelihood rows have inconsistent dimensions"
            )));
        }
        Ok(Self {
            class_log_prior,
            feature_log_prob,
        })
    }

    /// 事後確率分布。log-sum-exp で正規化するため総和は1になる。
    #[must_use]
    pub fn predict_proba(&self, features: &[f32]) -> Vec<f64> {
        let scores: Vec<f64> = self
            .class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, row)| {
                let likelihood: f32 = row
                    .iter()
                    .zip(features)
                    .map(|(log_prob, value)| log_prob * value)
                    .sum();
                f64::from(prior + likelihood)
            })
            .collect();

        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exponentials: Vec<f64> = scores.iter().map(|score| (score - max).exp()).collect();
        let total: f64 = exponentials.iter().sum();
        exponentials.into_iter().map(|value| value / total).collect()
    }

    #[must_use]
    pub fn class_log_prior(&self) -> &[f32] {
        &self.class_log_prior
    }

    #[must_use]
    pub fn feature_log_prob(&self) -> &[Vec<f32>] {
        &self.feature_log_prob
    }
}

/// 最大確率のインデックス。同点は先頭側（序数の小さいクラス）が勝つ。
#[must_use]
pub fn argmax(probabilities: &[f64]) -> usize {
    let mut best = 0;
    for (index, value) in probabilities.iter().enumerate().skip(1) {
        if *value > probabilities[best] {
            best = index;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_model() -> MultinomialNb {
        // 2クラス・3特徴の線形分離可能なトイデータ。
        let rows = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.9, 0.1, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![0.0, 0.1, 0.9],
        ];
        let classes = vec![0, 0, 1, 1];
        MultinomialNb::fit(&rows, &classes, 2, 1.0).expect("fit succeeds")
    }

    #[test]
    fn probabilities_sum_to_one() {
        let model = toy_model();
        let probabilities = model.predict_proba(&[1.0, 0.0, 0.0]);
        let sum: f64 = probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn separable_classes_are_recovered() {
        let model = toy_model();
        assert_eq!(argmax(&model.predict_proba(&[1.0, 0.0, 0.0])), 0);
        assert_eq!(argmax(&model.predict_proba(&[0.0, 0.0, 1.0])), 1);
    }

    #[test]
    fn argmax_breaks_ties_toward_the_lowest_index() {
        assert_eq!(argmax(&[0.25, 0.25, 0.25, 0.25]), 0);
        assert_eq!(argmax(&[0.1, 0.45, 0.45]), 1);
    }

    #[test]
    fn missing_class_samples_are_rejected() {
        let rows = vec![vec![1.0, 0.0]];
        let classes = vec![0];
        let error = MultinomialNb::fit(&rows, &classes, 2, 1.0).expect_err("must fail");
        assert!(matches!(error, ClassifyError::InsufficientData(_)));
    }
}
