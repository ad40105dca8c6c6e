//! カテゴリ比率を保つ層化分割。シード固定で再現可能。
use std::collections::BTreeMap;

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::error::ClassifyError;

/// 学習・評価それぞれに入るサンプルのインデックス。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// クラスごとにシャッフルして分割する。テスト側は各クラス最低1件。
///
/// # Errors
/// 比率が (0, 1) の範囲外なら [`ClassifyError::Configuration`]、
/// 分割後にいずれかのクラスの学習側が2件を下回る場合は
/// [`ClassifyError::InsufficientData`] を返す。
pub fn stratified_split(
    labels: &[usize],
    test_ratio: f32,
    seed: u64,
) -> Result<SplitIndices, ClassifyError> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(ClassifyError::configuration(format!(
            "test ratio must be in (0, 1), got {test_ratio}"
        )));
    }

    // BTreeMapでクラスの走査順を固定し、シードに対して決定的にする。
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (index, label) in labels.iter().enumerate() {
        groups.entry(*label).or_default().push(index);
    }

    let mut train = Vec::new();
    let mut test = Vec::new();
    for (label, mut indices) in groups {
        let total = indices.len();
        let test_count = ((total as f32 * test_ratio).round() as usize).max(1);
        let train_count = total.saturating_sub(test_count);
        if train_count < 2 {
            return Err(ClassifyError::InsufficientData(format!(
                "class {label} has only {total} samples; at least 2 must remain for training"
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(label as u64));
        indices.shuffle(&mut rng);
        test.extend(indices.drain(..test_count));
        train.extend(indices);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(SplitIndices { train, test })
}
