//! Bag-of-words特徴抽出。TF-IDF重み付けとL2正規化を行う。
use rustc_hash::FxHashMap;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::ClassifyError;

/// 特徴語彙から除外する英語ストップワード。
const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "and", "any", "are", "because", "been",
    "before", "being", "below", "between", "both", "but", "can", "did", "does", "doing", "down",
    "during", "each", "few", "for", "from", "further", "had", "has", "have", "having", "her",
    "here", "hers", "him", "his", "how", "into", "its", "itself", "just", "more", "most", "nor",
    "not", "now", "off", "once", "only", "other", "our", "ours", "out", "over", "own", "same",
    "she", "should", "some", "such", "than", "that", "the", "their", "theirs", "them", "then",
    "there", "these", "they", "this", "those", "through", "too", "under", "until", "very", "was",
    "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with",
    "would", "you", "your", "yours",
];

/// トークン化。単語境界で分割し、短語とストップワードを除く。
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_word_bounds()
        .map(|token| token.trim_matches(|c: char| !c.is_ascii_alphanumeric()))
        .filter(|token| token.len() >= 3)
        .map(str::to_lowercase)
        .filter(|token| !STOP_WORDS.contains(&token.as_str()))
        .collect()
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: Vec<String>,
    index: FxHashMap<String, usize>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    /// 文書集合から語彙とIDFを学習する。語彙は文書頻度の降順
    /// （同順位は辞書順）で `max_features` 件に絞る。
    ///
    /// # Errors
    /// 文書が空、またはトークンが一つも得られない場合は
    /// [`ClassifyError::InsufficientData`] を返す。
    pub fn fit(documents: &[String], max_features: usize) -> Result<Self, ClassifyError> {
        if documents.is_empty() {
            return Err(ClassifyError::InsufficientData(
                "no documents to fit vectorizer".into(),
            ));
        }

        let mut document_frequency: FxHashMap<String, usize> = FxHashMap::default();
        for document in documents {
            let mut unique: Vec<String> = tokenize(document);
            unique.sort_unstable();
            unique.dedup();
            for token in unique {
                *document_frequency.entry(token).or_default() += 1;
            }
        }
        if document_frequency.is_empty() {
            return Err(ClassifyError::InsufficientData(
                "documents produced no tokens".into(),
            ));
        }

        let mut ranked: Vec<(String, usize)> = document_frequency.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);
        // 成果物の語彙順を安定させるため、最終的には辞書順に並べ替える。
        ranked.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let total_docs = documents.len() as f32;
        let mut vocabulary = Vec::with_capacity(ranked.len());
        let mut idf = Vec::with_capacity(ranked.len());
        for (token, df) in ranked {
            idf.push(((1.0 + total_docs) / (1.0 + df as f32)).ln() + 1.0);
            vocabulary.push(token);
        }

        Self::from_parts(vocabulary, idf)
    }

    /// 永続化された語彙とIDFから復元する。
    ///
    /// # Errors
    /// 語彙とIDFの長さが一致しない場合は [`ClassifyError::Artifact`] を返す。
    pub fn from_parts(vocabulary: Vec<String>, idf: Vec<f32>) -> Result<Self, ClassifyError> {
        if vocabulary.len() != idf.len() {
            return Err(ClassifyError::Artifact(anyhow::anyhow!(
                "vocabulary length {} does not match idf length {}",
                vocabulary.len(),
                idf.len()
            )));
        }
        let index = vocabulary
            .iter()
            .enumerate()
            .map(|(position, token)| (token.clone(), position))
            .collect();
        Ok(Self {
            vocabulary,
            index,
            idf,
        })
    }

    /// テキストをTF-IDFベクトルに変換する。L2正規化済み。
    #[must_use]
    pub fn transform(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.vocabulary.len()];
        for token in tokenize(text) {
            if let Some(position) = self.index.get(&token) {
                vector[*position] += 1.0;
            }
        }
        for (value, idf) in vector.iter_mut().zip(&self.idf) {
            *value *= idf;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }

    #[must_use]
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    #[must_use]
    pub fn idf(&self) -> &[f32] {
        &self.idf
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }
}
