//! テキスト正規化。学習時と推論時で同一の変換を適用し、特徴空間を一致させる。
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::ClassifyError;

/// 正規化で許可する文字集合の補集合。英小文字・数字・空白・基本的な約物以外を落とす。
const DISALLOWED_PATTERN: &str = r"[^a-z0-9\s.,!?'-]";
const URL_PATTERN: &str = r"(?:https?://|www\.)\S+";
const HTML_TAG_PATTERN: &str = r"<[^>]+>";
const EMAIL_PATTERN: &str = r"[\w.-]+@[\w.-]+\.\w+";

#[derive(Debug, Clone)]
pub struct TextNormalizer {
    url_re: Regex,
    html_tag_re: Regex,
    email_re: Regex,
    disallowed_re: Regex,
    whitespace_re: Regex,
    max_input_chars: usize,
}

impl TextNormalizer {
    /// # Panics
    /// 内蔵の正規表現パターンがコンパイルできない場合のみパニックする。
    #[must_use]
    pub fn new(max_input_chars: usize) -> Self {
        Self {
            url_re: Regex::new(URL_PATTERN).expect("compile url pattern"),
            html_tag_re: Regex::new(HTML_TAG_PATTERN).expect("compile html tag pattern"),
            email_re: Regex::new(EMAIL_PATTERN).expect("compile email pattern"),
            disallowed_re: Regex::new(DISALLOWED_PATTERN).expect("compile disallowed pattern"),
            whitespace_re: Regex::new(r"\s+").expect("compile whitespace pattern"),
            max_input_chars,
        }
    }

    /// 入力検証つきの正規化。推論経路はこちらを通る。
    ///
    /// # Errors
    /// 入力が空・空白のみ・文字数上限超過、または正規化後に何も残らない場合は
    /// [`ClassifyError::InvalidInput`] を返す。
    pub fn normalize(&self, text: &str) -> Result<String, ClassifyError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ClassifyError::invalid_input("text is empty"));
        }
        let char_count = trimmed.chars().count();
        if char_count > self.max_input_chars {
            return Err(ClassifyError::invalid_input(format!(
                "text length {char_count} exceeds maximum {}",
                self.max_input_chars
            )));
        }

        let normalized = self.normalize_raw(trimmed);
        if normalized.is_empty() {
            return Err(ClassifyError::invalid_input(
                "text contains no classifiable characters",
            ));
        }
        Ok(normalized)
    }

    /// 長さ検証なしの正規化。コーパス構築はこちらを使い、長さ制約は
    /// 構築側のフィルタに委ねる。冪等。
    #[must_use]
    pub fn normalize_raw(&self, text: &str) -> String {
        let lowered = text.nfc().collect::<String>().to_lowercase();
        let stripped = self.url_re.replace_all(&lowered, " ");
        let stripped = self.html_tag_re.replace_all(&stripped, " ");
        let stripped = self.email_re.replace_all(&stripped, " ");
        let stripped = self.disallowed_re.replace_all(&stripped, " ");
        self.whitespace_re
            .replace_all(&stripped, " ")
            .trim()
            .to_string()
    }

    #[must_use]
    pub fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new(20_000)
    }

    #[rstest]
    #[case("Hello, World!", "hello, world!")]
    #[case("  Spaced\t\tout\n text ", "spaced out text")]
    #[case("Visit https://example.com today", "visit today")]
    #[case("<p>Markup</p> stays out", "markup stays out")]
    #[case("mail me at someone@example.com now", "mail me at now")]
    #[case("Stocks up 5% — traders cheer", "stocks up 5 traders cheer")]
    fn normalize_strips_and_lowers(#[case] input: &str, #[case] expected: &str) {
        let result = normalizer().normalize(input).expect("normalize succeeds");
        assert_eq!(result, expected);
    }

    #[rstest]
    #[case("The stock market rallied after earnings season.")]
    #[case("Visit https://example.com! <b>Breaking</b> news from someone@mail.org...")]
    #[case("   mixed CASE   and    gaps   ")]
    fn normalize_is_idempotent(#[case] input: &str) {
        let normalizer = normalizer();
        let once = normalizer.normalize(input).expect("first pass");
        let twice = normalizer.normalize(&once).expect("second pass");
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_input_is_rejected() {
        let error = normalizer().normalize("   ").expect_err("must fail");
        assert!(matches!(error, ClassifyError::InvalidInput(_)));
    }

    #[test]
    fn oversized_input_is_rejected_before_normalization() {
        let normalizer = TextNormalizer::new(10);
        let error = normalizer
            .normalize("this text is longer than ten characters")
            .expect_err("must fail");
        assert!(matches!(error, ClassifyError::InvalidInput(_)));
    }

    #[test]
    fn symbol_only_input_is_rejected() {
        let error = normalizer().normalize("@#$%^&*").expect_err("must fail");
        assert!(matches!(error, ClassifyError::InvalidInput(_)));
    }
}
