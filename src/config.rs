use std::{env, net::SocketAddr, num::NonZeroUsize, path::PathBuf, time::Duration};

use thiserror::Error;

use crate::dataset::DatasetConfig;
use crate::training::TrainerConfig;

#[cfg(test)]
use once_cell::sync::Lazy;
#[cfg(test)]
pub(crate) static ENV_MUTEX: Lazy<std::sync::Mutex<()>> = Lazy::new(|| std::sync::Mutex::new(()));

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    http_bind: SocketAddr,
    model_dir: PathBuf,
    model_version: String,
    semantic_enabled: bool,
    semantic_max_concurrency: NonZeroUsize,
    request_timeout: Duration,
    max_input_chars: usize,
    batch_limit: usize,
    min_text_length: usize,
    max_text_length: usize,
    category_floor: usize,
    augment_seed: u64,
    source_timeout: Duration,
    test_ratio: f32,
    split_seed: u64,
    max_features: usize,
    nb_alpha: f32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Config {
    /// 環境変数から分類ワーカーの設定値を読み込み、検証する。
    ///
    /// すべての項目に既定値があるため未設定でも起動できるが、
    /// 数値・アドレスのパースに失敗した場合はエラーを返す。
    ///
    /// # Errors
    /// 各種値のパースに失敗した場合は [`ConfigError`] を返す。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_bind = parse_socket_addr("CLASSIFIER_HTTP_BIND", "0.0.0.0:8000")?;
        let model_dir = PathBuf::from(
            env::var("CLASSIFIER_MODEL_DIR").unwrap_or_else(|_| "./models".to_string()),
        );
        let model_version =
            env::var("CLASSIFIER_MODEL_VERSION").unwrap_or_else(|_| "v1".to_string());

        // Prediction serving settings
        let semantic_enabled = parse_bool("CLASSIFIER_SEMANTIC_ENABLED", true)?;
        let semantic_max_concurrency =
            parse_non_zero_usize("CLASSIFIER_SEMANTIC_MAX_CONCURRENCY", 2)?;
        let request_timeout = parse_duration_secs("CLASSIFIER_REQUEST_TIMEOUT_SECS", 10)?;
        let max_input_chars = parse_usize("CLASSIFIER_MAX_INPUT_CHARS", 20_000)?;
        let batch_limit = parse_usize("CLASSIFIER_BATCH_LIMIT", 100)?;

        // Corpus building settings
        let min_text_length = parse_usize("CLASSIFIER_MIN_TEXT_LENGTH", 50)?;
        let max_text_length = parse_usize("CLASSIFIER_MAX_TEXT_LENGTH", 20_000)?;
        let category_floor = parse_usize("CLASSIFIER_CATEGORY_FLOOR", 200)?;
        let augment_seed = parse_u64("CLASSIFIER_AUGMENT_SEED", 42)?;
        let source_timeout = parse_duration_secs("CLASSIFIER_SOURCE_TIMEOUT_SECS", 30)?;

        // Training settings
        let test_ratio = parse_f64("CLASSIFIER_TEST_RATIO", 0.2)? as f32;
        let split_seed = parse_u64("CLASSIFIER_SPLIT_SEED", 42)?;
        let max_features = parse_usize("CLASSIFIER_MAX_FEATURES", 1000)?;
        let nb_alpha = parse_f64("CLASSIFIER_NB_ALPHA", 1.0)? as f32;

        Ok(Self {
            http_bind,
            model_dir,
            model_version,
            semantic_enabled,
            semantic_max_concurrency,
            request_timeout,
            max_input_chars,
            batch_limit,
            min_text_length,
            max_text_length,
            category_floor,
            augment_seed,
            source_timeout,
            test_ratio,
            split_seed,
            max_features,
            nb_alpha,
        })
    }

    #[must_use]
    pub fn http_bind(&self) -> SocketAddr {
        self.http_bind
    }

    #[must_use]
    pub fn model_dir(&self) -> &std::path::Path {
        &self.model_dir
    }

    #[must_use]
    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    #[must_use]
    pub fn semantic_enabled(&self) -> bool {
        self.semantic_enabled
    }

    #[must_use]
    pub fn semantic_max_concurrency(&self) -> NonZeroUsize {
        self.semantic_max_concurrency
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    #[must_use]
    pub fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }

    #[must_use]
    pub fn batch_limit(&self) -> usize {
        self.batch_limit
    }

    /// コーパス構築ジョブ向けの設定ビュー。
    #[must_use]
    pub fn dataset_config(&self) -> DatasetConfig {
        DatasetConfig {
            min_text_length: self.min_text_length,
            max_text_length: self.max_text_length,
            category_floor: self.category_floor,
            augment_seed: self.augment_seed,
            source_timeout: self.source_timeout,
        }
    }

    /// 学習ジョブ向けの設定ビュー。
    #[must_use]
    pub fn trainer_config(&self) -> TrainerConfig {
        TrainerConfig {
            test_ratio: self.test_ratio,
            seed: self.split_seed,
            max_features: self.max_features,
            nb_alpha: self.nb_alpha,
            version: self.model_version.clone(),
            max_text_length: self.max_text_length,
        }
    }
}

fn env_or_default(name: &'static str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_socket_addr(name: &'static str, default: &str) -> Result<SocketAddr, ConfigError> {
    env_or_default(name, default)
        .parse()
        .map_err(|error| ConfigError::Invalid {
            name,
            source: anyhow::Error::new(error),
        })
}

fn parse_usize(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    env_or_default(name, &default.to_string())
        .parse::<usize>()
        .map_err(|error| ConfigError::Invalid {
            name,
            source: anyhow::Error::new(error),
        })
}

fn parse_u64(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    env_or_default(name, &default.to_string())
        .parse::<u64>()
        .map_err(|error| ConfigError::Invalid {
            name,
            source: anyhow::Error::new(error),
        })
}

fn parse_f64(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    env_or_default(name, &default.to_string())
        .parse::<f64>()
        .map_err(|error| ConfigError::Invalid {
            name,
            source: anyhow::Error::new(error),
        })
}

fn parse_bool(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    let raw = env_or_default(name, &default.to_string());
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("invalid boolean value: {raw}"),
        }),
    }
}

fn parse_duration_secs(name: &'static str, default: u64) -> Result<Duration, ConfigError> {
    parse_u64(name, default).map(Duration::from_secs)
}

fn parse_non_zero_usize(name: &'static str, default: usize) -> Result<NonZeroUsize, ConfigError> {
    let value = parse_usize(name, default)?;
    NonZeroUsize::new(value).ok_or_else(|| ConfigError::Invalid {
        name,
        source: anyhow::anyhow!("value must be greater than zero"),
    })
}
