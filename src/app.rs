use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tracing::warn;

use crate::{
    api,
    config::Config,
    observability::Telemetry,
    service::{BackendKind, PredictionService},
};

#[derive(Clone)]
pub(crate) struct AppState {
    registry: Arc<ComponentRegistry>,
}

pub struct ComponentRegistry {
    config: Arc<Config>,
    telemetry: Telemetry,
    service: Arc<PredictionService>,
}

impl AppState {
    pub(crate) fn new(registry: ComponentRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub(crate) fn telemetry(&self) -> &Telemetry {
        &self.registry.telemetry
    }

    pub(crate) fn config(&self) -> &Config {
        &self.registry.config
    }

    pub(crate) fn service(&self) -> Arc<PredictionService> {
        Arc::clone(&self.registry.service)
    }
}

impl ComponentRegistry {
    /// 構成情報と依存をまとめて初期化し、アプリケーションの共有レジストリを構築する。
    /// パイプラインのロードはここで完了する。listener の bind はこの後なので、
    /// ロード完了前にリクエストが処理されることはない。
    ///
    /// # Errors
    /// Telemetry の初期化に失敗した場合はエラーを返す。
    pub fn build(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let telemetry = Telemetry::new().context("failed to initialize telemetry")?;
        let service = Arc::new(PredictionService::from_config(&config));

        if !service.is_ready(BackendKind::Fast) && !service.is_ready(BackendKind::Semantic) {
            warn!("no prediction backend is available; requests will fail until a trained artifact is provided");
        }

        Ok(Self {
            config,
            telemetry,
            service,
        })
    }

    #[must_use]
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    #[must_use]
    pub fn service(&self) -> Arc<PredictionService> {
        Arc::clone(&self.service)
    }
}

pub fn build_router(registry: ComponentRegistry) -> Router {
    let state = AppState::new(registry);
    api::router(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_MUTEX;

    #[tokio::test]
    async fn component_registry_builds_without_artifacts() {
        let config = {
            let _lock = ENV_MUTEX.lock().expect("env mutex");
            // SAFETY: test code adjusts deterministic environment state sequentially.
            unsafe {
                std::env::set_var("CLASSIFIER_SEMANTIC_ENABLED", "false");
                std::env::set_var("CLASSIFIER_MODEL_DIR", "/nonexistent/models");
            }
            let config = Config::from_env().expect("config loads");
            unsafe {
                std::env::remove_var("CLASSIFIER_SEMANTIC_ENABLED");
                std::env::remove_var("CLASSIFIER_MODEL_DIR");
            }
            config
        };

        let registry = ComponentRegistry::build(config).expect("registry builds");
        let state = AppState::new(registry);

        state.telemetry().record_health_probe();
        assert!(!state.service().is_ready(BackendKind::Fast));
        assert!(!state.service().is_ready(BackendKind::Semantic));
    }
}
