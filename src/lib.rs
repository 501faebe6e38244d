use std::sync::Arc;

pub mod api;
pub mod app;
pub mod build_info;
pub mod cli;
pub mod error;
pub mod model;
pub mod session;
pub mod storage;
pub mod util;

use anyhow::Context;
use api::{Detector, DetectorClient};
use session::AnalyzerSession;
use util::config::Config;
use util::history::HistoryManager;
use util::preferences::PreferencesManager;

/// 应用状态：配置与共享依赖，按命令需要组装各个管理器
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn storage::Storage>,
    pub detector: Arc<dyn Detector>,
}

impl AppState {
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let storage = storage::create_storage(&config.storage).context("初始化本地存储失败")?;
        let client = DetectorClient::from_config(&config.api).context("初始化检测客户端失败")?;
        tracing::debug!(
            event = "app.init",
            base_url = %client.base_url(),
            storage = ?config.storage.storage_type
        );
        Ok(Self::with_parts(config, storage, Arc::new(client)))
    }

    pub fn with_parts(
        config: Config,
        storage: Arc<dyn storage::Storage>,
        detector: Arc<dyn Detector>,
    ) -> Self {
        Self {
            config,
            storage,
            detector,
        }
    }

    pub fn history(&self) -> HistoryManager {
        HistoryManager::new(self.storage.clone(), &self.config.history)
    }

    pub fn preferences(&self) -> PreferencesManager {
        PreferencesManager::new(self.storage.clone())
    }

    /// 以已保存的偏好创建一次分析会话
    pub async fn session(&self) -> anyhow::Result<AnalyzerSession> {
        let prefs = self.preferences().load().await?;
        Ok(AnalyzerSession::new(
            self.detector.clone(),
            self.history(),
            prefs,
            &self.config,
        ))
    }
}
