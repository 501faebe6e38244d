use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use super::local::LocalStorage;
use super::memory::MemoryStorage;
use super::traits::Storage;

/// 存储类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    #[default]
    Local,
    Memory,
}

/// 存储配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(rename = "type")]
    pub storage_type: StorageType,

    /// 本地数据目录
    pub directory: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::Local,
            directory: PathBuf::from("./data"),
        }
    }
}

/// 创建存储实例
pub fn create_storage(config: &StorageConfig) -> Result<Arc<dyn Storage>> {
    match config.storage_type {
        StorageType::Local => {
            let storage = LocalStorage::new(&config.directory)?;
            tracing::info!(
                event = "storage.init",
                backend = "local",
                path = %config.directory.display(),
                "本地存储已初始化"
            );
            Ok(Arc::new(storage))
        }
        StorageType::Memory => {
            tracing::info!(event = "storage.init", backend = "memory", "内存存储已初始化");
            Ok(Arc::new(MemoryStorage::new()))
        }
    }
}
