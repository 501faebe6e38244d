//! 配置加载和管理模块
//! 处理配置文件的读取、写入与环境变量覆盖

use super::types::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从YAML文件读取配置
    pub fn read_yaml(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let config = serde_yaml::from_str(&config_str)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        Ok(config)
    }

    /// 从环境变量读取配置覆盖
    pub fn apply_env_overrides(config: Config) -> Config {
        Self::apply_overrides_from(config, |key| std::env::var(key).ok())
    }

    /// 按给定的取值函数应用覆盖，便于测试注入
    pub fn apply_overrides_from<F>(mut config: Config, lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = lookup("DETECTOR_API_URL") {
            tracing::info!(event = "config.env_override", key = "DETECTOR_API_URL", value = %url);
            config.api.base_url = url;
        }

        if let Some(mode) = lookup("DETECTOR_MODE") {
            match mode.parse() {
                Ok(parsed) => {
                    config.detection.default_mode = parsed;
                    tracing::info!(event = "config.env_override", key = "DETECTOR_MODE", value = %mode);
                }
                Err(err) => tracing::warn!(
                    event = "config.env_override_invalid",
                    key = "DETECTOR_MODE",
                    error = %err,
                    "环境变量无效，保留配置文件中的值"
                ),
            }
        }

        if let Some(dir) = lookup("DETECTOR_DATA_DIR") {
            tracing::info!(event = "config.env_override", key = "DETECTOR_DATA_DIR", value = %dir);
            config.storage.directory = PathBuf::from(dir);
        }

        if let Some(level) = lookup("DETECTOR_LOG_LEVEL") {
            config.logging.level = level.to_ascii_lowercase();
        }

        // 代理：配置文件优先，环境变量仅补空缺
        if config.api.http_proxy.is_none() {
            config.api.http_proxy = lookup("HTTP_PROXY").or_else(|| lookup("http_proxy"));
        }
        if config.api.https_proxy.is_none() {
            config.api.https_proxy = lookup("HTTPS_PROXY").or_else(|| lookup("https_proxy"));
        }

        config
    }

    /// 配置文件 + 环境变量
    pub fn load_with_env_overrides(path: impl AsRef<Path>) -> Result<Config> {
        let base_config = Self::read_yaml(path)?;
        Ok(Self::apply_env_overrides(base_config))
    }

    /// 生成配置模板
    pub fn generate_template() -> Config {
        Config::default()
    }
}

/// 配置写入器
pub struct ConfigWriter;

impl ConfigWriter {
    /// 写入配置到指定路径，确保目录存在
    pub fn write_yaml_with_dir(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("创建配置目录失败: {}", parent.display()))?;
        }

        let yaml_content = serde_yaml::to_string(config)?;
        fs::write(path, yaml_content)
            .with_context(|| format!("写入配置文件失败: {}", path.display()))?;
        Ok(())
    }

    /// 生成配置示例文件
    pub fn generate_example_config(path: &Path) -> Result<()> {
        Self::write_yaml_with_dir(&ConfigLoader::generate_template(), path)
    }
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::read_yaml(path)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        ConfigWriter::write_yaml_with_dir(self, path.as_ref())
    }
}
