//! 配置结构定义模块
//! 包含客户端配置的所有数据结构

use highlight_engine::HeuristicProfile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::model::DetectionMode;
pub use crate::storage::{StorageConfig, StorageType};

/// 主配置结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 远端检测服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 请求总超时（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub http_proxy: Option<String>,
    #[serde(default)]
    pub https_proxy: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: None,
            http_proxy: None,
            https_proxy: None,
        }
    }
}

impl ApiConfig {
    /// 去掉末尾斜杠后的服务地址
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// 检测相关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(default)]
    pub default_mode: DetectionMode,
    #[serde(default)]
    pub heuristic_profile: HeuristicProfile,
    /// 文本检测的最少词数，0 表示不限制
    #[serde(default = "default_min_words")]
    pub min_words: usize,
}

fn default_min_words() -> usize {
    100
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            default_mode: DetectionMode::default(),
            heuristic_profile: HeuristicProfile::default(),
            min_words: default_min_words(),
        }
    }
}

/// 上传校验配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
    /// 允许的扩展名（不含点号，小写）
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    /// 允许的 MIME 类型
    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,
}

fn default_max_file_size_mb() -> u64 {
    10
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["pdf".to_string(), "docx".to_string(), "doc".to_string()]
}

fn default_allowed_mime_types() -> Vec<String> {
    vec![
        "application/pdf".to_string(),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document".to_string(),
        "application/msword".to_string(),
    ]
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: default_max_file_size_mb(),
            allowed_extensions: default_allowed_extensions(),
            allowed_mime_types: default_allowed_mime_types(),
        }
    }
}

impl UploadConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

/// 批处理配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// 相邻请求间隔（毫秒）
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_max_files() -> usize {
    20
}

fn default_delay_ms() -> u64 {
    500
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            delay_ms: default_delay_ms(),
        }
    }
}

/// 历史记录配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    /// 文本分析保存的片段长度（字符）
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
}

fn default_max_items() -> usize {
    100
}

fn default_snippet_chars() -> usize {
    500
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
            snippet_chars: default_snippet_chars(),
        }
    }
}

/// 报告导出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// 报告中分析文本的最大字符数
    #[serde(default = "default_text_limit")]
    pub text_limit: usize,
    #[serde(default = "default_wkhtmltopdf_path")]
    pub wkhtmltopdf_path: String,
    #[serde(default = "default_report_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./reports")
}

fn default_text_limit() -> usize {
    2000
}

fn default_wkhtmltopdf_path() -> String {
    "wkhtmltopdf".to_string()
}

fn default_report_timeout_secs() -> u64 {
    60
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            text_limit: default_text_limit(),
            wkhtmltopdf_path: default_wkhtmltopdf_path(),
            timeout_secs: default_report_timeout_secs(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: LogFileConfig,
    /// 是否启用结构化（JSON）日志
    #[serde(default)]
    pub structured: Option<bool>,
    #[serde(default)]
    pub level_config: Option<LevelConfig>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: LogFileConfig::default(),
            structured: Some(false),
            level_config: None,
        }
    }
}

/// 日志文件配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogFileConfig {
    pub enabled: bool,
    pub directory: String,
    pub retention_days: Option<u32>,
}

impl Default for LogFileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: "logs".to_string(),
            retention_days: Some(7),
        }
    }
}

/// 按模块细分的日志级别
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelConfig {
    /// 远端调用（`ai_detector::api`）
    #[serde(default)]
    pub api: Option<String>,
    /// 存储与历史（`ai_detector::storage`、`ai_detector::util::history`）
    #[serde(default)]
    pub storage: Option<String>,
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}
