//! 配置验证模块
//! 提供配置的验证、检查和诊断功能

use super::types::*;
use url::Url;

/// 合法的日志级别
const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// 配置验证器
pub struct ConfigValidator;

impl ConfigValidator {
    /// 全面验证配置
    pub fn validate_all(config: &Config) -> ValidationReport {
        let mut report = ValidationReport::new();

        Self::validate_api_config(&config.api, &mut report);
        Self::validate_limits(config, &mut report);
        Self::validate_storage_config(&config.storage, &mut report);
        Self::validate_report_config(&config.report, &mut report);
        Self::validate_logging_config(&config.logging, &mut report);

        report
    }

    fn validate_api_config(api: &ApiConfig, report: &mut ValidationReport) {
        match Url::parse(api.normalized_base_url()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                if url.scheme() == "http" && url.host_str().is_some_and(|h| !is_local_host(h)) {
                    report.add_warning("api.base_url", "远端服务使用明文 HTTP 连接");
                }
            }
            Ok(url) => report.add_error(
                "api.base_url",
                &format!("不支持的URL协议: {}", url.scheme()),
            ),
            Err(err) => report.add_error(
                "api.base_url",
                &format!("无效的服务地址 {}: {}", api.base_url, err),
            ),
        }

        if api.timeout_secs == 0 {
            report.add_error("api.timeout_secs", "请求超时必须大于0");
        }
        if api.connect_timeout_secs > api.timeout_secs {
            report.add_warning("api.connect_timeout_secs", "连接超时大于请求总超时");
        }

        for (field, proxy) in [
            ("api.http_proxy", &api.http_proxy),
            ("api.https_proxy", &api.https_proxy),
        ] {
            if let Some(proxy) = proxy {
                if Url::parse(proxy).is_err() {
                    report.add_error(field, &format!("无效的代理地址: {}", proxy));
                }
            }
        }
    }

    fn validate_limits(config: &Config, report: &mut ValidationReport) {
        if config.upload.max_file_size_mb == 0 {
            report.add_error("upload.max_file_size_mb", "文件大小上限必须大于0");
        }
        if config.upload.allowed_extensions.is_empty() && config.upload.allowed_mime_types.is_empty()
        {
            report.add_error("upload.allowed_extensions", "未配置任何允许的文件类型");
        }
        if config.batch.max_files == 0 {
            report.add_error("batch.max_files", "批处理文件数上限必须大于0");
        }
        if config.batch.delay_ms == 0 {
            report.add_info("batch.delay_ms", "批处理请求之间不等待");
        }
        if config.history.max_items == 0 {
            report.add_warning("history.max_items", "历史记录上限为0，分析结果不会被保存");
        }
        if config.report.text_limit == 0 {
            report.add_error("report.text_limit", "报告文本长度上限必须大于0");
        }
    }

    fn validate_storage_config(storage: &StorageConfig, report: &mut ValidationReport) {
        match storage.storage_type {
            StorageType::Memory => {
                report.add_warning("storage.type", "使用内存存储，历史与偏好不会持久化")
            }
            StorageType::Local => {
                if !storage.directory.exists() {
                    report.add_info("storage.directory", "数据目录不存在，将自动创建");
                }
            }
        }
    }

    fn validate_report_config(config: &ReportConfig, report: &mut ValidationReport) {
        if config.wkhtmltopdf_path.trim().is_empty() {
            report.add_error("report.wkhtmltopdf_path", "PDF转换工具路径不能为空");
        }
        if config.timeout_secs == 0 {
            report.add_error("report.timeout_secs", "PDF转换超时必须大于0");
        }
    }

    fn validate_logging_config(config: &LoggingConfig, report: &mut ValidationReport) {
        if !VALID_LEVELS.contains(&config.level.as_str()) {
            report.add_error("logging.level", &format!("无效的日志级别: {}", config.level));
        }

        if config.file.enabled && config.file.retention_days == Some(0) {
            report.add_warning("logging.file.retention_days", "日志保留天数为0，日志将不会被清理");
        }

        if let Some(levels) = &config.level_config {
            let named = [("api", &levels.api), ("storage", &levels.storage)];
            for (name, level) in named {
                if let Some(level) = level {
                    if !VALID_LEVELS.contains(&level.as_str()) {
                        report.add_warning(
                            &format!("logging.level_config.{name}"),
                            &format!("无效的日志级别: {}", level),
                        );
                    }
                }
            }
        }
    }
}

fn is_local_host(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "::1" | "[::1]" | "0.0.0.0")
}

/// 验证报告
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub info: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationIssue::new(field, message));
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue::new(field, message));
    }

    pub fn add_info(&mut self, field: &str, message: &str) {
        self.info.push(ValidationIssue::new(field, message));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// 将警告写入日志
    pub fn log_warnings(&self) {
        for issue in &self.warnings {
            tracing::warn!(event = "config.validation_warning", field = %issue.field, "{}", issue.message);
        }
    }
}

/// 验证问题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
