use crate::util::config::{LevelConfig, LoggingConfig};
use anyhow::Context;
use std::io;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::daily;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{filter::EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// 按配置初始化日志
///
/// 控制台输出写到 stderr，stdout 只留给命令结果。启用文件日志时按天滚动，
/// 返回的 guard 需持有到进程退出，否则缓冲中的日志会丢失。
pub fn log_init_with_config(
    file_prefix: &str,
    config: &LoggingConfig,
    verbose: bool,
) -> anyhow::Result<Option<WorkerGuard>> {
    let level_filter = if verbose {
        LevelFilter::DEBUG
    } else {
        parse_level(&config.level).unwrap_or(LevelFilter::WARN)
    };
    let filter_expression = build_env_filter_expression(level_filter, config.level_config.as_ref());
    let use_json = config.structured.unwrap_or(false);

    let make_filter = || {
        EnvFilter::try_new(filter_expression.as_str())
            .unwrap_or_else(|_| EnvFilter::new(level_filter_to_str(level_filter)))
    };

    let mut layers: Vec<BoxedLayer> = Vec::new();

    let console: BoxedLayer = if use_json {
        layer()
            .json()
            .with_target(false)
            .with_writer(io::stderr)
            .with_filter(make_filter())
            .boxed()
    } else {
        layer()
            .without_time()
            .with_target(false)
            .with_writer(io::stderr)
            .with_filter(make_filter())
            .boxed()
    };
    layers.push(console);

    let mut guard = None;
    let mut log_dir = None;

    if config.file.enabled {
        let dir = resolve_log_dir(&config.file.directory);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("创建日志目录失败: {}", dir.display()))?;

        let file_appender = daily(&dir, format!("{}.log", file_prefix));
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

        let file_layer: BoxedLayer = if use_json {
            layer()
                .json()
                .with_ansi(false)
                .with_timer(LocalTime::rfc_3339())
                .with_writer(non_blocking)
                .with_filter(make_filter())
                .boxed()
        } else {
            layer()
                .with_ansi(false)
                .with_timer(LocalTime::rfc_3339())
                .with_writer(non_blocking)
                .with_filter(make_filter())
                .boxed()
        };
        layers.push(file_layer);
        guard = Some(file_guard);
        log_dir = Some(dir);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .context("日志系统已初始化")?;

    tracing::debug!(
        event = "log.init",
        level = level_filter_to_str(level_filter),
        file = config.file.enabled,
        structured = use_json
    );

    if let (Some(dir), Some(retention)) = (log_dir, config.file.retention_days) {
        if retention > 0 {
            if let Err(err) = cleanup_old_logs(&dir, file_prefix, retention) {
                tracing::warn!(event = "log.cleanup_failed", error = %err, "清理旧日志失败");
            }
        }
    }

    Ok(guard)
}

/// 相对路径按当前目录解析；在 bin 目录下运行时使用上级目录
fn resolve_log_dir(directory: &str) -> PathBuf {
    let path = Path::new(directory);
    if path.is_absolute() {
        return path.to_path_buf();
    }

    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    if current_dir.file_name() == Some(std::ffi::OsStr::new("bin")) {
        if let Some(parent) = current_dir.parent() {
            return parent.join(path);
        }
    }
    current_dir.join(path)
}

/// 删除超过保留天数的日志文件，仅处理以 `file_prefix` 开头的文件
pub fn cleanup_old_logs(log_dir: &Path, file_prefix: &str, retention_days: u32) -> anyhow::Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let retention = std::time::Duration::from_secs(retention_days as u64 * 24 * 60 * 60);
    let cutoff = std::time::SystemTime::now()
        .checked_sub(retention)
        .unwrap_or(std::time::UNIX_EPOCH);

    let mut deleted_count = 0;

    for entry in std::fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("");
        if !file_name.starts_with(file_prefix) {
            continue;
        }

        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }

        let modified = metadata
            .modified()
            .or_else(|_| metadata.created())
            .unwrap_or_else(|_| std::time::SystemTime::now());

        if modified < cutoff {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    deleted_count += 1;
                    tracing::debug!("已删除过期日志: {}", path.display());
                }
                Err(e) => {
                    tracing::warn!("删除日志文件失败: {} - {}", path.display(), e);
                }
            }
        }
    }

    if deleted_count > 0 {
        tracing::info!(event = "log.cleanup", deleted = deleted_count, "已清理过期日志文件");
    }

    Ok(deleted_count)
}

fn build_env_filter_expression(
    default_level: LevelFilter,
    level_config: Option<&LevelConfig>,
) -> String {
    let mut directives = vec![
        level_filter_to_str(default_level).to_string(),
        // 第三方依赖的连接细节默认不输出
        "hyper=warn".to_string(),
        "reqwest=warn".to_string(),
    ];

    if let Some(cfg) = level_config {
        if let Some(level) = cfg.api.as_deref().and_then(normalize_level_str) {
            directives.push(format!("ai_detector::api={level}"));
        }
        if let Some(level) = cfg.storage.as_deref().and_then(normalize_level_str) {
            directives.push(format!("ai_detector::storage={level}"));
            directives.push(format!("ai_detector::util::history={level}"));
            directives.push(format!("ai_detector::util::preferences={level}"));
        }

        let mut overrides: Vec<_> = cfg.overrides.iter().collect();
        overrides.sort();
        for (target, level_str) in overrides {
            if let Some(level) = normalize_level_str(level_str) {
                directives.push(format!("{}={level}", normalize_directive_target(target)));
            }
        }
    }

    directives.join(",")
}

fn parse_level(level: &str) -> Option<LevelFilter> {
    match normalize_level_str(level)? {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" => Some(LevelFilter::WARN),
        _ => Some(LevelFilter::ERROR),
    }
}

fn normalize_level_str(level: &str) -> Option<&'static str> {
    match level.to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

fn level_filter_to_str(level: LevelFilter) -> &'static str {
    match level {
        LevelFilter::OFF => "off",
        LevelFilter::ERROR => "error",
        LevelFilter::WARN => "warn",
        LevelFilter::INFO => "info",
        LevelFilter::DEBUG => "debug",
        LevelFilter::TRACE => "trace",
    }
}

fn normalize_directive_target(target: &str) -> String {
    if let Some(raw) = target.strip_prefix("target:") {
        raw.to_string()
    } else if target.contains("::") {
        target.to_string()
    } else {
        let path = target.replace('.', "::");
        format!("ai_detector::{path}")
    }
}
