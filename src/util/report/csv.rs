//! 批量结果 CSV 导出

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::model::{format_percent, BatchFileResult};
use crate::util::logging::events;

pub const CSV_HEADERS: [&str; 7] = [
    "File Name",
    "File Size (KB)",
    "Classification",
    "AI Probability",
    "Human Probability",
    "Word Count",
    "Timestamp",
];

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn row(item: &BatchFileResult) -> [String; 7] {
    let word_count = match item.result.word_count {
        Some(count) if count > 0 => count.to_string(),
        _ => "N/A".to_string(),
    };
    [
        item.file.clone(),
        format!("{:.2}", item.size as f64 / 1024.0),
        item.result.label.clone(),
        format_percent(item.result.ai_probability),
        format_percent(item.result.human_probability),
        word_count,
        item.timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    ]
}

/// 表头不加引号，数据行每个单元格都加双引号
pub fn batch_results_to_csv(results: &[BatchFileResult]) -> String {
    let mut lines = Vec::with_capacity(results.len() + 1);
    lines.push(CSV_HEADERS.join(","));
    for item in results {
        let cells: Vec<String> = row(item).iter().map(|c| quote(c)).collect();
        lines.push(cells.join(","));
    }
    lines.join("\n")
}

/// 写入 `batch_analysis_<毫秒>.csv`
pub async fn write_batch_csv(results: &[BatchFileResult], dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("创建导出目录失败: {}", dir.display()))?;

    let path = dir.join(format!(
        "batch_analysis_{}.csv",
        Utc::now().timestamp_millis()
    ));
    tokio::fs::write(&path, batch_results_to_csv(results))
        .await
        .with_context(|| format!("写入CSV失败: {}", path.display()))?;

    info!(
        event = events::REPORT_CSV,
        path = %path.display(),
        rows = results.len()
    );
    Ok(path)
}
