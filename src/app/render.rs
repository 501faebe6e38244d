//! 终端输出格式化
//!
//! 只负责把数据拼成文本，打印由调用方完成。

use highlight_engine::HighlightedText;
use serde_json::Value;

use crate::api::ServiceHealth;
use crate::model::{
    format_percent, AnalysisResult, BatchProgress, BatchRunResult, BatchStatus, BatchValidation,
    HistoryItem, HistoryStats,
};
use crate::util::config::ValidationReport;

const GAUGE_WIDTH: usize = 30;
const SNIPPET_PREVIEW: usize = 60;

/// 概率条，例如 `[#########---------------------]  30.0%`
pub fn gauge(probability: f64) -> String {
    let filled = ((probability.clamp(0.0, 1.0) * GAUGE_WIDTH as f64).round()) as usize;
    format!(
        "[{}{}] {:>6}",
        "#".repeat(filled),
        "-".repeat(GAUGE_WIDTH - filled),
        format_percent(probability)
    )
}

pub fn analysis_result(result: &AnalysisResult) -> String {
    let mut lines = vec![
        format!("Classification:   {} ({})", result.classification(), result.label),
        format!("AI-Generated:     {}", gauge(result.ai_probability)),
        format!("Human-Written:    {}", gauge(result.human_probability)),
        format!("Confidence Level: {}", result.confidence_tier().as_str()),
    ];

    if let Some(name) = &result.filename {
        lines.push(format!(
            "File:             {} ({})",
            name,
            result.file_type.as_deref().unwrap_or("unknown")
        ));
    }
    if let Some(words) = result.word_count {
        lines.push(format!("Word Count:       {}", words));
    }
    if let Some(model) = &result.model_name {
        lines.push(format!("Model:            {}", model));
    }
    if let Some(mode) = &result.mode {
        lines.push(format!("Mode:             {}", mode));
    }
    if let Some(Value::Object(breakdown)) = &result.breakdown {
        lines.push("Breakdown:".to_string());
        for (model, value) in breakdown {
            let shown = match value.as_f64() {
                Some(p) => format_percent(p),
                None => value.to_string(),
            };
            lines.push(format!("  {:<16} {}", model, shown));
        }
    }
    block(lines)
}

/// 可疑句子列表
pub fn highlight_listing(highlighted: &HighlightedText) -> String {
    let Some(threshold) = highlighted.threshold else {
        return block(vec![format!(
            "No sentence highlighting (AI probability {} is below 30.0%).",
            format_percent(highlighted.ai_probability)
        )]);
    };

    let mut lines = vec![format!(
        "Suspect sentences: {} of {} (threshold {:.1}, profile {})",
        highlighted.suspect_count(),
        highlighted.segments.len(),
        threshold,
        highlighted.profile
    )];
    lines.extend(
        highlighted
            .suspects()
            .map(|segment| format!("  [{:>4.1}] {}", segment.score, segment.text.trim())),
    );
    block(lines)
}

pub fn history_table(items: &[HistoryItem]) -> String {
    if items.is_empty() {
        return "No analysis history.\n".to_string();
    }

    let mut lines = vec![format!(
        "{:<24} {:<19} {:<5} {:<7} {:>7}  {}",
        "ID", "Time", "Type", "Label", "AI", "Source"
    )];
    for item in items {
        let source = item
            .file_name
            .clone()
            .or_else(|| item.text.as_deref().map(preview))
            .unwrap_or_default();
        lines.push(format!(
            "{:<24} {:<19} {:<5} {:<7} {:>7}  {}",
            item.id,
            local_time(item),
            item.kind.as_str(),
            item.result.label,
            format_percent(item.result.ai_probability),
            source
        ));
    }
    block(lines)
}

pub fn history_item(item: &HistoryItem) -> String {
    let mut lines = vec![
        format!("ID:        {}", item.id),
        format!("Time:      {}", local_time(item)),
        format!("Type:      {}", item.kind),
    ];
    if let Some(name) = &item.file_name {
        lines.push(format!("File:      {}", name));
    }
    lines.push(format!("Label:     {}", item.result.label));
    lines.push(format!("AI:        {}", gauge(item.result.ai_probability)));
    lines.push(format!("Human:     {}", gauge(item.result.human_probability)));
    if let Some(words) = item.result.word_count {
        lines.push(format!("Words:     {}", words));
    }
    if let Some(text) = &item.text {
        lines.push(String::new());
        lines.push(text.clone());
    }
    block(lines)
}

pub fn history_stats(stats: &HistoryStats) -> String {
    block(vec![
        format!("Total analyses:     {}", stats.total_analyses),
        format!(
            "AI detected:        {} ({:.1}%)",
            stats.ai_detected, stats.ai_percentage
        ),
        format!(
            "Human detected:     {} ({:.1}%)",
            stats.human_detected, stats.human_percentage
        ),
        format!("Text analyses:      {}", stats.text_analyses),
        format!("File analyses:      {}", stats.file_analyses),
        format!(
            "Avg AI probability: {}",
            format_percent(stats.avg_ai_probability)
        ),
    ])
}

pub fn batch_validation(validation: &BatchValidation) -> String {
    let mut lines: Vec<String> = validation
        .invalid_files
        .iter()
        .map(|invalid| format!("  skipped {}: {}", invalid.file, invalid.reason))
        .collect();
    lines.push(format!(
        "{} file(s) accepted, {} rejected",
        validation.total_valid(),
        validation.total_invalid()
    ));
    block(lines)
}

pub fn batch_progress(progress: &BatchProgress) -> String {
    let status = match progress.status {
        BatchStatus::Processing => "processing",
        BatchStatus::Completed => "completed",
        BatchStatus::Error => "error",
    };
    format!(
        "[{}/{}] {:<10} {} (ok {}, failed {})",
        progress.current,
        progress.total,
        status,
        progress.file_name,
        progress.processed,
        progress.errors
    )
}

pub fn batch_summary(summary: &BatchRunResult) -> String {
    let mut lines = vec![format!(
        "Processed {} file(s): {} successful, {} failed",
        summary.total, summary.successful, summary.failed
    )];
    lines.extend(summary.results.iter().map(|item| {
        format!(
            "  {:<32} {:<7} AI {:>7}  Human {:>7}",
            item.file,
            item.result.label,
            format_percent(item.result.ai_probability),
            format_percent(item.result.human_probability)
        )
    }));
    lines.extend(
        summary
            .errors
            .iter()
            .map(|error| format!("  {:<32} ERROR   {}", error.file, error.error)),
    );
    block(lines)
}

pub fn service_health(health: &ServiceHealth, storage_ok: bool) -> String {
    let mut lines = vec![format!("Status:    {}", health.status)];
    if let Some(count) = health.ml_models {
        lines.push(format!("ML models: {}", count));
    }
    if let Some(loaded) = health.dl_model {
        lines.push(format!(
            "DL model:  {}",
            if loaded { "loaded" } else { "not loaded" }
        ));
    }
    lines.push(format!(
        "Storage:   {}",
        if storage_ok { "ok" } else { "unavailable" }
    ));
    block(lines)
}

pub fn validation_report(report: &ValidationReport) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.extend(report.errors.iter().map(|issue| format!("error:   {}", issue)));
    lines.extend(report.warnings.iter().map(|issue| format!("warning: {}", issue)));
    lines.extend(report.info.iter().map(|issue| format!("info:    {}", issue)));
    lines.push(
        if report.is_valid() {
            "Configuration OK"
        } else {
            "Configuration has errors"
        }
        .to_string(),
    );
    block(lines)
}

/// 每行以换行结尾
fn block(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn local_time(item: &HistoryItem) -> impl std::fmt::Display {
    item.timestamp
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M:%S")
}

fn preview(text: &str) -> String {
    let single_line: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    crate::util::report::truncate_text(&single_line, SNIPPET_PREVIEW)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::analysis::fixtures;
    use highlight_engine::{highlight, HeuristicProfile};

    #[test]
    fn test_gauge() {
        assert_eq!(gauge(0.0), format!("[{}]   0.0%", "-".repeat(30)));
        assert_eq!(gauge(1.0), format!("[{}] 100.0%", "#".repeat(30)));
        assert!(gauge(0.5).starts_with(&format!("[{}{}]", "#".repeat(15), "-".repeat(15))));
    }

    #[test]
    fn test_analysis_result_lines() {
        let mut result = fixtures::result(0.91);
        result.breakdown = Some(serde_json::json!({ "knn": 0.88, "note": "n/a" }));
        let text = analysis_result(&result);
        assert!(text.contains("AI-Generated Content (AI)"));
        assert!(text.contains("91.0%"));
        assert!(text.contains("Confidence Level: High"));
        assert!(text.contains("knn              88.0%"));
        assert!(text.contains("\"n/a\""));
    }

    #[test]
    fn test_highlight_listing() {
        let inactive = highlight("Moreover, this is it.", 0.1, HeuristicProfile::Standard);
        assert!(highlight_listing(&inactive).starts_with("No sentence highlighting"));

        let active = highlight(
            "Moreover, this matters. We ate.",
            0.9,
            HeuristicProfile::Standard,
        );
        let listing = highlight_listing(&active);
        assert!(listing.contains("Suspect sentences: 1 of 2"));
        assert!(listing.contains("Moreover, this matters."));
    }

    #[test]
    fn test_history_table_and_health() {
        assert_eq!(history_table(&[]), "No analysis history.\n");

        let health = ServiceHealth {
            status: "healthy".to_string(),
            ml_models: Some(3),
            dl_model: Some(true),
            extra: Default::default(),
        };
        let text = service_health(&health, false);
        assert!(text.contains("ML models: 3"));
        assert!(text.contains("DL model:  loaded"));
        assert!(text.ends_with("Storage:   unavailable\n"));
    }

    #[test]
    fn test_preview_collapses_whitespace() {
        assert_eq!(preview("a\n b\t c"), "a b c");
        assert!(preview(&"word ".repeat(40)).ends_with("..."));
    }
}
