//! 报告导出模块
//!
//! - 单次分析报告：HTML (html.rs)，经 wkhtmltopdf 转为 PDF (pdf.rs)
//! - 批量结果：CSV (csv.rs)
//! - 报告样式 (styles.rs)

pub mod csv;
pub mod html;
pub mod pdf;
pub mod styles;

pub use self::csv::{batch_results_to_csv, write_batch_csv};
pub use html::HtmlReportGenerator;
pub use pdf::PdfGenerator;

use chrono::{DateTime, Local};
use highlight_engine::HighlightedText;

use crate::model::{AnalysisResult, InputKind};

/// 报告中分析文本的默认截断长度（字符）
pub const DEFAULT_TEXT_LIMIT: usize = 2000;

pub const REPORT_TITLE: &str = "AI Content Detector - Analysis Report";
pub const REPORT_FOOTER: &str = "AI Content Detector - Professional Analysis Tool";
pub const DISCLAIMER_LINES: [&str; 2] = [
    "This analysis is based on linguistic patterns, predictability, and structural indicators.",
    "Results should be used as a guide and not as definitive proof.",
];

/// 单次分析报告的输入
#[derive(Debug, Clone)]
pub struct AnalysisReport<'a> {
    pub result: &'a AnalysisResult,
    pub input_kind: InputKind,
    /// 文本模式下用户输入的原文
    pub input_text: &'a str,
    pub highlighted: Option<&'a HighlightedText>,
    pub generated_at: DateTime<Local>,
    pub text_limit: usize,
}

impl<'a> AnalysisReport<'a> {
    pub fn new(result: &'a AnalysisResult, input_kind: InputKind, input_text: &'a str) -> Self {
        Self {
            result,
            input_kind,
            input_text,
            highlighted: None,
            generated_at: Local::now(),
            text_limit: DEFAULT_TEXT_LIMIT,
        }
    }

    pub fn with_highlight(mut self, highlighted: Option<&'a HighlightedText>) -> Self {
        self.highlighted = highlighted;
        self
    }

    pub fn with_text_limit(mut self, limit: usize) -> Self {
        self.text_limit = limit;
        self
    }

    pub fn with_generated_at(mut self, generated_at: DateTime<Local>) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// 文件模式且服务端返回了文件名
    pub fn document_name(&self) -> Option<&str> {
        match self.input_kind {
            InputKind::File => self.result.filename.as_deref().filter(|n| !n.is_empty()),
            InputKind::Text => None,
        }
    }

    /// 文件模式优先使用服务端提取的文本
    pub fn analyzed_text(&self) -> &str {
        match (self.input_kind, self.result.extracted_text.as_deref()) {
            (InputKind::File, Some(extracted)) => extracted,
            _ => self.input_text,
        }
    }

    pub fn truncated_text(&self) -> String {
        truncate_text(self.analyzed_text(), self.text_limit)
    }

    pub fn pdf_file_name(&self) -> String {
        report_file_name(self.document_name(), self.generated_at, "pdf")
    }

    pub fn html_file_name(&self) -> String {
        report_file_name(self.document_name(), self.generated_at, "html")
    }
}

/// 按字符截断，超出部分以 `...` 结尾
pub fn truncate_text(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// `<文件名第一段>_analysis.<ext>`，无文件名时 `ai_analysis_<毫秒>.<ext>`
pub fn report_file_name(document: Option<&str>, at: DateTime<Local>, ext: &str) -> String {
    match document.and_then(|name| name.split('.').next()).filter(|s| !s.is_empty()) {
        Some(stem) => format!("{stem}_analysis.{ext}"),
        None => format!("ai_analysis_{}.{ext}", at.timestamp_millis()),
    }
}
