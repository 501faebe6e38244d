//! HTML报告生成
//!
//! 章节顺序固定：标题与生成时间、文档信息（仅文件模式）、分析结果、置信度、
//! 分析文本、说明、页脚。

use build_html::{Html, HtmlContainer, HtmlPage, Table};
use tracing::debug;

use super::{AnalysisReport, DISCLAIMER_LINES, REPORT_FOOTER, REPORT_TITLE};
use crate::util::logging::events;

pub struct HtmlReportGenerator;

impl HtmlReportGenerator {
    pub fn generate(report: &AnalysisReport<'_>) -> String {
        let result = report.result;
        let mut html = HtmlPage::new()
            .with_title(REPORT_TITLE)
            .with_meta(vec![("charset", "utf-8")])
            .with_style(super::styles::get_report_css());

        html.add_raw(format!("<h1 class=\"report-title\">{}</h1>", REPORT_TITLE));
        html.add_raw(format!(
            "<div class=\"generated\">Generated: {}</div>",
            report.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));

        if let Some(name) = report.document_name() {
            html.add_raw("<div class=\"section\">");
            html.add_raw("<h2>Document Information</h2>");
            html.add_table(Table::from([
                ["File".to_string(), escape_html(name)],
                [
                    "Type".to_string(),
                    escape_html(result.file_type.as_deref().unwrap_or("N/A")),
                ],
                [
                    "Word Count".to_string(),
                    result
                        .word_count
                        .map(format_thousands)
                        .unwrap_or_else(|| "N/A".to_string()),
                ],
            ]));
            html.add_raw("</div>");
        }

        let class_suffix = if result.is_ai { "ai" } else { "human" };
        html.add_raw("<div class=\"section\">");
        html.add_raw("<h2>Analysis Results</h2>");
        html.add_raw(format!(
            "<p class=\"classification-{}\">Classification: {}</p>",
            class_suffix,
            result.classification()
        ));
        html.add_raw(format!(
            "<p class=\"probability-ai\">AI-Generated Probability: {}</p>",
            result.ai_percent()
        ));
        html.add_raw(format!(
            "<p class=\"probability-human\">Human-Written Probability: {}</p>",
            result.human_percent()
        ));
        html.add_raw(format!(
            "<p class=\"confidence\">Confidence Level: {}</p>",
            result.confidence_tier().as_str()
        ));
        html.add_raw("</div>");

        html.add_raw("<div class=\"section\">");
        html.add_raw("<h2>Analyzed Text</h2>");
        html.add_raw(format!(
            "<div class=\"analyzed-text\">{}</div>",
            Self::analyzed_text_html(report)
        ));
        html.add_raw("</div>");

        html.add_raw("<div class=\"section notes\">");
        html.add_raw("<h2>Analysis Notes</h2>");
        for line in DISCLAIMER_LINES {
            html.add_raw(format!("<p>{}</p>", line));
        }
        html.add_raw("</div>");

        html.add_raw(format!("<div class=\"footer\">{}</div>", REPORT_FOOTER));

        debug!(
            target: "report.html",
            event = events::REPORT_HTML,
            input = report.input_kind.as_str(),
            highlighted = report.highlighted.is_some_and(|h| h.is_active())
        );

        html.to_html_string()
    }

    /// 文本未被截断且有标注时输出带高亮的片段，否则输出转义后的截断文本
    fn analyzed_text_html(report: &AnalysisReport<'_>) -> String {
        let text = report.analyzed_text();
        match report.highlighted {
            Some(highlighted)
                if highlighted.is_active()
                    && text.chars().count() <= report.text_limit
                    && highlighted.text() == text =>
            {
                highlighted.to_html()
            }
            _ => escape_html(&report.truncated_text()),
        }
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// 千分位分组，例如 `12345` -> `12,345`
fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
