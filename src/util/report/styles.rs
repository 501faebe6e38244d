//! 报告 CSS 样式

/// 单次分析报告样式（按 A4 打印排版）
pub fn get_report_css() -> &'static str {
    r#"
        body {
            font-family: Helvetica, Arial, sans-serif;
            margin: 0;
            padding: 20px;
            line-height: 1.6;
            color: #333;
            background-color: #fff;
        }
        .report-title {
            color: #5a63ff;
            font-size: 1.8em;
            font-weight: bold;
            margin-bottom: 4px;
            page-break-after: avoid;
        }
        .generated {
            color: #646464;
            font-size: 0.9em;
            border-bottom: 1px solid #c8c8c8;
            padding-bottom: 12px;
            margin-bottom: 24px;
        }
        .section {
            margin: 24px 0;
            break-inside: avoid;
        }
        .section h2 {
            color: #2c3e50;
            font-size: 1.3em;
            margin: 0 0 10px 0;
        }
        table {
            border-collapse: collapse;
            width: 100%;
            margin: 10px 0;
        }
        th, td {
            padding: 8px 12px;
            border: 1px solid #ddd;
            text-align: left;
            vertical-align: top;
        }
        .classification-ai { color: #e45c5c; font-weight: bold; }
        .classification-human { color: #3ccb7f; font-weight: bold; }
        .probability-ai { color: #e45c5c; }
        .probability-human { color: #3ccb7f; }
        .confidence { font-weight: bold; }
        .analyzed-text {
            white-space: pre-wrap;
            word-wrap: break-word;
            font-size: 0.9em;
            background: #fafafa;
            border: 1px solid #e0e0e0;
            padding: 12px;
        }
        .ai-sentence-highlight {
            background-color: rgba(228, 92, 92, 0.2);
            border-bottom: 2px solid #e45c5c;
        }
        .notes p {
            font-size: 0.9em;
            margin: 4px 0;
        }
        .footer {
            margin-top: 40px;
            text-align: center;
            font-size: 0.75em;
            color: #969696;
        }
        @media print {
            body { padding: 0; }
            .section { page-break-inside: avoid; }
        }
    "#
}
