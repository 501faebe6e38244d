//! 分析历史数据模型
//!
//! 字段命名与导出的 JSON 文件保持一致（`type`、`fileName` 等），便于导入导出互通。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::analysis::{AnalysisResult, InputKind};

/// 历史记录中保存的结果摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResult {
    pub label: String,
    pub is_ai: bool,
    pub ai_probability: f64,
    pub human_probability: f64,
    #[serde(default)]
    pub word_count: Option<u64>,
}

impl From<&AnalysisResult> for HistoryResult {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            label: result.label.clone(),
            is_ai: result.is_ai,
            ai_probability: result.ai_probability,
            human_probability: result.human_probability,
            word_count: result.word_count,
        }
    }
}

/// 单条历史记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: InputKind,
    #[serde(rename = "fileName", default)]
    pub file_name: Option<String>,
    /// 文本分析时保存的开头片段
    #[serde(default)]
    pub text: Option<String>,
    pub result: HistoryResult,
}

/// 写入历史所需的信息
#[derive(Debug, Clone)]
pub struct NewAnalysis<'a> {
    pub kind: InputKind,
    pub file_name: Option<&'a str>,
    pub text: Option<&'a str>,
    pub result: &'a AnalysisResult,
}

/// 按分类过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Ai,
    Human,
}

impl FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ai" => Ok(Classification::Ai),
            "human" => Ok(Classification::Human),
            other => Err(format!("unknown classification: {other}")),
        }
    }
}

/// 历史过滤条件，各条件取交集
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub kind: Option<InputKind>,
    pub classification: Option<Classification>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub min_probability: Option<f64>,
}

impl HistoryFilter {
    pub fn matches(&self, item: &HistoryItem) -> bool {
        if let Some(kind) = self.kind {
            if item.kind != kind {
                return false;
            }
        }
        if let Some(classification) = self.classification {
            if item.result.is_ai != (classification == Classification::Ai) {
                return false;
            }
        }
        if let Some(from) = self.date_from {
            if item.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if item.timestamp > to {
                return false;
            }
        }
        if let Some(min) = self.min_probability {
            if item.result.ai_probability < min {
                return false;
            }
        }
        true
    }
}

/// 历史统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_analyses: usize,
    pub ai_detected: usize,
    pub human_detected: usize,
    pub text_analyses: usize,
    pub file_analyses: usize,
    pub avg_ai_probability: f64,
    pub ai_percentage: f64,
    pub human_percentage: f64,
}

impl HistoryStats {
    pub fn from_items(items: &[HistoryItem]) -> Self {
        let total = items.len();
        if total == 0 {
            return Self::default();
        }

        let ai_detected = items.iter().filter(|i| i.result.is_ai).count();
        let text_analyses = items.iter().filter(|i| i.kind == InputKind::Text).count();
        let sum: f64 = items.iter().map(|i| i.result.ai_probability).sum();

        Self {
            total_analyses: total,
            ai_detected,
            human_detected: total - ai_detected,
            text_analyses,
            file_analyses: total - text_analyses,
            avg_ai_probability: sum / total as f64,
            ai_percentage: ai_detected as f64 / total as f64 * 100.0,
            human_percentage: (total - ai_detected) as f64 / total as f64 * 100.0,
        }
    }
}

/// 导入结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub imported: usize,
    pub total_after_merge: usize,
}
