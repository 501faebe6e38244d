//! 检测结果数据模型
//!
//! `AnalysisResult` 由远端服务生成，客户端只做透传与展示，不校验也不归一化概率。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// 检测模式，决定文本请求命中的端点
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
    /// `/predict`，服务端默认模型
    #[default]
    Default,
    /// `/predict-ml`，传统机器学习集成
    Ml,
    /// `/predict-hybrid`，机器学习 + RoBERTa
    Hybrid,
}

impl DetectionMode {
    pub fn text_endpoint(&self) -> &'static str {
        match self {
            DetectionMode::Default => "/predict",
            DetectionMode::Ml => "/predict-ml",
            DetectionMode::Hybrid => "/predict-hybrid",
        }
    }

    /// 文件上传时附带的 `mode` 表单值；默认模式不附带
    pub fn file_form_value(&self) -> Option<&'static str> {
        match self {
            DetectionMode::Default => None,
            DetectionMode::Ml => Some("ml"),
            DetectionMode::Hybrid => Some("hybrid"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMode::Default => "default",
            DetectionMode::Ml => "ml",
            DetectionMode::Hybrid => "hybrid",
        }
    }
}

impl FromStr for DetectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "" => Ok(DetectionMode::Default),
            "ml" | "ml_only" => Ok(DetectionMode::Ml),
            "hybrid" => Ok(DetectionMode::Hybrid),
            other => Err(format!("unknown detection mode: {other}")),
        }
    }
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 输入方式：粘贴文本或上传文档
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    File,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::File => "file",
        }
    }
}

impl FromStr for InputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(InputKind::Text),
            "file" => Ok(InputKind::File),
            other => Err(format!("unknown input type: {other}")),
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 远端检测结果（原样保留服务端返回的全部字段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub label: String,
    pub is_ai: bool,
    pub ai_probability: f64,
    pub human_probability: f64,
    /// 各子模型的概率明细，结构由服务端决定
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_length: Option<u64>,
    /// 未建模的其余字段
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 报告中的置信度档位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "High",
            ConfidenceTier::Medium => "Medium",
            ConfidenceTier::Low => "Low",
        }
    }
}

impl AnalysisResult {
    pub fn classification(&self) -> &'static str {
        if self.is_ai {
            "AI-Generated Content"
        } else {
            "Human-Written Content"
        }
    }

    /// 任一概率 > 0.7 为 High，> 0.5 为 Medium，否则 Low
    pub fn confidence_tier(&self) -> ConfidenceTier {
        if self.ai_probability > 0.7 || self.human_probability > 0.7 {
            ConfidenceTier::High
        } else if self.ai_probability > 0.5 || self.human_probability > 0.5 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn ai_percent(&self) -> String {
        format_percent(self.ai_probability)
    }

    pub fn human_percent(&self) -> String {
        format_percent(self.human_probability)
    }
}

/// 概率格式化为一位小数的百分比
pub fn format_percent(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}
