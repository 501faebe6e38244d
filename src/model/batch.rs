//! 批量处理数据模型

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::analysis::AnalysisResult;
use super::upload::FileUpload;

/// 单个文件在批处理中的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Processing,
    Completed,
    Error,
}

/// 进度回调参数
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchProgress {
    /// 从 1 开始的序号
    pub current: usize,
    pub total: usize,
    pub file_name: String,
    pub status: BatchStatus,
    pub processed: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFileResult {
    pub file: String,
    pub size: u64,
    pub result: AnalysisResult,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFileError {
    pub file: String,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

/// 批处理汇总（不持久化）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRunResult {
    pub results: Vec<BatchFileResult>,
    pub errors: Vec<BatchFileError>,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// 校验未通过的文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidFile {
    pub file: String,
    pub reason: String,
}

/// 批量校验结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchValidation {
    pub valid_files: Vec<FileUpload>,
    pub invalid_files: Vec<InvalidFile>,
}

impl BatchValidation {
    /// 至少有一个文件可处理
    pub fn is_valid(&self) -> bool {
        !self.valid_files.is_empty()
    }

    pub fn total_valid(&self) -> usize {
        self.valid_files.len()
    }

    pub fn total_invalid(&self) -> usize {
        self.invalid_files.len()
    }
}
