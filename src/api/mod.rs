//! 远端检测服务接口
//!
//! `Detector` 是会话与批处理依赖的唯一远端抽象，生产实现为 [`DetectorClient`]，
//! 测试中以确定性的桩实现替换。

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DetectorResult;
use crate::model::{AnalysisResult, DetectionMode, FileUpload};

pub use client::DetectorClient;

#[async_trait]
pub trait Detector: Send + Sync {
    /// 文本检测，端点由检测模式决定
    async fn predict_text(&self, text: &str, mode: DetectionMode)
        -> DetectorResult<AnalysisResult>;

    /// 文档检测（multipart 上传）
    async fn predict_file(
        &self,
        file: &FileUpload,
        mode: DetectionMode,
    ) -> DetectorResult<AnalysisResult>;

    /// 服务健康状态
    async fn health(&self) -> DetectorResult<ServiceHealth>;

    /// 模型配置信息，结构由服务端决定
    async fn info(&self) -> DetectorResult<Value>;
}

/// `GET /health` 响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    /// 已加载的机器学习模型数量
    #[serde(default)]
    pub ml_models: Option<u32>,
    /// 深度学习模型是否已加载
    #[serde(default)]
    pub dl_model: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServiceHealth {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") || self.status.eq_ignore_ascii_case("ok")
    }
}

#[cfg(test)]
pub(crate) mod stub {
    //! 确定性的检测桩，供会话与批处理测试使用

    use super::*;
    use crate::error::DetectorError;
    use crate::model::analysis::fixtures;
    use parking_lot::Mutex;

    #[derive(Default)]
    pub struct StubDetector {
        pub ai_probability: f64,
        /// 文件名包含其中任一片段时返回服务端错误
        pub fail_files: Vec<String>,
        /// 文本请求直接失败时返回的服务端错误信息
        pub text_error: Option<String>,
        /// 文件检测返回的提取文本
        pub extracted_text: Option<String>,
        pub calls: Mutex<Vec<String>>,
    }

    impl StubDetector {
        pub fn new(ai_probability: f64) -> Self {
            Self {
                ai_probability,
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl Detector for StubDetector {
        async fn predict_text(
            &self,
            text: &str,
            mode: DetectionMode,
        ) -> DetectorResult<AnalysisResult> {
            self.calls.lock().push(format!("text:{}", mode.as_str()));
            if let Some(message) = &self.text_error {
                return Err(DetectorError::remote(Some(500), Some(message.clone())));
            }
            let mut result = fixtures::result(self.ai_probability);
            result.word_count = Some(text.split_whitespace().count() as u64);
            Ok(result)
        }

        async fn predict_file(
            &self,
            file: &FileUpload,
            mode: DetectionMode,
        ) -> DetectorResult<AnalysisResult> {
            self.calls
                .lock()
                .push(format!("file:{}:{}", mode.as_str(), file.file_name));
            if self.fail_files.iter().any(|f| file.file_name.contains(f)) {
                return Err(DetectorError::remote(
                    Some(400),
                    Some("No text found in file".to_string()),
                ));
            }
            let mut result = fixtures::result(self.ai_probability);
            result.filename = Some(file.file_name.clone());
            result.file_type = Some(file.extension().trim_start_matches('.').to_string());
            result.extracted_text = self.extracted_text.clone();
            result.word_count = self
                .extracted_text
                .as_deref()
                .map(|t| t.split_whitespace().count() as u64);
            Ok(result)
        }

        async fn health(&self) -> DetectorResult<ServiceHealth> {
            Ok(ServiceHealth {
                status: "healthy".to_string(),
                ml_models: Some(2),
                dl_model: Some(false),
                extra: Map::new(),
            })
        }

        async fn info(&self) -> DetectorResult<Value> {
            Ok(serde_json::json!({ "ml_models_loaded": 2 }))
        }
    }
}
