//! 基于 reqwest 的远端检测客户端

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::{Detector, ServiceHealth};
use crate::error::{DetectorError, DetectorResult};
use crate::model::{AnalysisResult, DetectionMode, FileUpload};
use crate::util::config::ApiConfig;
use crate::util::http_client::{HttpClient, HttpClientConfig};
use crate::util::logging::events;

/// 远端检测服务客户端，不做重试
#[derive(Debug, Clone)]
pub struct DetectorClient {
    http: HttpClient,
    base_url: String,
}

impl DetectorClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn from_config(api: &ApiConfig) -> anyhow::Result<Self> {
        let http = HttpClient::new(HttpClientConfig::from(api))?;
        Ok(Self::new(http, api.normalized_base_url()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_text(&self, endpoint: &str, text: &str) -> DetectorResult<AnalysisResult> {
        let response = self
            .http
            .reqwest_client()
            .post(self.url(endpoint))
            .json(&json!({ "text": text }))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn send_file(
        &self,
        endpoint: &str,
        file: &FileUpload,
        mode: DetectionMode,
    ) -> DetectorResult<AnalysisResult> {
        let bytes = file.read_bytes().await?;
        let mut part = Part::bytes(bytes).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }

        let mut form = Form::new().part("file", part);
        if let Some(value) = mode.file_form_value() {
            form = form.text("mode", value);
        }

        let response = self
            .http
            .reqwest_client()
            .post(self.url(endpoint))
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// 成功响应按 JSON 解码；失败响应提取 `error` 字段作为服务端信息
    async fn decode<T: DeserializeOwned>(response: Response) -> DetectorResult<T> {
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return Ok(serde_json::from_slice(&body)?);
        }

        let server_message = serde_json::from_slice::<Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string));

        Err(DetectorError::remote(Some(status.as_u16()), server_message))
    }

    fn log_outcome(
        endpoint: &str,
        started: Instant,
        outcome: &DetectorResult<AnalysisResult>,
    ) {
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(result) => info!(
                event = events::ANALYSIS_COMPLETE,
                endpoint,
                elapsed_ms,
                is_ai = result.is_ai,
                ai_probability = result.ai_probability
            ),
            Err(err) => warn!(
                event = events::ANALYSIS_ERROR,
                endpoint,
                elapsed_ms,
                error = %err
            ),
        }
    }
}

#[async_trait]
impl Detector for DetectorClient {
    async fn predict_text(
        &self,
        text: &str,
        mode: DetectionMode,
    ) -> DetectorResult<AnalysisResult> {
        let endpoint = mode.text_endpoint();
        debug!(
            event = events::ANALYSIS_REQUEST,
            endpoint,
            chars = text.chars().count()
        );

        let started = Instant::now();
        let outcome = self.send_text(endpoint, text).await;
        Self::log_outcome(endpoint, started, &outcome);
        outcome
    }

    async fn predict_file(
        &self,
        file: &FileUpload,
        mode: DetectionMode,
    ) -> DetectorResult<AnalysisResult> {
        let endpoint = "/predict-file";
        debug!(
            event = events::ANALYSIS_REQUEST,
            endpoint,
            file = %file.file_name,
            size = file.size,
            mode = mode.as_str()
        );

        let started = Instant::now();
        let outcome = self.send_file(endpoint, file, mode).await;
        Self::log_outcome(endpoint, started, &outcome);
        outcome
    }

    async fn health(&self) -> DetectorResult<ServiceHealth> {
        let response = self
            .http
            .reqwest_client()
            .get(self.url("/health"))
            .send()
            .await?;
        let health: ServiceHealth = Self::decode(response).await?;
        debug!(event = events::SERVICE_HEALTH, status = %health.status);
        Ok(health)
    }

    async fn info(&self) -> DetectorResult<Value> {
        let response = self
            .http
            .reqwest_client()
            .get(self.url("/info"))
            .send()
            .await?;
        Self::decode(response).await
    }
}
