//! HTTP客户端模块
//!
//! 由 `api` 配置段构建 reqwest 客户端：超时、User-Agent、代理。

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

use crate::util::config::ApiConfig;

/// HTTP客户端配置
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            connect_timeout_secs: 10,
            user_agent: crate::build_info::user_agent(),
            http_proxy: None,
            https_proxy: None,
        }
    }
}

impl From<&ApiConfig> for HttpClientConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            timeout_secs: api.timeout_secs,
            connect_timeout_secs: api.connect_timeout_secs,
            user_agent: api
                .user_agent
                .clone()
                .unwrap_or_else(crate::build_info::user_agent),
            http_proxy: api.http_proxy.clone(),
            https_proxy: api.https_proxy.clone(),
        }
    }
}

/// HTTP客户端包装器
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Self::build_reqwest_client(&config)?;
        Ok(Self { client, config })
    }

    fn build_reqwest_client(config: &HttpClientConfig) -> Result<Client> {
        let mut client_builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(&config.user_agent);

        if let Some(proxy_url) = &config.http_proxy {
            match reqwest::Proxy::http(proxy_url) {
                Ok(proxy) => {
                    info!("使用HTTP代理: {}", proxy_url);
                    client_builder = client_builder.proxy(proxy);
                }
                Err(_) => warn!("HTTP代理配置无效: {}", proxy_url),
            }
        }

        if let Some(proxy_url) = &config.https_proxy {
            match reqwest::Proxy::https(proxy_url) {
                Ok(proxy) => {
                    info!("使用HTTPS代理: {}", proxy_url);
                    client_builder = client_builder.proxy(proxy);
                }
                Err(_) => warn!("HTTPS代理配置无效: {}", proxy_url),
            }
        }

        client_builder.build().context("构建HTTP客户端失败")
    }

    /// 底层 reqwest 客户端
    pub fn reqwest_client(&self) -> &Client {
        &self.client
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish()
    }
}
