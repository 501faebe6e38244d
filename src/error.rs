//! 客户端错误类型
//!
//! 三类失败：提交前的本地校验、远端调用失败、本地持久化/导出失败。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectorError {
    /// 本地校验未通过，未发起任何网络请求
    #[error("{0}")]
    Validation(String),

    /// 远端返回非成功状态
    #[error("{message}")]
    Remote {
        status: Option<u16>,
        /// 服务端提供的错误信息（若有）
        server_message: Option<String>,
        message: String,
    },

    #[error("网络请求失败: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("存储操作失败: {0}")]
    Storage(String),

    #[error("文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON解析失败: {0}")]
    Json(#[from] serde_json::Error),
}

impl DetectorError {
    pub fn validation(message: impl Into<String>) -> Self {
        DetectorError::Validation(message.into())
    }

    pub fn remote(status: Option<u16>, server_message: Option<String>) -> Self {
        let message = match (&server_message, status) {
            (Some(msg), _) => msg.clone(),
            (None, Some(code)) => format!("Request failed with status code {code}"),
            (None, None) => "Request failed".to_string(),
        };
        DetectorError::Remote {
            status,
            server_message,
            message,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DetectorError::Validation(_))
    }

    /// 面向用户的提示：优先服务端错误信息，其次使用给定的兜底文案
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            DetectorError::Validation(msg) => msg.clone(),
            DetectorError::Remote {
                server_message: Some(msg),
                ..
            } => msg.clone(),
            _ => fallback.to_string(),
        }
    }
}

pub type DetectorResult<T> = Result<T, DetectorError>;
