//! 待上传文件描述

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DetectorError, DetectorResult};

/// 本地待上传文件（仅元数据，内容在上传时读取）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpload {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
    /// 依据扩展名推断的 MIME 类型
    pub content_type: Option<String>,
}

impl FileUpload {
    /// 读取文件元数据
    pub fn from_path(path: impl AsRef<Path>) -> DetectorResult<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(DetectorError::validation(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        Ok(Self::new(path, metadata.len()))
    }

    /// 直接由路径与大小构造，用于已知元数据的场景
    pub fn new(path: impl AsRef<Path>, size: u64) -> Self {
        let path = path.as_ref().to_path_buf();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let content_type = mime_guess::from_path(&path)
            .first_raw()
            .map(|m| m.to_string());
        Self {
            path,
            file_name,
            size,
            content_type,
        }
    }

    /// 小写扩展名（含点号），取最后一个 `.` 之后的部分；无点号时整个文件名视为扩展名
    pub fn extension(&self) -> String {
        let last = self.file_name.rsplit('.').next().unwrap_or_default();
        format!(".{}", last.to_lowercase())
    }

    pub fn size_kb(&self) -> f64 {
        self.size as f64 / 1024.0
    }

    pub async fn read_bytes(&self) -> DetectorResult<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}
