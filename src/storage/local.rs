use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::traits::Storage;
use crate::util::logging::events;

/// 本地文件系统存储：每个键对应数据目录下的一个文件
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();

        std::fs::create_dir_all(&base_path).with_context(|| {
            format!("Failed to create data directory: {}", base_path.display())
        })?;

        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// 键只允许单层文件名，防止写出数据目录
    fn get_full_path(&self, key: &str) -> Result<PathBuf> {
        let key = key.trim_start_matches('/');
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            bail!("Invalid storage key: {key:?}");
        }
        Ok(self.base_path.join(key))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.get_full_path(key)?;
        let tmp = path.with_extension("tmp");

        // 先写临时文件再改名，中途失败不会留下半截数据
        fs::write(&tmp, data)
            .await
            .with_context(|| format!("Failed to write file: {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to replace file: {}", path.display()))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.get_full_path(key)?;

        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read file: {}", path.display())),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.get_full_path(key)?;

        match fs::remove_file(&path).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to delete file"),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        let probe = self.base_path.join(".health");
        match fs::write(&probe, b"ok").await {
            Ok(()) => {
                fs::remove_file(&probe).await.ok();
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(
                    event = events::STORAGE_HEALTH,
                    path = %self.base_path.display(),
                    error = %e,
                    "数据目录不可写"
                );
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_storage() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path()).unwrap();

        let key = "ai_detector_history";
        let data = br#"[{"id":"1"}]"#;

        storage.put(key, data).await.unwrap();
        assert!(temp_dir.path().join(key).is_file());

        let retrieved = storage.get(key).await.unwrap().unwrap();
        assert_eq!(retrieved, data);

        storage.put(key, b"[]").await.unwrap();
        assert_eq!(storage.get(key).await.unwrap().unwrap(), b"[]");

        storage.delete(key).await.unwrap();
        assert!(!temp_dir.path().join(key).exists());
        assert!(storage.get(key).await.unwrap().is_none());
        // 重复删除不报错
        storage.delete(key).await.unwrap();
    }

    #[tokio::test]
    async fn test_health_check() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("data");
        let storage = LocalStorage::new(&data_dir).unwrap();

        assert!(storage.health_check().await.unwrap());
        assert!(!data_dir.join(".health").exists());

        std::fs::remove_dir_all(&data_dir).unwrap();
        assert!(!storage.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_path_keys() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path()).unwrap();

        assert!(storage.put("../escape", b"x").await.is_err());
        assert!(storage.get("nested/key").await.is_err());
    }
}
