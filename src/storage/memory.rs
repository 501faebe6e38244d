use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::traits::Storage;

/// 进程内存储，不落盘
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        self.entries.write().insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert!(storage.get("theme").await.unwrap().is_none());

        storage.put("theme", b"\"light\"").await.unwrap();
        assert_eq!(storage.get("theme").await.unwrap().unwrap(), b"\"light\"");
        assert!(storage.health_check().await.unwrap());

        storage.delete("theme").await.unwrap();
        assert!(storage.get("theme").await.unwrap().is_none());
    }
}
