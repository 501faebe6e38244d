//! 分析历史管理
//!
//! 历史以 JSON 数组整体存放在 `ai_detector_history` 键下，最新的记录在最前，
//! 超过上限时淘汰最旧的记录。持久化数据损坏时记录警告并按空列表处理。

use anyhow::Context;
use chrono::{SubsecRound, Utc};
use nanoid::nanoid;
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{DetectorError, DetectorResult};
use crate::model::{
    HistoryFilter, HistoryItem, HistoryResult, HistoryStats, ImportOutcome, InputKind, NewAnalysis,
};
use crate::storage::Storage;
use crate::util::config::HistoryConfig;
use crate::util::logging::events;

pub const HISTORY_KEY: &str = "ai_detector_history";

const ID_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// `<毫秒时间戳>_<9位 base36 随机串>`
pub fn generate_id() -> String {
    format!(
        "{}_{}",
        Utc::now().timestamp_millis(),
        nanoid!(9, &ID_ALPHABET)
    )
}

pub(crate) fn storage_error(err: anyhow::Error) -> DetectorError {
    DetectorError::Storage(format!("{err:#}"))
}

pub struct HistoryManager {
    storage: Arc<dyn Storage>,
    max_items: usize,
    snippet_chars: usize,
}

impl HistoryManager {
    pub fn new(storage: Arc<dyn Storage>, config: &HistoryConfig) -> Self {
        Self {
            storage,
            max_items: config.max_items,
            snippet_chars: config.snippet_chars,
        }
    }

    /// 读取全部历史；内容无法解析时视为空
    pub async fn load(&self) -> DetectorResult<Vec<HistoryItem>> {
        let Some(raw) = self.storage.get(HISTORY_KEY).await.map_err(storage_error)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_slice::<Vec<HistoryItem>>(&raw) {
            Ok(items) => Ok(items),
            Err(err) => {
                warn!(
                    event = events::HISTORY_CORRUPT,
                    error = %err,
                    bytes = raw.len(),
                    "历史记录无法解析，按空列表处理"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn persist(&self, items: &[HistoryItem]) -> DetectorResult<()> {
        let data = serde_json::to_vec(items)?;
        self.storage
            .put(HISTORY_KEY, &data)
            .await
            .map_err(storage_error)
    }

    /// 新增一条记录并置于最前
    pub async fn save(&self, entry: NewAnalysis<'_>) -> DetectorResult<HistoryItem> {
        let text = match entry.kind {
            InputKind::Text => entry
                .text
                .map(|t| t.chars().take(self.snippet_chars).collect::<String>()),
            InputKind::File => None,
        };

        let item = HistoryItem {
            id: generate_id(),
            timestamp: Utc::now().trunc_subsecs(3),
            kind: entry.kind,
            file_name: entry.file_name.map(str::to_string),
            text,
            result: HistoryResult::from(entry.result),
        };

        let mut items = self.load().await?;
        items.insert(0, item.clone());
        items.truncate(self.max_items);
        self.persist(&items).await?;

        debug!(
            event = events::HISTORY_SAVE,
            id = %item.id,
            kind = item.kind.as_str(),
            total = items.len()
        );
        Ok(item)
    }

    pub async fn list(&self) -> DetectorResult<Vec<HistoryItem>> {
        self.load().await
    }

    pub async fn get(&self, id: &str) -> DetectorResult<Option<HistoryItem>> {
        Ok(self.load().await?.into_iter().find(|item| item.id == id))
    }

    /// 删除指定记录，返回记录是否存在
    pub async fn delete(&self, id: &str) -> DetectorResult<bool> {
        let mut items = self.load().await?;
        let before = items.len();
        items.retain(|item| item.id != id);
        let removed = items.len() != before;
        if removed {
            self.persist(&items).await?;
        }
        Ok(removed)
    }

    pub async fn clear(&self) -> DetectorResult<()> {
        self.storage
            .delete(HISTORY_KEY)
            .await
            .map_err(storage_error)
    }

    /// 在文件名、文本片段与标签中做不区分大小写的子串匹配
    pub async fn search(&self, query: &str) -> DetectorResult<Vec<HistoryItem>> {
        let query = query.to_lowercase();
        let items = self.load().await?;
        Ok(items
            .into_iter()
            .filter(|item| {
                let contains =
                    |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(&query));
                contains(item.file_name.as_deref())
                    || contains(item.text.as_deref())
                    || contains(Some(item.result.label.as_str()))
            })
            .collect())
    }

    pub async fn filter(&self, filter: &HistoryFilter) -> DetectorResult<Vec<HistoryItem>> {
        let items = self.load().await?;
        Ok(items.into_iter().filter(|item| filter.matches(item)).collect())
    }

    pub async fn stats(&self) -> DetectorResult<HistoryStats> {
        Ok(HistoryStats::from_items(&self.load().await?))
    }

    /// 导出为格式化 JSON：`<dir>/ai_detector_history_<毫秒>.json`
    pub async fn export_to(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        let items = self.load().await?;
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("创建导出目录失败: {}", dir.display()))?;

        let path = dir.join(format!(
            "ai_detector_history_{}.json",
            Utc::now().timestamp_millis()
        ));
        let content = serde_json::to_string_pretty(&items)?;
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("写入导出文件失败: {}", path.display()))?;

        info!(
            event = events::HISTORY_EXPORT,
            path = %path.display(),
            count = items.len()
        );
        Ok(path)
    }

    pub async fn import_from(&self, path: &Path) -> DetectorResult<ImportOutcome> {
        let content = tokio::fs::read_to_string(path).await?;
        self.import_json(&content).await
    }

    /// 导入 JSON 数组：导入项排在现有记录之前，按时间戳去重保留先出现者，再截断到上限
    pub async fn import_json(&self, content: &str) -> DetectorResult<ImportOutcome> {
        let parsed: Value = serde_json::from_str(content)?;
        let Value::Array(entries) = parsed else {
            return Err(DetectorError::validation("Invalid history format"));
        };

        let mut imported = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<HistoryItem>(entry) {
                Ok(item) => imported.push(item),
                Err(err) => warn!(
                    event = events::HISTORY_IMPORT,
                    index,
                    error = %err,
                    "跳过无法识别的历史记录"
                ),
            }
        }
        let imported_count = imported.len();

        let current = self.load().await?;
        let mut seen = HashSet::new();
        let mut merged: Vec<HistoryItem> = imported
            .into_iter()
            .chain(current)
            .filter(|item| seen.insert(item.timestamp))
            .collect();
        merged.truncate(self.max_items);
        self.persist(&merged).await?;

        info!(
            event = events::HISTORY_IMPORT,
            imported = imported_count,
            total = merged.len()
        );
        Ok(ImportOutcome {
            imported: imported_count,
            total_after_merge: merged.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::analysis::fixtures;
    use crate::model::Classification;
    use crate::storage::{LocalStorage, MemoryStorage};

    fn manager_with(storage: Arc<dyn Storage>, max_items: usize) -> HistoryManager {
        HistoryManager::new(
            storage,
            &HistoryConfig {
                max_items,
                snippet_chars: 500,
            },
        )
    }

    fn manager(max_items: usize) -> HistoryManager {
        manager_with(Arc::new(MemoryStorage::new()), max_items)
    }

    async fn save_text(manager: &HistoryManager, text: &str, probability: f64) -> HistoryItem {
        let result = fixtures::result(probability);
        manager
            .save(NewAnalysis {
                kind: InputKind::Text,
                file_name: None,
                text: Some(text),
                result: &result,
            })
            .await
            .unwrap()
    }

    #[test]
    fn test_generate_id_format() {
        let id = generate_id();
        let (millis, suffix) = id.split_once('_').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[tokio::test]
    async fn test_save_prepends_and_caps() {
        let manager = manager(3);
        for i in 0..5 {
            save_text(&manager, &format!("entry {i}"), 0.9).await;
        }

        let items = manager.list().await.unwrap();
        assert_eq!(items.len(), 3);
        let texts: Vec<_> = items.iter().map(|i| i.text.as_deref().unwrap()).collect();
        assert_eq!(texts, vec!["entry 4", "entry 3", "entry 2"]);
    }

    #[tokio::test]
    async fn test_history_never_exceeds_default_cap() {
        let manager = manager(100);
        for i in 0..105 {
            save_text(&manager, &format!("t{i}"), 0.5).await;
        }
        let items = manager.list().await.unwrap();
        assert_eq!(items.len(), 100);
        assert_eq!(items[0].text.as_deref(), Some("t104"));
        assert_eq!(items[99].text.as_deref(), Some("t5"));
    }

    #[tokio::test]
    async fn test_snippet_and_file_entries() {
        let manager = manager(10);
        let long_text = "é".repeat(600);
        let item = save_text(&manager, &long_text, 0.7).await;
        assert_eq!(item.text.as_ref().unwrap().chars().count(), 500);

        let result = fixtures::result(0.3);
        let file_item = manager
            .save(NewAnalysis {
                kind: InputKind::File,
                file_name: Some("thesis.pdf"),
                text: Some("ignored for files"),
                result: &result,
            })
            .await
            .unwrap();
        assert_eq!(file_item.text, None);
        assert_eq!(file_item.file_name.as_deref(), Some("thesis.pdf"));
    }

    #[tokio::test]
    async fn test_get_delete_clear() {
        let manager = manager(10);
        let first = save_text(&manager, "first", 0.9).await;
        let second = save_text(&manager, "second", 0.1).await;

        assert_eq!(manager.get(&first.id).await.unwrap(), Some(first.clone()));
        assert!(manager.delete(&first.id).await.unwrap());
        assert!(!manager.delete(&first.id).await.unwrap());
        assert_eq!(manager.list().await.unwrap(), vec![second]);

        manager.clear().await.unwrap();
        assert!(manager.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let manager = manager(10);
        save_text(&manager, "Quarterly Revenue report", 0.9).await;
        save_text(&manager, "a poem about rain", 0.1).await;

        assert_eq!(manager.search("REVENUE").await.unwrap().len(), 1);
        // 标签匹配：fixtures 中 0.1 的标签为 Human
        assert_eq!(manager.search("human").await.unwrap().len(), 1);
        assert_eq!(manager.search("").await.unwrap().len(), 2);
        assert!(manager.search("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filter_by_classification() {
        let manager = manager(10);
        save_text(&manager, "one", 0.9).await;
        save_text(&manager, "two", 0.2).await;
        save_text(&manager, "three", 0.8).await;

        let filter = HistoryFilter {
            classification: Some(Classification::Ai),
            min_probability: Some(0.85),
            ..Default::default()
        };
        let hits = manager.filter(&filter).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text.as_deref(), Some("one"));
    }

    #[tokio::test]
    async fn test_corrupt_history_is_treated_as_empty() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.put(HISTORY_KEY, b"{not json").await.unwrap();
        let manager = manager_with(storage, 10);

        assert!(manager.list().await.unwrap().is_empty());
        save_text(&manager, "fresh", 0.6).await;
        assert_eq!(manager.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_import_merges_and_dedups() {
        let manager = manager(10);
        let existing = save_text(&manager, "existing", 0.9).await;

        let payload = serde_json::json!([
            {
                "id": "1700000000000_aaaaaaaaa",
                "timestamp": "2023-11-14T22:13:20.000Z",
                "type": "file",
                "fileName": "old.pdf",
                "text": null,
                "result": {"label": "AI", "is_ai": true, "ai_probability": 0.8, "human_probability": 0.2}
            },
            {
                "id": "1700000000000_bbbbbbbbb",
                "timestamp": "2023-11-14T22:13:20.000Z",
                "type": "text",
                "fileName": null,
                "text": "duplicate timestamp",
                "result": {"label": "Human", "is_ai": false, "ai_probability": 0.1, "human_probability": 0.9}
            },
            serde_json::to_value(&existing).unwrap()
        ]);

        let outcome = manager.import_json(&payload.to_string()).await.unwrap();
        assert_eq!(outcome.imported, 3);
        assert_eq!(outcome.total_after_merge, 2);

        let items = manager.list().await.unwrap();
        assert_eq!(items[0].id, "1700000000000_aaaaaaaaa");
        assert_eq!(items[1].id, existing.id);
    }

    #[tokio::test]
    async fn test_import_rejects_non_array() {
        let manager = manager(10);
        let err = manager.import_json(r#"{"id": "x"}"#).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid history format");
    }

    #[tokio::test]
    async fn test_export_and_reimport_with_local_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path().join("data")).unwrap());
        let manager = manager_with(storage, 10);
        save_text(&manager, "exported text", 0.75).await;

        let path = manager.export_to(&dir.path().join("exports")).await.unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("ai_detector_history_") && name.ends_with(".json"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  {"), "pretty printed");

        manager.clear().await.unwrap();
        let outcome = manager.import_from(&path).await.unwrap();
        assert_eq!(outcome.imported, 1);
        assert_eq!(
            manager.list().await.unwrap()[0].text.as_deref(),
            Some("exported text")
        );
    }

    #[tokio::test]
    async fn test_stats() {
        let manager = manager(10);
        save_text(&manager, "a", 0.9).await;
        save_text(&manager, "b", 0.1).await;
        let stats = manager.stats().await.unwrap();
        assert_eq!(stats.total_analyses, 2);
        assert_eq!(stats.ai_detected, 1);
        assert_eq!(stats.text_analyses, 2);
        assert!((stats.avg_ai_probability - 0.5).abs() < 1e-9);
    }
}
