use anyhow::Result;
use async_trait::async_trait;

/// 键值存储抽象，用于历史记录、偏好与主题的持久化
///
/// 值为原始字节，序列化格式由调用方决定（目前均为 JSON）。
#[async_trait]
pub trait Storage: Send + Sync {
    /// 写入（覆盖）
    async fn put(&self, key: &str, data: &[u8]) -> Result<()>;

    /// 读取，不存在时返回 `None`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// 删除，不存在时视为成功
    async fn delete(&self, key: &str) -> Result<()>;

    /// 健康检查：存储目录仍然可写
    async fn health_check(&self) -> Result<bool>;
}
