//! 持久化槽位抽象
//!
//! 以字符串为键、字符串为值的耐久存储（相当于浏览器 localStorage）。时间线、保存时间、归档与
//! 启动意图各占一个槽位；实现有内存版（测试、临时会话）与目录版（见 async_io）。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::StorageError;

/// 当前时间线
pub const TIMELINE_SLOT: &str = "chat.timeline";
/// 时间线保存时间（毫秒时间戳）
pub const SAVED_AT_SLOT: &str = "chat.timeline.savedAt";
/// 归档列表
pub const ARCHIVE_SLOT: &str = "chat.archive";
/// 一次性启动意图（「开始做某道菜」）
pub const INTENT_SLOT: &str = "chat.intent";

/// 槽位存储接口
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// 读取槽位；不存在时返回 None
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// 写入（覆盖）槽位
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// 删除槽位；不存在时视为成功
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// 原子地读取并删除槽位：并发调用时至多一个拿到值
    async fn take(&self, key: &str) -> Result<Option<String>, StorageError>;
}

/// 内存槽位存储
#[derive(Debug, Default)]
pub struct MemorySlotStore {
    slots: RwLock<HashMap<String, String>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.slots.read().await.contains_key(key)
    }
}

#[async_trait]
impl SlotStore for MemorySlotStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.slots.write().await.remove(key);
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.write().await.remove(key))
    }
}
