//! 库存（食品柜）写入端：批量插入选中的食材
//!
//! 会话核心只把库存后端当作插入接收器；每个食材一条记录，分类与数量固定。

pub mod memory;
pub mod rest;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use memory::MemoryInventory;
pub use rest::RestInventorySink;

/// 入库记录的固定分类
pub const DEFAULT_CATEGORY: &str = "Other";
/// 入库记录的固定数量
pub const DEFAULT_QUANTITY: &str = "1 unit";

/// 一条待插入的库存记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub owner_ref: String,
    pub name: String,
    pub category: String,
    pub quantity: String,
}

impl InventoryRecord {
    /// 由食材名构造记录（名称去除首尾空白）
    pub fn for_item(owner_ref: &str, item: &str) -> Self {
        Self {
            owner_ref: owner_ref.to_string(),
            name: item.trim().to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            quantity: DEFAULT_QUANTITY.to_string(),
        }
    }
}

/// 库存写入错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Inventory rejected insert: {0}")]
    Rejected(String),
}

/// 库存写入接口
#[async_trait]
pub trait InventorySink: Send + Sync {
    /// 一次批量插入；要么全部成功，要么返回错误
    async fn insert(&self, records: Vec<InventoryRecord>) -> Result<(), SinkError>;
}
