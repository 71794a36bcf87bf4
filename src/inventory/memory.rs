//! 内存库存：记录每次批量插入，可切换为失败模式（测试与离线演示）

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{InventoryRecord, InventorySink, SinkError};

#[derive(Debug, Default)]
pub struct MemoryInventory {
    batches: Mutex<Vec<Vec<InventoryRecord>>>,
    failing: AtomicBool,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 之后的插入全部失败（true）或恢复正常（false）
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn batches(&self) -> Vec<Vec<InventoryRecord>> {
        self.batches.lock().map(|b| b.clone()).unwrap_or_default()
    }

    pub fn records(&self) -> Vec<InventoryRecord> {
        self.batches().into_iter().flatten().collect()
    }
}

#[async_trait]
impl InventorySink for MemoryInventory {
    async fn insert(&self, records: Vec<InventoryRecord>) -> Result<(), SinkError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::Rejected("inventory unavailable".to_string()));
        }
        self.batches
            .lock()
            .map_err(|_| SinkError::Request("inventory lock poisoned".to_string()))?
            .push(records);
        Ok(())
    }
}
