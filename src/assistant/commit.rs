//! 入库提交：把选中的食材批量写入库存，并安排一次续接请求
//!
//! 成功后依次：标记消息已入库、关闭选择、延迟片刻后发送续接提示词（只安排一次）。
//! 失败时消息保持未入库，向用户报告失败，不自动重试。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::assistant::{continuation_prompt, SendOutcome};
use crate::inventory::{InventoryRecord, InventorySink, SinkError};

/// 续接请求前的默认延迟
pub const DEFAULT_CONTINUATION_DELAY: Duration = Duration::from_millis(500);

/// 提交成功后需要会话配合的动作（由控制器实现）
#[async_trait]
pub trait CommitTarget: Send + Sync {
    /// 标记消息已入库，返回是否找到可标记的消息
    async fn mark_committed(&self, message_id: &str) -> bool;

    /// 关闭选择（若有）
    async fn close_selection(&self);

    /// 延迟 delay 后发送 prompt
    fn schedule_continuation(&self, prompt: String, delay: Duration) -> JoinHandle<SendOutcome>;

    /// 向用户报告入库失败
    fn commit_failed(&self, message_id: &str, error: &SinkError);
}

/// 提交结果
#[derive(Debug)]
pub enum CommitOutcome {
    /// 没有选中任何食材
    Skipped,
    /// 已入库；continuation 为已安排的续接请求
    Committed {
        count: usize,
        continuation: JoinHandle<SendOutcome>,
    },
}

pub struct CommitDispatcher {
    inventory: Arc<dyn InventorySink>,
    owner_ref: String,
    continuation_delay: Duration,
}

impl CommitDispatcher {
    pub fn new(
        inventory: Arc<dyn InventorySink>,
        owner_ref: impl Into<String>,
        continuation_delay: Duration,
    ) -> Self {
        Self {
            inventory,
            owner_ref: owner_ref.into(),
            continuation_delay,
        }
    }

    pub async fn commit(
        &self,
        message_id: &str,
        items: &[String],
        target: &dyn CommitTarget,
    ) -> Result<CommitOutcome, SinkError> {
        if items.is_empty() {
            return Ok(CommitOutcome::Skipped);
        }

        let records: Vec<InventoryRecord> = items
            .iter()
            .map(|item| InventoryRecord::for_item(&self.owner_ref, item))
            .collect();
        let count = records.len();

        if let Err(e) = self.inventory.insert(records).await {
            tracing::warn!("Inventory insert for message {} failed: {}", message_id, e);
            target.commit_failed(message_id, &e);
            return Err(e);
        }

        if !target.mark_committed(message_id).await {
            tracing::warn!("Committed items for unknown or list-less message {}", message_id);
        }
        target.close_selection().await;
        tracing::info!("Added {} items to pantry from message {}", count, message_id);

        let continuation =
            target.schedule_continuation(continuation_prompt(count), self.continuation_delay);
        Ok(CommitOutcome::Committed {
            count,
            continuation,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::inventory::MemoryInventory;

    #[derive(Default)]
    struct RecordingTarget {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingTarget {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommitTarget for RecordingTarget {
        async fn mark_committed(&self, message_id: &str) -> bool {
            self.record(format!("mark {}", message_id));
            true
        }

        async fn close_selection(&self) {
            self.record("close".to_string());
        }

        fn schedule_continuation(&self, prompt: String, delay: Duration) -> JoinHandle<SendOutcome> {
            self.record(format!("schedule {:?} {}", delay, prompt));
            tokio::spawn(async { SendOutcome::Ignored })
        }

        fn commit_failed(&self, message_id: &str, error: &SinkError) {
            self.record(format!("failed {} {}", message_id, error));
        }
    }

    fn dispatcher(inventory: Arc<MemoryInventory>) -> CommitDispatcher {
        CommitDispatcher::new(inventory, "user-1", Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_empty_commit_is_noop() {
        let inventory = Arc::new(MemoryInventory::new());
        let target = RecordingTarget::default();

        let outcome = dispatcher(inventory.clone())
            .commit("m1", &[], &target)
            .await
            .unwrap();
        assert!(matches!(outcome, CommitOutcome::Skipped));
        assert!(inventory.batches().is_empty());
        assert!(target.calls().is_empty());
    }

    #[tokio::test]
    async fn test_commit_inserts_one_batch_then_continues() {
        let inventory = Arc::new(MemoryInventory::new());
        let target = RecordingTarget::default();
        let items = vec![" Egg".to_string(), "Milk ".to_string()];

        let outcome = dispatcher(inventory.clone())
            .commit("m1", &items, &target)
            .await
            .unwrap();
        let CommitOutcome::Committed { count, continuation } = outcome else {
            panic!("expected commit");
        };
        assert_eq!(count, 2);
        continuation.await.unwrap();

        let batches = inventory.batches();
        assert_eq!(batches.len(), 1);
        let names: Vec<&str> = batches[0].iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Egg", "Milk"]);
        assert!(batches[0].iter().all(|r| r.owner_ref == "user-1"));

        let calls = target.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], "mark m1");
        assert_eq!(calls[1], "close");
        assert!(calls[2].contains("I have added 2 items to my pantry"));
    }

    #[tokio::test]
    async fn test_sink_failure_reports_and_skips_follow_up() {
        let inventory = Arc::new(MemoryInventory::new());
        inventory.set_failing(true);
        let target = RecordingTarget::default();

        let result = dispatcher(inventory)
            .commit("m1", &["Egg".to_string()], &target)
            .await;
        assert!(result.is_err());
        let calls = target.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("failed m1"));
    }
}
