//! 归档：退役会话的有界历史
//!
//! 最新在前，容量默认 20，超出时淘汰最旧的一条。每次变更都把完整列表交给写入任务落盘。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::memory::{PersistHandle, SlotStore, Timeline, ARCHIVE_SLOT};

/// 默认归档容量
pub const DEFAULT_ARCHIVE_CAPACITY: usize = 20;

/// 历史列表中没有用户消息时的标题
pub const UNTITLED_SESSION: &str = "New Conversation";

/// 一条归档：某个时间线的不可变快照
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveEntry {
    pub archived_at: DateTime<Utc>,
    pub timeline: Timeline,
}

impl ArchiveEntry {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            archived_at: Utc::now(),
            timeline,
        }
    }

    pub fn summary(&self) -> ArchiveSummary {
        ArchiveSummary {
            title: self
                .timeline
                .first_user_text()
                .unwrap_or(UNTITLED_SESSION)
                .to_string(),
            message_count: self.timeline.len(),
            last_activity: self
                .timeline
                .last()
                .map(|m| m.created_at)
                .unwrap_or(self.archived_at),
        }
    }
}

/// 历史列表的一行
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArchiveSummary {
    pub title: String,
    pub message_count: usize,
    pub last_activity: DateTime<Utc>,
}

/// 归档存储
#[derive(Debug)]
pub struct ArchiveStore {
    entries: Vec<ArchiveEntry>,
    capacity: usize,
    persist: PersistHandle,
}

impl ArchiveStore {
    pub fn new(capacity: usize, persist: PersistHandle) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
            persist,
        }
    }

    /// 从槽位恢复归档；槽位缺失或损坏时得到空归档
    pub async fn load(slots: &dyn SlotStore, capacity: usize, persist: PersistHandle) -> Self {
        let mut store = Self::new(capacity, persist);
        match slots.get(ARCHIVE_SLOT).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<ArchiveEntry>>(&raw) {
                Ok(mut entries) => {
                    entries.truncate(store.capacity);
                    store.entries = entries;
                }
                Err(e) => tracing::warn!("Archive slot is corrupt, ignoring: {}", e),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to read archive slot: {}", e),
        }
        store
    }

    /// 归档一个时间线快照（插到最前，超出容量淘汰最旧）
    pub fn archive(&mut self, timeline: &Timeline) {
        self.entries.insert(0, ArchiveEntry::new(timeline.clone()));
        if self.entries.len() > self.capacity {
            let evicted = self.entries.len() - self.capacity;
            self.entries.truncate(self.capacity);
            tracing::debug!("Archive full, evicted {} oldest entries", evicted);
        }
        self.persist.save_archive(&self.entries);
    }

    /// 清空归档并删除槽位
    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist.clear_archive();
    }

    /// 取回某条归档的深拷贝，归档本身保持不变
    pub fn restore(&self, index: usize) -> Option<Timeline> {
        self.entries.get(index).map(|e| e.timeline.clone())
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn summaries(&self) -> Vec<ArchiveSummary> {
        self.entries.iter().map(ArchiveEntry::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
