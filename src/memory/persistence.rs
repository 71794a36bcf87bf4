//! 时间线持久化（带保鲜期）
//!
//! 时间线 JSON 与保存时间分别写入两个槽位；读取时若任一缺失、已过保鲜期或内容损坏，
//! 一律视为「没有可恢复的会话」，由调用方新建问候。本模块从不把错误抛出边界。

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::core::StorageError;
use crate::memory::{SlotStore, Timeline, SAVED_AT_SLOT, TIMELINE_SLOT};

/// 默认保鲜期：2 小时
pub const DEFAULT_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// 时间线持久化适配器
#[derive(Clone)]
pub struct TimelinePersistence {
    slots: Arc<dyn SlotStore>,
    ttl: Duration,
}

impl std::fmt::Debug for TimelinePersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelinePersistence")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// age 严格小于 ttl 才算新鲜；savedAt 在未来或相减溢出时按过期处理
pub(crate) fn is_fresh(saved_at_ms: i64, now: DateTime<Utc>, ttl: Duration) -> bool {
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    match now.timestamp_millis().checked_sub(saved_at_ms) {
        Some(age) if age >= 0 => age < ttl_ms,
        _ => false,
    }
}

impl TimelinePersistence {
    pub fn new(slots: Arc<dyn SlotStore>, ttl: Duration) -> Self {
        Self { slots, ttl }
    }

    /// 保存时间线与当前时间；失败只记日志
    pub async fn save(&self, timeline: &Timeline) {
        self.save_at(timeline, Utc::now()).await;
    }

    pub async fn save_at(&self, timeline: &Timeline, now: DateTime<Utc>) {
        if let Err(e) = self.try_save(timeline, now).await {
            tracing::warn!("Failed to persist timeline ({} messages): {}", timeline.len(), e);
        }
    }

    async fn try_save(&self, timeline: &Timeline, now: DateTime<Utc>) -> Result<(), StorageError> {
        let raw = serde_json::to_string(timeline)?;
        self.slots.set(TIMELINE_SLOT, &raw).await?;
        self.slots
            .set(SAVED_AT_SLOT, &now.timestamp_millis().to_string())
            .await?;
        Ok(())
    }

    /// 读取仍在保鲜期内的时间线
    pub async fn load(&self) -> Option<Timeline> {
        self.load_at(Utc::now()).await
    }

    pub async fn load_at(&self, now: DateTime<Utc>) -> Option<Timeline> {
        match self.try_load(now).await {
            Ok(timeline) => timeline,
            Err(e) => {
                tracing::warn!("Failed to load persisted timeline, starting fresh: {}", e);
                None
            }
        }
    }

    async fn try_load(&self, now: DateTime<Utc>) -> Result<Option<Timeline>, StorageError> {
        let raw = self.slots.get(TIMELINE_SLOT).await?;
        let saved_at = self.slots.get(SAVED_AT_SLOT).await?;
        let (Some(raw), Some(saved_at)) = (raw, saved_at) else {
            return Ok(None);
        };

        let saved_at_ms: i64 = saved_at.trim().parse().map_err(|e| StorageError::Corrupt {
            key: SAVED_AT_SLOT.to_string(),
            reason: format!("{}", e),
        })?;
        if !is_fresh(saved_at_ms, now, self.ttl) {
            tracing::debug!("Persisted timeline expired (saved at {}ms)", saved_at_ms);
            return Ok(None);
        }

        let timeline: Timeline = serde_json::from_str(&raw)?;
        if timeline.is_empty() {
            return Ok(None);
        }
        Ok(Some(timeline))
    }
}
