//! 后台持久化写入任务
//!
//! 控制器每次状态变更后把快照投递到无界通道，由单个后台任务按顺序落盘：
//! 投递不阻塞调用方，写入顺序与投递顺序一致，写失败只记日志。

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::core::StorageError;
use crate::memory::{ArchiveEntry, SlotStore, Timeline, TimelinePersistence, ARCHIVE_SLOT};

/// 写入任务处理的作业
#[derive(Debug)]
pub enum PersistJob {
    /// 保存时间线与保存时间
    Timeline(Timeline),
    /// 覆盖归档列表
    Archive(Vec<ArchiveEntry>),
    /// 删除归档槽位
    ClearArchive,
    /// 在此之前投递的作业全部完成后回执
    Flush(oneshot::Sender<()>),
}

/// 投递端（可克隆，多处共享）
#[derive(Debug, Clone)]
pub struct PersistHandle {
    tx: mpsc::UnboundedSender<PersistJob>,
}

impl PersistHandle {
    fn submit(&self, job: PersistJob) {
        if self.tx.send(job).is_err() {
            tracing::debug!("Persist writer stopped, dropping job");
        }
    }

    pub fn save_timeline(&self, timeline: &Timeline) {
        self.submit(PersistJob::Timeline(timeline.clone()));
    }

    pub fn save_archive(&self, entries: &[ArchiveEntry]) {
        self.submit(PersistJob::Archive(entries.to_vec()));
    }

    pub fn clear_archive(&self) {
        self.submit(PersistJob::ClearArchive);
    }

    /// 等待已投递的作业全部写完；写入任务已退出时立即返回
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        self.submit(PersistJob::Flush(tx));
        let _ = rx.await;
    }
}

async fn write_archive(slots: &dyn SlotStore, entries: &[ArchiveEntry]) -> Result<(), StorageError> {
    let raw = serde_json::to_string(entries)?;
    slots.set(ARCHIVE_SLOT, &raw).await
}

/// 启动写入任务；所有 PersistHandle 被丢弃后任务自然结束
pub fn spawn_writer(
    persistence: TimelinePersistence,
    slots: Arc<dyn SlotStore>,
) -> (PersistHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<PersistJob>();
    let handle = tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            match job {
                PersistJob::Timeline(timeline) => persistence.save(&timeline).await,
                PersistJob::Archive(entries) => {
                    if let Err(e) = write_archive(slots.as_ref(), &entries).await {
                        tracing::warn!("Failed to persist archive ({} entries): {}", entries.len(), e);
                    }
                }
                PersistJob::ClearArchive => {
                    if let Err(e) = slots.remove(ARCHIVE_SLOT).await {
                        tracing::warn!("Failed to remove archive slot: {}", e);
                    }
                }
                PersistJob::Flush(ack) => {
                    let _ = ack.send(());
                }
            }
        }
        tracing::debug!("Persist writer finished");
    });
    (PersistHandle { tx }, handle)
}
