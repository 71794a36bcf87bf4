//! 会话错误类型
//!
//! 控制器边界上只有 Busy / Sink 等少数错误会交给调用方；持久化与上游失败在内部吞掉并记录日志。

use thiserror::Error;

use crate::inventory::SinkError;

/// 持久化槽位读写错误
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid slot key: {0}")]
    InvalidKey(String),

    #[error("Corrupt slot {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// 会话控制器对外暴露的错误
#[derive(Error, Debug)]
pub enum SessionError {
    /// 有请求在途时不允许 reset
    #[error("Session busy: a request is in flight")]
    Busy,

    #[error("Inventory commit failed: {0}")]
    Sink(#[from] SinkError),

    #[error("Archive entry not found: {0}")]
    ArchiveEntryNotFound(usize),

    #[error("No selection is open")]
    NoSelection,

    #[error("Message has no ingredient list: {0}")]
    NoIngredients(String),
}
