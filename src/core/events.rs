//! 会话事件：供界面订阅的状态变化通知（可序列化为 JSON）

use serde::Serialize;

use crate::memory::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// 时间线追加了一条消息
    MessageAppended { message_id: String, role: Role },
    /// 消息的食材已入库
    MessageCommitted { message_id: String },
    /// 入库失败（需要用户可见的提示）
    CommitFailed { message_id: String, reason: String },
    /// 打开了某条消息的食材选择
    SelectionOpened { message_id: String },
    SelectionClosed,
    /// 会话被重置；archived 表示旧时间线是否进入归档
    SessionReset { archived: bool },
    /// 从归档恢复
    SessionRestored { index: usize },
    ArchiveCleared,
    /// 启动意图已触发
    AutoStarted { dish: String },
}
