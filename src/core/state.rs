//! 状态投影：会话阶段与快照
//!
//! 界面只持有轻量的 SessionSnapshot（阶段、时间线、当前选择）；完整状态由 SessionController 维护并投影出来。

use serde::Serialize;

use crate::assistant::Selection;
use crate::memory::Timeline;

/// 会话阶段：Idle ⇄ Sending（上游请求在途）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    Idle,
    Sending,
}

/// 界面可渲染的会话快照
#[derive(Clone, Debug, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub timeline: Timeline,
    /// 正在打开的食材选择（与 phase 正交）
    pub selection: Option<Selection>,
    pub archived_sessions: usize,
}

impl SessionSnapshot {
    /// 输入框是否应锁定
    pub fn input_locked(&self) -> bool {
        self.phase == SessionPhase::Sending
    }
}
