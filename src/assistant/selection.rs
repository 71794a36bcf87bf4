//! 食材选择：同一时间只对一条消息开放的勾选集合
//!
//! 打开时默认全选；关闭或改开另一条消息时，未提交的勾选直接丢弃，不做持久化。

use std::collections::HashSet;

use serde::Serialize;

/// 一次打开中的选择
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    message_id: String,
    items: Vec<String>,
    chosen: HashSet<String>,
}

impl Selection {
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// 消息中的完整清单（原顺序）
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_selected(&self, item: &str) -> bool {
        self.chosen.contains(item)
    }

    /// 已勾选的食材，按清单顺序，重复名只出现一次
    pub fn selected(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .filter(|item| self.chosen.contains(*item) && seen.insert(item.as_str()))
            .cloned()
            .collect()
    }
}

/// 选择流程状态
#[derive(Debug, Default)]
pub struct SelectionWorkflow {
    current: Option<Selection>,
}

impl SelectionWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为某条消息打开选择（默认全选），覆盖之前未提交的选择
    pub fn open(&mut self, message_id: impl Into<String>, items: Vec<String>) {
        let message_id = message_id.into();
        if let Some(prev) = &self.current {
            if prev.message_id != message_id {
                tracing::debug!("Discarding open selection for message {}", prev.message_id);
            }
        }
        let chosen = items.iter().cloned().collect();
        self.current = Some(Selection {
            message_id,
            items,
            chosen,
        });
    }

    /// 翻转某个食材的勾选状态，返回翻转后的状态；没有打开的选择或食材不在清单中时返回 None
    pub fn toggle(&mut self, item: &str) -> Option<bool> {
        let selection = self.current.as_mut()?;
        if !selection.items.iter().any(|i| i == item) {
            return None;
        }
        if selection.chosen.remove(item) {
            Some(false)
        } else {
            selection.chosen.insert(item.to_string());
            Some(true)
        }
    }

    /// 关闭选择，不提交
    pub fn close(&mut self) -> Option<Selection> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }
}
