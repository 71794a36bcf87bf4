//! 一次性启动意图：「开始做某道菜」
//!
//! 意图在外部边界被原子地取出并清除（IntentMailbox::take），之后以值的形式交给控制器；
//! StartCooking 不可克隆，消费一次即失效，重复挂载或重新加载都不会再次触发。

use std::sync::Arc;

use crate::assistant::start_cooking_prompt;
use crate::core::StorageError;
use crate::memory::{SlotStore, INTENT_SLOT};

/// 已从边界取出的启动意图令牌
#[derive(Debug, PartialEq, Eq)]
pub struct StartCooking {
    dish: String,
}

impl StartCooking {
    /// 菜名为空白时返回 None
    pub fn new(dish: impl Into<String>) -> Option<Self> {
        let dish = dish.into();
        let trimmed = dish.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            dish: trimmed.to_string(),
        })
    }

    pub fn dish(&self) -> &str {
        &self.dish
    }

    /// 消费令牌，得到要发送的提示词
    pub fn into_prompt(self) -> String {
        start_cooking_prompt(&self.dish)
    }
}

/// 意图信箱：外部（如菜谱页）投递，控制器创建时取出
pub struct IntentMailbox {
    slots: Arc<dyn SlotStore>,
}

impl IntentMailbox {
    pub fn new(slots: Arc<dyn SlotStore>) -> Self {
        Self { slots }
    }

    /// 投递意图，覆盖尚未被取走的旧意图
    pub async fn post(&self, dish: &str) -> Result<(), StorageError> {
        self.slots.set(INTENT_SLOT, dish).await
    }

    /// 原子地取出并清除意图；读失败时按「没有意图」处理
    pub async fn take(&self) -> Option<StartCooking> {
        match self.slots.take(INTENT_SLOT).await {
            Ok(Some(dish)) => StartCooking::new(dish),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to take start-cooking intent: {}", e);
                None
            }
        }
    }
}
