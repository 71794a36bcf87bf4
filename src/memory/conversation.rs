//! 会话时间线：消息记录与仅追加的时间线
//!
//! 时间线是会话状态的基本单位：新建时只含一条助手问候，之后只允许追加或整体替换；
//! 唯一的原地修改是把某条带食材清单的消息标记为已入库。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 新会话的种子问候语
pub const GREETING: &str =
    "Hello! I'm your AI Chef. I can help you find recipes. What are we cooking today?";

/// 上游调用失败时追加的固定回复
pub const CONNECTION_ERROR_TEXT: &str = "Connection error. Please try again.";

/// 消息角色
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// 单条消息
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_error: bool,
    /// 助手回复中解析出的食材清单；`None` 表示回复里没有清单，`Some(vec![])` 表示有标记但为空
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    #[serde(default)]
    pub committed: bool,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Message {
    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            role,
            text: text.into(),
            created_at: Utc::now(),
            is_error: false,
            ingredients: None,
            committed: false,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// 带食材清单的助手回复
    pub fn assistant_with_ingredients(
        text: impl Into<String>,
        ingredients: Option<Vec<String>>,
    ) -> Self {
        Self {
            ingredients,
            ..Self::new(Role::Assistant, text)
        }
    }

    /// 上游失败时的错误回复（is_error = true）
    pub fn connection_error() -> Self {
        Self {
            is_error: true,
            ..Self::new(Role::Assistant, CONNECTION_ERROR_TEXT)
        }
    }

    pub fn greeting() -> Self {
        Self::assistant(GREETING)
    }

    /// 是否有可供选择入库的食材（非空清单）
    pub fn has_ingredients(&self) -> bool {
        self.ingredients.as_ref().is_some_and(|items| !items.is_empty())
    }
}

/// 时间线：按插入顺序排列的消息序列
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    messages: Vec<Message>,
}

impl Timeline {
    /// 新建时间线，仅含一条种子问候
    pub fn new() -> Self {
        Self {
            messages: vec![Message::greeting()],
        }
    }

    pub fn push(&mut self, msg: Message) {
        self.messages.push(msg);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// 标记消息已入库；消息不存在或没有非空清单时返回 false（保持 committed ⇒ 清单非空）
    pub fn mark_committed(&mut self, id: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(msg) if msg.has_ingredients() => {
                msg.committed = true;
                true
            }
            _ => false,
        }
    }

    /// 是否有种子问候之外的内容（reset 时据此决定是否归档）
    pub fn has_history(&self) -> bool {
        self.messages.len() > 1
    }

    /// 第一条用户消息的文本（历史列表标题）
    pub fn first_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.text.as_str())
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}
