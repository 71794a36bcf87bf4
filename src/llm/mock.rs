//! Mock 补全客户端（用于测试与离线演示，无需 API）
//!
//! 按脚本依次返回预置回复；脚本用完后返回一段带食材清单的固定回复。
//! 可选「闸门」：每次调用先等一个许可，便于测试在途请求。

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::llm::{LlmClient, LlmError};

/// 脚本用完后的默认回复
pub fn default_mock_reply(prompt: &str) -> String {
    format!(
        "Mock chef here. You said: \"{}\". A simple fried rice works well.\n\
         +++INGREDIENTS: Rice, Egg, Spring onion, Soy sauce +++",
        prompt.trim()
    )
}

/// 放行被闸住的调用
#[derive(Debug, Clone)]
pub struct MockGate {
    permits: Arc<Semaphore>,
}

impl MockGate {
    /// 放行一个调用
    pub fn release(&self) {
        self.permits.add_permits(1);
    }
}

/// Mock 客户端：脚本回复 + 记录收到的提示词
#[derive(Debug, Default)]
pub struct MockLlmClient {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置回复序列
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let client = Self::new();
        for reply in replies {
            client.push_reply(reply);
        }
        client
    }

    /// 每次调用需要 gate.release() 放行
    pub fn gated() -> (Self, MockGate) {
        let permits = Arc::new(Semaphore::new(0));
        let client = Self {
            gate: Some(permits.clone()),
            ..Self::default()
        };
        (client, MockGate { permits })
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Ok(reply.into()));
        }
    }

    pub fn push_error(&self, error: LlmError) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Err(error));
        }
    }

    /// 已收到的提示词（按调用顺序）
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|_| LlmError::Request("mock gate closed".to_string()))?
                .forget();
        }

        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        next.unwrap_or_else(|| Ok(default_mock_reply(prompt)))
    }
}
