//! 请求派发：对上游补全调用的单飞保护
//!
//! 同一时刻至多一个请求在途，重叠调用直接拒绝而不排队。用户消息在往返前先行追加，
//! 往返结束后恰好追加一条助手消息（成功为解析后的回复，失败为错误提示）。
//! 上游调用受超时与取消令牌约束，任何失败都不会抛给调用方。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::assistant::parse_reply;
use crate::llm::{LlmClient, LlmError};
use crate::memory::Message;

/// 时间线追加端（由控制器实现：追加、保存、广播事件）
#[async_trait]
pub trait TimelineSink: Send + Sync {
    async fn append(&self, message: Message);
}

/// 一次 send 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// 提示词为空白，什么也没做
    Ignored,
    /// 已有请求在途，被拒绝
    Rejected,
    /// 续接请求在触发前被取消，什么也没发
    Cancelled,
    /// 追加了助手回复
    Replied { message_id: String },
    /// 上游失败，追加了错误消息
    Failed { error: LlmError },
}

/// 在途标记守卫：离开作用域（含提前返回与 future 被丢弃）时清除
pub struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct RequestDispatcher {
    llm: Arc<dyn LlmClient>,
    in_flight: AtomicBool,
    timeout: Duration,
}

impl RequestDispatcher {
    pub fn new(llm: Arc<dyn LlmClient>, timeout: Duration) -> Self {
        Self {
            llm,
            in_flight: AtomicBool::new(false),
            timeout,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// 占住单飞标记；持有期间 send 一律被拒绝
    pub fn try_acquire(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(&self.in_flight))
    }

    async fn call_upstream(&self, prompt: &str, cancel: &CancellationToken) -> Result<String, LlmError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(LlmError::Cancelled),
            result = tokio::time::timeout(self.timeout, self.llm.complete(prompt)) => {
                result.unwrap_or(Err(LlmError::Timeout(self.timeout)))
            }
        }
    }

    /// 发送一条用户提示词
    pub async fn send(
        &self,
        prompt: &str,
        sink: &dyn TimelineSink,
        cancel: &CancellationToken,
    ) -> SendOutcome {
        if prompt.trim().is_empty() {
            return SendOutcome::Ignored;
        }
        let Some(_guard) = self.try_acquire() else {
            tracing::debug!("Request already in flight, rejecting send");
            return SendOutcome::Rejected;
        };

        sink.append(Message::user(prompt)).await;

        match self.call_upstream(prompt, cancel).await {
            Ok(raw) => {
                let parsed = parse_reply(&raw);
                let reply =
                    Message::assistant_with_ingredients(parsed.display_text, parsed.ingredients);
                let message_id = reply.id.clone();
                sink.append(reply).await;
                SendOutcome::Replied { message_id }
            }
            Err(error) => {
                tracing::warn!("Upstream completion failed: {}", error);
                sink.append(Message::connection_error()).await;
                SendOutcome::Failed { error }
            }
        }
    }
}
