//! 上游补全服务抽象
//!
//! 对会话核心而言上游是一个黑盒：给一段提示词，返回一段原始回复文本（可能带食材分隔协议）。

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// 上游调用错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request cancelled")]
    Cancelled,
}

/// 补全客户端 trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 单轮补全：提示词 -> 原始回复
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}
