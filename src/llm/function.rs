//! 托管函数客户端
//!
//! 调用部署在后端的 `assistant` 函数：`POST {endpoint}`，请求体 `{"prompt": "..."}`，
//! 响应体 `{"reply": "..."}`。提示词拼装与分隔协议由函数侧负责。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::llm::{LlmClient, LlmError};

#[derive(Serialize)]
struct FunctionRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct FunctionResponse {
    reply: Option<String>,
    error: Option<String>,
}

/// 托管函数客户端
#[derive(Debug, Clone)]
pub struct FunctionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl FunctionClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

/// 解析函数响应体
fn extract_reply(body: &str) -> Result<String, LlmError> {
    let parsed: FunctionResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("{}: {}", e, body)))?;
    if let Some(err) = parsed.error {
        return Err(LlmError::ApiError(err));
    }
    parsed
        .reply
        .ok_or_else(|| LlmError::InvalidResponse("missing `reply` field".to_string()))
}

#[async_trait]
impl LlmClient for FunctionClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .json(&FunctionRequest { prompt });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(LlmError::ApiError(format!("{}: {}", status, body)));
        }
        extract_reply(&body)
    }
}
