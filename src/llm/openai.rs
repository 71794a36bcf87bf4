//! OpenAI 兼容 API 客户端
//!
//! 通过 async_openai 调用任意 OpenAI 兼容端点（可配置 base_url）。系统提示词要求模型在回复末尾
//! 按分隔协议附上食材清单，协议常量与 ReplyParser 共用。

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::assistant::{INGREDIENTS_CLOSE, INGREDIENTS_OPEN};
use crate::llm::{LlmClient, LlmError};

/// 默认系统提示词：厨师角色 + 食材分隔协议
pub fn chef_system_prompt() -> String {
    format!(
        "You are a friendly AI Chef. Help the user pick recipes and guide them step by step. \
         Whenever you recommend a dish, end your reply with `{open} ` followed by a comma-separated \
         list of ingredient names and close it with `{close}`. Never put commas inside an ingredient name.",
        open = INGREDIENTS_OPEN,
        close = INGREDIENTS_CLOSE,
    )
}

/// OpenAI 兼容客户端：system + 单条 user 消息，取首条 choice 的 content
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    system_prompt: String,
}

impl OpenAiClient {
    pub fn new(base_url: Option<&str>, model: &str, api_key: Option<&str>) -> Self {
        let api_key = api_key
            .map(String::from)
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_else(|| "sk-placeholder".to_string());

        let config = if let Some(url) = base_url {
            OpenAIConfig::new()
                .with_api_base(url)
                .with_api_key(api_key)
        } else {
            OpenAIConfig::new().with_api_key(api_key)
        };

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
            system_prompt: chef_system_prompt(),
        }
    }

    fn build_messages(&self, prompt: &str) -> Result<Vec<ChatCompletionRequestMessage>, LlmError> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(self.system_prompt.clone())
            .build()
            .map_err(|e| LlmError::Request(e.to_string()))?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.to_string())
            .build()
            .map_err(|e| LlmError::Request(e.to_string()))?;
        Ok(vec![
            ChatCompletionRequestMessage::System(system),
            ChatCompletionRequestMessage::User(user),
        ])
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(self.build_messages(prompt)?)
            .build()
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| LlmError::ApiError(e.to_string()))?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                "Completion used {} prompt / {} completion tokens",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| LlmError::InvalidResponse("empty choices".to_string()))
    }
}
