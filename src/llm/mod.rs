//! LLM 层：上游补全客户端抽象与实现（托管函数 / OpenAI 兼容 / Mock）

pub mod function;
pub mod mock;
pub mod openai;
pub mod traits;

pub use function::FunctionClient;
pub use mock::{default_mock_reply, MockGate, MockLlmClient};
pub use openai::{chef_system_prompt, OpenAiClient};
pub use traits::{LlmClient, LlmError};
