//! 会话构建器：统一的会话初始化逻辑
//!
//! 按配置组装槽位存储、上游客户端与库存后端；测试或嵌入方可用 with_* 注入自己的实现。
//! build() 在控制器启动后从意图信箱取出一次性启动意图并交给控制器。

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::assistant::{IntentMailbox, SendOutcome};
use crate::config::{api_key_from_env, AppConfig};
use crate::core::{SessionConfig, SessionController, SessionDeps};
use crate::inventory::{InventorySink, MemoryInventory, RestInventorySink};
use crate::llm::{FunctionClient, LlmClient, MockLlmClient, OpenAiClient};
use crate::memory::{FileSlotStore, MemorySlotStore, SlotStore};

/// 根据 [llm] 配置创建上游客户端；缺少必要参数时退回 Mock
pub(crate) fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    let api_key = api_key_from_env(&cfg.llm.api_key_env);

    match (provider.as_str(), cfg.llm.endpoint.as_deref()) {
        ("function", Some(endpoint)) => {
            tracing::info!("Using assistant function at {}", endpoint);
            Arc::new(FunctionClient::new(endpoint, api_key))
        }
        ("openai", base) => {
            tracing::info!("Using OpenAI-compatible LLM ({})", cfg.llm.model);
            Arc::new(OpenAiClient::new(base, &cfg.llm.model, api_key.as_deref()))
        }
        ("mock", _) => {
            tracing::info!("Using Mock LLM");
            Arc::new(MockLlmClient::new())
        }
        _ => {
            tracing::warn!(
                "LLM provider '{}' unknown or missing endpoint, using Mock LLM",
                cfg.llm.provider
            );
            Arc::new(MockLlmClient::new())
        }
    }
}

/// 会话构建器
pub struct SessionBuilder {
    config: AppConfig,
    slots: Option<Arc<dyn SlotStore>>,
    llm: Option<Arc<dyn LlmClient>>,
    inventory: Option<Arc<dyn InventorySink>>,
}

impl SessionBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            slots: None,
            llm: None,
            inventory: None,
        }
    }

    pub fn with_slots(mut self, slots: Arc<dyn SlotStore>) -> Self {
        self.slots = Some(slots);
        self
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_inventory(mut self, inventory: Arc<dyn InventorySink>) -> Self {
        self.inventory = Some(inventory);
        self
    }

    /// 槽位存储：配置了 storage.dir 时落盘，否则只在内存中
    pub fn build_slots(&self) -> Arc<dyn SlotStore> {
        if let Some(slots) = &self.slots {
            return slots.clone();
        }
        match &self.config.storage.dir {
            Some(dir) => {
                tracing::info!("Session slots stored in {}", dir.display());
                Arc::new(FileSlotStore::new(dir))
            }
            None => {
                tracing::info!("No storage dir configured, session slots kept in memory");
                Arc::new(MemorySlotStore::new())
            }
        }
    }

    pub fn build_llm(&self) -> Arc<dyn LlmClient> {
        match &self.llm {
            Some(llm) => llm.clone(),
            None => create_llm_from_config(&self.config),
        }
    }

    /// 库存后端：rest 需要 endpoint，缺失时退回内存实现
    pub fn build_inventory(&self) -> Arc<dyn InventorySink> {
        if let Some(inventory) = &self.inventory {
            return inventory.clone();
        }
        let inv = &self.config.inventory;
        match (inv.provider.to_lowercase().as_str(), inv.endpoint.as_deref()) {
            ("rest", Some(endpoint)) => {
                tracing::info!("Using REST inventory at {}", endpoint);
                Arc::new(RestInventorySink::new(
                    endpoint,
                    api_key_from_env(&inv.api_key_env),
                ))
            }
            ("memory", _) => Arc::new(MemoryInventory::new()),
            _ => {
                tracing::warn!(
                    "Inventory provider '{}' unknown or missing endpoint, using in-memory inventory",
                    inv.provider
                );
                Arc::new(MemoryInventory::new())
            }
        }
    }

    /// 启动控制器，并消费信箱中的启动意图（若有）
    ///
    /// 返回的 JoinHandle 是自动开始的发送任务。
    pub async fn build(self) -> (SessionController, Option<JoinHandle<SendOutcome>>) {
        let slots = self.build_slots();
        let deps = SessionDeps {
            slots: slots.clone(),
            llm: self.build_llm(),
            inventory: self.build_inventory(),
        };
        let controller = SessionController::start(SessionConfig::from(&self.config), deps).await;

        let auto_start = match IntentMailbox::new(slots).take().await {
            Some(intent) => controller.auto_start(intent),
            None => None,
        };
        (controller, auto_start)
    }
}

/// 便捷函数：从默认路径加载配置并创建 SessionBuilder
pub fn create_session_builder(config_path: Option<PathBuf>) -> SessionBuilder {
    let config = crate::config::load_config(config_path).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });
    SessionBuilder::new(config)
}
