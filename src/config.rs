//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `NOURISH__*` 覆盖（双下划线表示嵌套，如 `NOURISH__LLM__PROVIDER=function`）。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub session: SessionSection,
    pub storage: StorageSection,
    pub llm: LlmSection,
    pub inventory: InventorySection,
}

/// [app] 段：应用名与库存记录归属
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    pub name: Option<String>,
    /// 写入库存记录的归属用户（身份认证由外部负责，这里只是引用）
    #[serde(default = "default_owner_ref")]
    pub owner_ref: String,
}

fn default_owner_ref() -> String {
    "local-user".to_string()
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            owner_ref: default_owner_ref(),
        }
    }
}

/// [session] 段：保鲜期、归档容量、续接延迟与超时
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSection {
    /// 持久化时间线的保鲜期（秒）
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_archive_capacity")]
    pub archive_capacity: usize,
    /// 入库成功后发送续接提示词前的延迟（毫秒）
    #[serde(default = "default_continuation_delay_ms")]
    pub continuation_delay_ms: u64,
    /// 单次上游请求超时（秒）
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// 关闭时等待后台任务的时间（秒）
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_ttl_secs() -> u64 {
    2 * 60 * 60
}

fn default_archive_capacity() -> usize {
    20
}

fn default_continuation_delay_ms() -> u64 {
    500
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_shutdown_timeout_secs() -> u64 {
    5
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            archive_capacity: default_archive_capacity(),
            continuation_delay_ms: default_continuation_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl SessionSection {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn continuation_delay(&self) -> Duration {
        Duration::from_millis(self.continuation_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// [storage] 段：槽位目录；未设置时只保存在内存中
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageSection {
    pub dir: Option<PathBuf>,
}

/// [llm] 段：上游后端选择
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：mock / function / openai
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    /// function 后端的完整地址，或 openai 后端的 base_url
    pub endpoint: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// 存放 API Key 的环境变量名
    #[serde(default = "default_llm_key_env")]
    pub api_key_env: String,
}

fn default_llm_provider() -> String {
    "mock".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_key_env() -> String {
    "NOURISH_LLM_API_KEY".to_string()
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            endpoint: None,
            model: default_model(),
            api_key_env: default_llm_key_env(),
        }
    }
}

/// [inventory] 段：库存后端选择
#[derive(Debug, Clone, Deserialize)]
pub struct InventorySection {
    /// 后端：memory / rest
    #[serde(default = "default_inventory_provider")]
    pub provider: String,
    /// rest 后端的表地址
    pub endpoint: Option<String>,
    #[serde(default = "default_inventory_key_env")]
    pub api_key_env: String,
}

fn default_inventory_provider() -> String {
    "memory".to_string()
}

fn default_inventory_key_env() -> String {
    "NOURISH_INVENTORY_API_KEY".to_string()
}

impl Default for InventorySection {
    fn default() -> Self {
        Self {
            provider: default_inventory_provider(),
            endpoint: None,
            api_key_env: default_inventory_key_env(),
        }
    }
}

/// 读取 key_env 指向的环境变量（空值视为未设置）
pub fn api_key_from_env(key_env: &str) -> Option<String> {
    std::env::var(key_env).ok().filter(|k| !k.trim().is_empty())
}

/// 从 config 目录加载配置，环境变量 NOURISH__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 NOURISH__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("NOURISH")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
