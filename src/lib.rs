//! Nourish - AI 厨房助手会话核心
//!
//! 模块划分：
//! - **assistant**: 回复解析、单飞请求派发、食材选择、入库提交、启动意图
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 会话控制器、构建器、事件、状态投影、会话监管
//! - **inventory**: 库存写入端（内存 / REST）
//! - **llm**: 补全客户端抽象与实现（Mock / HTTP 函数 / OpenAI 兼容）
//! - **memory**: 时间线、槽位存储、带保鲜期的持久化、后台写入、归档

pub mod assistant;
pub mod config;
pub mod core;
pub mod inventory;
pub mod llm;
pub mod memory;
pub mod observability;
