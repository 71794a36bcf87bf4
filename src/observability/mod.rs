//! 可观测性

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 安装日志：默认 info，可通过 RUST_LOG 覆盖；日志写到 stderr，不干扰 stdout 上的对话输出
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
