//! `tracing` Subscriber 的便捷安装入口，仅在启用 `subscriber` 特性时编译。
//!
//! # 教案式说明
//! - **意图（Why）**：[`TracingLogSink`](crate::TracingLogSink) 只产生事件；未自建 Subscriber 的宿主
//!   （命令行工具、集成测试）需要一个最小入口把事件打印出来。
//! - **逻辑（How）**：`fmt` 层 + `EnvFilter`，过滤规则读取 `RUST_LOG`，缺省为 `info`。
//! - **契约（What）**：全局 Subscriber 只能设置一次；已存在时返回 [`InstallError::SubscriberAlreadySet`]。

use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt};

/// 安装 Subscriber 失败的原因。
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("global tracing subscriber already set: {0}")]
    SubscriberAlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// 安装全局 `fmt` Subscriber。
pub fn install_fmt_subscriber() -> Result<(), InstallError> {
    let subscriber = tracing_subscriber::registry()
        .with(build_env_filter())
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
