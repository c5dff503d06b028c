//! 观察器配置。
//!
//! # 教案式说明
//! - **意图（Why）**：宿主通常在自身配置文件中统一管理日志文案与策略，因此配置结构实现
//!   `serde::Deserialize`，可直接嵌入 TOML/JSON 等配置树；
//! - **契约（What）**：所有字段均有默认值，缺省字段按 [`ObserverConfig::default`] 补齐。

use std::borrow::Cow;

use serde::Deserialize;

/// 失败动作本身失败时写入日志汇的默认文案。
pub const DEFAULT_FAILURE_MESSAGE: &str = "failed to process error";

/// 结果被取消时的处理策略。
///
/// # 契约说明（What）
/// - `Ignore`：不调用失败动作，也不写日志汇，仅输出一条 `tracing::debug!` 事件；
/// - `Warn`：向日志汇写入一条 [`RecordKind::Cancelled`](crate::RecordKind::Cancelled) 记录。
///
/// # 风险提示（Trade-offs）
/// - 取消不携带错误值，因此无论哪种策略都不会路由到失败动作。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationPolicy {
    #[default]
    Ignore,
    Warn,
}

/// [`FailureObserver`](crate::FailureObserver) 的配置。
///
/// # 契约说明（What）
/// - `message`：失败动作失败时 WARN 记录的文案，默认 [`DEFAULT_FAILURE_MESSAGE`]；
/// - `cancellation`：取消终态的处理策略，默认 [`CancellationPolicy::Ignore`]。
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    pub message: Cow<'static, str>,
    pub cancellation: CancellationPolicy,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            message: Cow::Borrowed(DEFAULT_FAILURE_MESSAGE),
            cancellation: CancellationPolicy::default(),
        }
    }
}

impl ObserverConfig {
    /// 替换 WARN 记录文案。
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// 替换取消策略。
    pub fn with_cancellation(mut self, policy: CancellationPolicy) -> Self {
        self.cancellation = policy;
        self
    }
}
