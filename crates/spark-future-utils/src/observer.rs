//! 失败观察器。
//!
//! # 设计缘起（Why）
//! - 不关心成功值的调用方倾向于直接丢弃异步句柄，使得生产方的失败被静默吞掉；这里提供唯一受认可的
//!   “丢弃成功值、仍观察失败”的入口。
//! - 失败动作运行在解析结果的线程上，可能是与业务无关的共享执行器线程；动作自身的失败必须被完全吸收，
//!   不能拖垮该线程。
//!
//! # 总体结构（How）
//! - [`FailureObserver`] 持有日志汇与配置，[`FailureObserver::observe`] 向完成源注册回调后立即返回；
//! - 回调在 `Failure` 终态下同步调用失败动作，借助 `catch_unwind` 把 `Err` 与 panic 两类次生失败
//!   统一归并为一条引用原始错误的 WARN 记录；
//! - 生产方 panic（[`Completion::Panicked`]）没有错误值可交给动作，总是写一条记录；
//! - [`if_fail`]、[`if_fail_with`]、[`warn_if_fail`] 是面向常见场景的函数入口。
//!
//! # 契约约束（What）
//! - 失败动作至多调用一次，且只在失败路径上调用；
//! - 注册之外不会向调用方返回任何错误，也不会等待结果终结；
//! - 仅当“结果失败且动作失败”时写一次日志汇；生产方 panic 总写一次，取消终态按策略决定。
//!
//! # 风险与权衡（Trade-offs）
//! - 以 `panic = "abort"` 编译时 panic 无法被捕获，进程会直接终止；
//! - 动作 panic 时默认 panic hook 仍会向 stderr 打印一次信息。

use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, OnceLock},
};

use crate::{
    completion::{Completion, CompletionSource},
    config::{CancellationPolicy, ObserverConfig},
    error::RegistrationError,
    sink::{FailureRecord, LogSink, RecordKind, TracingLogSink},
};

/// 取消终态告警时使用的文案。
const CANCELLED_MESSAGE: &str = "observed asynchronous result was cancelled";
/// 生产方 panic 时使用的文案。
const PANICKED_MESSAGE: &str = "observed asynchronous producer panicked";
/// [`FailureObserver::warn_if_fail`] 记录失败时使用的文案。
const OPERATION_FAILED_MESSAGE: &str = "asynchronous operation failed";

/// 失败动作的返回值约定。
///
/// # 契约说明（What）
/// - `()`：动作不可失败；
/// - `Result<T, X>`：`Err` 视为次生失败，`X` 本身不会被上报。
///
/// # 风险提示（Trade-offs）
/// - 只会 panic 的闭包（`|_| panic!(..)`、`|_| unreachable!()`）在 edition 2024 下返回类型推断为 `!`，
///   不满足本 Trait；请显式写成 `|_| -> () { panic!(..) }`。
pub trait ActionOutcome {
    /// 动作是否成功完成。
    fn succeeded(self) -> bool;
}

impl ActionOutcome for () {
    fn succeeded(self) -> bool {
        true
    }
}

impl<T, X> ActionOutcome for Result<T, X> {
    fn succeeded(self) -> bool {
        self.is_ok()
    }
}

/// 携带日志汇与配置的失败观察器。
///
/// # 教案式说明
/// - **意图（Why）**：观察本身无状态，但宿主往往需要自定义日志汇或文案；把这两者封装为可克隆的值，
///   便于在组件间共享同一套策略。
/// - **契约（What）**：
///   - 克隆只复制两个 `Arc`；
///   - 每次 `observe` 相互独立，不共享可变数据。
#[derive(Clone)]
pub struct FailureObserver {
    sink: Arc<dyn LogSink>,
    config: Arc<ObserverConfig>,
}

impl fmt::Debug for FailureObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailureObserver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for FailureObserver {
    fn default() -> Self {
        Self::new(Arc::new(TracingLogSink))
    }
}

impl FailureObserver {
    /// 以给定日志汇与默认配置构造观察器。
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            config: Arc::new(ObserverConfig::default()),
        }
    }

    /// 替换配置。
    pub fn with_config(mut self, config: ObserverConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// 当前生效的配置。
    pub fn config(&self) -> &ObserverConfig {
        &self.config
    }

    /// 观察 `source` 的失败通道。
    ///
    /// # 教案式注释
    ///
    /// ## 意图 (Why)
    /// - 调用方明确放弃成功值，只在失败时执行 `action`，例如累加指标或回滚本地状态。
    ///
    /// ## 解析逻辑 (How)
    /// 1. 克隆观察器（两个 `Arc`），连同 `action` 一起移动进回调；
    /// 2. 调用 [`CompletionSource::register_completion`]，立即返回；
    /// 3. 回调触发时按终态分派，详见模块文档。
    ///
    /// ## 契约定义 (What)
    /// - `action`：接收原始错误的引用，可能在任意线程上运行，因此要求 `Send + 'static`；
    /// - 返回：仅在注册失败时返回 [`RegistrationError`]，此时 `action` 不会被调用。
    pub fn observe<S, F, R>(&self, source: S, action: F) -> Result<(), RegistrationError>
    where
        S: CompletionSource,
        S::Error: fmt::Debug,
        F: FnOnce(&S::Error) -> R + Send + 'static,
        R: ActionOutcome,
    {
        let observer = self.clone();
        source.register_completion(move |completion| observer.settle(completion, action))
    }

    /// 不挂动作，仅把失败写入日志汇。
    ///
    /// # 契约说明（What）
    /// - `Failure(e)`：写一条 [`RecordKind::OperationFailed`] 记录，`cause` 为 `e`；
    /// - `Panicked` 与 `Cancelled`：与 [`FailureObserver::observe`] 的处理一致；
    /// - `Success`：静默。
    pub fn warn_if_fail<S>(&self, source: S) -> Result<(), RegistrationError>
    where
        S: CompletionSource,
        S::Error: fmt::Debug,
    {
        let observer = self.clone();
        source.register_completion(move |completion| match completion {
            Completion::Success(_) => {}
            Completion::Failure(error) => observer.sink.warn(&FailureRecord {
                message: OPERATION_FAILED_MESSAGE,
                cause: Some(&error),
                kind: RecordKind::OperationFailed,
            }),
            Completion::Panicked(detail) => observer.report_panic(&detail),
            Completion::Cancelled => observer.report_cancelled(),
        })
    }

    fn settle<T, E, F, R>(&self, completion: Completion<T, E>, action: F)
    where
        E: fmt::Debug,
        F: FnOnce(&E) -> R,
        R: ActionOutcome,
    {
        match completion {
            Completion::Success(_) => {}
            Completion::Failure(error) => {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| action(&error).succeeded()));
                let kind = match outcome {
                    Ok(true) => return,
                    Ok(false) => RecordKind::ActionFailed,
                    Err(_) => RecordKind::ActionPanicked,
                };
                self.sink.warn(&FailureRecord {
                    message: &self.config.message,
                    cause: Some(&error),
                    kind,
                });
            }
            Completion::Panicked(detail) => self.report_panic(&detail),
            Completion::Cancelled => self.report_cancelled(),
        }
    }

    fn report_panic(&self, detail: &str) {
        self.sink.warn(&FailureRecord {
            message: PANICKED_MESSAGE,
            cause: Some(&detail),
            kind: RecordKind::ProducerPanicked,
        });
    }

    fn report_cancelled(&self) {
        match self.config.cancellation {
            CancellationPolicy::Ignore => {
                tracing::debug!("{CANCELLED_MESSAGE}; failure action skipped");
            }
            CancellationPolicy::Warn => self.sink.warn(&FailureRecord {
                message: CANCELLED_MESSAGE,
                cause: None,
                kind: RecordKind::Cancelled,
            }),
        }
    }
}

fn default_observer() -> &'static FailureObserver {
    static DEFAULT: OnceLock<FailureObserver> = OnceLock::new();
    DEFAULT.get_or_init(FailureObserver::default)
}

/// 在 `source` 失败时调用 `action`，次生失败写入 `tracing`。
///
/// 这是丢弃异步句柄时唯一应当使用的入口：成功值被忽略，失败仍然可见。
pub fn if_fail<S, F, R>(source: S, action: F) -> Result<(), RegistrationError>
where
    S: CompletionSource,
    S::Error: fmt::Debug,
    F: FnOnce(&S::Error) -> R + Send + 'static,
    R: ActionOutcome,
{
    default_observer().observe(source, action)
}

/// 与 [`if_fail`] 相同，但次生失败写入调用方提供的日志汇。
pub fn if_fail_with<S, F, R>(
    source: S,
    action: F,
    sink: Arc<dyn LogSink>,
) -> Result<(), RegistrationError>
where
    S: CompletionSource,
    S::Error: fmt::Debug,
    F: FnOnce(&S::Error) -> R + Send + 'static,
    R: ActionOutcome,
{
    FailureObserver::new(sink).observe(source, action)
}

/// 仅把失败写入默认日志汇（`tracing` 的 WARN 事件），不执行其他动作。
///
/// 需要自定义日志汇时使用 [`FailureObserver::warn_if_fail`]。
pub fn warn_if_fail<S>(source: S) -> Result<(), RegistrationError>
where
    S: CompletionSource,
    S::Error: fmt::Debug,
{
    default_observer().warn_if_fail(source)
}
