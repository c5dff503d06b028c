//! 日志汇（Log Sink）契约与内置实现。
//!
//! # 设计缘起（Why）
//! - 失败动作自身失败时，错误已无处可传：回调运行在未知线程上，可能是与本业务无关的共享执行器线程。
//!   日志汇是最后的兜底上报通道。
//! - 与框架其余部分一致，默认实现桥接到 `tracing`；测试与诊断场景使用 [`RecordingLogSink`] 在内存中捕获。
//!
//! # 契约约束（What）
//! - **前置条件**：实现必须 `Send + Sync`，可从任意线程调用；
//! - **后置条件**：`warn` 不得 panic，也不得阻塞调用线程过久。

use std::{fmt, sync::Arc};

use spin::Mutex;

/// 观察记录的种类。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// 失败动作返回了 `Err`。
    ActionFailed,
    /// 失败动作发生 panic。
    ActionPanicked,
    /// 未挂动作，失败本身即是要上报的内容（[`crate::warn_if_fail`]）。
    OperationFailed,
    /// 生产方在给出结果前 panic；与取消策略无关，总会上报。
    ProducerPanicked,
    /// 结果以取消终结且策略要求告警。
    Cancelled,
}

impl RecordKind {
    /// 稳定的小写标识，便于作为结构化字段输出。
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::ActionFailed => "action_failed",
            RecordKind::ActionPanicked => "action_panicked",
            RecordKind::OperationFailed => "operation_failed",
            RecordKind::ProducerPanicked => "producer_panicked",
            RecordKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 写入日志汇的单条 WARN 记录。
///
/// # 教案式说明
/// - **意图（Why）**：记录携带的是**原始**异步错误，而非失败动作产生的次生错误；次生错误仅通过
///   `kind` 间接体现，不再继续上报。
/// - **契约（What）**：
///   - `message`：动作失败时来自 [`ObserverConfig::message`](crate::ObserverConfig)，其余种类使用固定文案；
///   - `cause`：原始错误；[`RecordKind::ProducerPanicked`] 时为 panic 文本，[`RecordKind::Cancelled`]
///     时为 `None`；
///   - 记录只持有引用，提交给 [`LogSink::warn`] 后即失效。
#[derive(Clone, Copy)]
pub struct FailureRecord<'a> {
    pub message: &'a str,
    pub cause: Option<&'a dyn fmt::Debug>,
    pub kind: RecordKind,
}

impl fmt::Debug for FailureRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailureRecord")
            .field("message", &self.message)
            .field("cause", &self.cause)
            .field("kind", &self.kind)
            .finish()
    }
}

/// 兜底日志通道。
pub trait LogSink: Send + Sync + 'static {
    /// 写入一条 WARN 级别记录。
    fn warn(&self, record: &FailureRecord<'_>);
}

impl<S> LogSink for Arc<S>
where
    S: LogSink + ?Sized,
{
    fn warn(&self, record: &FailureRecord<'_>) {
        (**self).warn(record);
    }
}

/// 桥接到 `tracing` 的默认日志汇。
///
/// 事件以本模块路径为 target，携带 `error` 与 `kind` 两个结构化字段。
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn warn(&self, record: &FailureRecord<'_>) {
        match record.cause {
            Some(cause) => tracing::warn!(
                error = ?cause,
                kind = %record.kind,
                "{}",
                record.message
            ),
            None => tracing::warn!(kind = %record.kind, "{}", record.message),
        }
    }
}

/// 被 [`RecordingLogSink`] 捕获的拥有所有权的记录。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedRecord {
    pub message: String,
    /// 原始错误的 `Debug` 渲染。
    pub cause: Option<String>,
    pub kind: RecordKind,
}

/// 在内存中捕获记录的日志汇。
///
/// # 契约说明（What）
/// - 使用 `spin::Mutex` 保护内部向量，不存在锁中毒，可从任意线程写入；
/// - [`RecordingLogSink::take`] 取走并清空已捕获记录。
#[derive(Debug, Default)]
pub struct RecordingLogSink {
    records: Mutex<Vec<CapturedRecord>>,
}

impl RecordingLogSink {
    /// 构造不含任何记录的日志汇。
    pub fn new() -> Self {
        Self::default()
    }

    /// 取走全部已捕获记录。
    pub fn take(&self) -> Vec<CapturedRecord> {
        core::mem::take(&mut *self.records.lock())
    }

    /// 当前已捕获的记录数。
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for RecordingLogSink {
    fn warn(&self, record: &FailureRecord<'_>) {
        let captured = CapturedRecord {
            message: record.message.to_owned(),
            cause: record.cause.map(|cause| format!("{cause:?}")),
            kind: record.kind,
        };
        self.records.lock().push(captured);
    }
}
