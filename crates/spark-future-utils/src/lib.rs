#![deny(unsafe_code)]
#![doc = "spark-future-utils: 只观察异步结果失败通道的 fire-and-forget 工具。"]
#![doc = ""]
#![doc = "== 使用场景 =="]
#![doc = "调用方不关心异步操作的成功值时，往往直接丢弃句柄，导致失败被静默吞掉。"]
#![doc = "本 crate 提供唯一受认可的“丢弃但仍观察失败”入口：[`if_fail`] 在结果失败时恰好调用一次动作，"]
#![doc = "动作自身失败（返回 `Err` 或 panic）时仅向 [`LogSink`] 写一条引用原始错误的 WARN 记录。"]
#![doc = ""]
#![doc = "== 组成 =="]
#![doc = "- [`CompletionSource`]：\"可注册完成回调\" 能力的抽象，解耦具体的 Future/Promise 实现；"]
#![doc = "- [`OnExecutor`]：把任意 `Future<Output = Result<T, E>>` 与 [`Spawner`] 组合成完成源；"]
#![doc = "- [`FailureObserver`]：携带 [`ObserverConfig`] 与日志汇的观察器，`if_fail` 系列函数均委托于它；"]
#![doc = "- 启用 `tokio` 特性后，`tokio::task::JoinHandle` 与 `tokio::sync::oneshot::Receiver` 直接可用。"]

pub mod completion;
pub mod config;
pub mod error;
pub mod ext;
#[cfg(feature = "subscriber")]
pub mod logging;
pub mod observer;
pub mod sink;
pub mod source;

pub use completion::{Completion, CompletionSource};
pub use config::{CancellationPolicy, ObserverConfig};
pub use error::RegistrationError;
pub use ext::IfFailExt;
pub use observer::{ActionOutcome, FailureObserver, if_fail, if_fail_with, warn_if_fail};
pub use sink::{
    CapturedRecord, FailureRecord, LogSink, RecordKind, RecordingLogSink, TracingLogSink,
};
pub use source::{OnExecutor, Spawner, on_executor};
