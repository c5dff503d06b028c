//! 完成回调契约。
//!
//! # 教案式说明
//! - **意图（Why）**：失败观察只依赖“能够注册一次性完成回调”这一能力，而不绑定任何具体的
//!   Future/Promise 类型；因此以 [`CompletionSource`] Trait 表达该能力，执行器适配、Tokio 句柄、
//!   宿主自研的回调式 Promise 均可实现它。
//! - **逻辑（How）**：回调接收 [`Completion`]，其四个终态覆盖成功、失败、生产方 panic，以及
//!   “未产生值也未产生错误”的取消。
//! - **契约（What）**：实现者保证回调恰好触发一次；即便注册时结果已经终结，也必须补发，而不是静默丢失。

use std::any::Any;

use crate::error::RegistrationError;

/// 异步结果的终态。
///
/// # 契约说明（What）
/// - `Success(T)`：结果以成功值终结；
/// - `Failure(E)`：结果以应用错误终结，是失败观察的唯一关注点；
/// - `Panicked(detail)`：生产方在给出结果前 panic，`detail` 为 panic 负载的文本渲染；
/// - `Cancelled`：结果没有给出值也没有给出错误即终结，例如生产方任务被中止或发送端被丢弃。
///
/// # 风险提示（Trade-offs）
/// - `Panicked` 与 `Cancelled` 都没有 `E` 可交给失败动作；前者总会写日志汇，后者由
///   [`CancellationPolicy`](crate::CancellationPolicy) 决定。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion<T, E> {
    Success(T),
    Failure(E),
    Panicked(String),
    Cancelled,
}

impl<T, E> Completion<T, E> {
    /// 是否以失败终结。
    pub fn is_failure(&self) -> bool {
        matches!(self, Completion::Failure(_))
    }

    /// 是否以取消终结。
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Completion::Cancelled)
    }

    /// 生产方是否 panic。
    pub fn is_panicked(&self) -> bool {
        matches!(self, Completion::Panicked(_))
    }

    /// 丢弃成功值，仅保留失败通道。
    pub fn failure(self) -> Option<E> {
        match self {
            Completion::Failure(error) => Some(error),
            Completion::Success(_) | Completion::Panicked(_) | Completion::Cancelled => None,
        }
    }

    /// 以 panic 负载构造 [`Completion::Panicked`]。
    ///
    /// `&str` 与 `String` 负载原样保留，其余类型只记录占位文本。
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let detail = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => (*message).to_owned(),
                Err(_) => "non-string panic payload".to_owned(),
            },
        };
        Completion::Panicked(detail)
    }
}

impl<T, E> From<Result<T, E>> for Completion<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Completion::Success(value),
            Err(error) => Completion::Failure(error),
        }
    }
}

/// 支持注册完成回调的异步结果。
///
/// # 设计背景（Why）
/// - Rust 的 Future 是拉取式的，本身没有“注册回调”的入口；各执行器或 Promise 实现需以不同方式
///   （派生观察任务、回调列表等）补上这一能力。统一为 Trait 后，[`crate::if_fail`] 无需感知差异。
///
/// # 契约说明（What）
/// - `register_completion` 必须是非阻塞的：返回时结果不一定已经终结；
/// - `continuation` 恰好被调用一次，调用线程不作任何保证，可能是注册线程、生产方线程或执行器工作线程；
/// - 注册时结果已终结的，回调仍须触发（可在注册调用内同步执行）；
/// - 返回 `Err` 仅代表注册本身失败（执行器已关闭、不在运行时上下文中等），此时回调不会被调用。
///
/// # 风险提示（Trade-offs）
/// - 方法按值消费 `self`：需要多路观察的句柄应实现 `Clone`（例如 `futures::future::Shared`），
///   由调用方为每个观察者克隆一份。
pub trait CompletionSource: Sized {
    /// 成功值类型。
    type Output;
    /// 失败值类型。
    type Error;

    /// 注册一次性完成回调。
    fn register_completion<C>(self, continuation: C) -> Result<(), RegistrationError>
    where
        C: FnOnce(Completion<Self::Output, Self::Error>) + Send + 'static;
}
