//! Tokio 句柄适配，仅在启用 `tokio` 特性时编译。
//!
//! # 教案式说明
//! - **意图（Why）**：Tokio 的 `JoinHandle` 与 `oneshot::Receiver` 是最常被“顺手丢弃”的异步句柄，
//!   为它们直接实现 [`CompletionSource`]，调用方无需手工组装 [`OnExecutor`](super::OnExecutor)。
//! - **逻辑（How）**：注册时从 `Handle::try_current()` 取得当前运行时并派生观察任务；
//!   任务 panic 映射为 [`Completion::Panicked`]，任务被 abort 与 `RecvError`（发送端被丢弃）映射为
//!   [`Completion::Cancelled`]。
//! - **契约（What）**：不在运行时上下文中调用时返回 [`RegistrationError::NoRuntime`]。

use futures::future::BoxFuture;
use tokio::{
    runtime::Handle,
    sync::oneshot,
    task::{JoinError, JoinHandle},
};

use super::Spawner;
use crate::{
    completion::{Completion, CompletionSource},
    error::RegistrationError,
};

impl Spawner for Handle {
    fn spawn_detached(&self, task: BoxFuture<'static, ()>) -> Result<(), RegistrationError> {
        // 观察任务本身只负责调用回调，唯一刻意丢弃 JoinHandle 的位置。
        drop(self.spawn(task));
        Ok(())
    }
}

fn current_runtime() -> Result<Handle, RegistrationError> {
    Handle::try_current().map_err(|_| RegistrationError::NoRuntime)
}

fn join_outcome<T, E>(outcome: Result<Result<T, E>, JoinError>) -> Completion<T, E> {
    match outcome {
        Ok(result) => result.into(),
        Err(err) => match err.try_into_panic() {
            Ok(payload) => Completion::from_panic(payload),
            Err(err) => {
                tracing::debug!(
                    cancelled = err.is_cancelled(),
                    "observed task ended without a result"
                );
                Completion::Cancelled
            }
        },
    }
}

impl<T, E> CompletionSource for JoinHandle<Result<T, E>>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = T;
    type Error = E;

    fn register_completion<C>(self, continuation: C) -> Result<(), RegistrationError>
    where
        C: FnOnce(Completion<T, E>) + Send + 'static,
    {
        let runtime = current_runtime()?;
        runtime.spawn_detached(Box::pin(async move {
            continuation(join_outcome(self.await));
        }))
    }
}

impl<T, E> CompletionSource for oneshot::Receiver<Result<T, E>>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = T;
    type Error = E;

    fn register_completion<C>(self, continuation: C) -> Result<(), RegistrationError>
    where
        C: FnOnce(Completion<T, E>) + Send + 'static,
    {
        let runtime = current_runtime()?;
        runtime.spawn_detached(Box::pin(async move {
            let completion = match self.await {
                Ok(result) => result.into(),
                Err(_) => Completion::Cancelled,
            };
            continuation(completion);
        }))
    }
}
