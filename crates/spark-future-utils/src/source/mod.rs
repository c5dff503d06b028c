//! 完成源适配。
//!
//! # 教案式说明
//! - **意图（Why）**：拉取式 Future 需要有人持续轮询才能终结；把“派生一个观察任务，等待结果后调用回调”
//!   封装成 [`OnExecutor`]，任意 Future 都能以 [`CompletionSource`] 的身份接入失败观察。
//! - **逻辑（How）**：[`Spawner`] 抽象执行器的“提交分离任务”能力；观察任务仅 `await` 原 Future
//!   并把输出转换为 [`Completion`]，不改变结果本身；Future 在轮询中 panic 时转换为
//!   [`Completion::Panicked`]，而不是让观察任务悄无声息地消失。
//! - **契约（What）**：观察器本身不创建线程，所有调度都交给调用方提供的执行器。

use std::{future::Future, panic::AssertUnwindSafe, sync::Arc};

use futures::{
    FutureExt,
    executor::{LocalSpawner, ThreadPool},
    future::BoxFuture,
    task::SpawnExt,
};

use crate::{
    completion::{Completion, CompletionSource},
    error::RegistrationError,
};

#[cfg(feature = "tokio")]
mod tokio_handles;

/// 执行器的分离任务提交能力。
///
/// # 契约说明（What）
/// - `spawn_detached` 必须立即返回，不得等待任务完成；
/// - 任务被拒绝时返回 [`RegistrationError`]，且任务不会被执行；
/// - 执行器只在注册调用内被借用，因此不要求 `Send`，`LocalSpawner` 这类线程本地执行器同样可用。
pub trait Spawner {
    /// 提交一个无需回收句柄的任务。
    fn spawn_detached(&self, task: BoxFuture<'static, ()>) -> Result<(), RegistrationError>;
}

impl<S> Spawner for &S
where
    S: Spawner + ?Sized,
{
    fn spawn_detached(&self, task: BoxFuture<'static, ()>) -> Result<(), RegistrationError> {
        (**self).spawn_detached(task)
    }
}

impl<S> Spawner for Arc<S>
where
    S: Spawner + ?Sized,
{
    fn spawn_detached(&self, task: BoxFuture<'static, ()>) -> Result<(), RegistrationError> {
        (**self).spawn_detached(task)
    }
}

impl Spawner for ThreadPool {
    fn spawn_detached(&self, task: BoxFuture<'static, ()>) -> Result<(), RegistrationError> {
        self.spawn(task).map_err(Into::into)
    }
}

impl Spawner for LocalSpawner {
    fn spawn_detached(&self, task: BoxFuture<'static, ()>) -> Result<(), RegistrationError> {
        self.spawn(task).map_err(Into::into)
    }
}

/// 把 Future 与执行器绑定成完成源。
///
/// # 契约说明（What）
/// - `future` 的输出必须是 `Result<T, E>`；`Ok` 映射为 [`Completion::Success`]，`Err` 映射为
///   [`Completion::Failure`]；轮询 `future` 时发生的 panic 映射为 [`Completion::Panicked`]；
/// - 注册时将观察任务提交给 `spawner`，提交失败则同步返回错误；
/// - 多路观察请先将 Future 包装为 `futures::future::Shared`，再为每个观察者克隆一份。
#[derive(Debug)]
pub struct OnExecutor<F, S> {
    future: F,
    spawner: S,
}

impl<F, S> OnExecutor<F, S> {
    /// 绑定 `future` 与 `spawner`，此时尚未派生任何任务。
    pub fn new(future: F, spawner: S) -> Self {
        Self { future, spawner }
    }
}

/// [`OnExecutor::new`] 的函数形式。
pub fn on_executor<F, S>(future: F, spawner: S) -> OnExecutor<F, S> {
    OnExecutor::new(future, spawner)
}

impl<F, S, T, E> CompletionSource for OnExecutor<F, S>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    S: Spawner,
{
    type Output = T;
    type Error = E;

    fn register_completion<C>(self, continuation: C) -> Result<(), RegistrationError>
    where
        C: FnOnce(Completion<T, E>) + Send + 'static,
    {
        let OnExecutor { future, spawner } = self;
        spawner.spawn_detached(Box::pin(async move {
            let completion = match AssertUnwindSafe(future).catch_unwind().await {
                Ok(result) => Completion::from(result),
                Err(payload) => Completion::from_panic(payload),
            };
            continuation(completion);
        }))
    }
}
