//! 方法调用形式的失败观察。

use std::{fmt, sync::Arc};

use crate::{
    completion::CompletionSource,
    error::RegistrationError,
    observer::{ActionOutcome, FailureObserver},
    sink::LogSink,
};

/// 为所有 [`CompletionSource`] 提供 `.if_fail(..)` 链式调用。
///
/// # 契约说明（What）
/// - 语义与 [`crate::if_fail`] / [`crate::if_fail_with`] / [`crate::warn_if_fail`] 完全一致，仅是调用形式不同；
/// - 通过 blanket impl 自动覆盖所有完成源，调用方无需手动实现。
pub trait IfFailExt: CompletionSource {
    /// 见 [`crate::if_fail`]。
    fn if_fail<F, R>(self, action: F) -> Result<(), RegistrationError>
    where
        Self::Error: fmt::Debug,
        F: FnOnce(&Self::Error) -> R + Send + 'static,
        R: ActionOutcome,
    {
        crate::observer::if_fail(self, action)
    }

    /// 见 [`crate::if_fail_with`]。
    fn if_fail_with<F, R>(
        self,
        action: F,
        sink: Arc<dyn LogSink>,
    ) -> Result<(), RegistrationError>
    where
        Self::Error: fmt::Debug,
        F: FnOnce(&Self::Error) -> R + Send + 'static,
        R: ActionOutcome,
    {
        FailureObserver::new(sink).observe(self, action)
    }

    /// 见 [`crate::warn_if_fail`]。
    fn warn_if_fail(self) -> Result<(), RegistrationError>
    where
        Self::Error: fmt::Debug,
    {
        crate::observer::warn_if_fail(self)
    }
}

impl<S> IfFailExt for S where S: CompletionSource {}
