//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 失败观察本身从不向调用方抛出异步错误；唯一同步可见的错误来自“注册回调”这一步，
//!   它意味着调用方的使用方式有误（执行器已关闭、不在运行时内）。
//!
//! ## 设计要求（What）
//! - 错误类型派生 `thiserror::Error`，保持与 `std::error::Error` 生态兼容；
//! - 变体保持粗粒度，仅区分调用方可采取不同补救措施的情形。

use thiserror::Error;

/// 注册完成回调时的失败原因。
///
/// # 教案式说明
/// - **意图 (Why)**：与异步失败严格区分：异步失败被交给失败动作或日志汇，注册失败则同步返回，
///   让调用方立即发现误用。
/// - **契约 (What)**：返回该错误时，回调保证不会被调用，失败动作也不会执行。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum RegistrationError {
    /// 执行器拒绝接收观察任务，通常是已经关闭。
    #[error("executor rejected the completion watcher: {detail}")]
    ExecutorShutdown { detail: String },

    /// 当前线程不在任何异步运行时上下文中，无法派生观察任务。
    #[error("no async runtime available to register the completion watcher")]
    NoRuntime,
}

impl From<futures::task::SpawnError> for RegistrationError {
    fn from(err: futures::task::SpawnError) -> Self {
        RegistrationError::ExecutorShutdown {
            detail: err.to_string(),
        }
    }
}
