//! `if_fail` 集成测试入口。
//!
//! # 教案级注释概览
//! - **核心目标 (Why)**：从公开 API 出发验证失败观察的六条性质：成功静默、失败恰好一次、双重失败收敛、
//!   注册不阻塞、先终结后注册不丢通知、多观察者互不干扰。
//! - **结构说明 (How)**：
//!   - `support`：回调列表式 Promise 测试替身，注册时若已终结则同步补发；
//!   - `manual_promise`：基于测试替身逐条验证性质；
//!   - `executor`：基于 `LocalPool` + `OnExecutor`/`Shared` 验证执行器驱动路径与端到端场景。

mod executor;
