use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use futures::{
    FutureExt,
    channel::oneshot,
    executor::{LocalPool, ThreadPool},
    future,
};
use spark_future_utils::{
    FailureObserver, IfFailExt, LogSink, RecordKind, RecordingLogSink, if_fail, if_fail_with,
    on_executor, warn_if_fail,
};

use super::support::{MetricsUnavailable, NetworkError};

/// 端到端场景：网络调用超时，指标动作自身不可用。
///
/// # 目标（Why）
/// - 复现典型的“丢弃句柄但关心失败”用法，验证动作执行一次、日志汇记录原始超时错误。
#[test]
fn network_timeout_with_failing_metrics_hook() {
    let mut pool = LocalPool::new();
    let spawner = pool.spawner();
    let sink = Arc::new(RecordingLogSink::new());
    let attempts = Arc::new(AtomicUsize::new(0));

    let (tx, rx) = oneshot::channel::<Result<String, NetworkError>>();
    let network_call = rx.map(|delivered| delivered.unwrap_or(Err(NetworkError::ConnectionTimeout)));

    let counter = Arc::clone(&attempts);
    if_fail_with(
        on_executor(network_call, &spawner),
        move |error| {
            assert_eq!(*error, NetworkError::ConnectionTimeout);
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(MetricsUnavailable)
        },
        sink.clone() as Arc<dyn LogSink>,
    )
    .expect("注册不应失败");

    pool.run_until_stalled();
    assert_eq!(attempts.load(Ordering::SeqCst), 0, "结果未终结前动作不得执行");

    tx.send(Err(NetworkError::ConnectionTimeout))
        .expect("接收端仍在等待");
    pool.run_until_stalled();

    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    let records = sink.take();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, RecordKind::ActionFailed);
    assert_eq!(records[0].cause.as_deref(), Some("ConnectionTimeout"));
}

/// `Shared` 句柄的多个克隆各自观察到同一失败。
#[test]
fn shared_future_feeds_every_observer() {
    let mut pool = LocalPool::new();
    let spawner = pool.spawner();
    let (tx, rx) = oneshot::channel::<Result<(), NetworkError>>();
    let shared = rx
        .map(|delivered| delivered.unwrap_or(Err(NetworkError::ConnectionTimeout)))
        .boxed()
        .shared();
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let counter = Arc::clone(&calls);
        if_fail(on_executor(shared.clone(), &spawner), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .expect("注册不应失败");
    }

    tx.send(Err(NetworkError::ConnectionTimeout))
        .expect("接收端仍在等待");
    pool.run_until_stalled();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

/// 观察不改变结果：其他消费者仍拿到原值。
#[test]
fn observation_does_not_alter_result_for_other_consumers() {
    let mut pool = LocalPool::new();
    let spawner = pool.spawner();
    let shared = future::ready(Err::<u8, _>(NetworkError::ConnectionTimeout)).shared();

    if_fail(on_executor(shared.clone(), &spawner), |_| {}).expect("注册不应失败");
    pool.run_until_stalled();

    assert_eq!(
        pool.run_until(shared),
        Err(NetworkError::ConnectionTimeout)
    );
}

/// 动作在线程池工作线程上运行，调用线程无需驱动执行器。
#[test]
fn action_runs_on_thread_pool_worker() {
    let pool = ThreadPool::builder()
        .pool_size(2)
        .create()
        .expect("线程池应可创建");
    let (done_tx, done_rx) = oneshot::channel();

    if_fail(
        on_executor(future::ready(Err::<(), _>(NetworkError::ConnectionTimeout)), &pool),
        move |error| {
            let _ = done_tx.send((error.clone(), std::thread::current().id()));
        },
    )
    .expect("注册不应失败");

    let (error, worker) = futures::executor::block_on(done_rx).expect("动作应被调用");
    assert_eq!(error, NetworkError::ConnectionTimeout);
    assert_ne!(worker, std::thread::current().id());
}

/// `warn_if_fail` 只记录，不需要调用方提供动作；记录经由观察器的日志汇写出。
#[test]
fn warn_if_fail_records_failure_through_sink() {
    let mut pool = LocalPool::new();
    let spawner = pool.spawner();
    let sink = Arc::new(RecordingLogSink::new());
    let observer = FailureObserver::new(sink.clone());

    observer
        .warn_if_fail(on_executor(
            future::ready(Err::<(), _>(NetworkError::ConnectionTimeout)),
            &spawner,
        ))
        .expect("注册不应失败");
    assert!(sink.is_empty(), "注册本身不得同步等待结果");

    pool.run_until_stalled();
    let records = sink.take();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, RecordKind::OperationFailed);
    assert_eq!(records[0].cause.as_deref(), Some("ConnectionTimeout"));
}

/// 自由函数 `warn_if_fail` 在成功路径上同样静默，且注册即返回。
#[test]
fn warn_if_fail_accepts_any_debug_error() {
    let mut pool = LocalPool::new();
    let spawner = pool.spawner();

    warn_if_fail(on_executor(future::ready(Ok::<_, NetworkError>(())), &spawner))
        .expect("注册不应失败");
    on_executor(future::ready(Err::<(), _>(MetricsUnavailable)), &spawner)
        .warn_if_fail()
        .expect("注册不应失败");
    pool.run_until_stalled();
}
