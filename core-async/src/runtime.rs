//! Runtime utilities that abstract over the underlying async executor.

pub use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};

/// Runs the provided future to completion on a fresh multi-threaded runtime.
///
/// Used by `#[core_async::main]` and `#[core_async::test]`. Spawned lookup
/// tasks run on the worker pool, so tests observe real concurrency.
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .expect("core_async::runtime::block_on: failed to build Tokio runtime")
        .block_on(future)
}
