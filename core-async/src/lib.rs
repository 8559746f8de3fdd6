//! Runtime abstraction layer for the spinlist workspace.
//!
//! All `core-*` and `provider-*` crates depend on this crate instead of naming
//! tokio directly. Keeping the executor behind one crate means the pipeline
//! code only ever sees `core_async::task`, `core_async::time` and
//! `core_async::sync`.
//!
//! # Modules
//!
//! - `task`: Task spawning and join handles
//! - `time`: Sleep, intervals and timeouts
//! - `sync`: Locks, channels and cancellation tokens
//! - `runtime`: Blocking entry point used by the attribute macros
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let handle = task::spawn(async {
//!         sleep(Duration::from_millis(5)).await;
//!         42
//!     });
//!     assert_eq!(handle.await.unwrap(), 42);
//! }
//! ```

// Re-export the async entry-point/test macros so downstream crates never need
// direct Tokio dependencies.
pub use core_async_macros::{main, test};

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};

/// Waits on multiple concurrent branches, returning when the first completes.
///
/// Re-exported so cancellation-aware loops can race a token against a timer
/// without a direct tokio dependency.
pub use tokio::select;
