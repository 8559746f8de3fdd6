//! Synchronization primitives.
//!
//! All primitives are async-aware and `Send + Sync`. The cancellation token
//! is the single signal threaded through a pipeline run: any stage may check
//! it between units of work.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let child = token.child_token();
//! token.cancel();
//! assert!(child.is_cancelled());
//! ```

pub use tokio::sync::{broadcast, mpsc, oneshot, Mutex, MutexGuard, RwLock, Semaphore};

pub use tokio_util::sync::{CancellationToken, DropGuard, WaitForCancellationFuture};
