//! Time-related abstractions.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{interval, Duration, MissedTickBehavior};
//!
//! async fn example() {
//!     let mut ticker = interval(Duration::from_millis(200));
//!     ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
//!     ticker.tick().await; // first tick completes immediately
//!     ticker.tick().await; // then one tick per period
//! }
//! ```

pub use tokio::time::{
    interval, sleep, sleep_until, timeout, Interval, MissedTickBehavior, Sleep, Timeout,
};

pub use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Returns the current time as milliseconds since UNIX_EPOCH.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
