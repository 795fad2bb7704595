//! Nullable clock — deterministic time for testing.

use std::sync::Mutex;
use vigil_types::Timestamp;

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to. Shared freely across threads so
/// concurrency tests can read a stable `now`.
pub struct NullClock {
    current: Mutex<u64>,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Mutex::new(initial_secs),
        }
    }

    /// Get the current time.
    pub fn now(&self) -> Timestamp {
        Timestamp::new(*self.current.lock().expect("null clock lock poisoned"))
    }

    /// Advance time by a number of seconds.
    pub fn advance(&self, secs: u64) {
        *self.current.lock().expect("null clock lock poisoned") += secs;
    }

    /// Set the time to a specific value.
    pub fn set(&self, secs: u64) {
        *self.current.lock().expect("null clock lock poisoned") = secs;
    }
}
