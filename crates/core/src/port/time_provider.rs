// Time Provider Port (for testability)

use tokio::time::Instant;

/// Time provider interface (allows controlled time in tests)
pub trait TimeProvider: Send + Sync {
    /// Milliseconds elapsed on this provider's clock
    fn now_millis(&self) -> i64;
}

/// Monotonic provider (production)
///
/// Backed by `tokio::time::Instant`, so it follows paused/advanced time in
/// `#[tokio::test(start_paused = true)]` tests.
pub struct MonotonicTimeProvider {
    origin: Instant,
}

impl MonotonicTimeProvider {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for MonotonicTimeProvider {
    fn now_millis(&self) -> i64 {
        self.origin.elapsed().as_millis() as i64
    }
}
