// Poller constants (no magic values)

/// Wait before the first status check (2s)
pub const DEFAULT_INITIAL_INTERVAL_MS: u64 = 2000;

/// Ceiling on the wait before jitter is added (30s)
pub const DEFAULT_MAX_INTERVAL_MS: u64 = 30_000;

/// Multiplicative backoff growth per status check
pub const DEFAULT_GROWTH_FACTOR: f64 = 2.0;

/// Exclusive upper bound of the additive jitter (1s)
pub const DEFAULT_MAX_JITTER_MS: u64 = 1000;

/// Wall-clock budget from upload start to the last status check (90s)
pub const DEFAULT_TIMEOUT_MS: u64 = 90_000;

/// Consecutive failed status checks tolerated (0 = first failure aborts)
pub const DEFAULT_MAX_STATUS_ERRORS: u32 = 0;
