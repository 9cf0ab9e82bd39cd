// Backoff schedule for change set status polling
use crate::application::poller::PollConfig;
use crate::port::JitterSource;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Per-poll backoff state, owned by one `run_to_completion` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffState {
    interval_ms: u64,
    pre_jitter_ms: u64,
    step: u32,
}

impl BackoffState {
    /// Wait to apply before the next status check (jitter included)
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Same interval without its jitter
    pub fn pre_jitter_ms(&self) -> u64 {
        self.pre_jitter_ms
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Number of times the schedule has been advanced
    pub fn step(&self) -> u32 {
        self.step
    }
}

/// Exponential backoff with additive jitter
///
/// Schedule:
/// next = min(floor(interval * growth_factor), max_interval) + uniform[0, max_jitter)
///
/// `interval` is the previous wait including its jitter, and the jitter is
/// added after clamping, so a wait may exceed `max_interval` by less than
/// `max_jitter`.
pub struct BackoffPolicy {
    initial_interval_ms: u64,
    max_interval_ms: u64,
    growth_factor: f64,
    max_jitter_ms: u64,
    jitter: Arc<dyn JitterSource>,
}

impl BackoffPolicy {
    pub fn new(config: &PollConfig, jitter: Arc<dyn JitterSource>) -> Self {
        Self {
            initial_interval_ms: config.initial_interval_ms,
            max_interval_ms: config.max_interval_ms,
            growth_factor: config.growth_factor,
            max_jitter_ms: config.max_jitter_ms,
            jitter,
        }
    }

    /// State before the first status check (no jitter on the first wait)
    pub fn start(&self) -> BackoffState {
        BackoffState {
            interval_ms: self.initial_interval_ms,
            pre_jitter_ms: self.initial_interval_ms,
            step: 0,
        }
    }

    /// Grow and clamp an interval (multiply in f64, truncate toward zero)
    pub fn grow(&self, interval_ms: u64) -> u64 {
        // f64 -> u64 casts saturate, so huge intervals clamp instead of wrapping
        let grown = (interval_ms as f64 * self.growth_factor).floor() as u64;
        grown.min(self.max_interval_ms)
    }

    /// Advance to the next wait, drawing fresh jitter
    pub fn advance(&self, state: &mut BackoffState) {
        let pre_jitter_ms = self.grow(state.interval_ms);
        let jitter_ms = self.jitter.jitter_ms(self.max_jitter_ms);

        state.pre_jitter_ms = pre_jitter_ms;
        state.interval_ms = pre_jitter_ms.saturating_add(jitter_ms);
        state.step += 1;

        debug!(
            step = state.step,
            pre_jitter_ms = pre_jitter_ms,
            jitter_ms = jitter_ms,
            interval_ms = state.interval_ms,
            "Backoff advanced"
        );
    }
}
