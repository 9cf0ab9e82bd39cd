// Jitter Source Port (for deterministic testing)

use rand::Rng;

/// Jitter source interface (allows fixed jitter in tests)
pub trait JitterSource: Send + Sync {
    /// Uniform draw in `[0, max_ms)`, 0 when `max_ms` is 0
    fn jitter_ms(&self, max_ms: u64) -> u64;
}

/// Thread-local RNG per draw (production), safe across concurrent pollers
pub struct UniformJitter;

impl JitterSource for UniformJitter {
    fn jitter_ms(&self, max_ms: u64) -> u64 {
        if max_ms == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..max_ms)
    }
}

/// Always the same jitter, clamped below `max_ms`
pub struct FixedJitter(pub u64);

impl JitterSource for FixedJitter {
    fn jitter_ms(&self, max_ms: u64) -> u64 {
        if max_ms == 0 {
            return 0;
        }
        self.0.min(max_ms - 1)
    }
}
