//! Global atomic counters for snpsim.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] at the end of a stage to emit current values as a
//! single `tracing::info!` event.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    mutations_generated: AtomicU64,
    oracle_calls: AtomicU64,
    oracle_failures: AtomicU64,
    checkpoints_written: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            mutations_generated: AtomicU64::new(0),
            oracle_calls: AtomicU64::new(0),
            oracle_failures: AtomicU64::new(0),
            checkpoints_written: AtomicU64::new(0),
        }
    }

    pub fn add_mutations(&self, n: u64) {
        self.mutations_generated.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "mutations_generated", "counter incremented");
    }

    pub fn inc_oracle_calls(&self) {
        self.oracle_calls.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "oracle_calls", "counter incremented");
    }

    pub fn inc_oracle_failures(&self) {
        self.oracle_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "oracle_failures", "counter incremented");
    }

    pub fn inc_checkpoints(&self) {
        self.checkpoints_written.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "checkpoints_written", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            mutations_generated = self.mutations_generated(),
            oracle_calls = self.oracle_calls(),
            oracle_failures = self.oracle_failures(),
            checkpoints_written = self.checkpoints_written(),
        );
    }

    pub fn mutations_generated(&self) -> u64 {
        self.mutations_generated.load(Ordering::Relaxed)
    }

    pub fn oracle_calls(&self) -> u64 {
        self.oracle_calls.load(Ordering::Relaxed)
    }

    pub fn oracle_failures(&self) -> u64 {
        self.oracle_failures.load(Ordering::Relaxed)
    }

    pub fn checkpoints_written(&self) -> u64 {
        self.checkpoints_written.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.mutations_generated.store(0, Ordering::Relaxed);
        self.oracle_calls.store(0, Ordering::Relaxed);
        self.oracle_failures.store(0, Ordering::Relaxed);
        self.checkpoints_written.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        m.add_mutations(5);
        assert_eq!(m.mutations_generated(), 5);

        m.inc_oracle_calls();
        m.inc_oracle_calls();
        m.inc_oracle_failures();
        assert_eq!(m.oracle_calls(), 2);
        assert_eq!(m.oracle_failures(), 1);

        m.inc_checkpoints();
        assert_eq!(m.checkpoints_written(), 1);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.add_mutations(3);
        m.inc_oracle_calls();
        m.inc_oracle_failures();
        m.inc_checkpoints();
        m.reset();
        assert_eq!(m.mutations_generated(), 0);
        assert_eq!(m.oracle_calls(), 0);
        assert_eq!(m.oracle_failures(), 0);
        assert_eq!(m.checkpoints_written(), 0);
    }
}
