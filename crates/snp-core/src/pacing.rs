//! Spacing between oracle calls.
//!
//! The classifier calls [`Pacing::pause`] between consecutive requests.
//! The delay is a fixed policy; it never looks at latency, status codes or
//! response headers.

use std::time::Duration;

use async_trait::async_trait;

/// Strategy invoked between two oracle calls.
#[async_trait]
pub trait Pacing: Send + Sync {
    async fn pause(&self);
}

/// Unconditional sleep of a fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(Duration);

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        FixedDelay(delay)
    }

    pub fn delay(&self) -> Duration {
        self.0
    }
}

#[async_trait]
impl Pacing for FixedDelay {
    async fn pause(&self) {
        if !self.0.is_zero() {
            tokio::time::sleep(self.0).await;
        }
    }
}

/// No spacing at all (tests, local fakes).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Pacing for NoDelay {
    async fn pause(&self) {}
}
