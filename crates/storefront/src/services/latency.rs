//! Simulated network latency.

use std::time::Duration;

/// Delay applied before mocked login, signup and CEP lookups.
///
/// Zero by default, so tests run without sleeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latency(Duration);

impl Latency {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self(delay)
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.0
    }

    /// Sleep for the configured delay.
    pub async fn simulate(&self) {
        if !self.0.is_zero() {
            tokio::time::sleep(self.0).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_latency_returns_immediately() {
        let latency = Latency::default();
        let started = std::time::Instant::now();
        latency.simulate().await;
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_latency_sleeps_for_delay() {
        let latency = Latency::new(Duration::from_millis(20));
        let started = std::time::Instant::now();
        latency.simulate().await;
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
