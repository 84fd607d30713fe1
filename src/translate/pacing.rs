use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::info;

/// Waits between outbound requests so the provider does not throttle us
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Pause after a request
    async fn pause(&self);

    /// Longer pause after a whole translation round
    async fn settle(&self, min_secs: u64, max_secs: u64);
}

/// Sleeps a uniformly random number of whole seconds
pub struct RandomPacer {
    min_secs: u64,
    max_secs: u64,
}

impl RandomPacer {
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min_secs: min_secs.min(max_secs),
            max_secs: max_secs.max(min_secs),
        }
    }

    async fn sleep_between(min_secs: u64, max_secs: u64) {
        let secs = jitter(min_secs, max_secs);
        if secs == 0 {
            return;
        }
        info!("Sleeping for {}s", secs);
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }
}

fn jitter(min_secs: u64, max_secs: u64) -> u64 {
    let (low, high) = (min_secs.min(max_secs), min_secs.max(max_secs));
    rand::thread_rng().gen_range(low..=high)
}

#[async_trait]
impl Pacer for RandomPacer {
    async fn pause(&self) {
        Self::sleep_between(self.min_secs, self.max_secs).await;
    }

    async fn settle(&self, min_secs: u64, max_secs: u64) {
        Self::sleep_between(min_secs, max_secs).await;
    }
}

/// Never waits; for offline runs and tests
pub struct NoPause;

#[async_trait]
impl Pacer for NoPause {
    async fn pause(&self) {}

    async fn settle(&self, _min_secs: u64, _max_secs: u64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_stays_in_bounds() {
        for _ in 0..200 {
            let secs = jitter(1, 5);
            assert!((1..=5).contains(&secs));
        }
        assert_eq!(jitter(3, 3), 3);
        assert!((2..=4).contains(&jitter(4, 2)));
    }

    #[tokio::test]
    async fn test_zero_pause_returns_immediately() {
        let pacer = RandomPacer::new(0, 0);
        let started = std::time::Instant::now();
        pacer.pause().await;
        pacer.settle(0, 0).await;
        assert!(started.elapsed() < Duration::from_millis(500));
    }
}
