//! Fixed-interval scheduler with a single cancellation point: the sleep
//! between runs. A run that has started always completes.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct PeriodicTask {
    interval: Duration,
    shutdown: CancellationToken,
}

impl PeriodicTask {
    pub fn new(interval: Duration, shutdown: CancellationToken) -> Self {
        Self { interval, shutdown }
    }

    /// Call `work` now and then once per interval until the shutdown token is
    /// cancelled. Returns the number of completed runs.
    pub async fn run<F, Fut>(&self, mut work: F) -> u64
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut runs = 0u64;

        loop {
            if self.shutdown.is_cancelled() {
                tracing::info!("Shutdown requested, exiting...");
                break;
            }

            work().await;
            runs += 1;

            if self.shutdown.is_cancelled() {
                tracing::info!("Shutdown requested, exiting...");
                break;
            }
            tracing::info!(seconds = self.interval.as_secs(), "Sleeping until next sync");
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Shutdown during wait, exiting...");
                    break;
                }
            }
        }

        runs
    }
}
