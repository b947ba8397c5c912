// src/retry.rs

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::driver::{DriverError, ErrorKind};

/// Bounded retry for operations that fail transiently against the remote
/// interface. Applied explicitly at call sites, never as ambient behavior.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    /// Error kinds worth another attempt; everything else propagates at once.
    pub retry_on: &'static [ErrorKind],
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, delay: Duration, retry_on: &'static [ErrorKind]) -> Self {
        Self {
            max_attempts,
            delay,
            retry_on,
        }
    }

    /// Run `op` up to `max_attempts` times. The last error is propagated
    /// unchanged once attempts are exhausted.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, DriverError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DriverError>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    warn!(
                        %label,
                        attempt,
                        max_attempts = self.max_attempts,
                        %err,
                        "attempt failed"
                    );
                    if attempt >= self.max_attempts || !self.retry_on.contains(&err.kind()) {
                        return Err(err);
                    }
                    sleep(self.delay).await;
                }
            }
        }
    }
}
