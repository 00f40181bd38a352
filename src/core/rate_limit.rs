// ─── Rate Limiter ───
// Global single-slot throttle shared by every registry call.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::core::error::{PackerError, PackerResult};

/// Default registry budget (Modrinth allows 300 requests per minute).
pub const DEFAULT_CALLS_PER_MINUTE: u32 = 280;

const NANOS_PER_MINUTE: u64 = 60_000_000_000;

/// Grants at most one call per `60s / calls_per_minute`,
/// across all callers. Not a token bucket: no bursts.
pub struct RateLimiter {
    min_interval: Duration,
    /// Timestamp of the previous grant. The lock is held while waiting,
    /// which is what serializes concurrent callers.
    last_grant: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(calls_per_minute: u32) -> Self {
        // Rounded up so that N grants never take less than N/C minutes.
        let calls = u64::from(calls_per_minute.max(1));
        Self {
            min_interval: Duration::from_nanos(NANOS_PER_MINUTE.div_ceil(calls)),
            last_grant: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Suspend until the minimum interval since the previous grant has elapsed,
    /// then stamp a new grant. No fairness among waiters.
    pub async fn acquire(&self) {
        let mut last = self.last_grant.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Like [`acquire`](Self::acquire) but gives up once `cancel` fires.
    /// A cancelled wait does not stamp a grant.
    pub async fn acquire_or_cancel(&self, cancel: &CancellationToken) -> PackerResult<()> {
        if cancel.is_cancelled() {
            return Err(PackerError::Cancelled);
        }
        tokio::select! {
            _ = cancel.cancelled() => Err(PackerError::Cancelled),
            _ = self.acquire() => Ok(()),
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_CALLS_PER_MINUTE)
    }
}
