use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::sync::{ChangeEvent, LedgerCache, Topic};

/// Exponential backoff with up to 10% jitter.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
    pub max_attempts: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(250),
            max: Duration::from_secs(30),
            max_attempts: 6,
        }
    }
}

impl Backoff {
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        let base = self.initial.saturating_mul(factor).min(self.max);
        let jitter_cap = (base.as_millis() / 10) as u64;
        let jitter = if jitter_cap == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_cap)
        };
        base + Duration::from_millis(jitter)
    }
}

/// `None` refreshes every collection.
async fn refresh_with_backoff(cache: &LedgerCache, topic: Option<Topic>, backoff: &Backoff) -> bool {
    for attempt in 0..backoff.max_attempts {
        let result = match topic {
            Some(topic) => cache.refresh(topic).await,
            None => cache.refresh_all().await,
        };

        match result {
            Ok(()) => return true,
            Err(e) => {
                let delay = backoff.delay(attempt);
                tracing::warn!(
                    topic = topic.map(|t| t.as_str()).unwrap_or("all"),
                    attempt,
                    retry_in_ms = delay.as_millis() as u64,
                    error = %e,
                    "Ledger cache refresh failed"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }

    tracing::error!(
        topic = topic.map(|t| t.as_str()).unwrap_or("all"),
        "Giving up on ledger cache refresh until the next change"
    );
    false
}

/// Keeps `cache` in step with the change feed behind `receiver`.
///
/// Starts with a full load. A lagged receiver has missed events, so it reloads
/// everything. Returns once every notifier handle is gone and the feed closes.
pub async fn run_subscriber(
    mut receiver: broadcast::Receiver<ChangeEvent>,
    cache: Arc<LedgerCache>,
    backoff: Backoff,
) {
    refresh_with_backoff(&cache, None, &backoff).await;
    tracing::info!("Ledger cache subscribed to change feed");

    loop {
        match receiver.recv().await {
            Ok(change) => {
                refresh_with_backoff(&cache, Some(change.topic), &backoff).await;
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Change feed lagged, reloading everything");
                refresh_with_backoff(&cache, None, &backoff).await;
            }
            Err(RecvError::Closed) => {
                tracing::info!("Change feed closed, ledger cache subscriber stopping");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_grows_and_is_capped() {
        let backoff = Backoff {
            initial: Duration::from_millis(100),
            max: Duration::from_secs(2),
            max_attempts: 5,
        };

        let first = backoff.delay(0);
        assert!(first >= Duration::from_millis(100) && first <= Duration::from_millis(110));

        let third = backoff.delay(2);
        assert!(third >= Duration::from_millis(400) && third <= Duration::from_millis(440));

        let late = backoff.delay(30);
        assert!(late >= Duration::from_secs(2) && late <= Duration::from_millis(2200));
    }
}
