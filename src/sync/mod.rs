//! Change propagation between sessions.
//!
//! Mutations publish the collection they touched; subscribers re-run the matching
//! list operation and replace their copy wholesale. Nothing is patched incrementally.

pub mod cache;
pub mod subscriber;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub use cache::{LedgerCache, LedgerSnapshot};
pub use subscriber::{run_subscriber, Backoff};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Cars,
    Drivers,
    Trips,
    FuelRecords,
    ServiceOrders,
}

impl Topic {
    pub const ALL: [Topic; 5] = [
        Topic::Cars,
        Topic::Drivers,
        Topic::Trips,
        Topic::FuelRecords,
        Topic::ServiceOrders,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Cars => "cars",
            Topic::Drivers => "drivers",
            Topic::Trips => "trips",
            Topic::FuelRecords => "fuel_records",
            Topic::ServiceOrders => "service_orders",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub topic: Topic,
    pub at: DateTime<Utc>,
}

/// Fan-out of change events to every live subscriber.
#[derive(Clone)]
pub struct SyncNotifier {
    sender: broadcast::Sender<ChangeEvent>,
}

impl SyncNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Announces that `topic` changed. Having nobody listening is not an error.
    pub fn publish(&self, topic: Topic) {
        let event = ChangeEvent {
            topic,
            at: Utc::now(),
        };

        match self.sender.send(event) {
            Ok(receivers) => tracing::debug!(topic = %topic, receivers, "Change published"),
            Err(_) => tracing::debug!(topic = %topic, "Change published with no subscribers"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SyncNotifier {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_subscriber_sees_the_change() {
        let notifier = SyncNotifier::new(8);
        let mut first = notifier.subscribe();
        let mut second = notifier.subscribe();

        notifier.publish(Topic::Trips);

        assert_eq!(first.recv().await.unwrap().topic, Topic::Trips);
        assert_eq!(second.recv().await.unwrap().topic, Topic::Trips);
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let notifier = SyncNotifier::new(8);
        notifier.publish(Topic::Cars);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags() {
        let notifier = SyncNotifier::new(2);
        let mut receiver = notifier.subscribe();

        for _ in 0..5 {
            notifier.publish(Topic::FuelRecords);
        }

        assert!(matches!(
            receiver.recv().await,
            Err(broadcast::error::RecvError::Lagged(3))
        ));
    }

    #[test]
    fn test_topic_names() {
        let names: Vec<&str> = Topic::ALL.iter().map(Topic::as_str).collect();
        assert_eq!(names, vec!["cars", "drivers", "trips", "fuel_records", "service_orders"]);
        assert_eq!(serde_json::to_string(&Topic::FuelRecords).unwrap(), "\"fuel_records\"");
    }
}
