use std::time::Duration;

use crate::infrastructure::broker::EventBroker;

/// Periodically sweeps the broker registry for subscriptions whose
/// consumer went away without closing. Publish already removes dead
/// entries lazily; this covers quiet periods with no publishes.
pub struct BrokerJanitor {
    broker: EventBroker,
    interval_seconds: u64,
}

impl BrokerJanitor {
    pub fn new(broker: EventBroker, interval_seconds: u64) -> Self {
        Self {
            broker,
            interval_seconds: interval_seconds.max(5),
        }
    }

    pub async fn start(&self) {
        loop {
            tokio::time::sleep(Duration::from_secs(self.interval_seconds)).await;
            let removed = self.broker.prune();
            if removed > 0 {
                tracing::debug!(removed, "pruned dead subscriptions");
            }
        }
    }
}
