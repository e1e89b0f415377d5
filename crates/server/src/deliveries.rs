use std::sync::{Arc, Mutex};
use std::time::Duration;

use kudos_slack::delivery::KudosDelivery;
use kudos_slack::events::EventContext;
use kudos_slack::submission::KudosPost;
use tokio::task::JoinSet;
use tracing::warn;

/// Runs deliveries off the request path and lets shutdown wait for the ones
/// still in flight.
#[derive(Clone)]
pub struct DeliveryQueue {
    delivery: Arc<KudosDelivery>,
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl DeliveryQueue {
    pub fn new(delivery: KudosDelivery) -> Self {
        Self { delivery: Arc::new(delivery), tasks: Arc::new(Mutex::new(JoinSet::new())) }
    }

    pub fn spawn(&self, post: KudosPost, ctx: EventContext) {
        let delivery = self.delivery.clone();
        let mut tasks = match self.tasks.lock() {
            Ok(tasks) => tasks,
            Err(poisoned) => poisoned.into_inner(),
        };
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            delivery.deliver(&post, &ctx).await;
        });
    }

    /// Waits up to `timeout` for in-flight deliveries. Returns `false` when
    /// some were still running at the deadline.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let mut tasks = {
            let mut guard = match self.tasks.lock() {
                Ok(tasks) => tasks,
                Err(poisoned) => poisoned.into_inner(),
            };
            std::mem::take(&mut *guard)
        };
        let pending = tasks.len();

        let drained = tokio::time::timeout(timeout, async {
            while tasks.join_next().await.is_some() {}
        })
        .await
        .is_ok();

        if !drained {
            warn!(
                event_name = "system.server.deliveries_abandoned",
                correlation_id = "shutdown",
                pending,
                "shutdown deadline reached with deliveries in flight"
            );
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use kudos_core::{InMemoryRecognitionLog, Recognition};
    use kudos_slack::delivery::KudosDelivery;
    use kudos_slack::events::EventContext;
    use kudos_slack::submission::KudosPost;

    use super::DeliveryQueue;
    use crate::testing::RecordingSlackApi;

    #[tokio::test]
    async fn drain_waits_for_spawned_deliveries() {
        let api = Arc::new(RecordingSlackApi::default());
        let log = Arc::new(InMemoryRecognitionLog::default());
        let queue = DeliveryQueue::new(KudosDelivery::new(api.clone(), log.clone()));

        queue.spawn(
            KudosPost {
                channel_id: "C1".to_owned(),
                sender_id: "U1".to_owned(),
                recipient_id: "U2".to_owned(),
                recognition: Recognition::fallback(),
                content: "thanks".to_owned(),
                text: "kudos text".to_owned(),
            },
            EventContext::default(),
        );

        assert!(queue.drain(Duration::from_secs(5)).await);
        assert_eq!(api.messages(), vec![("C1".to_owned(), "kudos text".to_owned())]);
        assert_eq!(log.records().len(), 1);
    }

    #[tokio::test]
    async fn draining_an_idle_queue_is_immediate() {
        let queue = DeliveryQueue::new(KudosDelivery::new(
            Arc::new(RecordingSlackApi::default()),
            Arc::new(InMemoryRecognitionLog::default()),
        ));
        assert!(queue.drain(Duration::from_millis(10)).await);
    }
}
