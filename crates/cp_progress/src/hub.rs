use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cp_core::{ProgressEvent, ProgressSink};
use futures::future::join_all;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, error, warn};

use crate::subscriber::{ChannelSubscriber, Subscriber, SubscriberId, DEFAULT_QUEUE_CAPACITY};

#[derive(Default)]
pub struct NotificationHub {
    subscribers: RwLock<HashMap<SubscriberId, Arc<dyn Subscriber>>>,
    next_id: AtomicU64,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, subscriber: Arc<dyn Subscriber>) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().await.insert(id, subscriber);
        debug!(%id, "Subscriber connected");
        id
    }

    /// Register a channel-backed subscriber and hand back its receiving end.
    pub async fn subscribe_channel(&self) -> (SubscriberId, mpsc::Receiver<String>) {
        self.subscribe_channel_with_capacity(DEFAULT_QUEUE_CAPACITY).await
    }

    pub async fn subscribe_channel_with_capacity(&self, capacity: usize) -> (SubscriberId, mpsc::Receiver<String>) {
        let (subscriber, rx) = ChannelSubscriber::new(capacity);
        let id = self.subscribe(Arc::new(subscriber)).await;
        (id, rx)
    }

    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.write().await.remove(&id).is_some();
        if removed {
            debug!(%id, "Subscriber disconnected");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.subscribers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Deliver `event` to every current subscriber and return how many
    /// accepted it. Subscribers whose send fails are removed.
    pub async fn broadcast(&self, event: &ProgressEvent) -> usize {
        let message = match serde_json::to_string(event) {
            Ok(message) => message,
            Err(e) => {
                error!(error = %e, article_id = event.article_id, "Failed to serialize progress event");
                return 0;
            }
        };

        let targets: Vec<(SubscriberId, Arc<dyn Subscriber>)> = self
            .subscribers
            .read()
            .await
            .iter()
            .map(|(id, s)| (*id, s.clone()))
            .collect();

        let results = join_all(targets.iter().map(|(id, subscriber)| {
            let message = message.as_str();
            async move { (*id, subscriber.send(message).await) }
        }))
        .await;

        let mut delivered = 0;
        let mut failed = Vec::new();
        for (id, result) in results {
            match result {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(%id, error = %e, "Dropping subscriber after failed delivery");
                    failed.push(id);
                }
            }
        }

        if !failed.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in failed {
                subscribers.remove(&id);
            }
        }

        delivered
    }
}

#[async_trait]
impl ProgressSink for NotificationHub {
    async fn publish(&self, event: ProgressEvent) {
        self.broadcast(&event).await;
    }
}
