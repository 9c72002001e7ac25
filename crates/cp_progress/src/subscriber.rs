use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub(crate) u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscriber-{}", self.0)
    }
}

#[derive(Error, Debug)]
#[error("delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// One end of a client connection.
#[async_trait]
pub trait Subscriber: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), DeliveryError>;
}

/// Messages a channel subscriber may have queued before it counts as stalled.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Sink backed by a bounded channel. The receiving half is typically drained
/// by a WebSocket writer task. A full queue or a dropped receiver fails the
/// send, which gets the subscriber removed from the hub.
#[derive(Debug, Clone)]
pub struct ChannelSubscriber {
    tx: mpsc::Sender<String>,
}

impl ChannelSubscriber {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Subscriber for ChannelSubscriber {
    async fn send(&self, message: &str) -> Result<(), DeliveryError> {
        self.tx.try_send(message.to_string()).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError("queue full".to_string()),
            TrySendError::Closed(_) => DeliveryError("receiver closed".to_string()),
        })
    }
}
