//! Notification Hub: the process-wide registry of live subscribers.
//!
//! Subscribers register a [`Subscriber`] sink and get back a
//! [`SubscriberId`]. [`NotificationHub::broadcast`] serializes an event once
//! and offers it to every registered sink; a sink whose delivery fails is
//! dropped from the registry. Delivery is best-effort.

pub mod hub;
pub mod subscriber;

pub use hub::NotificationHub;
pub use subscriber::{ChannelSubscriber, DeliveryError, Subscriber, SubscriberId, DEFAULT_QUEUE_CAPACITY};
