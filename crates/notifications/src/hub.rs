//! Subscriber registry and fan-out.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::task::{Context, Poll};

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_stream::Stream;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::{Event, Payload};

/// Buffer size of each subscriber channel.
pub const DEFAULT_CAPACITY: usize = 10;

/// user id -> subscription id -> channel
type Registry = HashMap<Uuid, HashMap<u64, mpsc::Sender<Event>>>;

#[derive(Debug)]
struct Inner {
    registry: RwLock<Registry>,
    next_id: AtomicU64,
    capacity: usize,
}

/// Fan-out of events to the live subscriptions of each user.
///
/// Cloning is cheap and every clone shares the same registry.
#[derive(Clone, Debug)]
pub struct Hub {
    inner: Arc<Inner>,
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl Hub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Hub whose subscriber channels buffer `capacity` events (at least 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(0),
                capacity: capacity.max(1),
            }),
        }
    }

    /// Register a new channel for `user_id`.
    ///
    /// The channel already holds a `connected` event. A user can hold any
    /// number of subscriptions and each of them receives every event.
    pub fn subscribe(&self, user_id: Uuid) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.inner.capacity);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        // Cannot fail: the channel is new and has room for one event.
        let _ = sender.try_send(Event::now(Payload::Connected { user_id }));

        let mut registry = self
            .inner
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        registry.entry(user_id).or_default().insert(id, sender);
        debug!(%user_id, subscription = id, "subscribed");
        drop(registry);

        Subscription {
            receiver,
            handle: SubscriptionHandle {
                inner: Arc::clone(&self.inner),
                user_id,
                id,
                closed: Arc::new(AtomicBool::new(false)),
            },
        }
    }

    /// Send `payload` to every subscription of `user_id` without waiting.
    ///
    /// Returns how many subscriptions took the event. Full channels drop it.
    pub fn publish(&self, user_id: Uuid, payload: Payload) -> usize {
        let event = Event::now(payload);
        let registry = self
            .inner
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(channels) = registry.get(&user_id) else {
            return 0;
        };

        let mut delivered = 0;
        for (id, sender) in channels {
            match sender.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    trace!(%user_id, subscription = id, kind = event.kind(), "buffer full, event dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    trace!(%user_id, subscription = id, kind = event.kind(), "receiver gone, event dropped");
                }
            }
        }
        delivered
    }

    /// Number of live subscriptions of `user_id`.
    pub fn subscriber_count(&self, user_id: Uuid) -> usize {
        self.inner
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user_id)
            .map_or(0, HashMap::len)
    }
}

/// Unsubscribe function of one subscription.
///
/// Cloneable so the transport can release the subscription from another
/// task. Calling [`unsubscribe`](Self::unsubscribe) more than once is a no-op.
#[derive(Clone, Debug)]
pub struct SubscriptionHandle {
    inner: Arc<Inner>,
    user_id: Uuid,
    id: u64,
    closed: Arc<AtomicBool>,
}

impl SubscriptionHandle {
    /// Remove the channel from the hub and close it.
    ///
    /// Events already buffered can still be read; then the receiver ends.
    pub fn unsubscribe(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut registry = self
            .inner
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(channels) = registry.get_mut(&self.user_id) {
            channels.remove(&self.id);
            if channels.is_empty() {
                registry.remove(&self.user_id);
            }
        }
        debug!(user_id = %self.user_id, subscription = self.id, "unsubscribed");
    }
}

/// Receiving side of one subscription.
///
/// Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::Receiver<Event>,
    handle: SubscriptionHandle,
}

impl Subscription {
    pub fn user_id(&self) -> Uuid {
        self.handle.user_id
    }

    pub fn handle(&self) -> SubscriptionHandle {
        self.handle.clone()
    }

    pub fn unsubscribe(&self) {
        self.handle.unsubscribe();
    }

    /// Next event, or `None` once unsubscribed and drained.
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Next buffered event, if any.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.unsubscribe();
    }
}

impl Stream for Subscription {
    type Item = Event;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_never_zero() {
        let hub = Hub::with_capacity(0);
        let mut sub = hub.subscribe(Uuid::new_v4());
        assert!(matches!(
            sub.try_recv().map(|e| e.payload),
            Some(Payload::Connected { .. })
        ));
    }

    #[test]
    fn last_unsubscribe_removes_the_user_entry() {
        let hub = Hub::new();
        let user = Uuid::new_v4();
        let first = hub.subscribe(user);
        let second = hub.subscribe(user);
        drop(first);
        assert_eq!(hub.subscriber_count(user), 1);
        second.unsubscribe();
        assert_eq!(hub.subscriber_count(user), 0);
        assert!(
            hub.inner
                .registry
                .read()
                .unwrap()
                .get(&user)
                .is_none()
        );
    }
}
