//! In-process pub/sub for moderation events.
//!
//! Each subscription owns a bounded broadcast channel. Publishing never
//! blocks and never fails because of subscriber state: a slow consumer
//! overflows its own channel, the oldest unread events are dropped, and
//! the consumer sees a [`SubscriptionMessage::Degraded`] marker telling
//! it to refetch its queues instead of trusting incremental deltas.
//!
//! The registry holds senders only; the receiving half lives in the
//! [`SubscriptionHandle`], so dropping a handle is enough to tear the
//! subscription down. Dead entries are removed lazily on the next
//! publish and periodically by the janitor worker.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock, Weak};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::events::{EventKind, EventPayload, ModerationEvent};
use crate::domain::scope::ModerationScope;

/// What a subscriber pulls off its handle.
#[derive(Debug, Clone)]
pub enum SubscriptionMessage {
    Event(ModerationEvent),
    /// Events were dropped for this subscriber. Every open connection
    /// tied to this subscription must be resynced from the store.
    Degraded { missed: u64 },
}

struct Slot {
    topics: HashSet<EventKind>,
    scope: ModerationScope,
    tx: broadcast::Sender<ModerationEvent>,
}

struct BrokerInner {
    subscriptions: RwLock<HashMap<Uuid, Slot>>,
    /// Next sequence number, taken and enqueued under one lock so that
    /// delivery order matches sequence order on every channel. Only
    /// publishers contend here; consumers never touch it.
    seq: Mutex<u64>,
    capacity: usize,
}

#[derive(Clone)]
pub struct EventBroker {
    inner: Arc<BrokerInner>,
}

impl EventBroker {
    pub fn new(capacity: usize) -> Self {
        EventBroker {
            inner: Arc::new(BrokerInner {
                subscriptions: RwLock::new(HashMap::new()),
                seq: Mutex::new(0),
                capacity: capacity.max(1),
            }),
        }
    }

    /// Publish an event to every subscription whose topic set contains
    /// `kind` and whose scope covers `site_id`. Returns the assigned
    /// sequence number.
    pub fn publish(
        &self,
        kind: EventKind,
        subject_id: Uuid,
        site_id: Option<Uuid>,
        payload: EventPayload,
    ) -> u64 {
        let mut dead = Vec::new();
        let seq;
        {
            // The seq lock is held across the fan-out: two publishes
            // must not interleave, or a channel could carry a later
            // seq ahead of an earlier one and replay dedup downstream
            // would keep the stale snapshot.
            let mut next = self.inner.seq.lock().expect("broker seq poisoned");
            *next += 1;
            seq = *next;
            let event = ModerationEvent {
                kind,
                subject_id,
                site_id,
                seq,
                payload,
            };

            let subs = self.inner.subscriptions.read().expect("broker registry poisoned");
            for (id, slot) in subs.iter() {
                if !slot.topics.contains(&kind) || !slot.scope.allows(site_id) {
                    continue;
                }
                // A send error means the receiver is gone; queue it for
                // lazy removal rather than failing the publish.
                if slot.tx.send(event.clone()).is_err() {
                    dead.push(*id);
                }
            }
        }

        if !dead.is_empty() {
            let mut subs = self.inner.subscriptions.write().expect("broker registry poisoned");
            for id in dead {
                subs.remove(&id);
            }
        }

        tracing::debug!(kind = ?kind, subject = %subject_id, seq, "published moderation event");
        seq
    }

    /// Register a subscription. The returned handle is the only owner
    /// of the receiving half; the broker keeps just the sender.
    pub fn subscribe(
        &self,
        topics: impl IntoIterator<Item = EventKind>,
        scope: ModerationScope,
    ) -> SubscriptionHandle {
        let (tx, rx) = broadcast::channel(self.inner.capacity);
        let id = Uuid::now_v7();
        let slot = Slot {
            topics: topics.into_iter().collect(),
            scope,
            tx,
        };
        self.inner
            .subscriptions
            .write()
            .expect("broker registry poisoned")
            .insert(id, slot);
        tracing::debug!(subscription = %id, "subscription opened");
        SubscriptionHandle {
            id,
            rx: Some(rx),
            broker: Arc::downgrade(&self.inner),
        }
    }

    /// Drop subscriptions whose receiver has gone away.
    pub fn prune(&self) -> usize {
        let mut subs = self.inner.subscriptions.write().expect("broker registry poisoned");
        let before = subs.len();
        subs.retain(|_, slot| slot.tx.receiver_count() > 0);
        before - subs.len()
    }

    pub fn subscription_count(&self) -> usize {
        self.inner
            .subscriptions
            .read()
            .expect("broker registry poisoned")
            .len()
    }
}

/// A live subscription: a lazy, non-restartable sequence of messages.
pub struct SubscriptionHandle {
    id: Uuid,
    rx: Option<broadcast::Receiver<ModerationEvent>>,
    broker: Weak<BrokerInner>,
}

impl SubscriptionHandle {
    /// Wait for the next message. Returns `None` once the handle is
    /// closed; in-flight messages already buffered are still delivered
    /// before that.
    pub async fn next(&mut self) -> Option<SubscriptionMessage> {
        let rx = self.rx.as_mut()?;
        match rx.recv().await {
            Ok(event) => Some(SubscriptionMessage::Event(event)),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(subscription = %self.id, missed, "subscriber degraded");
                Some(SubscriptionMessage::Degraded { missed })
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    /// Non-blocking variant used when draining after a known delivery.
    pub fn try_next(&mut self) -> Option<SubscriptionMessage> {
        let rx = self.rx.as_mut()?;
        match rx.try_recv() {
            Ok(event) => Some(SubscriptionMessage::Event(event)),
            Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                Some(SubscriptionMessage::Degraded { missed })
            }
            Err(_) => None,
        }
    }

    /// Stop delivery and release broker-side resources. Idempotent.
    pub fn close(&mut self) {
        if self.rx.take().is_none() {
            return;
        }
        if let Some(inner) = self.broker.upgrade() {
            inner
                .subscriptions
                .write()
                .expect("broker registry poisoned")
                .remove(&self.id);
        }
        tracing::debug!(subscription = %self.id, "subscription closed");
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.close();
    }
}
