//! Event channel contract and the in-memory implementation.
//!
//! The channel carries client lifecycle events between services. Publishing
//! resolves only once the channel has accepted the message, so a caller that
//! publishes after committing its own transaction knows the event is on its
//! way. Consumption is pull-based with explicit acknowledgment: a delivery
//! dropped without [`Delivery::ack`] returns to the front of its queue and
//! comes around again (at-least-once).
//!
//! [`InMemoryEventChannel`] is the single-process transport. Every consumer
//! group sees every message; within a group each message reaches exactly one
//! subscriber, and a message is withheld while an earlier one with the same
//! key is in flight, so per-key ordering survives redelivery and concurrent
//! subscribers. There is no ordering guarantee across keys.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;
use tracing::debug;

use ledgra_shared::error::AppError;

/// A keyed message on the channel.
#[derive(Debug, Clone)]
pub struct EventMessage {
    /// Routing key; deliveries sharing a key stay ordered.
    pub key: String,
    /// JSON payload.
    pub payload: serde_json::Value,
}

/// Error types for channel operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The payload could not be serialized.
    #[error("Event serialization error: {0}")]
    Serialization(String),
}

impl From<ChannelError> for AppError {
    fn from(err: ChannelError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Transport contract for lifecycle events.
#[async_trait]
pub trait EventChannel: Send + Sync {
    /// Publishes a message, resolving once the channel has acknowledged
    /// receipt.
    async fn publish(&self, message: EventMessage) -> Result<(), ChannelError>;

    /// Opens a subscription for a consumer group, creating the group's
    /// queue on first use. A group only sees messages published after its
    /// queue exists.
    fn subscribe(&self, group: &str) -> Subscription;
}

#[derive(Debug)]
struct Pending {
    message: EventMessage,
    attempt: u32,
}

#[derive(Debug)]
struct GroupState {
    queue: VecDeque<Pending>,
    in_flight: HashSet<String>,
}

/// One consumer group's queue, shared by the channel and every
/// subscription of the group.
#[derive(Debug)]
struct GroupQueue {
    state: Mutex<GroupState>,
    notify: Notify,
}

impl GroupQueue {
    fn new() -> Self {
        Self {
            state: Mutex::new(GroupState {
                queue: VecDeque::new(),
                in_flight: HashSet::new(),
            }),
            notify: Notify::new(),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, GroupState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push_back(&self, message: EventMessage) {
        self.lock_state().queue.push_back(Pending {
            message,
            attempt: 1,
        });
        self.notify.notify_one();
    }

    /// Takes the oldest message whose key has no in-flight predecessor.
    fn try_take(&self) -> Option<Pending> {
        let mut state = self.lock_state();
        let GroupState { queue, in_flight } = &mut *state;

        let position = queue
            .iter()
            .position(|pending| !in_flight.contains(&pending.message.key))?;
        let pending = queue.remove(position)?;
        in_flight.insert(pending.message.key.clone());

        Some(pending)
    }

    fn settle(&self, key: &str) {
        self.lock_state().in_flight.remove(key);
        self.notify.notify_one();
    }

    /// Puts an unacknowledged delivery back at the front of its queue so
    /// it redelivers before anything newer with the same key.
    fn requeue(&self, message: EventMessage, attempt: u32) {
        let mut state = self.lock_state();
        state.in_flight.remove(&message.key);
        state.queue.push_front(Pending { message, attempt });
        drop(state);
        self.notify.notify_one();
    }
}

/// A consumer group member's handle for receiving deliveries.
#[derive(Debug)]
pub struct Subscription {
    queue: Arc<GroupQueue>,
}

impl Subscription {
    /// Waits for the next eligible delivery.
    pub async fn recv(&self) -> Delivery {
        loop {
            if let Some(pending) = self.queue.try_take() {
                return Delivery {
                    message: pending.message,
                    attempt: pending.attempt,
                    queue: Arc::clone(&self.queue),
                    settled: false,
                };
            }
            self.queue.notify.notified().await;
        }
    }
}

/// One in-flight message. Call [`Delivery::ack`] after handling it;
/// dropping the delivery without acking requeues the message.
#[derive(Debug)]
pub struct Delivery {
    message: EventMessage,
    attempt: u32,
    queue: Arc<GroupQueue>,
    settled: bool,
}

impl Delivery {
    /// The delivered message.
    #[must_use]
    pub fn message(&self) -> &EventMessage {
        &self.message
    }

    /// How many times this message has been delivered, starting at 1.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Acknowledges the delivery, removing the message for good.
    pub fn ack(mut self) {
        self.settled = true;
        self.queue.settle(&self.message.key);
    }
}

impl Drop for Delivery {
    fn drop(&mut self) {
        if !self.settled {
            self.queue.requeue(self.message.clone(), self.attempt + 1);
        }
    }
}

/// Single-process channel: a named topic with per-group queues.
#[derive(Debug)]
pub struct InMemoryEventChannel {
    topic: String,
    groups: Mutex<HashMap<String, Arc<GroupQueue>>>,
}

impl InMemoryEventChannel {
    /// Creates a channel for the named topic.
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            groups: Mutex::new(HashMap::new()),
        }
    }

    fn lock_groups(&self) -> MutexGuard<'_, HashMap<String, Arc<GroupQueue>>> {
        self.groups.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl EventChannel for InMemoryEventChannel {
    async fn publish(&self, message: EventMessage) -> Result<(), ChannelError> {
        let queues: Vec<Arc<GroupQueue>> = self.lock_groups().values().cloned().collect();
        for queue in &queues {
            queue.push_back(message.clone());
        }

        debug!(topic = %self.topic, key = %message.key, groups = queues.len(), "Message accepted");
        Ok(())
    }

    fn subscribe(&self, group: &str) -> Subscription {
        let queue = Arc::clone(
            self.lock_groups()
                .entry(group.to_string())
                .or_insert_with(|| Arc::new(GroupQueue::new())),
        );

        Subscription { queue }
    }
}
