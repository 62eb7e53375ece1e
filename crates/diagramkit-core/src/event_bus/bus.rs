//! Event bus: synchronous handlers, an async broadcast feed and an optional
//! replay log.

use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use super::events::{EditorEvent, EventCategory};

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Which events a handler wants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EventFilter {
    #[default]
    All,
    /// Events in any of these categories
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &EditorEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type Handler = Arc<dyn Fn(EditorEvent) + Send + Sync>;

struct Subscription {
    id: SubscriptionId,
    filter: EventFilter,
    handler: Handler,
}

/// Tuning for an [`EventBus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBusConfig {
    /// Buffer of the async broadcast channel; slow receivers lag past it.
    pub channel_capacity: usize,
    /// Published events kept for [`EventBus::replay`]. 0 disables the log.
    pub replay_limit: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            replay_limit: 0,
        }
    }
}

/// An event together with its position in the publish order.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencedEvent {
    pub sequence: u64,
    pub event: EditorEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventBusError {
    #[error("No active subscribers")]
    NoSubscribers,
}

/// Publish/subscribe hub shared by a session and its elements.
///
/// Handlers run synchronously on the publishing thread, in the order they
/// subscribed. They are called outside the bus's locks, so a handler may
/// itself subscribe, unsubscribe or publish.
pub struct EventBus {
    subscriptions: RwLock<Vec<Subscription>>,
    next_subscription: AtomicU64,
    sequence: AtomicU64,
    sender: broadcast::Sender<EditorEvent>,
    log: Mutex<VecDeque<SequencedEvent>>,
    config: EventBusConfig,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            subscriptions: RwLock::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
            sequence: AtomicU64::new(0),
            sender,
            log: Mutex::new(VecDeque::new()),
            config,
        }
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    /// Deliver `event` to every matching handler and async receiver.
    ///
    /// Returns how many parties received it, or
    /// [`EventBusError::NoSubscribers`] when nobody did.
    pub fn publish(&self, event: EditorEvent) -> Result<usize, EventBusError> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!("#{} {}", sequence, event.description());

        if self.config.replay_limit > 0 {
            let mut log = self.log.lock();
            log.push_back(SequencedEvent {
                sequence,
                event: event.clone(),
            });
            while log.len() > self.config.replay_limit {
                log.pop_front();
            }
        }

        let handlers: Vec<Handler> = self
            .subscriptions
            .read()
            .iter()
            .filter(|s| s.filter.matches(&event))
            .map(|s| Arc::clone(&s.handler))
            .collect();
        for handler in &handlers {
            handler(event.clone());
        }

        let receivers = self.sender.send(event).unwrap_or(0);
        match handlers.len() + receivers {
            0 => Err(EventBusError::NoSubscribers),
            delivered => Ok(delivered),
        }
    }

    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(EditorEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.subscriptions.write().push(Subscription {
            id,
            filter,
            handler: Arc::new(handler),
        });
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        let removed = subscriptions.len() != before;
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Async feed of every event published from now on.
    pub fn receiver(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }

    /// Sequence number of the most recently published event, 0 before any.
    pub fn last_sequence(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }

    /// Logged events published after `after`, oldest first. Lets a view
    /// that was detached catch up; empty when the log is disabled.
    pub fn replay(&self, after: u64) -> Vec<SequencedEvent> {
        self.log
            .lock()
            .iter()
            .filter(|e| e.sequence > after)
            .cloned()
            .collect()
    }

    pub fn clear_log(&self) {
        self.log.lock().clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("last_sequence", &self.last_sequence())
            .field("config", &self.config)
            .finish()
    }
}
