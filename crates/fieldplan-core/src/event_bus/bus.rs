//! Event bus shared by an editor and its shapes.
//!
//! The editor owns the bus and hands the shapes it creates an `Arc` clone.
//! There is no process-wide instance.

use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{EventCategory, PlanEvent};

/// Returned by [`EventBus::subscribe`]; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = self.0.simple().to_string();
        write!(f, "sub-{}", &full[..8])
    }
}

/// Which events a subscriber wants.
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    #[default]
    All,
    /// Events in any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &PlanEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Buffer size of the broadcast channel behind [`EventBus::receiver`].
    pub channel_capacity: usize,
    /// Keep published events for [`EventBus::history`].
    pub enable_history: bool,
    pub max_history_size: usize,
    /// Events older than this are dropped from the history.
    pub history_retention: Duration,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            enable_history: false,
            max_history_size: 500,
            history_retention: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventBusError {
    /// Neither a handler nor an async receiver saw the event.
    #[error("No active subscribers")]
    NoSubscribers,
}

type Handler = Box<dyn Fn(PlanEvent) + Send + Sync>;

struct Subscription {
    id: SubscriptionId,
    filter: EventFilter,
    handler: Handler,
}

/// Bounded, time-limited record of published events.
#[derive(Debug, Default)]
struct History {
    entries: VecDeque<(Instant, PlanEvent)>,
}

impl History {
    fn record(&mut self, event: &PlanEvent, config: &EventBusConfig) {
        let now = Instant::now();
        self.entries.push_back((now, event.clone()));

        while let Some((at, _)) = self.entries.front() {
            let expired = now.duration_since(*at) > config.history_retention;
            if !expired && self.entries.len() <= config.max_history_size {
                break;
            }
            self.entries.pop_front();
        }
    }

    fn since(&self, since: Option<Instant>) -> Vec<PlanEvent> {
        self.entries
            .iter()
            .filter(|(at, _)| since.is_none_or(|s| *at >= s))
            .map(|(_, event)| event.clone())
            .collect()
    }
}

/// Plan event fan-out.
///
/// Handlers run synchronously inside [`EventBus::publish`], in subscription
/// order. Async consumers read from a broadcast channel instead.
pub struct EventBus {
    sender: broadcast::Sender<PlanEvent>,
    subscriptions: RwLock<Vec<Subscription>>,
    history: Mutex<History>,
    config: EventBusConfig,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            subscriptions: RwLock::new(Vec::new()),
            history: Mutex::new(History::default()),
            config,
        }
    }

    /// Delivers `event` to matching handlers and to async receivers.
    ///
    /// Returns how many async receivers got it. Fails with `NoSubscribers`
    /// only when there is no handler and no receiver at all.
    pub fn publish(&self, event: PlanEvent) -> Result<usize, EventBusError> {
        tracing::trace!("Publishing {}", event.description());

        if self.config.enable_history {
            self.history.lock().record(&event, &self.config);
        }

        let subscriptions = self.subscriptions.read();
        subscriptions
            .iter()
            .filter(|s| s.filter.matches(&event))
            .for_each(|s| (s.handler)(event.clone()));

        match self.sender.send(event) {
            Ok(receivers) => Ok(receivers),
            Err(_) if subscriptions.is_empty() => Err(EventBusError::NoSubscribers),
            Err(_) => Ok(0),
        }
    }

    /// Registers a synchronous handler.
    ///
    /// The handler must not publish, subscribe or unsubscribe on this bus.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(PlanEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscriptions.write().push(Subscription {
            id,
            filter,
            handler: Box::new(handler),
        });
        tracing::debug!("Subscription {} added", id);
        id
    }

    pub fn receiver(&self) -> broadcast::Receiver<PlanEvent> {
        self.sender.subscribe()
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

    /// Recorded events at or after `since`, oldest first.
    ///
    /// Always empty unless the bus was built with `enable_history`.
    pub fn history(&self, since: Option<Instant>) -> Vec<PlanEvent> {
        self.history.lock().since(since)
    }

    pub fn clear_history(&self) {
        self.history.lock().entries.clear();
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("history", &self.history.lock().entries.len())
            .field("config", &self.config)
            .finish()
    }
}
