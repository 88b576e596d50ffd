//! Gateway event subscriptions.
//!
//! Events are grouped by name into persistent (`on`) and one-shot (`once`)
//! handler lists. One-shot handlers are removed the first time their event
//! is emitted.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CommandResult;

/// Handler for a gateway event.
#[async_trait]
pub trait EventHandler<C>: Send + Sync {
    async fn handle(&self, client: &C, payload: &Value) -> CommandResult<()>;
}

/// One declared event subscription.
pub struct EventSubscription<C> {
    pub event: String,
    pub once: bool,
    pub handler: Arc<dyn EventHandler<C>>,
}

impl<C> EventSubscription<C> {
    /// Subscribe for every occurrence of `event`.
    pub fn on(event: impl Into<String>, handler: Arc<dyn EventHandler<C>>) -> Self {
        Self {
            event: event.into(),
            once: false,
            handler,
        }
    }

    /// Subscribe for the next occurrence of `event` only.
    pub fn once(event: impl Into<String>, handler: Arc<dyn EventHandler<C>>) -> Self {
        Self {
            event: event.into(),
            once: true,
            handler,
        }
    }
}

impl<C> fmt::Debug for EventSubscription<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSubscription")
            .field("event", &self.event)
            .field("once", &self.once)
            .finish_non_exhaustive()
    }
}

struct EventHandlers<C> {
    on: Vec<Arc<dyn EventHandler<C>>>,
    once: Vec<Arc<dyn EventHandler<C>>>,
}

impl<C> Default for EventHandlers<C> {
    fn default() -> Self {
        Self {
            on: Vec::new(),
            once: Vec::new(),
        }
    }
}

/// Event name to handler lists, in declaration order.
pub struct EventHandlerMap<C> {
    events: HashMap<String, EventHandlers<C>>,
}

impl<C> Default for EventHandlerMap<C> {
    fn default() -> Self {
        Self {
            events: HashMap::new(),
        }
    }
}

impl<C> fmt::Debug for EventHandlerMap<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (event, handlers) in &self.events {
            map.entry(event, &(handlers.on.len(), handlers.once.len()));
        }
        map.finish()
    }
}

/// Group subscriptions by event name.
pub fn build_event_map<C>(
    subscriptions: impl IntoIterator<Item = EventSubscription<C>>,
) -> EventHandlerMap<C> {
    let mut map = EventHandlerMap::default();
    for subscription in subscriptions {
        map.subscribe(subscription);
    }
    map
}

impl<C> EventHandlerMap<C> {
    pub fn subscribe(&mut self, subscription: EventSubscription<C>) {
        let handlers = self.events.entry(subscription.event).or_default();
        if subscription.once {
            handlers.once.push(subscription.handler);
        } else {
            handlers.on.push(subscription.handler);
        }
    }

    /// Names of events with at least one handler.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.events
            .iter()
            .filter(|(_, handlers)| !handlers.on.is_empty() || !handlers.once.is_empty())
            .map(|(event, _)| event.as_str())
    }

    /// Number of `(on, once)` handlers registered for `event`.
    pub fn handler_count(&self, event: &str) -> (usize, usize) {
        self.events
            .get(event)
            .map_or((0, 0), |handlers| (handlers.on.len(), handlers.once.len()))
    }
}

impl<C> EventHandlerMap<C> {
    /// Handlers due for one occurrence of `event`: every persistent handler,
    /// then the one-shot handlers, which are removed from the map.
    pub fn take_due(&mut self, event: &str) -> Vec<Arc<dyn EventHandler<C>>> {
        let Some(handlers) = self.events.get_mut(event) else {
            return Vec::new();
        };
        let once = std::mem::take(&mut handlers.once);
        handlers.on.iter().cloned().chain(once).collect()
    }
}

impl<C: Sync> EventHandlerMap<C> {
    /// Run every handler for `event` and return how many ran.
    ///
    /// A failing handler is logged and does not stop the others.
    pub async fn emit(&mut self, event: &str, client: &C, payload: &Value) -> usize {
        let due = self.take_due(event);
        run_handlers(event, &due, client, payload).await
    }
}

/// Run `handlers` in order for one occurrence of `event`.
///
/// Does not touch the map, so callers can release any lock on it first.
pub async fn run_handlers<C: Sync>(
    event: &str,
    handlers: &[Arc<dyn EventHandler<C>>],
    client: &C,
    payload: &Value,
) -> usize {
    for handler in handlers {
        if let Err(e) = handler.handle(client, payload).await {
            tracing::warn!("Event handler for '{}' failed: {}", event, e);
        }
    }
    handlers.len()
}
