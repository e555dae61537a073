//! An in-process, synchronous publish/subscribe registry.
//!
//! Handlers are keyed by [EventKind] and run in registration order. A handler
//! that needs to announce something in response publishes into the [Outbox]
//! it is handed; those events are dispatched by the same [EventBus::publish]
//! call once the current event's handlers have all run.

use std::collections::{HashMap, VecDeque};

use crate::{
    Error,
    event::{Event, EventKind},
};

/// Identifies a handler registered with [EventBus::subscribe].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Collects the events published by a handler while it runs.
#[derive(Debug, Default)]
pub struct Outbox {
    events: Vec<Event>,
}

impl Outbox {
    /// Queue `event` for dispatch after the current event.
    pub fn publish(&mut self, event: Event) {
        self.events.push(event);
    }

    /// The queued events, in the order they were published.
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

type Handler = Box<dyn FnMut(&Event, &mut Outbox) -> Result<(), Error> + Send>;

/// The event bus.
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<EventKind, Vec<(SubscriptionId, Handler)>>,
    next_subscription_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<_, _> = self
            .handlers
            .iter()
            .map(|(kind, handlers)| (kind, handlers.len()))
            .collect();

        f.debug_struct("EventBus")
            .field("handlers", &counts)
            .finish()
    }
}

impl EventBus {
    /// Create a bus with no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` to run for every event of `kind`.
    ///
    /// Returns the ID to pass to [EventBus::unsubscribe].
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event, &mut Outbox) -> Result<(), Error> + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id += 1;

        self.handlers
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));

        id
    }

    /// Remove the handler registered under `id` for `kind`.
    ///
    /// Does nothing if there is no such handler.
    pub fn unsubscribe(&mut self, kind: EventKind, id: SubscriptionId) {
        if let Some(handlers) = self.handlers.get_mut(&kind) {
            handlers.retain(|(subscription_id, _)| *subscription_id != id);
        }
    }

    /// Run every handler subscribed to `event`'s kind, in order, then dispatch
    /// whatever those handlers published.
    ///
    /// # Errors
    /// Returns the first error raised by a handler. Handlers after the failing
    /// one do not run and queued events are discarded.
    pub fn publish(&mut self, event: Event) -> Result<(), Error> {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let Some(handlers) = self.handlers.get_mut(&event.kind()) else {
                tracing::trace!("No subscribers for {:?}", event.kind());
                continue;
            };

            let mut outbox = Outbox::default();

            for (_, handler) in handlers.iter_mut() {
                handler(&event, &mut outbox)?;
            }

            queue.extend(outbox.into_events());
        }

        Ok(())
    }
}
