//! Named-event subscription for the stateful widgets.
//!
//! [`crate::plan::Plan`] and [`crate::control::RoutingControl`] each own an
//! [`EventBus`] for their own event type. Hosts subscribe to a single
//! [`Event::kind`] or to everything, and unsubscribe with the returned
//! [`ListenerId`].

use std::fmt;

/// An event that can be dispatched by name.
pub trait Event {
    type Kind: Copy + Eq + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// Handle returned by [`EventBus::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Handler<E> = Box<dyn FnMut(&E)>;

struct Listener<E: Event> {
    id: ListenerId,
    kind: Option<E::Kind>,
    handler: Handler<E>,
}

/// Synchronous event dispatcher.
///
/// Handlers run in subscription order on the thread that fires the event.
pub struct EventBus<E: Event> {
    listeners: Vec<Listener<E>>,
    next_id: u64,
}

impl<E: Event> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E: Event> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<E: Event> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `handler` to events of `kind`.
    pub fn on(&mut self, kind: E::Kind, handler: impl FnMut(&E) + 'static) -> ListenerId {
        self.subscribe(Some(kind), Box::new(handler))
    }

    /// Subscribes `handler` to every event.
    pub fn on_any(&mut self, handler: impl FnMut(&E) + 'static) -> ListenerId {
        self.subscribe(None, Box::new(handler))
    }

    /// Removes a listener. Returns `false` if it was not subscribed.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|listener| listener.id != id);
        self.listeners.len() != before
    }

    /// Delivers `event` to every matching listener.
    pub fn fire(&mut self, event: &E) {
        let kind = event.kind();
        for listener in &mut self.listeners {
            if listener.kind.is_none_or(|wanted| wanted == kind) {
                (listener.handler)(event);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn subscribe(&mut self, kind: Option<E::Kind>, handler: Handler<E>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener { id, kind, handler });
        id
    }
}
