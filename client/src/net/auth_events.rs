//! Push channel for session-change notifications.
//!
//! ARCHITECTURE
//! ============
//! The identity client owns one `AuthEventHub`. Each subscriber gets its own
//! unbounded channel; `emit` fans an event out to every live subscriber.
//! Releasing a subscription removes its sender from the hub, which ends the
//! subscriber's stream once buffered events are drained.

#[cfg(test)]
#[path = "auth_events_test.rs"]
mod auth_events_test;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::StreamExt;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};

use super::types::AuthEvent;

type Listeners = RefCell<Vec<(u64, UnboundedSender<AuthEvent>)>>;

/// Fan-out registry of session-change listeners.
#[derive(Clone, Default)]
pub struct AuthEventHub {
    listeners: Rc<Listeners>,
    next_id: Rc<Cell<u64>>,
}

impl AuthEventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new listener.
    pub fn subscribe(&self) -> AuthSubscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let (tx, rx) = unbounded();
        self.listeners.borrow_mut().push((id, tx));
        AuthSubscription {
            handle: SubscriptionHandle {
                id,
                hub: Rc::downgrade(&self.listeners),
                released: Rc::new(Cell::new(false)),
            },
            events: rx,
        }
    }

    /// Deliver `event` to every live listener, pruning closed ones.
    pub fn emit(&self, event: &AuthEvent) {
        self.listeners
            .borrow_mut()
            .retain(|(_, tx)| tx.unbounded_send(event.clone()).is_ok());
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

/// Cloneable release handle for one subscription.
#[derive(Clone)]
pub struct SubscriptionHandle {
    id: u64,
    hub: Weak<Listeners>,
    released: Rc<Cell<bool>>,
}

impl SubscriptionHandle {
    /// Detach from the hub. Only the first call has any effect; returns
    /// whether this call performed the release.
    pub fn unsubscribe(&self) -> bool {
        if self.released.replace(true) {
            return false;
        }
        if let Some(listeners) = self.hub.upgrade() {
            listeners.borrow_mut().retain(|(id, _)| *id != self.id);
        }
        true
    }

    pub fn is_released(&self) -> bool {
        self.released.get()
    }
}

/// A live subscription: the event stream plus its release handle.
/// Dropping it releases the listener.
pub struct AuthSubscription {
    handle: SubscriptionHandle,
    events: UnboundedReceiver<AuthEvent>,
}

impl AuthSubscription {
    pub fn handle(&self) -> SubscriptionHandle {
        self.handle.clone()
    }

    /// Next pushed event, or `None` once released and drained.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        self.events.next().await
    }

    pub fn unsubscribe(&self) -> bool {
        self.handle.unsubscribe()
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.handle.unsubscribe();
    }
}
