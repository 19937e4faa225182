//! Listener registry and synchronous event fan-out.
//!
//! The dispatcher owns the registered listeners and delivers each
//! [`TransitionEvent`] to them on the caller's thread, in registration order.
//! Registration goes through `&self`, so an `Arc<Dispatcher>` can be shared with
//! threads other than the poller.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ListenerError;
use crate::event::TransitionEvent;
use crate::identity::ResourceIdentity;
use crate::stream::{ChannelListener, TransitionStream};

/// Unique identifier for a listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListenerId(Uuid);

impl ListenerId {
    /// Create a new random listener id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receives transition events.
///
/// Any `Fn(&TransitionEvent<R>) -> Result<(), ListenerError>` closure that is
/// `Send + Sync` is a listener.
pub trait Listener<R>: Send + Sync {
    /// Called once per transition, synchronously on the polling thread.
    fn on_event(&self, event: &TransitionEvent<R>) -> Result<(), ListenerError>;
}

impl<R, F> Listener<R> for F
where
    F: Fn(&TransitionEvent<R>) -> Result<(), ListenerError> + Send + Sync,
{
    fn on_event(&self, event: &TransitionEvent<R>) -> Result<(), ListenerError> {
        self(event)
    }
}

/// A listener failed while an event was being delivered.
#[derive(Debug, Error)]
#[error("listener {listener} failed: {source}")]
pub struct DispatchError {
    /// The listener that failed.
    pub listener: ListenerId,
    /// What the listener reported.
    #[source]
    pub source: ListenerError,
}

type ListenerEntry<R> = (ListenerId, Arc<dyn Listener<R>>);

/// Ordered listener registry with synchronous fan-out.
pub struct Dispatcher<R: ResourceIdentity> {
    listeners: RwLock<Vec<ListenerEntry<R>>>,
    delivered: AtomicU64,
}

impl<R: ResourceIdentity> Dispatcher<R> {
    /// Creates a dispatcher with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            delivered: AtomicU64::new(0),
        }
    }

    /// Registers a listener at the end of the delivery order.
    pub fn add_listener<L>(&self, listener: L) -> ListenerId
    where
        L: Listener<R> + 'static,
    {
        self.add_shared(Arc::new(listener))
    }

    /// Registers a closure listener.
    pub fn add_fn<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&TransitionEvent<R>) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.add_shared(Arc::new(f))
    }

    /// Registers a shared listener. Registering the same `Arc` twice yields two
    /// independent registrations.
    pub fn add_shared(&self, listener: Arc<dyn Listener<R>>) -> ListenerId {
        let id = ListenerId::new();
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        debug!(listener = %id, "Listener registered");
        id
    }

    /// Removes a registration. Returns false if the id is unknown.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut guard = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|(lid, _)| *lid != id);
        let removed = guard.len() != before;
        drop(guard);

        if removed {
            debug!(listener = %id, "Listener removed");
        }
        removed
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Total successful listener invocations since construction.
    #[must_use]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Creates a channel-backed subscription with a bounded buffer.
    ///
    /// The stream unregisters itself when dropped.
    pub fn subscribe(self: &Arc<Self>, capacity: usize) -> TransitionStream<R> {
        let (listener, parts) = ChannelListener::bounded(capacity);
        let id = self.add_listener(listener);
        TransitionStream::new(id, parts, Arc::downgrade(self))
    }

    /// Delivers `event` to every listener, in registration order.
    ///
    /// The listener list is snapshotted before delivery, so listeners may add
    /// or remove registrations from inside their callback. Delivery stops at
    /// the first failing listener; later listeners do not see the event.
    ///
    /// Returns the number of listeners that received the event.
    pub fn emit(&self, event: &TransitionEvent<R>) -> Result<usize, DispatchError> {
        let snapshot: Vec<ListenerEntry<R>> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut delivered = 0;
        for (id, listener) in &snapshot {
            if let Err(source) = listener.on_event(event) {
                warn!(
                    listener = %id,
                    category = %event.category,
                    direction = %event.direction,
                    error = %source,
                    "Listener failed; remaining listeners skipped for this event"
                );
                self.delivered.fetch_add(delivered as u64, Ordering::Relaxed);
                return Err(DispatchError {
                    listener: *id,
                    source,
                });
            }
            delivered += 1;
        }

        self.delivered.fetch_add(delivered as u64, Ordering::Relaxed);
        Ok(delivered)
    }
}

impl<R: ResourceIdentity> Default for Dispatcher<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ResourceIdentity> fmt::Debug for Dispatcher<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("listeners", &self.listener_count())
            .field("delivered", &self.delivered())
            .finish()
    }
}
