//! Bounded subscriber streams.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};

use crate::dispatcher::{Dispatcher, Listener, ListenerId};
use crate::error::{ListenerError, StreamError};
use crate::event::TransitionEvent;
use crate::identity::ResourceIdentity;

/// Listener that forwards events into a bounded channel.
///
/// Never blocks the polling thread: when the buffer is full, or the receiving
/// side is gone, the event is dropped and counted.
pub(crate) struct ChannelListener<R> {
    tx: Sender<TransitionEvent<R>>,
    dropped: Arc<AtomicU64>,
}

pub(crate) struct StreamParts<R> {
    rx: Receiver<TransitionEvent<R>>,
    dropped: Arc<AtomicU64>,
}

impl<R: ResourceIdentity> ChannelListener<R> {
    pub(crate) fn bounded(capacity: usize) -> (Self, StreamParts<R>) {
        let (tx, rx) = bounded(capacity.max(1));
        let dropped = Arc::new(AtomicU64::new(0));
        (
            Self {
                tx,
                dropped: Arc::clone(&dropped),
            },
            StreamParts { rx, dropped },
        )
    }
}

impl<R: ResourceIdentity> Listener<R> for ChannelListener<R> {
    fn on_event(&self, event: &TransitionEvent<R>) -> Result<(), ListenerError> {
        match self.tx.try_send(event.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(())
    }
}

/// A subscription stream of transition events.
///
/// Dropping this stream unregisters its listener.
pub struct TransitionStream<R: ResourceIdentity> {
    listener_id: ListenerId,
    rx: Receiver<TransitionEvent<R>>,
    dropped: Arc<AtomicU64>,
    dispatcher: Weak<Dispatcher<R>>,
    unsubscribed: AtomicBool,
}

impl<R: ResourceIdentity> TransitionStream<R> {
    pub(crate) fn new(listener_id: ListenerId, parts: StreamParts<R>, dispatcher: Weak<Dispatcher<R>>) -> Self {
        Self {
            listener_id,
            rx: parts.rx,
            dropped: parts.dropped,
            dispatcher,
            unsubscribed: AtomicBool::new(false),
        }
    }

    /// The listener registration backing this stream.
    #[must_use]
    pub const fn listener_id(&self) -> ListenerId {
        self.listener_id
    }

    /// Events discarded because the buffer was full.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Explicit unregistration. Idempotent.
    ///
    /// Events already buffered can still be received afterwards.
    pub fn unsubscribe(&self) {
        if self.unsubscribed.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(dispatcher) = self.dispatcher.upgrade() {
            dispatcher.remove_listener(self.listener_id);
        }
    }

    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<TransitionEvent<R>, StreamError> {
        self.rx.recv().map_err(|_| StreamError::Disconnected)
    }

    /// Receive the next event with a timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<TransitionEvent<R>, StreamError> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => StreamError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            },
            RecvTimeoutError::Disconnected => StreamError::Disconnected,
        })
    }

    /// Receive an already buffered event, if any.
    pub fn try_recv(&self) -> Result<Option<TransitionEvent<R>>, StreamError> {
        match self.rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(StreamError::Disconnected),
        }
    }

    /// Take every buffered event without blocking.
    #[must_use]
    pub fn drain(&self) -> Vec<TransitionEvent<R>> {
        self.rx.try_iter().collect()
    }
}

impl<R: ResourceIdentity> std::fmt::Debug for TransitionStream<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionStream")
            .field("listener_id", &self.listener_id)
            .field("buffered", &self.rx.len())
            .field("dropped", &self.dropped_events())
            .finish()
    }
}

impl<R: ResourceIdentity> Drop for TransitionStream<R> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
