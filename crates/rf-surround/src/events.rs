//! Typed change notifications
//!
//! Each notifier carries one event type. Handlers run synchronously on the
//! emitting thread, so anything connected to a notifier emitted from the audio
//! thread must itself be real-time safe.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::automation::ControlKind;

/// Handle returned by [`Notifier::connect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

type Handler<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Single-event-type callback list
pub struct Notifier<T> {
    handlers: RwLock<Vec<(ConnectionId, Handler<T>)>>,
    next_id: AtomicU64,
}

impl<T> Notifier<T> {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn connect<F>(&self, handler: F) -> ConnectionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().push((id, Box::new(handler)));
        id
    }

    /// Returns false if `id` was not connected
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(h, _)| *h != id);
        handlers.len() != before
    }

    pub fn emit(&self, event: &T) {
        for (_, handler) in self.handlers.read().iter() {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for Notifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Notifier<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("handlers", &self.len())
            .finish()
    }
}

/// Effective delay split after a latency change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyChange {
    pub send_delay: usize,
    pub thru_delay: usize,
}

/// A control value changed on a send
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlChange {
    /// Pan channel, or None for the send's gain
    pub channel: Option<usize>,
    pub kind: ControlKind,
    pub value: f64,
}

/// Notifications raised by a surround send
#[derive(Debug, Default)]
pub struct SendSignals {
    /// Pan parameter set count changed after reconfiguration
    pub pannables_changed: Notifier<usize>,
    /// Delay split changed; upstream latency compensation should re-run
    pub latency_changed: Notifier<LatencyChange>,
    /// A delay split change was requested on the audio thread and is pending
    pub queue_update: Notifier<()>,
    pub control_changed: Notifier<ControlChange>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_connect_emit_disconnect() {
        let notifier: Notifier<usize> = Notifier::new();
        let total = Arc::new(AtomicUsize::new(0));

        let t = Arc::clone(&total);
        let id = notifier.connect(move |n| {
            t.fetch_add(*n, Ordering::SeqCst);
        });

        notifier.emit(&3);
        notifier.emit(&4);
        assert_eq!(total.load(Ordering::SeqCst), 7);

        assert!(notifier.disconnect(id));
        assert!(!notifier.disconnect(id));
        notifier.emit(&100);
        assert_eq!(total.load(Ordering::SeqCst), 7);
        assert!(notifier.is_empty());
    }
}
