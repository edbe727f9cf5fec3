//! Status listener registry
//!
//! Synchronous observers are called in registration order on every status
//! transition. Async consumers can instead subscribe to a broadcast channel
//! carrying the same transitions.

use super::SyncStatus;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, error};

/// Default broadcast channel capacity
const DEFAULT_CAPACITY: usize = 64;

/// Callback invoked with the new status on every transition.
pub type StatusListener = Arc<dyn Fn(SyncStatus) + Send + Sync>;

/// Handle returned by [`ListenerRegistry::add`], used to unregister a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered list of status observers plus a broadcast fan-out.
pub struct ListenerRegistry {
    listeners: Mutex<Vec<(ListenerId, StatusListener)>>,
    next_id: Mutex<u64>,
    sender: broadcast::Sender<SyncStatus>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self {
            listeners: Mutex::new(Vec::new()),
            next_id: Mutex::new(0),
            sender,
        }
    }

    /// Register a listener. The same callback may be registered more than
    /// once; each registration is invoked separately.
    pub fn add(&self, listener: StatusListener) -> ListenerId {
        let id = {
            let mut next = self.next_id.lock().unwrap_or_else(PoisonError::into_inner);
            *next += 1;
            ListenerId(*next)
        };
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    /// Remove a listener. Returns false if the id was unknown.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Drop every registered listener.
    pub fn clear(&self) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subscribe to transitions from async code.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncStatus> {
        self.sender.subscribe()
    }

    /// Notify every listener of `status`.
    ///
    /// The registry lock is released before callbacks run, so a listener may
    /// query or drive the debouncer it observes. A panicking listener is
    /// logged and skipped.
    pub fn notify(&self, status: SyncStatus) {
        let snapshot: Vec<(ListenerId, StatusListener)> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for (id, listener) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener(status))).is_err() {
                error!(listener = ?id, status = %status, "Status listener panicked");
            }
        }

        if let Ok(n) = self.sender.send(status) {
            debug!(status = %status, subscribers = n, "Sync status broadcast");
        }
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<SyncStatus>>>, StatusListener) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let listener: StatusListener = Arc::new(move |s| sink.lock().unwrap().push(s));
        (seen, listener)
    }

    #[test]
    fn test_notify_in_registration_order() {
        let registry = ListenerRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let order = order.clone();
            registry.add(Arc::new(move |_| order.lock().unwrap().push(tag)));
        }

        registry.notify(SyncStatus::Syncing);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_same_listener_twice_is_called_twice() {
        let registry = ListenerRegistry::new();
        let (seen, listener) = recorder();
        registry.add(listener.clone());
        registry.add(listener);

        registry.notify(SyncStatus::NotSynced);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![SyncStatus::NotSynced, SyncStatus::NotSynced]
        );
    }

    #[test]
    fn test_remove_listener() {
        let registry = ListenerRegistry::new();
        let (seen, listener) = recorder();
        let id = registry.add(listener);

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert!(registry.is_empty());

        registry.notify(SyncStatus::Error);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_panicking_listener_does_not_stop_others() {
        let registry = ListenerRegistry::new();
        registry.add(Arc::new(|_| panic!("broken observer")));
        let (seen, listener) = recorder();
        registry.add(listener);

        registry.notify(SyncStatus::Synced);
        assert_eq!(*seen.lock().unwrap(), vec![SyncStatus::Synced]);
    }

    #[test]
    fn test_broadcast_subscriber_receives_transitions() {
        let registry = ListenerRegistry::new();
        let mut rx = registry.subscribe();

        registry.notify(SyncStatus::NotSynced);
        registry.notify(SyncStatus::Syncing);

        assert_eq!(rx.try_recv().unwrap(), SyncStatus::NotSynced);
        assert_eq!(rx.try_recv().unwrap(), SyncStatus::Syncing);
    }

    #[test]
    fn test_notify_without_subscribers_no_panic() {
        let registry = ListenerRegistry::default();
        registry.notify(SyncStatus::Error);
        assert_eq!(registry.len(), 0);
    }
}
