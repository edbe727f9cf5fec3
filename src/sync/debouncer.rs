//! Edit debouncer with sync-status tracking.
//!
//! Coalesces bursts of edits into a single delayed write per key and
//! broadcasts one aggregate [`SyncStatus`] for the whole instance.
//!
//! ## Design
//!
//! Every `debounce(key, action)` call spawns a small timer task:
//! 1. The task races the delay deadline against a cancel channel
//! 2. A newer call for the same key (or `clear()`) fires the cancel channel,
//!    and the task settles its handle with `Superseded` / `Cleared`
//! 3. Once the deadline passes the task claims its slot in the timer table,
//!    moves it to the in-flight table and runs the action
//! 4. The action's result settles the handle returned to the caller
//!
//! Timer tasks hold only a weak reference to the debouncer, so dropping the
//! owner cancels every unfired timer.
//!
//! ## Usage
//!
//! ```ignore
//! let debouncer = Debouncer::new(Duration::from_millis(500));
//! let saved = debouncer.debounce("updateTitle", move || client.update_note(id, patch));
//! ```

use super::listeners::{ListenerId, ListenerRegistry, StatusListener};
use super::SyncStatus;
use futures::FutureExt;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Delay used by every editing screen unless configured otherwise.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Why a debounced write did not produce a value.
#[derive(Debug, thiserror::Error)]
pub enum DebounceError<E> {
    /// The write ran and returned an error
    #[error("write failed: {0}")]
    Failed(E),
    /// A newer edit for the same key replaced this one before it fired
    #[error("superseded by a newer edit")]
    Superseded,
    /// The debouncer was cleared or dropped before the write fired
    #[error("cancelled before the write started")]
    Cleared,
    /// The write panicked
    #[error("write panicked")]
    Panicked,
}

impl<E> DebounceError<E> {
    /// True for outcomes callers usually ignore (the edit was replaced or
    /// the screen closed).
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Superseded | Self::Cleared)
    }

    /// The underlying write error, if the write actually ran and failed.
    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Handle for one scheduled write; resolves once the write settles.
#[must_use = "a debounced write still runs if its handle is dropped, but its result is lost"]
pub struct Debounced<T, E> {
    rx: oneshot::Receiver<Result<T, DebounceError<E>>>,
}

impl<T, E> Future for Debounced<T, E> {
    type Output = Result<T, DebounceError<E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx)
            .poll(cx)
            // The timer task was dropped without reporting (runtime shutdown).
            .map(|res| res.unwrap_or(Err(DebounceError::Cleared)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cancel {
    Superseded,
    Cleared,
}

impl<E> From<Cancel> for DebounceError<E> {
    fn from(reason: Cancel) -> Self {
        match reason {
            Cancel::Superseded => Self::Superseded,
            Cancel::Cleared => Self::Cleared,
        }
    }
}

struct PendingTimer {
    ticket: u64,
    cancel: oneshot::Sender<Cancel>,
}

#[derive(Default)]
struct State {
    status: SyncStatus,
    /// Unfired timers, at most one per key
    timers: HashMap<String, PendingTimer>,
    /// Writes in flight, keyed by ticket so one key can have overlapping writes
    in_flight: HashMap<u64, String>,
    /// Set by a failed write, cleared by the next edit
    failed: bool,
    /// Bumped by `clear()`; writes started in an older epoch are ignored
    epoch: u64,
    next_ticket: u64,
    /// Transitions not yet delivered to listeners, oldest first
    outbox: VecDeque<SyncStatus>,
    /// Set while one caller drains `outbox`
    delivering: bool,
}

impl State {
    /// Queue a transition for listeners if the status changed.
    fn set_status(&mut self, status: SyncStatus) {
        if self.status != status {
            self.status = status;
            self.outbox.push_back(status);
        }
    }

    fn derived_status(&self) -> SyncStatus {
        if !self.in_flight.is_empty() {
            SyncStatus::Syncing
        } else if self.failed {
            SyncStatus::Error
        } else if !self.timers.is_empty() {
            SyncStatus::NotSynced
        } else {
            SyncStatus::Synced
        }
    }

    /// Cancel every unfired timer and forget in-flight writes.
    fn reset(&mut self) {
        for (_, timer) in self.timers.drain() {
            let _ = timer.cancel.send(Cancel::Cleared);
        }
        self.in_flight.clear();
        self.failed = false;
        self.epoch += 1;
        self.set_status(SyncStatus::Synced);
    }
}

struct Inner {
    delay: Duration,
    state: Mutex<State>,
    listeners: ListenerRegistry,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver queued transitions after the state lock has been released.
    ///
    /// Only one caller drains at a time, so listeners see transitions in the
    /// order the state changed. A caller that finds another one draining
    /// leaves its transitions to that caller.
    fn publish(&self) {
        {
            let mut state = self.state();
            if state.delivering {
                return;
            }
            state.delivering = true;
        }
        loop {
            let next = {
                let mut state = self.state();
                match state.outbox.pop_front() {
                    Some(status) => status,
                    None => {
                        state.delivering = false;
                        return;
                    }
                }
            };
            self.listeners.notify(next);
        }
    }

    /// Move a fired timer to the in-flight table.
    fn begin_write(&self, key: &str, ticket: u64, epoch: u64) -> Result<(), Cancel> {
        {
            let mut state = self.state();
            if state.epoch != epoch {
                return Err(Cancel::Cleared);
            }
            match state.timers.get(key) {
                Some(timer) if timer.ticket == ticket => {
                    state.timers.remove(key);
                }
                _ => return Err(Cancel::Superseded),
            }
            state.in_flight.insert(ticket, key.to_string());
            state.set_status(SyncStatus::Syncing);
        }
        self.publish();
        Ok(())
    }

    fn finish_write(&self, ticket: u64, epoch: u64, succeeded: bool) {
        {
            let mut state = self.state();
            if state.epoch != epoch {
                // Cleared while the write was running: nobody observes it anymore.
                return;
            }
            state.in_flight.remove(&ticket);
            if succeeded {
                let derived = state.derived_status();
                state.set_status(derived);
            } else {
                state.failed = true;
                state.set_status(SyncStatus::Error);
            }
        }
        self.publish();
    }
}

/// Per-screen edit debouncer.
///
/// Not `Clone`: the owner controls the lifetime, and dropping it cancels
/// every write that has not fired yet.
pub struct Debouncer {
    inner: Arc<Inner>,
}

impl Debouncer {
    /// Create a debouncer that waits `delay` of silence per key before writing.
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                delay,
                state: Mutex::new(State::default()),
                listeners: ListenerRegistry::new(),
            }),
        }
    }

    /// Create a debouncer with a delay given in milliseconds.
    pub fn with_delay_ms(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    /// Current aggregate status.
    pub fn status(&self) -> SyncStatus {
        self.inner.state().status
    }

    /// Keys that have a timer waiting to fire.
    pub fn pending_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.state().timers.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of writes currently running.
    pub fn in_flight(&self) -> usize {
        self.inner.state().in_flight.len()
    }

    /// Schedule `action` to run once `key` has been quiet for the delay.
    ///
    /// Any unfired action previously scheduled under `key` is discarded and
    /// its handle resolves to [`DebounceError::Superseded`]. Must be called
    /// from within a tokio runtime.
    pub fn debounce<T, E, F, Fut>(&self, key: impl Into<String>, action: F) -> Debounced<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let key = key.into();
        let (result_tx, result_rx) = oneshot::channel();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let deadline = Instant::now() + self.inner.delay;

        let (ticket, epoch) = {
            let mut state = self.inner.state();
            state.next_ticket += 1;
            let ticket = state.next_ticket;
            let previous = state.timers.insert(
                key.clone(),
                PendingTimer {
                    ticket,
                    cancel: cancel_tx,
                },
            );
            if let Some(previous) = previous {
                let _ = previous.cancel.send(Cancel::Superseded);
            }
            state.failed = false;
            state.set_status(SyncStatus::NotSynced);
            (ticket, state.epoch)
        };
        self.inner.publish();
        debug!(key = %key, ticket, "Write scheduled");

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::select! {
                reason = cancel_rx => {
                    // A dropped sender means the debouncer itself went away.
                    let reason = reason.unwrap_or(Cancel::Cleared);
                    debug!(key = %key, ticket, ?reason, "Write discarded");
                    let _ = result_tx.send(Err(reason.into()));
                    return;
                }
                _ = tokio::time::sleep_until(deadline) => {}
            }

            let Some(inner) = weak.upgrade() else {
                let _ = result_tx.send(Err(DebounceError::Cleared));
                return;
            };
            if let Err(reason) = inner.begin_write(&key, ticket, epoch) {
                let _ = result_tx.send(Err(reason.into()));
                return;
            }

            debug!(key = %key, ticket, "Write started");
            let outcome = AssertUnwindSafe(async move { action().await })
                .catch_unwind()
                .await;

            let result = match outcome {
                Ok(Ok(value)) => {
                    inner.finish_write(ticket, epoch, true);
                    debug!(key = %key, ticket, "Write completed");
                    Ok(value)
                }
                Ok(Err(e)) => {
                    inner.finish_write(ticket, epoch, false);
                    warn!(key = %key, ticket, "Debounced write failed");
                    Err(DebounceError::Failed(e))
                }
                Err(_) => {
                    inner.finish_write(ticket, epoch, false);
                    warn!(key = %key, ticket, "Debounced write panicked");
                    Err(DebounceError::Panicked)
                }
            };
            let _ = result_tx.send(result);
        });

        Debounced { rx: result_rx }
    }

    /// Register an observer called on every status transition, in the order
    /// the transitions happened. Listeners must not block on the debouncer.
    pub fn add_status_change_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(SyncStatus) + Send + Sync + 'static,
    {
        self.inner.listeners.add(Arc::new(listener))
    }

    /// Register an already shared observer. Registering the same `Arc` twice
    /// makes it fire twice per transition.
    pub fn add_shared_listener(&self, listener: StatusListener) -> ListenerId {
        self.inner.listeners.add(listener)
    }

    pub fn remove_status_change_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.remove(id)
    }

    /// Receive transitions from async code.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncStatus> {
        self.inner.listeners.subscribe()
    }

    /// Cancel every unfired write and reset the status to `synced`.
    ///
    /// Writes already running are not aborted; their results still reach
    /// their handles but no longer affect the status.
    pub fn clear(&self) {
        self.inner.state().reset();
        self.inner.publish();
        debug!("Debouncer cleared");
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        let mut state = self.inner.state();
        state.reset();
        state.outbox.clear();
        drop(state);
        self.inner.listeners.clear();
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.inner.delay)
            .field("status", &self.status())
            .finish()
    }
}
