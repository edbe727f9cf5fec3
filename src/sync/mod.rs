//! Debounced autosave
//!
//! This module provides:
//! - `SyncStatus` - the four-state vocabulary rendered next to every editor
//! - `Debouncer` - coalesces rapid edits into one delayed write per key
//! - `ListenerRegistry` - observers notified on every status transition

mod debouncer;
mod listeners;
mod status;

pub use debouncer::{DebounceError, Debounced, Debouncer, DEFAULT_DELAY};
pub use listeners::{ListenerId, ListenerRegistry, StatusListener};
pub use status::SyncStatus;
