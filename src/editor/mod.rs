//! Autosaving edit sessions
//!
//! An [`EditSession`] is what an editing screen owns while one document is
//! open: every keystroke-level change goes through [`EditSession::edit`],
//! is coalesced per field by a private [`Debouncer`], and ends up as a single
//! `PATCH` against the API. Dropping the session discards unsaved edits that
//! have not fired yet.

use crate::client::{ApiClient, ClientError};
use crate::models::{Document, Note, Plan, UpdateNoteRequest, UpdatePlanRequest};
use crate::sync::{Debounced, Debouncer, ListenerId, SyncStatus};
use std::marker::PhantomData;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

pub struct EditSession<T: Document> {
    client: ApiClient,
    id: Uuid,
    debouncer: Debouncer,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> EditSession<T> {
    pub fn new(client: ApiClient, id: Uuid, delay: Duration) -> Self {
        debug!(route = T::ROUTE, id = %id, ?delay, "Opened edit session");
        Self {
            client,
            id,
            debouncer: Debouncer::new(delay),
            _marker: PhantomData,
        }
    }

    /// Id of the document being edited
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Schedule `patch` to be saved under `key`. A later edit with the same
    /// key before the delay elapses replaces this one.
    pub fn edit(&self, key: impl Into<String>, patch: T::Patch) -> Debounced<T, ClientError> {
        let client = self.client.clone();
        let id = self.id;
        self.debouncer
            .debounce(key, move || async move { client.update::<T>(id, &patch).await })
    }

    pub fn status(&self) -> SyncStatus {
        self.debouncer.status()
    }

    /// Keys with an edit waiting for its delay to elapse
    pub fn pending(&self) -> Vec<String> {
        self.debouncer.pending_keys()
    }

    pub fn on_status_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(SyncStatus) + Send + Sync + 'static,
    {
        self.debouncer.add_status_change_listener(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.debouncer.remove_status_change_listener(id)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncStatus> {
        self.debouncer.subscribe()
    }

    /// Discard unsent edits and reset the status, keeping the session open.
    pub fn discard(&self) {
        self.debouncer.clear();
    }

    /// Close the session. Edits still waiting for their delay are dropped.
    pub fn close(self) {
        debug!(route = T::ROUTE, id = %self.id, "Closed edit session");
    }
}

impl EditSession<Plan> {
    pub fn update_plan(&self, text: impl Into<String>) -> Debounced<Plan, ClientError> {
        self.edit("updatePlan", UpdatePlanRequest::text(text))
    }
}

impl EditSession<Note> {
    pub fn update_title(&self, title: impl Into<String>) -> Debounced<Note, ClientError> {
        let patch = UpdateNoteRequest {
            title: Some(title.into()),
            ..Default::default()
        };
        self.edit("updateTitle", patch)
    }

    pub fn update_content(&self, content: impl Into<String>) -> Debounced<Note, ClientError> {
        let patch = UpdateNoteRequest {
            content: Some(content.into()),
            ..Default::default()
        };
        self.edit("updateContent", patch)
    }
}
