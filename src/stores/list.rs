//! # List Store
//!
//! Paged, name-filtered listing of one resource type, plus deletion from the
//! list screen.
//!
//! Setters only change the query; the caller decides when to [`fetch`]. Each
//! fetch takes a ticket from a generation counter and its response is applied
//! only while that ticket is still the newest, so a slow early response can
//! never overwrite a later one.
//!
//! [`fetch`]: ListStore::fetch

use crate::framework::{ListQuery, Page, Resource, ResourceFacade, StateStream, Subject};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T: Resource> {
    pub page: u32,
    pub name_filter: String,
    pub loading: bool,
    pub error: Option<String>,
    pub data: Option<Page<T>>,
    pub deleting_id: Option<T::Id>,
    pub delete_error: Option<String>,
}

impl<T: Resource> Default for ListState<T> {
    fn default() -> Self {
        Self {
            page: 0,
            name_filter: String::new(),
            loading: false,
            error: None,
            data: None,
            deleting_id: None,
            delete_error: None,
        }
    }
}

pub struct ListStore<T: Resource> {
    facade: Arc<dyn ResourceFacade<T>>,
    page_size: u32,
    subject: Subject<ListState<T>>,
    generation: AtomicU64,
}

impl<T: Resource> ListStore<T> {
    pub fn new(facade: Arc<dyn ResourceFacade<T>>, page_size: u32) -> Self {
        Self {
            facade,
            page_size,
            subject: Subject::default(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> ListState<T> {
        self.subject.snapshot()
    }

    pub fn subscribe(&self) -> StateStream<ListState<T>> {
        self.subject.subscribe()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Replaces the name filter and goes back to the first page.
    pub fn set_name_filter(&self, value: impl Into<String>) {
        let value = value.into();
        self.subject.update(|state| {
            state.name_filter = value;
            state.page = 0;
        });
    }

    /// Out-of-range pages are sent as-is; the server answers them with an empty page.
    pub fn set_page(&self, page: u32) {
        self.subject.update(|state| state.page = page);
    }

    /// Loads the current page with the current filter.
    #[instrument(skip(self), fields(kind = T::KIND))]
    pub async fn fetch(&self) {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut query = ListQuery::default();
        self.subject.update(|state| {
            state.loading = true;
            state.error = None;
            query = ListQuery::new(state.page, self.page_size, &state.name_filter);
        });
        debug!(?query, ticket, "Fetching page");

        let result = self.facade.list(query).await;

        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "Discarding stale page");
            return;
        }
        match result {
            Ok(page) => {
                debug!(total = page.total, rows = page.content.len(), "Page loaded");
                self.subject.update(|state| {
                    state.data = Some(page);
                    state.loading = false;
                });
            }
            Err(e) => {
                warn!(error = %e, "Fetch failed");
                self.subject.update(|state| {
                    state.loading = false;
                    state.error = Some(e.to_string());
                });
            }
        }
    }

    /// Deletes a record and reloads the current page once on success.
    ///
    /// Failures land in `delete_error`; the list and its `error` stay as they were.
    #[instrument(skip(self), fields(kind = T::KIND))]
    pub async fn delete(&self, id: T::Id) {
        self.subject.update(|state| {
            state.deleting_id = Some(id);
            state.delete_error = None;
        });

        match self.facade.delete(id).await {
            Ok(()) => {
                info!(%id, "Deleted");
                self.subject.update(|state| state.deleting_id = None);
                self.fetch().await;
            }
            Err(e) => {
                warn!(%id, error = %e, "Delete failed");
                self.subject.update(|state| {
                    state.deleting_id = None;
                    state.delete_error = Some(e.to_string());
                });
            }
        }
    }
}
