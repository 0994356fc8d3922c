//! # Candidate List
//!
//! The searchable list of records that can still be linked to the record on
//! a detail screen (the pets offered on a tutor page). Typing in the search
//! box should not send a request per keystroke, so every input change is
//! debounced:
//!
//! 1. The change bumps a generation counter and spawns a task.
//! 2. The task sleeps for the debounce interval.
//! 3. If a newer change arrived meanwhile, the task stops without a request.
//! 4. When the response arrives it is applied only if still the newest.
//!
//! Records already linked are listed in `excluded` and removed from every
//! page before it reaches the snapshot.

use crate::framework::{ListQuery, Page, Resource, ResourceFacade, StateStream, Subject};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateState<T: Resource> {
    pub query: String,
    pub page: u32,
    pub excluded: BTreeSet<T::Id>,
    pub loading: bool,
    pub error: Option<String>,
    pub data: Option<Page<T>>,
    pub selected: Option<T::Id>,
}

impl<T: Resource> Default for CandidateState<T> {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 0,
            excluded: BTreeSet::new(),
            loading: false,
            error: None,
            data: None,
            selected: None,
        }
    }
}

struct Inner<T: Resource> {
    facade: Arc<dyn ResourceFacade<T>>,
    page_size: u32,
    debounce: Duration,
    subject: Subject<CandidateState<T>>,
    generation: AtomicU64,
}

/// Cloning shares the same state; all clones schedule against one counter.
pub struct CandidateList<T: Resource> {
    inner: Arc<Inner<T>>,
}

impl<T: Resource> Clone for CandidateList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Resource> CandidateList<T> {
    pub fn new(facade: Arc<dyn ResourceFacade<T>>, page_size: u32, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                facade,
                page_size,
                debounce,
                subject: Subject::default(),
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn snapshot(&self) -> CandidateState<T> {
        self.inner.subject.snapshot()
    }

    pub fn subscribe(&self) -> StateStream<CandidateState<T>> {
        self.inner.subject.subscribe()
    }

    /// Replaces the search text and goes back to the first page.
    ///
    /// The returned handle completes once this input has been served or
    /// superseded; callers are free to drop it.
    pub fn set_query(&self, value: impl Into<String>) -> JoinHandle<()> {
        let value = value.into();
        self.inner.subject.update(|state| {
            state.query = value;
            state.page = 0;
        });
        self.schedule()
    }

    pub fn set_page(&self, page: u32) -> JoinHandle<()> {
        self.inner.subject.update(|state| state.page = page);
        self.schedule()
    }

    /// Replaces the ids hidden from the list, usually the records already linked.
    pub fn set_excluded(&self, ids: impl IntoIterator<Item = T::Id>) -> JoinHandle<()> {
        let excluded: BTreeSet<T::Id> = ids.into_iter().collect();
        self.inner.subject.update(|state| {
            if state.selected.is_some_and(|id| excluded.contains(&id)) {
                state.selected = None;
            }
            state.excluded = excluded;
        });
        self.schedule()
    }

    /// Reissues the current query after the debounce interval.
    pub fn refresh(&self) -> JoinHandle<()> {
        self.schedule()
    }

    pub fn select(&self, id: T::Id) {
        self.inner.subject.update(|state| state.selected = Some(id));
    }

    pub fn clear_selection(&self) {
        self.inner.subject.update(|state| state.selected = None);
    }

    fn schedule(&self) -> JoinHandle<()> {
        let ticket = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let inner = self.inner.clone();
        tokio::spawn(async move { inner.run(ticket).await })
    }
}

impl<T: Resource> Inner<T> {
    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    async fn run(&self, ticket: u64) {
        tokio::time::sleep(self.debounce).await;
        if !self.is_current(ticket) {
            return;
        }

        let mut query = ListQuery::default();
        self.subject.update(|state| {
            state.loading = true;
            state.error = None;
            query = ListQuery::new(state.page, self.page_size, &state.query);
        });
        debug!(kind = T::KIND, ?query, ticket, "Searching candidates");

        let result = self.facade.list(query).await;

        if !self.is_current(ticket) {
            debug!(kind = T::KIND, ticket, "Discarding stale candidates");
            return;
        }
        match result {
            Ok(mut page) => {
                self.subject.update(|state| {
                    page.content
                        .retain(|candidate| !state.excluded.contains(&candidate.id()));
                    state.data = Some(page);
                    state.loading = false;
                });
            }
            Err(e) => {
                warn!(kind = T::KIND, error = %e, "Candidate search failed");
                self.subject.update(|state| {
                    state.loading = false;
                    state.error = Some(e.to_string());
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{create_mock_client, expect_list, MockClient};
    use crate::framework::{page_count, ApiError};
    use crate::model::{Pet, PetId};

    const DEBOUNCE: Duration = Duration::from_millis(350);

    fn page_of(ids: &[u32]) -> Page<Pet> {
        Page {
            page: 0,
            size: 10,
            total: ids.len() as u64,
            page_count: page_count(ids.len() as u64, 10),
            content: ids
                .iter()
                .map(|id| Pet::new(PetId(*id), format!("Pet {id}"), "SRD"))
                .collect(),
        }
    }

    fn ids(state: &CandidateState<Pet>) -> Vec<PetId> {
        state
            .data
            .as_ref()
            .map(|page| page.content.iter().map(|pet| pet.id).collect())
            .unwrap_or_default()
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_last_keystroke_is_searched() {
        let mock = MockClient::<Pet>::new();
        mock.expect_list().return_ok(page_of(&[1]));
        let candidates = CandidateList::new(mock.facade(), 10, DEBOUNCE);

        let first = candidates.set_query("R");
        let second = candidates.set_query("Re");
        let last = candidates.set_query(" Rex ");
        for handle in [first, second, last] {
            handle.await.unwrap();
        }

        assert_eq!(mock.list_queries(), vec![ListQuery::new(0, 10, "Rex")]);
        assert_eq!(ids(&candidates.snapshot()), vec![PetId(1)]);
        mock.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_sent_before_the_interval_elapses() {
        let mock = MockClient::<Pet>::new();
        mock.expect_list().return_ok(page_of(&[]));
        let candidates = CandidateList::new(mock.facade(), 10, DEBOUNCE);

        let handle = candidates.set_query("Rex");
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(mock.calls().is_empty());
        assert!(!candidates.snapshot().loading);

        handle.await.unwrap();
        assert_eq!(mock.list_queries().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn linked_records_are_filtered_out() {
        let mock = MockClient::<Pet>::new();
        mock.expect_list().return_ok(page_of(&[1, 2, 3]));
        let candidates = CandidateList::new(mock.facade(), 10, DEBOUNCE);

        candidates.set_excluded([PetId(2)]).await.unwrap();

        let state = candidates.snapshot();
        assert_eq!(ids(&state), vec![PetId(1), PetId(3)]);
        assert!(state.excluded.contains(&PetId(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn response_after_newer_input_is_dropped() {
        let (client, mut requests) = create_mock_client::<Pet>(4);
        let candidates = CandidateList::new(Arc::new(client), 10, DEBOUNCE);

        let first = candidates.set_query("a");
        let (query, respond_first) = expect_list(&mut requests).await.unwrap();
        assert_eq!(query.name.as_deref(), Some("a"));

        let second = candidates.set_query("b");
        respond_first.send(Ok(page_of(&[1]))).unwrap();
        first.await.unwrap();
        assert_eq!(candidates.snapshot().data, None);

        let (query, respond_second) = expect_list(&mut requests).await.unwrap();
        assert_eq!(query.name.as_deref(), Some("b"));
        respond_second.send(Ok(page_of(&[2]))).unwrap();
        second.await.unwrap();

        let state = candidates.snapshot();
        assert!(!state.loading);
        assert_eq!(ids(&state), vec![PetId(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_repeats_the_current_search() {
        let mock = MockClient::<Pet>::new();
        mock.expect_list().return_ok(page_of(&[1, 2]));
        mock.expect_list().return_ok(page_of(&[1]));
        let candidates = CandidateList::new(mock.facade(), 10, DEBOUNCE);

        candidates.set_query("Rex").await.unwrap();
        assert_eq!(ids(&candidates.snapshot()), vec![PetId(1), PetId(2)]);

        candidates.refresh().await.unwrap();

        assert_eq!(
            mock.list_queries(),
            vec![ListQuery::new(0, 10, "Rex"), ListQuery::new(0, 10, "Rex")]
        );
        assert_eq!(ids(&candidates.snapshot()), vec![PetId(1)]);
        mock.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn search_failure_is_reported() {
        let mock = MockClient::<Pet>::new();
        mock.expect_list()
            .return_err(ApiError::Network("offline".to_string()));
        let candidates = CandidateList::new(mock.facade(), 10, DEBOUNCE);

        candidates.set_page(1).await.unwrap();

        let state = candidates.snapshot();
        assert!(!state.loading);
        assert_eq!(
            state.error.as_deref(),
            Some("request could not complete: offline")
        );
        assert_eq!(mock.list_queries()[0].page, 1);
    }

    #[tokio::test]
    async fn selection_is_cleared_when_the_pick_becomes_excluded() {
        let mock = MockClient::<Pet>::new();
        let candidates = CandidateList::new(mock.facade(), 10, Duration::from_secs(3600));

        candidates.select(PetId(4));
        assert_eq!(candidates.snapshot().selected, Some(PetId(4)));

        let _pending = candidates.set_excluded([PetId(4)]);
        assert_eq!(candidates.snapshot().selected, None);

        candidates.select(PetId(5));
        candidates.clear_selection();
        assert_eq!(candidates.snapshot().selected, None);
    }
}
