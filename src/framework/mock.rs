//! # Mock Facades & Testing Guide
//!
//! `MockClient<T>` hands out a real [`ResourceClient<T>`] whose requests are
//! answered from a queue of expectations instead of a remote service. Stores
//! under test cannot tell the difference, which makes it easy to drive every
//! success and failure branch deterministically.
//!
//! ## When to use which tool
//!
//! | Tool | Ordering | Use Case |
//! |------|----------|----------|
//! | [`MockClient`] | Replies immediately, in queue order | Most store tests |
//! | [`create_mock_client`] + `expect_*` | The test decides when each reply is sent | Out-of-order replies, in-flight state |
//! | [`MockRelation`] | Replies immediately, in queue order | Link/unlink success and failure |
//! | `RemoteRegistry` | Real server-side behaviour | Integration tests |
//!
//! ## Example
//!
//! ```rust
//! use pet_admin::framework::mock::MockClient;
//! use pet_admin::framework::{ApiError, ListQuery, Page};
//! use pet_admin::model::{Pet, PetId};
//! use pet_admin::stores::ListStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockClient::<Pet>::new();
//!     mock.expect_list().return_err(ApiError::Network("offline".into()));
//!
//!     let store = ListStore::new(mock.facade(), 10);
//!     store.fetch().await;
//!
//!     let state = store.snapshot();
//!     assert!(!state.loading);
//!     assert!(state.error.is_some());
//!     mock.verify();
//! }
//! ```
//!
//! ## Manually ordered replies
//!
//! ```rust
//! use pet_admin::framework::mock::{create_mock_client, expect_list};
//! use pet_admin::framework::{Page, ResourceFacade};
//! use pet_admin::model::Pet;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (client, mut requests) = create_mock_client::<Pet>(4);
//!     let facade: Arc<dyn ResourceFacade<Pet>> = Arc::new(client);
//!
//!     let call = tokio::spawn({
//!         let facade = facade.clone();
//!         async move { facade.list(Default::default()).await }
//!     });
//!
//!     let (query, respond_to) = expect_list(&mut requests).await.unwrap();
//!     respond_to.send(Ok(Page::empty(query.page, query.size))).unwrap();
//!     assert!(call.await.unwrap().is_ok());
//! }
//! ```

use crate::framework::client::ResourceClient;
use crate::framework::error::ApiError;
use crate::framework::facade::{RelationFacade, ResourceFacade};
use crate::framework::message::{ResourceRequest, Response};
use crate::framework::resource::{ListQuery, Page, Resource};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// A queued reply, matched against the next incoming request.
enum Expectation<T: Resource> {
    List {
        response: Result<Page<T>, ApiError>,
    },
    Get {
        id: T::Id,
        response: Result<T, ApiError>,
    },
    Create {
        response: Result<T, ApiError>,
    },
    Update {
        id: T::Id,
        response: Result<T, ApiError>,
    },
    Delete {
        id: T::Id,
        response: Result<(), ApiError>,
    },
    Upload {
        id: T::Id,
        response: Result<(), ApiError>,
    },
}

/// A request the mock received, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call<T: Resource> {
    List(ListQuery),
    Get(T::Id),
    Create(T::Draft),
    Update(T::Id, T::Draft),
    Delete(T::Id),
    UploadPhoto(T::Id),
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A mock facade with expectation tracking for fluent testing.
///
/// Requests that do not match the head of the queue are answered with
/// [`ApiError::Network`] and counted; [`MockClient::verify`] fails on them.
pub struct MockClient<T: Resource> {
    client: ResourceClient<T>,
    expectations: Queue<T>,
    calls: Arc<Mutex<Vec<Call<T>>>>,
    mismatches: Arc<AtomicUsize>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: Resource> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Resource> MockClient<T> {
    /// Creates a mock with no expectations. Must be called inside a runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mismatches = Arc::new(AtomicUsize::new(0));

        let handle = tokio::spawn({
            let expectations = expectations.clone();
            let calls = calls.clone();
            let mismatches = mismatches.clone();
            async move {
                while let Some(request) = receiver.recv().await {
                    calls.lock().unwrap().push(record(&request));
                    let expectation = expectations.lock().unwrap().pop_front();
                    if let Some(request) = answer(request, expectation) {
                        mismatches.fetch_add(1, Ordering::SeqCst);
                        let operation = request.operation();
                        request.reject(ApiError::Network(format!(
                            "unexpected {operation} request"
                        )));
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            calls,
            mismatches,
            _handle: handle,
        }
    }

    /// The client side of the mock.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    /// The client side of the mock, ready for store injection.
    pub fn facade(&self) -> Arc<dyn ResourceFacade<T>> {
        Arc::new(self.client())
    }

    pub fn expect_list(&self) -> ExpectationBuilder<T, Page<T>> {
        self.builder(|response| Expectation::List { response })
    }

    pub fn expect_get(&self, id: T::Id) -> ExpectationBuilder<T, T> {
        self.builder(move |response| Expectation::Get { id, response })
    }

    pub fn expect_create(&self) -> ExpectationBuilder<T, T> {
        self.builder(|response| Expectation::Create { response })
    }

    pub fn expect_update(&self, id: T::Id) -> ExpectationBuilder<T, T> {
        self.builder(move |response| Expectation::Update { id, response })
    }

    pub fn expect_delete(&self, id: T::Id) -> ExpectationBuilder<T, ()> {
        self.builder(move |response| Expectation::Delete { id, response })
    }

    pub fn expect_upload(&self, id: T::Id) -> ExpectationBuilder<T, ()> {
        self.builder(move |response| Expectation::Upload { id, response })
    }

    /// Every request received so far.
    pub fn calls(&self) -> Vec<Call<T>> {
        self.calls.lock().unwrap().clone()
    }

    /// The queries of the list requests received so far.
    pub fn list_queries(&self) -> Vec<ListQuery> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::List(query) => Some(query),
                _ => None,
            })
            .collect()
    }

    /// Verifies that all expectations were met and nothing unexpected arrived.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().unwrap().len();
        if remaining > 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
        let mismatches = self.mismatches.load(Ordering::SeqCst);
        if mismatches > 0 {
            panic!("{mismatches} unexpected request(s) received");
        }
    }

    fn builder<R>(
        &self,
        make: impl FnOnce(Result<R, ApiError>) -> Expectation<T> + Send + 'static,
    ) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            make: Box::new(make),
            expectations: self.expectations.clone(),
        }
    }
}

fn record<T: Resource>(request: &ResourceRequest<T>) -> Call<T> {
    match request {
        ResourceRequest::List { query, .. } => Call::List(query.clone()),
        ResourceRequest::Get { id, .. } => Call::Get(*id),
        ResourceRequest::Create { draft, .. } => Call::Create(draft.clone()),
        ResourceRequest::Update { id, draft, .. } => Call::Update(*id, draft.clone()),
        ResourceRequest::Delete { id, .. } => Call::Delete(*id),
        ResourceRequest::UploadPhoto { id, .. } => Call::UploadPhoto(*id),
    }
}

/// Replies when the expectation matches, otherwise hands the request back.
fn answer<T: Resource>(
    request: ResourceRequest<T>,
    expectation: Option<Expectation<T>>,
) -> Option<ResourceRequest<T>> {
    match (request, expectation) {
        (ResourceRequest::List { respond_to, .. }, Some(Expectation::List { response })) => {
            let _ = respond_to.send(response);
        }
        (ResourceRequest::Get { id, respond_to }, Some(Expectation::Get { id: want, response }))
            if id == want =>
        {
            let _ = respond_to.send(response);
        }
        (ResourceRequest::Create { respond_to, .. }, Some(Expectation::Create { response })) => {
            let _ = respond_to.send(response);
        }
        (
            ResourceRequest::Update { id, respond_to, .. },
            Some(Expectation::Update { id: want, response }),
        ) if id == want => {
            let _ = respond_to.send(response);
        }
        (
            ResourceRequest::Delete { id, respond_to },
            Some(Expectation::Delete { id: want, response }),
        ) if id == want => {
            let _ = respond_to.send(response);
        }
        (
            ResourceRequest::UploadPhoto { id, respond_to, .. },
            Some(Expectation::Upload { id: want, response }),
        ) if id == want => {
            let _ = respond_to.send(response);
        }
        (request, _) => return Some(request),
    }
    None
}

/// Builder for a single queued reply.
pub struct ExpectationBuilder<T: Resource, R> {
    make: Box<dyn FnOnce(Result<R, ApiError>) -> Expectation<T> + Send>,
    expectations: Queue<T>,
}

impl<T: Resource, R> ExpectationBuilder<T, R> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: ApiError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, ApiError>) {
        let expectation = (self.make)(response);
        self.expectations.lock().unwrap().push_back(expectation);
    }
}

// =============================================================================
// MANUAL HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on.
///
/// The test answers each request itself, which allows holding a reply back
/// while a later request completes.
pub fn create_mock_client<T: Resource>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a List request
pub async fn expect_list<T: Resource>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(ListQuery, Response<Page<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::List { query, respond_to }) => Some((query, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Resource>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Delete request
pub async fn expect_delete<T: Resource>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<()>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Delete { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

// =============================================================================
// RELATION MOCK
// =============================================================================

/// A link or unlink the relation mock received.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationCall<P: Resource, R: Resource> {
    Link(P::Id, R::Id),
    Unlink(P::Id, R::Id),
}

/// Answers link/unlink calls from a queue of results.
///
/// With nothing queued a call fails with [`ApiError::Network`].
pub struct MockRelation<P: Resource, R: Resource> {
    responses: Mutex<VecDeque<Result<(), ApiError>>>,
    calls: Mutex<Vec<RelationCall<P, R>>>,
    _marker: PhantomData<fn() -> (P, R)>,
}

impl<P: Resource, R: Resource> Default for MockRelation<P, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Resource, R: Resource> MockRelation<P, R> {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            _marker: PhantomData,
        }
    }

    pub fn return_ok(&self) {
        self.responses.lock().unwrap().push_back(Ok(()));
    }

    pub fn return_err(&self, error: ApiError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn calls(&self) -> Vec<RelationCall<P, R>> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(&self, call: RelationCall<P, R>) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("no response queued".to_string())))
    }
}

#[async_trait]
impl<P: Resource, R: Resource> RelationFacade<P, R> for MockRelation<P, R> {
    async fn link(&self, primary: P::Id, related: R::Id) -> Result<(), ApiError> {
        self.respond(RelationCall::Link(primary, related))
    }

    async fn unlink(&self, primary: P::Id, related: R::Id) -> Result<(), ApiError> {
        self.respond(RelationCall::Unlink(primary, related))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Pet, PetId, Tutor, TutorId};

    #[tokio::test]
    async fn answers_in_queue_order() {
        let mock = MockClient::<Pet>::new();
        mock.expect_delete(PetId(1)).return_ok(());
        mock.expect_delete(PetId(2))
            .return_err(ApiError::bad_request("in use"));

        let facade = mock.facade();
        assert!(facade.delete(PetId(1)).await.is_ok());
        assert_eq!(
            facade.delete(PetId(2)).await,
            Err(ApiError::bad_request("in use"))
        );
        assert_eq!(
            mock.calls(),
            vec![Call::Delete(PetId(1)), Call::Delete(PetId(2))]
        );
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "unexpected request")]
    async fn verify_reports_mismatched_ids() {
        let mock = MockClient::<Pet>::new();
        mock.expect_get(PetId(1))
            .return_err(ApiError::not_found::<Pet>(PetId(1)));

        let result = mock.facade().get_by_id(PetId(9)).await;
        assert!(matches!(result, Err(ApiError::Network(_))));
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "1 remaining")]
    async fn verify_reports_unused_expectations() {
        let mock = MockClient::<Pet>::new();
        mock.expect_list().return_ok(Page::empty(0, 10));
        mock.verify();
    }

    #[tokio::test]
    async fn relation_mock_records_calls() {
        let relation = MockRelation::<Tutor, Pet>::new();
        relation.return_ok();

        assert!(relation.link(TutorId(1), PetId(2)).await.is_ok());
        assert!(relation.unlink(TutorId(1), PetId(2)).await.is_err());
        assert_eq!(
            relation.calls(),
            vec![
                RelationCall::Link(TutorId(1), PetId(2)),
                RelationCall::Unlink(TutorId(1), PetId(2)),
            ]
        );
    }
}
