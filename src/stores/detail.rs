//! # Detail Store
//!
//! One record together with the records it is linked to: a tutor and its pets,
//! or a pet and its tutors. Linking and unlinking happen here too, and after
//! either one the record is reloaded so the view shows what the server holds.
//!
//! Related records are fetched concurrently and fail fast: the related list is
//! either complete or left as it was, never partially filled.

use crate::framework::{
    ApiError, RelationFacade, Related, Resource, ResourceFacade, StateStream, Subject,
};
use futures_util::future::try_join_all;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct DetailState<P: Resource, R: Resource> {
    pub loading: bool,
    pub error: Option<String>,
    pub entity: Option<P>,
    pub related: Vec<R>,
    pub linking: bool,
    pub link_error: Option<String>,
}

impl<P: Resource, R: Resource> Default for DetailState<P, R> {
    fn default() -> Self {
        Self {
            loading: false,
            error: None,
            entity: None,
            related: Vec::new(),
            linking: false,
            link_error: None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum LinkOp {
    Link,
    Unlink,
}

pub struct DetailStore<P: Related<R>, R: Resource> {
    primary: Arc<dyn ResourceFacade<P>>,
    related: Arc<dyn ResourceFacade<R>>,
    relation: Arc<dyn RelationFacade<P, R>>,
    subject: Subject<DetailState<P, R>>,
    generation: AtomicU64,
}

impl<P: Related<R>, R: Resource> DetailStore<P, R> {
    pub fn new(
        primary: Arc<dyn ResourceFacade<P>>,
        related: Arc<dyn ResourceFacade<R>>,
        relation: Arc<dyn RelationFacade<P, R>>,
    ) -> Self {
        Self {
            primary,
            related,
            relation,
            subject: Subject::default(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> DetailState<P, R> {
        self.subject.snapshot()
    }

    pub fn subscribe(&self) -> StateStream<DetailState<P, R>> {
        self.subject.subscribe()
    }

    /// Ids of the related records currently shown.
    pub fn linked_ids(&self) -> Vec<R::Id> {
        self.subject
            .snapshot()
            .related
            .iter()
            .map(Resource::id)
            .collect()
    }

    /// Resets to the empty snapshot. Responses still in flight are ignored.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.subject.replace(DetailState::default());
    }

    #[instrument(skip(self), fields(kind = P::KIND))]
    pub async fn fetch(&self, id: P::Id) {
        let ticket = self.next_ticket();
        self.subject.update(|state| {
            state.loading = true;
            state.error = None;
        });

        let result = self.load(id).await;

        if !self.is_current(ticket) {
            debug!(%id, ticket, "Discarding stale detail");
            return;
        }
        match result {
            Ok((entity, related)) => {
                debug!(%id, related = related.len(), "Detail loaded");
                self.subject.update(|state| {
                    state.entity = Some(entity);
                    state.related = related;
                    state.loading = false;
                });
            }
            Err(e) => {
                warn!(%id, error = %e, "Fetch failed");
                self.subject.update(|state| {
                    state.loading = false;
                    state.error = Some(e.to_string());
                });
            }
        }
    }

    /// Links `related` to `primary` and reloads the record.
    ///
    /// Returns `true` when both the link and the reload succeeded.
    #[instrument(skip(self), fields(kind = P::KIND))]
    pub async fn link(&self, primary: P::Id, related: R::Id) -> bool {
        self.mutate_relation(LinkOp::Link, primary, related).await
    }

    /// Removes the link between `primary` and `related` and reloads the record.
    #[instrument(skip(self), fields(kind = P::KIND))]
    pub async fn unlink(&self, primary: P::Id, related: R::Id) -> bool {
        self.mutate_relation(LinkOp::Unlink, primary, related).await
    }

    async fn mutate_relation(&self, op: LinkOp, primary: P::Id, related: R::Id) -> bool {
        let started = self.generation.load(Ordering::SeqCst);
        self.subject.update(|state| {
            state.linking = true;
            state.link_error = None;
        });

        let outcome = match op {
            LinkOp::Link => self.relation.link(primary, related).await,
            LinkOp::Unlink => self.relation.unlink(primary, related).await,
        };
        if let Err(e) = outcome {
            warn!(?op, %primary, %related, error = %e, "Relation change failed");
            let superseded = self.generation.load(Ordering::SeqCst) != started;
            self.subject.update(|state| {
                state.linking = false;
                if !superseded {
                    state.link_error = Some(e.to_string());
                }
            });
            return false;
        }
        info!(?op, %primary, %related, "Relation changed");

        // A clear() or fetch() issued meanwhile owns the snapshot now.
        let Some(ticket) = self.claim_ticket(started) else {
            debug!(%primary, "Skipping reload after navigation");
            self.subject.update(|state| state.linking = false);
            return true;
        };
        let refreshed = self.load(primary).await;
        let current = self.is_current(ticket);
        match refreshed {
            Ok((entity, related)) => {
                self.subject.update(|state| {
                    if current {
                        state.entity = Some(entity);
                        state.related = related;
                        state.loading = false;
                    }
                    state.linking = false;
                });
                true
            }
            Err(e) => {
                warn!(%primary, error = %e, "Reload after relation change failed");
                self.subject.update(|state| {
                    if current {
                        state.loading = false;
                    }
                    state.linking = false;
                    state.link_error = Some(e.to_string());
                });
                false
            }
        }
    }

    async fn load(&self, id: P::Id) -> Result<(P, Vec<R>), ApiError> {
        let entity = self.primary.get_by_id(id).await?;
        let lookups = entity
            .related_ids()
            .into_iter()
            .map(|related_id| self.related.get_by_id(related_id));
        let related = try_join_all(lookups).await?;
        Ok((entity, related))
    }

    fn next_ticket(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Takes the next ticket only if no other ticket was issued since `seen`.
    fn claim_ticket(&self, seen: u64) -> Option<u64> {
        self.generation
            .compare_exchange(seen, seen + 1, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|previous| previous + 1)
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }
}
