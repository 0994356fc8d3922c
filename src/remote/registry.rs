//! # Remote Registry
//!
//! The server half of the channel clients. One task owns every table and
//! serves the pet, tutor, link and auth channels, one message at a time, so
//! the tables need no locking.
//!
//! It behaves the way the remote API does as far as the stores can observe:
//! server-assigned ids, case-insensitive name filtering, pages past the end
//! answered with empty content, related summaries embedded in every record,
//! deletes that drop the record's links, and rotating refresh tokens.

use super::tables::{Stored, Tables};
use crate::clients::{AuthClient, AuthRequest, LinkClient, LinkRequest, PetClient, TutorClient};
use crate::framework::{page_count, ApiError, ListQuery, Page, ResourceClient, ResourceRequest};
use crate::model::{Pet, PetId, Photo, Tokens, Tutor, TutorId};
use std::collections::HashSet;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The login the registry accepts.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Clients connected to a [`RemoteRegistry`].
#[derive(Clone)]
pub struct RemoteHandles {
    pub pets: PetClient,
    pub tutors: TutorClient,
    pub links: LinkClient,
    pub auth: AuthClient,
}

pub struct RemoteRegistry {
    pets: mpsc::Receiver<ResourceRequest<Pet>>,
    tutors: mpsc::Receiver<ResourceRequest<Tutor>>,
    links: mpsc::Receiver<LinkRequest>,
    auth: mpsc::Receiver<AuthRequest>,
    tables: Tables,
    credentials: Credentials,
    refresh_tokens: HashSet<String>,
    issued: u64,
}

impl RemoteRegistry {
    /// Creates the registry and the clients that talk to it.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - Capacity of each request channel. When a channel is
    ///   full, callers wait for space.
    /// * `credentials` - The only login accepted.
    pub fn new(buffer_size: usize, credentials: Credentials) -> (Self, RemoteHandles) {
        let (pet_tx, pet_rx) = mpsc::channel(buffer_size);
        let (tutor_tx, tutor_rx) = mpsc::channel(buffer_size);
        let (link_tx, link_rx) = mpsc::channel(buffer_size);
        let (auth_tx, auth_rx) = mpsc::channel(buffer_size);

        let registry = Self {
            pets: pet_rx,
            tutors: tutor_rx,
            links: link_rx,
            auth: auth_rx,
            tables: Tables::default(),
            credentials,
            refresh_tokens: HashSet::new(),
            issued: 0,
        };
        let handles = RemoteHandles {
            pets: ResourceClient::new(pet_tx),
            tutors: ResourceClient::new(tutor_tx),
            links: LinkClient::new(link_tx),
            auth: AuthClient::new(auth_tx),
        };
        (registry, handles)
    }

    /// Serves requests until every client has been dropped.
    pub async fn run(mut self) {
        info!("Registry started");

        loop {
            tokio::select! {
                Some(request) = self.pets.recv() => serve(&mut self.tables, request),
                Some(request) = self.tutors.recv() => serve(&mut self.tables, request),
                Some(request) = self.links.recv() => self.serve_link(request),
                Some(request) = self.auth.recv() => self.serve_auth(request),
                else => break,
            }
        }

        info!(
            pets = self.tables.pets.len(),
            tutors = self.tables.tutors.len(),
            links = self.tables.links.len(),
            "Shutdown"
        );
    }

    fn serve_link(&mut self, request: LinkRequest) {
        match request {
            LinkRequest::Link {
                tutor,
                pet,
                respond_to,
            } => {
                debug!(%tutor, %pet, "Link");
                let result = self.check_pair(tutor, pet).and_then(|()| {
                    if self.tables.links.insert((tutor, pet)) {
                        Ok(())
                    } else {
                        Err(ApiError::Rejected {
                            status: 409,
                            message: format!("pet {pet} is already linked to tutor {tutor}"),
                        })
                    }
                });
                log_link("Linked", tutor, pet, &result);
                let _ = respond_to.send(result);
            }
            LinkRequest::Unlink {
                tutor,
                pet,
                respond_to,
            } => {
                debug!(%tutor, %pet, "Unlink");
                let result = self.check_pair(tutor, pet).and_then(|()| {
                    if self.tables.links.remove(&(tutor, pet)) {
                        Ok(())
                    } else {
                        Err(ApiError::NotFound {
                            kind: "link",
                            id: format!("{tutor}/{pet}"),
                        })
                    }
                });
                log_link("Unlinked", tutor, pet, &result);
                let _ = respond_to.send(result);
            }
        }
    }

    fn check_pair(&self, tutor: TutorId, pet: PetId) -> Result<(), ApiError> {
        if !self.tables.tutors.contains_key(&tutor) {
            return Err(ApiError::not_found::<Tutor>(tutor));
        }
        if !self.tables.pets.contains_key(&pet) {
            return Err(ApiError::not_found::<Pet>(pet));
        }
        Ok(())
    }

    fn serve_auth(&mut self, request: AuthRequest) {
        match request {
            AuthRequest::Login {
                username,
                password,
                respond_to,
            } => {
                let result = if username == self.credentials.username
                    && password == self.credentials.password
                {
                    info!(%username, "Login");
                    Ok(self.issue())
                } else {
                    warn!(%username, "Login rejected");
                    Err(ApiError::unauthorized("invalid username or password"))
                };
                let _ = respond_to.send(result);
            }
            AuthRequest::Refresh {
                refresh_token,
                respond_to,
            } => {
                let result = if self.refresh_tokens.remove(&refresh_token) {
                    debug!("Refresh");
                    Ok(self.issue())
                } else {
                    warn!("Refresh rejected");
                    Err(ApiError::unauthorized("refresh token is invalid or expired"))
                };
                let _ = respond_to.send(result);
            }
        }
    }

    fn issue(&mut self) -> Tokens {
        self.issued += 1;
        let tokens = Tokens {
            access_token: format!("access-{}", self.issued),
            refresh_token: format!("refresh-{}", self.issued),
        };
        self.refresh_tokens.insert(tokens.refresh_token.clone());
        tokens
    }
}

fn log_link(action: &str, tutor: TutorId, pet: PetId, result: &Result<(), ApiError>) {
    match result {
        Ok(()) => info!(%tutor, %pet, "{action}"),
        Err(e) => warn!(%tutor, %pet, error = %e, "{action} failed"),
    }
}

/// Hands out a record with its embedded summaries filled in.
fn hydrated<T: Stored>(tables: &Tables, record: &T) -> T {
    let mut record = record.clone();
    record.hydrate(tables);
    record
}

fn list<T: Stored>(tables: &Tables, query: &ListQuery) -> Page<T> {
    let needle = query.name.as_deref().map(str::to_lowercase);
    let matches: Vec<&T> = T::table(tables)
        .values()
        .filter(|record| match &needle {
            Some(needle) => record.name().to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .collect();

    let total = matches.len() as u64;
    let skip = query.page as usize * query.size as usize;
    Page {
        page: query.page,
        size: query.size,
        total,
        page_count: page_count(total, query.size),
        content: matches
            .into_iter()
            .skip(skip)
            .take(query.size as usize)
            .map(|record| hydrated(tables, record))
            .collect(),
    }
}

fn serve<T: Stored>(tables: &mut Tables, request: ResourceRequest<T>) {
    let kind = T::KIND;
    match request {
        ResourceRequest::List { query, respond_to } => {
            let page = list::<T>(tables, &query);
            debug!(kind, ?query, total = page.total, "List");
            let _ = respond_to.send(Ok(page));
        }
        ResourceRequest::Get { id, respond_to } => {
            let result = T::table(tables)
                .get(&id)
                .map(|record| hydrated(tables, record))
                .ok_or_else(|| ApiError::not_found::<T>(id));
            debug!(kind, %id, found = result.is_ok(), "Get");
            let _ = respond_to.send(result);
        }
        ResourceRequest::Create { draft, respond_to } => {
            debug!(kind, ?draft, "Create");
            let id = T::next_id(tables);
            let result = T::build(id, draft).map(|record| {
                T::reserve_id(tables);
                let created = hydrated(tables, &record);
                T::table_mut(tables).insert(id, record);
                created
            });
            match &result {
                Ok(_) => info!(kind, %id, size = T::table(tables).len(), "Created"),
                Err(e) => warn!(kind, error = %e, "Create failed"),
            }
            let _ = respond_to.send(result);
        }
        ResourceRequest::Update {
            id,
            draft,
            respond_to,
        } => {
            debug!(kind, %id, ?draft, "Update");
            let result = match T::table_mut(tables).get_mut(&id) {
                Some(record) => record.apply(draft),
                None => Err(ApiError::not_found::<T>(id)),
            }
            .map(|()| hydrated(tables, &T::table(tables)[&id]));
            match &result {
                Ok(_) => info!(kind, %id, "Updated"),
                Err(e) => warn!(kind, %id, error = %e, "Update failed"),
            }
            let _ = respond_to.send(result);
        }
        ResourceRequest::Delete { id, respond_to } => {
            debug!(kind, %id, "Delete");
            let result = match T::table_mut(tables).remove(&id) {
                Some(_) => {
                    T::unlink_all(tables, id);
                    info!(kind, %id, size = T::table(tables).len(), "Deleted");
                    Ok(())
                }
                None => {
                    warn!(kind, %id, "Not found");
                    Err(ApiError::not_found::<T>(id))
                }
            };
            let _ = respond_to.send(result);
        }
        ResourceRequest::UploadPhoto {
            id,
            photo,
            respond_to,
        } => {
            debug!(kind, %id, ?photo, "Upload photo");
            let photo_id = tables.next_photo_id();
            let result = match T::table_mut(tables).get_mut(&id) {
                Some(record) => {
                    record.set_photo(Photo {
                        id: photo_id,
                        filename: photo.filename().to_string(),
                        content_type: photo.content_type().to_string(),
                        url: format!("/{kind}s/{id}/photos/{photo_id}"),
                    });
                    info!(kind, %id, photo_id, "Photo stored");
                    Ok(())
                }
                None => {
                    warn!(kind, %id, "Not found");
                    Err(ApiError::not_found::<T>(id))
                }
            };
            let _ = respond_to.send(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{AuthFacade, RelationFacade, ResourceFacade};
    use crate::model::{PetDraft, PhotoUpload, TutorDraft};

    fn start() -> RemoteHandles {
        let (registry, handles) = RemoteRegistry::new(
            8,
            Credentials {
                username: "admin".into(),
                password: "secret".into(),
            },
        );
        tokio::spawn(registry.run());
        handles
    }

    fn pet_draft(name: &str) -> PetDraft {
        PetDraft {
            name: name.into(),
            breed: "SRD".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_by_the_server() {
        let remote = start();
        let first = remote.pets.create(pet_draft("Rex")).await.unwrap();
        let second = remote.pets.create(pet_draft("Luna")).await.unwrap();
        assert_eq!(first.id, PetId(1));
        assert_eq!(second.id, PetId(2));
    }

    #[tokio::test]
    async fn rejected_creates_do_not_use_up_ids() {
        let remote = start();
        let first = remote.pets.create(pet_draft("Rex")).await.unwrap();
        remote.pets.create(pet_draft(" ")).await.unwrap_err();
        let second = remote.pets.create(pet_draft("Luna")).await.unwrap();
        assert_eq!(first.id, PetId(1));
        assert_eq!(second.id, PetId(2));
    }

    #[tokio::test]
    async fn pages_past_the_end_are_empty() {
        let remote = start();
        for n in 0..25 {
            remote
                .pets
                .create(pet_draft(&format!("Pet {n:02}")))
                .await
                .unwrap();
        }

        let third = remote.pets.list(ListQuery::new(2, 10, "")).await.unwrap();
        assert_eq!(third.total, 25);
        assert_eq!(third.page_count, 3);
        assert_eq!(third.content.len(), 5);
        assert_eq!(third.content[0].name, "Pet 20");

        let beyond = remote.pets.list(ListQuery::new(5, 10, "")).await.unwrap();
        assert!(beyond.content.is_empty());
        assert_eq!(beyond.page, 5);
        assert_eq!(beyond.total, 25);
    }

    #[tokio::test]
    async fn name_filter_is_case_insensitive() {
        let remote = start();
        remote.pets.create(pet_draft("Rex")).await.unwrap();
        remote.pets.create(pet_draft("Luna")).await.unwrap();
        remote.pets.create(pet_draft("T-Rex")).await.unwrap();

        let page = remote.pets.list(ListQuery::new(0, 10, "rex")).await.unwrap();
        let names: Vec<_> = page.content.iter().map(|pet| pet.name.as_str()).collect();
        assert_eq!(names, vec!["Rex", "T-Rex"]);
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn invalid_drafts_are_rejected() {
        let remote = start();
        let err = remote.pets.create(pet_draft("  ")).await.unwrap_err();
        assert_eq!(err, ApiError::bad_request("name is required"));
        assert_eq!(
            remote.pets.update(PetId(9), pet_draft("Rex")).await,
            Err(ApiError::not_found::<Pet>(PetId(9)))
        );
    }

    #[tokio::test]
    async fn links_are_embedded_on_both_sides() {
        let remote = start();
        let pet = remote.pets.create(pet_draft("Rex")).await.unwrap();
        let tutor = remote
            .tutors
            .create(TutorDraft {
                name: "Ana".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        remote.links.link(tutor.id, pet.id).await.unwrap();
        let conflict = remote.links.link(tutor.id, pet.id).await.unwrap_err();
        assert!(matches!(conflict, ApiError::Rejected { status: 409, .. }));

        let pet = remote.pets.get_by_id(pet.id).await.unwrap();
        assert_eq!(pet.tutors[0].name, "Ana");
        let tutor = remote.tutors.get_by_id(tutor.id).await.unwrap();
        assert_eq!(tutor.pets[0].name, "Rex");

        remote.pets.delete(pet.id).await.unwrap();
        let tutor = remote.tutors.get_by_id(tutor.id).await.unwrap();
        assert!(tutor.pets.is_empty());
    }

    #[tokio::test]
    async fn unlinking_a_missing_link_is_not_found() {
        let remote = start();
        let pet = remote.pets.create(pet_draft("Rex")).await.unwrap();
        let relation: &dyn RelationFacade<Pet, Tutor> = &remote.links;
        let err = relation.unlink(pet.id, TutorId(3)).await.unwrap_err();
        assert_eq!(err, ApiError::not_found::<Tutor>(TutorId(3)));
    }

    #[tokio::test]
    async fn photo_metadata_is_attached() {
        let remote = start();
        let pet = remote.pets.create(pet_draft("Rex")).await.unwrap();
        let upload = PhotoUpload::new("rex.png", "image/png", vec![1, 2]).unwrap();

        remote.pets.upload_photo(pet.id, upload).await.unwrap();

        let photo = remote.pets.get_by_id(pet.id).await.unwrap().photo.unwrap();
        assert_eq!(photo.filename, "rex.png");
        assert_eq!(photo.url, "/pets/1/photos/1");
    }

    #[tokio::test]
    async fn refresh_tokens_are_single_use() {
        let remote = start();
        assert!(remote.auth.login("admin", "nope").await.is_err());

        let tokens = remote.auth.login("admin", "secret").await.unwrap();
        let rotated = remote.auth.refresh(&tokens.refresh_token).await.unwrap();
        assert_ne!(rotated.access_token, tokens.access_token);
        assert!(remote.auth.refresh(&tokens.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn run_returns_once_clients_are_gone() {
        let (registry, handles) = RemoteRegistry::new(
            1,
            Credentials {
                username: "a".into(),
                password: "b".into(),
            },
        );
        let handle = tokio::spawn(registry.run());
        drop(handles);
        handle.await.unwrap();
    }
}
