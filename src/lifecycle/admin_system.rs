use std::sync::Arc;

use tracing::{error, info};

use crate::config::{AdminConfig, StoreConfig};
use crate::framework::{AuthFacade, RelationFacade, ResourceFacade};
use crate::model::{Pet, Tutor};
use crate::remote::{RemoteHandles, RemoteRegistry};
use crate::stores::{
    CandidateList, DetailStore, FormStore, ListStore, MemoryTokenStorage, PetCandidates,
    PetDetailStore, PetFormStore, PetListStore, SessionStore, TokenStorage, TutorDetailStore,
    TutorFormStore, TutorListStore,
};

/// Everything the stores depend on, ready for injection.
pub struct Facades {
    pub pets: Arc<dyn ResourceFacade<Pet>>,
    pub tutors: Arc<dyn ResourceFacade<Tutor>>,
    pub tutor_links: Arc<dyn RelationFacade<Tutor, Pet>>,
    pub pet_links: Arc<dyn RelationFacade<Pet, Tutor>>,
    pub auth: Arc<dyn AuthFacade>,
    pub tokens: Arc<dyn TokenStorage>,
}

impl Facades {
    /// Facades backed by registry clients, with tokens kept in memory.
    pub fn from_remote(remote: RemoteHandles) -> Self {
        let links = Arc::new(remote.links);
        Self {
            pets: Arc::new(remote.pets),
            tutors: Arc::new(remote.tutors),
            tutor_links: links.clone(),
            pet_links: links,
            auth: Arc::new(remote.auth),
            tokens: Arc::new(MemoryTokenStorage::default()),
        }
    }
}

/// One store per screen concern.
pub struct Stores {
    pub session: SessionStore,
    pub pet_list: PetListStore,
    pub tutor_list: TutorListStore,
    pub pet_detail: PetDetailStore,
    pub tutor_detail: TutorDetailStore,
    pub pet_form: PetFormStore,
    pub tutor_form: TutorFormStore,
    /// Pets offered for linking on the tutor detail screen.
    pub pet_candidates: PetCandidates,
}

impl Stores {
    pub fn from_facades(facades: Facades, config: &StoreConfig) -> Self {
        Self {
            session: SessionStore::new(facades.auth, facades.tokens),
            pet_list: ListStore::new(facades.pets.clone(), config.page_size),
            tutor_list: ListStore::new(facades.tutors.clone(), config.page_size),
            pet_detail: DetailStore::new(
                facades.pets.clone(),
                facades.tutors.clone(),
                facades.pet_links,
            ),
            tutor_detail: DetailStore::new(
                facades.tutors.clone(),
                facades.pets.clone(),
                facades.tutor_links,
            ),
            pet_form: FormStore::new(facades.pets.clone()),
            tutor_form: FormStore::new(facades.tutors),
            pet_candidates: CandidateList::new(
                facades.pets,
                config.candidate_page_size,
                config.search_debounce(),
            ),
        }
    }
}

/// Runs the admin state layer against the in-process registry.
///
/// `AdminSystem` is responsible for:
/// - **Startup**: spawning the registry task and connecting its clients
/// - **Wiring**: handing each store the facades it needs
/// - **Shutdown**: dropping every store so the registry sees its channels close
///
/// # Example
///
/// ```ignore
/// let system = AdminSystem::new(&AdminConfig::default());
///
/// system.stores.pet_list.fetch().await;
/// let page = system.stores.pet_list.snapshot().data;
///
/// system.shutdown().await?;
/// ```
pub struct AdminSystem {
    pub stores: Stores,

    /// Registry task, awaited on shutdown.
    handle: tokio::task::JoinHandle<()>,
}

impl AdminSystem {
    /// Spawns the registry and builds the stores. Must be called inside a runtime.
    pub fn new(config: &AdminConfig) -> Self {
        let (registry, remote) =
            RemoteRegistry::new(config.remote.channel_buffer, config.remote.credentials());
        let handle = tokio::spawn(registry.run());

        Self {
            stores: Stores::from_facades(Facades::from_remote(remote), &config.stores),
            handle,
        }
    }

    /// Drops every store, then waits for the registry to finish.
    ///
    /// Candidate searches still waiting on their debounce keep the registry
    /// alive until they complete.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        // Dropping the stores drops the last senders; the registry loop ends.
        drop(self.stores);

        if let Err(e) = self.handle.await {
            error!("Registry task failed: {:?}", e);
            return Err(format!("Registry task failed: {:?}", e));
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
