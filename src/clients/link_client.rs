//! # Link Client
//!
//! Pet and tutor links are one relationship seen from two sides. `LinkClient`
//! sends both directions over the same channel, so the tutor detail screen
//! (`RelationFacade<Tutor, Pet>`) and the pet detail screen
//! (`RelationFacade<Pet, Tutor>`) share one endpoint.

use crate::framework::{ApiError, RelationFacade, Response};
use crate::model::{Pet, PetId, Tutor, TutorId};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

#[derive(Debug)]
pub enum LinkRequest {
    Link {
        tutor: TutorId,
        pet: PetId,
        respond_to: Response<()>,
    },
    Unlink {
        tutor: TutorId,
        pet: PetId,
        respond_to: Response<()>,
    },
}

#[derive(Clone)]
pub struct LinkClient {
    sender: mpsc::Sender<LinkRequest>,
}

impl LinkClient {
    pub fn new(sender: mpsc::Sender<LinkRequest>) -> Self {
        Self { sender }
    }

    #[instrument(skip(self))]
    pub async fn link(&self, tutor: TutorId, pet: PetId) -> Result<(), ApiError> {
        debug!("Sending request");
        self.call(|respond_to| LinkRequest::Link {
            tutor,
            pet,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn unlink(&self, tutor: TutorId, pet: PetId) -> Result<(), ApiError> {
        debug!("Sending request");
        self.call(|respond_to| LinkRequest::Unlink {
            tutor,
            pet,
            respond_to,
        })
        .await
    }

    async fn call(
        &self,
        build: impl FnOnce(Response<()>) -> LinkRequest + Send,
    ) -> Result<(), ApiError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| ApiError::Network("link service closed".to_string()))?;
        response
            .await
            .map_err(|_| ApiError::Network("link service dropped the reply".to_string()))?
    }
}

#[async_trait]
impl RelationFacade<Tutor, Pet> for LinkClient {
    async fn link(&self, tutor: TutorId, pet: PetId) -> Result<(), ApiError> {
        LinkClient::link(self, tutor, pet).await
    }

    async fn unlink(&self, tutor: TutorId, pet: PetId) -> Result<(), ApiError> {
        LinkClient::unlink(self, tutor, pet).await
    }
}

#[async_trait]
impl RelationFacade<Pet, Tutor> for LinkClient {
    async fn link(&self, pet: PetId, tutor: TutorId) -> Result<(), ApiError> {
        LinkClient::link(self, tutor, pet).await
    }

    async fn unlink(&self, pet: PetId, tutor: TutorId) -> Result<(), ApiError> {
        LinkClient::unlink(self, tutor, pet).await
    }
}
