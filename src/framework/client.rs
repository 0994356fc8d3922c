//! # Channel Client
//!
//! [`ResourceClient<T>`] implements [`ResourceFacade<T>`] by forwarding each
//! call as a [`ResourceRequest<T>`] over a tokio mpsc channel and awaiting the
//! reply on a oneshot channel. It holds only the sender, so clones are cheap
//! and can be handed to every store that needs the resource.

use crate::framework::error::ApiError;
use crate::framework::facade::ResourceFacade;
use crate::framework::message::{ResourceRequest, Response};
use crate::framework::resource::{ListQuery, Page, Resource};
use crate::model::PhotoUpload;
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

pub struct ResourceClient<T: Resource> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Resource> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Resource> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn call<R: Send>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T> + Send,
    ) -> Result<R, ApiError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| ApiError::Network(format!("{} service closed", T::KIND)))?;
        response
            .await
            .map_err(|_| ApiError::Network(format!("{} service dropped the reply", T::KIND)))?
    }
}

#[async_trait]
impl<T: Resource> ResourceFacade<T> for ResourceClient<T> {
    #[instrument(skip(self), fields(kind = T::KIND))]
    async fn list(&self, query: ListQuery) -> Result<Page<T>, ApiError> {
        debug!("Sending request");
        self.call(|respond_to| ResourceRequest::List { query, respond_to })
            .await
    }

    #[instrument(skip(self), fields(kind = T::KIND))]
    async fn get_by_id(&self, id: T::Id) -> Result<T, ApiError> {
        debug!("Sending request");
        self.call(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    #[instrument(skip(self), fields(kind = T::KIND))]
    async fn create(&self, draft: T::Draft) -> Result<T, ApiError> {
        debug!("Sending request");
        self.call(|respond_to| ResourceRequest::Create { draft, respond_to })
            .await
    }

    #[instrument(skip(self), fields(kind = T::KIND))]
    async fn update(&self, id: T::Id, draft: T::Draft) -> Result<T, ApiError> {
        debug!("Sending request");
        self.call(|respond_to| ResourceRequest::Update {
            id,
            draft,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self), fields(kind = T::KIND))]
    async fn delete(&self, id: T::Id) -> Result<(), ApiError> {
        debug!("Sending request");
        self.call(|respond_to| ResourceRequest::Delete { id, respond_to })
            .await
    }

    #[instrument(skip(self, photo), fields(kind = T::KIND))]
    async fn upload_photo(&self, id: T::Id, photo: PhotoUpload) -> Result<(), ApiError> {
        debug!(
            filename = photo.filename(),
            size = photo.bytes().len(),
            "Sending request"
        );
        self.call(|respond_to| ResourceRequest::UploadPhoto {
            id,
            photo,
            respond_to,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Pet, PetId};

    #[tokio::test]
    async fn closed_channel_is_a_network_error() {
        let (sender, receiver) = mpsc::channel::<ResourceRequest<Pet>>(1);
        drop(receiver);
        let client = ResourceClient::new(sender);

        let err = client.get_by_id(PetId(1)).await.unwrap_err();
        assert_eq!(err, ApiError::Network("pet service closed".to_string()));
    }

    #[tokio::test]
    async fn dropped_reply_is_a_network_error() {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<Pet>>(1);
        let client = ResourceClient::new(sender);
        tokio::spawn(async move {
            // Receive and drop without answering.
            let _ = receiver.recv().await;
        });

        let err = client.delete(PetId(1)).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(message) if message.contains("dropped")));
    }
}
