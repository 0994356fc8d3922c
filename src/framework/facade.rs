//! # Facade Traits
//!
//! The stores never talk to the network directly. They hold facades behind
//! `Arc<dyn ...>` and the concrete implementation is chosen when the system is
//! wired: the channel clients in [`crate::clients`] in production, the mocks in
//! [`crate::framework::mock`] in tests.
//!
//! Every method resolves to `Result<_, ApiError>`; turning the error into view
//! state is the store's job.

use crate::framework::error::ApiError;
use crate::framework::resource::{ListQuery, Page, Resource};
use crate::model::{PhotoUpload, Tokens};
use async_trait::async_trait;

/// CRUD and photo upload for one resource type.
#[async_trait]
pub trait ResourceFacade<T: Resource>: Send + Sync {
    async fn list(&self, query: ListQuery) -> Result<Page<T>, ApiError>;

    /// Fails with [`ApiError::NotFound`] when the id is unknown.
    async fn get_by_id(&self, id: T::Id) -> Result<T, ApiError>;

    async fn create(&self, draft: T::Draft) -> Result<T, ApiError>;

    async fn update(&self, id: T::Id, draft: T::Draft) -> Result<T, ApiError>;

    async fn delete(&self, id: T::Id) -> Result<(), ApiError>;

    async fn upload_photo(&self, id: T::Id, photo: PhotoUpload) -> Result<(), ApiError>;
}

/// Creates and removes links between a `P` and an `R`.
#[async_trait]
pub trait RelationFacade<P: Resource, R: Resource>: Send + Sync {
    async fn link(&self, primary: P::Id, related: R::Id) -> Result<(), ApiError>;

    async fn unlink(&self, primary: P::Id, related: R::Id) -> Result<(), ApiError>;
}

/// Credential exchange with the remote API.
#[async_trait]
pub trait AuthFacade: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<Tokens, ApiError>;

    async fn refresh(&self, refresh_token: &str) -> Result<Tokens, ApiError>;
}
