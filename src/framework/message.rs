//! # Request Messages
//!
//! The messages a [`ResourceClient`](crate::framework::ResourceClient) sends
//! to whatever serves a resource type. One variant per facade operation, each
//! carrying the oneshot sender its reply goes back on.

use crate::framework::error::ApiError;
use crate::framework::resource::{ListQuery, Page, Resource};
use crate::model::PhotoUpload;
use tokio::sync::oneshot;

/// One-shot reply channel.
pub type Response<T> = oneshot::Sender<Result<T, ApiError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Resource> {
    List {
        query: ListQuery,
        respond_to: Response<Page<T>>,
    },
    Get {
        id: T::Id,
        respond_to: Response<T>,
    },
    Create {
        draft: T::Draft,
        respond_to: Response<T>,
    },
    Update {
        id: T::Id,
        draft: T::Draft,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    UploadPhoto {
        id: T::Id,
        photo: PhotoUpload,
        respond_to: Response<()>,
    },
}

impl<T: Resource> ResourceRequest<T> {
    pub fn operation(&self) -> &'static str {
        match self {
            ResourceRequest::List { .. } => "list",
            ResourceRequest::Get { .. } => "get",
            ResourceRequest::Create { .. } => "create",
            ResourceRequest::Update { .. } => "update",
            ResourceRequest::Delete { .. } => "delete",
            ResourceRequest::UploadPhoto { .. } => "upload_photo",
        }
    }

    /// Answers the request with an error, whatever it asked for.
    pub fn reject(self, error: ApiError) {
        match self {
            ResourceRequest::List { respond_to, .. } => {
                let _ = respond_to.send(Err(error));
            }
            ResourceRequest::Get { respond_to, .. }
            | ResourceRequest::Create { respond_to, .. }
            | ResourceRequest::Update { respond_to, .. } => {
                let _ = respond_to.send(Err(error));
            }
            ResourceRequest::Delete { respond_to, .. }
            | ResourceRequest::UploadPhoto { respond_to, .. } => {
                let _ = respond_to.send(Err(error));
            }
        }
    }
}
