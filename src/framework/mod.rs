//! Generic plumbing shared by every resource type.
//!
//! # Main Components
//!
//! - [`Resource`] - Trait that pets and tutors implement to be served and stored
//! - [`ResourceFacade`], [`RelationFacade`], [`AuthFacade`] - The remote API as the stores see it
//! - [`ResourceClient`] - Facade implementation over a request channel
//! - [`Subject`] / [`StateStream`] - Snapshot cell each store owns
//! - [`ApiError`] - The one error type that crosses the facade boundary
//!
//! # Testing
//!
//! See [`mock`] module for facades driven by expectations instead of a remote.

pub mod client;
pub mod error;
pub mod facade;
pub mod message;
pub mod mock;
pub mod resource;
pub mod subject;

pub use client::ResourceClient;
pub use error::ApiError;
pub use facade::{AuthFacade, RelationFacade, ResourceFacade};
pub use message::{ResourceRequest, Response};
pub use resource::{page_count, FieldOf, FormDraft, ListQuery, Page, Related, Resource};
pub use subject::{StateStream, Subject};
