//! Channel clients implementing the facade traits.
//!
//! Resource CRUD goes through the generic
//! [`ResourceClient`](crate::framework::ResourceClient); links and
//! authentication have their own request types.

pub mod auth_client;
pub mod link_client;

pub use auth_client::*;
pub use link_client::*;

use crate::framework::ResourceClient;
use crate::model::{Pet, Tutor};

pub type PetClient = ResourceClient<Pet>;
pub type TutorClient = ResourceClient<Tutor>;
