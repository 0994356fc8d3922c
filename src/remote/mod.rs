//! In-process stand-in for the remote API.
//!
//! The stores only ever see facades; [`RemoteRegistry`] is what sits behind the
//! channel clients when the crate runs on its own (the demo binary and the
//! integration tests).

pub mod registry;
mod tables;

pub use registry::{Credentials, RemoteHandles, RemoteRegistry};
