//! # System Lifecycle
//!
//! Starting, wiring and stopping the admin state layer.
//!
//! The stores take their collaborators through their constructors, so the
//! only place that knows which implementations are used is here:
//!
//! - [`Facades`] gathers the facade objects (registry clients by default,
//!   anything implementing the traits otherwise).
//! - [`Stores::from_facades`] builds one store per concern from them.
//! - [`AdminSystem`] spawns the [`RemoteRegistry`](crate::remote::RemoteRegistry),
//!   owns the stores and shuts everything down in order.
//!
//! Tests that want a mix (a real registry with one failing facade) build
//! their own [`Facades`] and call [`Stores::from_facades`] directly.

pub mod admin_system;
pub mod tracing;

pub use admin_system::{AdminSystem, Facades, Stores};
pub use self::tracing::setup_tracing;
