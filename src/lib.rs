//! # Pet Admin
//!
//! > **Client-side state for a pet and tutor administration screen.**
//!
//! This crate keeps view-facing state consistent with a remote, paginated,
//! filterable and relationally linked API. Views read snapshots and call store
//! methods; stores call facades and replace their snapshot with the outcome.
//!
//! ```text
//! View -> Store method -> Facade -> Store replaces snapshot -> View re-renders
//! ```
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Stores own state, facades own I/O
//! Each store holds exactly one snapshot and is the only code that changes it.
//! Everything it needs from the outside arrives as an `Arc<dyn Facade>` through
//! its constructor, so the same store runs against the in-process registry, a
//! mock, or a real HTTP client.
//!
//! ### Errors become state
//! No store operation returns an error to the view. Each failure is written as
//! a message into the snapshot field that belongs to the operation (`error`,
//! `delete_error`, `link_error`, `photo_error`), and nothing is retried.
//!
//! ### Latest request wins
//! Overlapping requests are not serialized. A generation counter tags every
//! request; a response that is no longer the newest is discarded instead of
//! overwriting newer state.
//!
//! ## 🚀 Core Concepts
//!
//! ### Generics: The Power of `T`
//! `ListStore<T: Resource>`, `FormStore<T>` and `DetailStore<P, R>` are written
//! once and used for both pets and tutors. The associated types of
//! [`Resource`](framework::Resource) keep them type-safe: a `FormStore<Pet>`
//! only accepts `PetField` edits.
//!
//! ### Mocking: Testing without Pain
//! [`framework::mock`] provides facades driven by expectation queues, plus
//! helpers to answer requests by hand when a test needs out-of-order replies.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Contract ([`framework`])
//! - **Role**: The resource trait, facade traits, error type, snapshot cell and channel client.
//! - **Key items**: [`Resource`](framework::Resource), [`ResourceFacade`](framework::ResourceFacade), [`Subject`](framework::Subject).
//!
//! ### 2. The Records ([`model`])
//! - **Role**: Pets, tutors, photos and tokens with their wire names.
//!
//! ### 3. The State ([`stores`])
//! - **Role**: List, detail, form, candidate and session stores.
//! - **Key items**: [`ListStore`](stores::ListStore), [`DetailStore`](stores::DetailStore), [`FormStore`](stores::FormStore), [`CandidateList`](stores::CandidateList).
//!
//! ### 4. The Wiring ([`clients`], [`remote`], [`lifecycle`], [`config`])
//! - **Role**: Channel clients, the in-process registry that answers them, and the system that builds and stops everything.
//! - **Key items**: [`AdminSystem`](lifecycle::AdminSystem), [`RemoteRegistry`](remote::RemoteRegistry), [`AdminConfig`](config::AdminConfig).
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo flow with info logs
//! RUST_LOG=info cargo run
//!
//! # With a config file
//! PET_ADMIN_CONFIG=admin.toml cargo run
//! ```

pub mod clients;
pub mod config;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod remote;
pub mod stores;
