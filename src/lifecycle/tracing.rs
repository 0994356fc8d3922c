//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the `tracing` subscriber for the whole crate.
//!
//! ## Configuration
//!
//! The filter comes from `RUST_LOG` when it is set, otherwise from the
//! `[logging] level` config value. The compact format hides module paths
//! (`with_target(false)`); every event carries a `kind` field instead.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Compact logs (default)
//! RUST_LOG=info cargo run
//!
//! # Queries, payloads and discarded stale responses
//! RUST_LOG=debug cargo run
//!
//! # Only the stores
//! RUST_LOG=pet_admin::stores=debug cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! - **Facade calls**: one span per call with its arguments, `kind` attached
//! - **Store operations**: `fetch`, `delete`, `save`, `link` spans; failures at `warn`
//! - **Registry**: `Created`, `Updated`, `Deleted`, `Linked` with ids and table sizes
//!
//! ## Workflow Trace Example
//!
//! ```text
//! INFO Registry started
//! INFO login: Login username=admin
//! INFO save:create: Created kind="tutor" id=1 size=1
//! INFO save: Saved kind="tutor" id=1 verb="created"
//! INFO link:link: Linked tutor=1 pet=1
//! INFO link: Relation changed kind="tutor" op=Link primary=1 related=1
//! ```
//!
//! Credentials and token values are never recorded.

use tracing_subscriber::EnvFilter;

pub fn setup_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false) // Don't show module paths - events carry `kind` instead
        .compact()
        .init();
}
