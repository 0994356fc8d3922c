//! # Framework Errors
//!
//! A single error type crosses the facade boundary. Stores never return it to
//! the view: each operation turns it into a message in its own error field.

use crate::framework::resource::Resource;

/// Failures reported by a facade call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The request could not complete.
    #[error("request could not complete: {0}")]
    Network(String),

    /// The remote side has no record with this identifier.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// The request completed but the remote side refused it.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Input rejected before anything was sent.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
}

impl ApiError {
    pub fn not_found<T: Resource>(id: T::Id) -> Self {
        ApiError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Rejected {
            status: 400,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Rejected {
            status: 401,
            message: message.into(),
        }
    }
}
