//! Error taxonomy for content operations.
//!
//! Validation errors abort a pipeline at the failing step. Store errors are
//! wrapped without modification so callers see exactly what the backing
//! store reported. Mapping these kinds to client responses is left to the
//! surrounding layer.

use crate::store::StoreError;
use crate::types::ThingId;

/// Error type for content operations.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// A referenced Thing does not exist.
    #[error("{kind} \"{id}\" not found.")]
    NotFound {
        /// What was looked up (e.g. "Literature list").
        kind: &'static str,
        /// The missing ID.
        id: ThingId,
    },
    /// An identifying attribute is already taken.
    #[error("{kind} with {key} already exists.")]
    AlreadyExists {
        /// What was being created.
        kind: &'static str,
        /// Identifying attribute description.
        key: String,
    },
    /// Operation on a frozen or published aggregate.
    #[error("{kind} \"{id}\" is not modifiable: {reason}.")]
    NotModifiable {
        /// Aggregate kind.
        kind: &'static str,
        /// Aggregate ID.
        id: ThingId,
        /// Why the aggregate is frozen.
        reason: &'static str,
    },
    /// Deletion of a Thing that is still referenced.
    #[error("Unable to delete {kind} \"{id}\" because it is used in at least one statement.")]
    InUse {
        /// Thing kind.
        kind: &'static str,
        /// Thing ID.
        id: ThingId,
    },
    /// Malformed command field.
    #[error("Invalid {field}: {reason}.")]
    ValidationFailed {
        /// Offending field.
        field: String,
        /// What is wrong with it.
        reason: String,
    },
    /// External collaborator (DOI registrar) failed.
    #[error("External service \"{service}\" failed: {message}")]
    ExternalServiceFailure {
        /// Service name.
        service: &'static str,
        /// Failure description.
        message: String,
    },
    /// Store-level error, propagated unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ContentError {
    /// Create a validation error.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(kind: &'static str, id: &ThingId) -> Self {
        Self::NotFound { kind, id: id.clone() }
    }

    /// Check whether this is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationFailed { .. })
    }
}

/// Result alias for content operations.
pub type ContentResult<T> = Result<T, ContentError>;
