//! Error types for the access-control core

use thiserror::Error;
use uuid::Uuid;

/// Access-control core errors
///
/// Every variant carries the names of the entities involved so that an
/// embedding application can build its own user-facing message from the
/// structured fields instead of parsing the display string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// A required field was missing or blank at entity construction
    #[error("required field missing: {field}")]
    Validation {
        /// Name of the missing field
        field: &'static str,
    },

    /// A profile code collided with an existing profile's code
    #[error("a profile with code '{code}' already exists")]
    DuplicateCode {
        /// The conflicting code
        code: String,
    },

    /// A profile was proposed as its own child
    #[error("profile '{profile}' cannot be added as a child of itself")]
    SelfReference {
        /// Name of the profile
        profile: String,
    },

    /// The proposed child is already an ancestor of the proposed parent
    #[error("cannot add '{child}' under '{parent}': '{child}' is already an ancestor of '{parent}'")]
    Cycle {
        /// Name of the profile that would receive the child
        parent: String,
        /// Name of the proposed child
        child: String,
    },

    /// Deletion attempted while other entities still reference the target
    #[error("'{}' cannot be deleted while still referenced by {}", .entity, .blocked_by.join(", "))]
    DeleteBlocked {
        /// Name of the entity whose deletion was refused
        entity: String,
        /// Names of the entities blocking the deletion
        blocked_by: Vec<String>,
    },

    /// A mutation named an id that is not present in the store
    #[error("{kind} not found: {id}")]
    UnknownEntity {
        /// Entity kind ("permission" or "profile")
        kind: &'static str,
        /// The dangling id
        id: Uuid,
    },
}

/// Result type for access-control operations
pub type Result<T> = std::result::Result<T, AccessError>;
