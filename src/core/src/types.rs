//! Core entity types for the access-control domain

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Unique permission identifier
pub type PermissionId = Uuid;

/// Unique profile identifier
pub type ProfileId = Uuid;

/// An atomic, named capability that can be granted to profiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Stable identifier
    pub id: PermissionId,

    /// Unique code naming the capability (immutable after creation)
    pub code: String,

    /// Profiles currently granting this permission (inverse of
    /// [`Profile::permissions`])
    #[serde(default)]
    pub granted_to: HashSet<ProfileId>,
}

impl Permission {
    /// Create a new detached permission with a fresh id
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            granted_to: HashSet::new(),
        }
    }

    /// Render this permission as an expression-language atom,
    /// e.g. `permission(manager)`
    pub fn expression(&self) -> String {
        format!("permission({})", self.code)
    }
}

/// A named role/group that aggregates permissions directly and/or
/// transitively via child profiles
///
/// Parent/child links are stored as id sets in both directions; the
/// graph over all profiles is kept acyclic by the hierarchy validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Stable identifier
    pub id: ProfileId,

    /// Human-readable name (not unique)
    pub raw_name: String,

    /// Unique code; generated when the creator does not supply one
    pub code: String,

    /// Optional expression evaluated by the embedding authorization
    /// layer; stored verbatim, never interpreted here
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_expression: Option<String>,

    /// Restricted flag (semantics belong to the embedding layer)
    pub restricted: bool,

    /// Locked flag (semantics belong to the embedding layer)
    pub locked: bool,

    /// Profiles that include this profile as a child
    #[serde(default)]
    pub parents: HashSet<ProfileId>,

    /// Profiles this profile includes
    #[serde(default)]
    pub children: HashSet<ProfileId>,

    /// Permissions granted directly to this profile
    #[serde(default)]
    pub permissions: HashSet<PermissionId>,
}

impl Profile {
    /// Restricted flag accessor
    pub fn is_restricted(&self) -> bool {
        self.restricted
    }

    /// Locked flag accessor
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

/// Creation request for a [`Profile`]
///
/// Required attributes are held as `Option` so that an absent field is
/// representable and rejected with a validation error when the store
/// materializes the draft, rather than silently defaulted.
///
/// # Example
///
/// ```
/// use authgraph_core::ProfileDraft;
///
/// let draft = ProfileDraft::new("Operators")
///     .restricted(false)
///     .locked(false);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDraft {
    /// Human-readable name (required)
    pub raw_name: Option<String>,

    /// Unique code; generated when omitted
    pub code: Option<String>,

    /// Optional custom expression
    pub custom_expression: Option<String>,

    /// Restricted flag (required)
    pub restricted: Option<bool>,

    /// Locked flag (required)
    pub locked: Option<bool>,
}

impl ProfileDraft {
    /// Create a draft with the given name; flags still need to be set
    pub fn new(raw_name: impl Into<String>) -> Self {
        Self {
            raw_name: Some(raw_name.into()),
            ..Self::default()
        }
    }

    /// Supply an explicit code instead of a generated one
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach a custom expression
    pub fn custom_expression(mut self, expression: impl Into<String>) -> Self {
        self.custom_expression = Some(expression.into());
        self
    }

    /// Set the restricted flag
    pub fn restricted(mut self, restricted: bool) -> Self {
        self.restricted = Some(restricted);
        self
    }

    /// Set the locked flag
    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }
}
