//! Profile entities and their relations

use crate::error::{AccessError, Result};
use crate::hierarchy;
use crate::store::{DomainState, DomainStore};
use crate::types::{PermissionId, Profile, ProfileDraft, ProfileId};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Store for profile entities and their two relations: parent/child
/// links to other profiles, and granted-permission links
///
/// Every mutation runs as one atomic unit against the backing
/// [`DomainStore`], including the hierarchy validation read that guards
/// `add_child`, so concurrent mutations can never interleave into a
/// state that violates the acyclicity invariant.
pub struct ProfileStore<S> {
    store: Arc<S>,
}

impl<S> Clone for ProfileStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

fn profile_ref(state: &DomainState, id: ProfileId) -> Result<&Profile> {
    state.profiles.get(&id).ok_or(AccessError::UnknownEntity {
        kind: "profile",
        id,
    })
}

fn profile_mut(state: &mut DomainState, id: ProfileId) -> Result<&mut Profile> {
    state
        .profiles
        .get_mut(&id)
        .ok_or(AccessError::UnknownEntity {
            kind: "profile",
            id,
        })
}

impl<S: DomainStore> ProfileStore<S> {
    /// Create a profile store backed by the given store
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Materialize a draft into a live profile
    ///
    /// A missing code is replaced with a freshly generated unique token;
    /// a supplied code must not collide with any existing profile.
    ///
    /// # Errors
    ///
    /// - [`AccessError::Validation`] when `raw_name`, `restricted` or
    ///   `locked` is absent
    /// - [`AccessError::DuplicateCode`] when the supplied code is taken
    pub async fn create(&self, draft: ProfileDraft) -> Result<Profile> {
        let raw_name = draft
            .raw_name
            .ok_or(AccessError::Validation { field: "raw_name" })?;
        let restricted = draft
            .restricted
            .ok_or(AccessError::Validation { field: "restricted" })?;
        let locked = draft
            .locked
            .ok_or(AccessError::Validation { field: "locked" })?;
        let supplied_code = draft.code;
        let custom_expression = draft.custom_expression;

        self.store
            .run_atomically(move |state| {
                let code = match supplied_code {
                    Some(code) => {
                        if state.profiles.values().any(|p| p.code == code) {
                            return Err(AccessError::DuplicateCode { code });
                        }
                        code
                    }
                    None => Uuid::new_v4().to_string(),
                };

                let profile = Profile {
                    id: Uuid::new_v4(),
                    raw_name,
                    code,
                    custom_expression,
                    restricted,
                    locked,
                    parents: Default::default(),
                    children: Default::default(),
                    permissions: Default::default(),
                };
                debug!("Created profile '{}' (code {})", profile.raw_name, profile.code);
                state.profiles.insert(profile.id, profile.clone());
                Ok(profile)
            })
            .await
    }

    /// First profile with the given name, or `None`
    pub async fn find_by_name(&self, name: &str) -> Option<Profile> {
        self.store
            .read(|state| {
                state
                    .profiles
                    .values()
                    .find(|p| p.raw_name == name)
                    .cloned()
            })
            .await
    }

    /// First profile with the given code, or `None`
    pub async fn find_by_code(&self, code: &str) -> Option<Profile> {
        self.store
            .read(|state| state.profiles.values().find(|p| p.code == code).cloned())
            .await
    }

    /// All live profiles
    pub async fn find_all(&self) -> Vec<Profile> {
        self.store
            .read(|state| state.profiles.values().cloned().collect())
            .await
    }

    /// Full ancestor closure of a profile, as detached copies
    pub async fn find_all_parents(&self, id: ProfileId) -> Result<Vec<Profile>> {
        self.store
            .read(move |state| {
                profile_ref(state, id)?;
                Ok(hierarchy::ancestors_of(state, id)
                    .into_iter()
                    .filter_map(|pid| state.profiles.get(&pid))
                    .cloned()
                    .collect())
            })
            .await
    }

    /// Attach `child` under `parent`
    ///
    /// The hierarchy validator decides acceptance; on success the edge
    /// is recorded in both directions within the same atomic unit as
    /// the validation read.
    ///
    /// # Errors
    ///
    /// - [`AccessError::SelfReference`] / [`AccessError::Cycle`] from
    ///   the validator
    /// - [`AccessError::UnknownEntity`] when either id is dangling
    pub async fn add_child(&self, parent: ProfileId, child: ProfileId) -> Result<()> {
        self.store
            .run_atomically(move |state| {
                let parent_ref = profile_ref(state, parent)?;
                let child_ref = profile_ref(state, child)?;
                hierarchy::validate_attachment(state, parent_ref, child_ref)?;
                let parent_name = parent_ref.raw_name.clone();
                let child_name = child_ref.raw_name.clone();

                profile_mut(state, parent)?.children.insert(child);
                profile_mut(state, child)?.parents.insert(parent);
                debug!("Attached '{}' as child of '{}'", child_name, parent_name);
                Ok(())
            })
            .await
    }

    /// Remove the `parent`/`child` edge in both directions
    ///
    /// Unconditional apart from entity existence: removing an edge can
    /// never create a cycle, so the validator is not involved.
    pub async fn remove_child(&self, parent: ProfileId, child: ProfileId) -> Result<()> {
        self.store
            .run_atomically(move |state| {
                profile_ref(state, parent)?;
                profile_ref(state, child)?;

                profile_mut(state, parent)?.children.remove(&child);
                profile_mut(state, child)?.parents.remove(&parent);
                Ok(())
            })
            .await
    }

    /// Grant a permission to a profile
    pub async fn add_permission(
        &self,
        profile: ProfileId,
        permission: PermissionId,
    ) -> Result<()> {
        self.store
            .run_atomically(move |state| {
                profile_ref(state, profile)?;
                let grant =
                    state
                        .permissions
                        .get_mut(&permission)
                        .ok_or(AccessError::UnknownEntity {
                            kind: "permission",
                            id: permission,
                        })?;

                grant.granted_to.insert(profile);
                profile_mut(state, profile)?.permissions.insert(permission);
                Ok(())
            })
            .await
    }

    /// Revoke a permission from a profile
    pub async fn remove_permission(
        &self,
        profile: ProfileId,
        permission: PermissionId,
    ) -> Result<()> {
        self.store
            .run_atomically(move |state| {
                profile_ref(state, profile)?;
                let grant =
                    state
                        .permissions
                        .get_mut(&permission)
                        .ok_or(AccessError::UnknownEntity {
                            kind: "permission",
                            id: permission,
                        })?;

                grant.granted_to.remove(&profile);
                profile_mut(state, profile)?.permissions.remove(&permission);
                Ok(())
            })
            .await
    }

    /// Delete a profile
    ///
    /// A profile still included by other profiles cannot be deleted.
    /// Otherwise the cascade detaches every child and revokes every
    /// granted permission before removing the entity, all within one
    /// atomic unit.
    ///
    /// # Errors
    ///
    /// - [`AccessError::DeleteBlocked`] naming every parent profile
    /// - [`AccessError::UnknownEntity`] when the id is dangling
    pub async fn delete(&self, id: ProfileId) -> Result<()> {
        self.store
            .run_atomically(move |state| {
                let profile = profile_ref(state, id)?;

                if !profile.parents.is_empty() {
                    let mut blocked_by: Vec<String> = profile
                        .parents
                        .iter()
                        .filter_map(|pid| state.profiles.get(pid))
                        .map(|p| p.raw_name.clone())
                        .collect();
                    blocked_by.sort();
                    return Err(AccessError::DeleteBlocked {
                        entity: profile.raw_name.clone(),
                        blocked_by,
                    });
                }

                let children: Vec<ProfileId> = profile.children.iter().copied().collect();
                let permissions: Vec<PermissionId> =
                    profile.permissions.iter().copied().collect();

                for child in children {
                    if let Some(child_profile) = state.profiles.get_mut(&child) {
                        child_profile.parents.remove(&id);
                    }
                }
                for permission in permissions {
                    if let Some(grant) = state.permissions.get_mut(&permission) {
                        grant.granted_to.remove(&id);
                    }
                }

                let removed = state.profiles.remove(&id);
                if let Some(profile) = removed {
                    debug!("Deleted profile '{}'", profile.raw_name);
                }
                Ok(())
            })
            .await
    }
}
