//! Permission catalog management

use crate::error::{AccessError, Result};
use crate::store::DomainStore;
use crate::types::{Permission, PermissionId};
use std::sync::Arc;
use tracing::{debug, info};

/// Reserved code of the bootstrap "manager" permission
pub const MANAGER_CODE: &str = "manager";

/// Catalog of permission codes
///
/// Permissions are a flat keyed collection; the registry does not
/// enforce code uniqueness on create (callers own that concern), but it
/// does refuse to delete a permission while any profile still grants it.
pub struct PermissionRegistry<S> {
    store: Arc<S>,
}

impl<S> Clone for PermissionRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: DomainStore> PermissionRegistry<S> {
    /// Create a registry backed by the given store
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Idempotent bootstrap: seed the manager permission if the catalog
    /// is empty
    ///
    /// Safe to call any number of times; once any permission exists the
    /// call is a no-op.
    pub async fn initialize(&self) -> Result<()> {
        self.store
            .run_atomically(|state| {
                if !state.permissions.is_empty() {
                    return Ok(());
                }
                let manager = Permission::new(MANAGER_CODE);
                info!("Seeding manager permission '{}'", manager.code);
                state.permissions.insert(manager.id, manager);
                Ok(())
            })
            .await
    }

    /// The permission with the reserved manager code, if bootstrapped
    pub async fn manager(&self) -> Option<Permission> {
        self.find_by_code(MANAGER_CODE).await
    }

    /// Create a new permission with the given code
    ///
    /// # Errors
    ///
    /// Returns a validation error when `code` is empty or blank.
    pub async fn create(&self, code: impl Into<String>) -> Result<Permission> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(AccessError::Validation { field: "code" });
        }

        self.store
            .run_atomically(move |state| {
                let permission = Permission::new(code);
                debug!("Created permission '{}'", permission.code);
                state.permissions.insert(permission.id, permission.clone());
                Ok(permission)
            })
            .await
    }

    /// First permission with the given code, or `None`
    pub async fn find_by_code(&self, code: &str) -> Option<Permission> {
        self.store
            .read(|state| {
                state
                    .permissions
                    .values()
                    .find(|p| p.code == code)
                    .cloned()
            })
            .await
    }

    /// All live permissions
    pub async fn find_all(&self) -> Vec<Permission> {
        self.store
            .read(|state| state.permissions.values().cloned().collect())
            .await
    }

    /// Delete a permission
    ///
    /// # Errors
    ///
    /// - [`AccessError::DeleteBlocked`] naming every granting profile
    ///   while the permission is still granted to at least one profile
    /// - [`AccessError::UnknownEntity`] when the id is not in the store
    pub async fn delete(&self, id: PermissionId) -> Result<()> {
        self.store
            .run_atomically(move |state| {
                let permission =
                    state
                        .permissions
                        .get(&id)
                        .ok_or(AccessError::UnknownEntity {
                            kind: "permission",
                            id,
                        })?;

                if !permission.granted_to.is_empty() {
                    let mut blocked_by: Vec<String> = permission
                        .granted_to
                        .iter()
                        .filter_map(|pid| state.profiles.get(pid))
                        .map(|p| p.raw_name.clone())
                        .collect();
                    blocked_by.sort();
                    return Err(AccessError::DeleteBlocked {
                        entity: permission.code.clone(),
                        blocked_by,
                    });
                }

                let removed = state.permissions.remove(&id);
                if let Some(permission) = removed {
                    debug!("Deleted permission '{}'", permission.code);
                }
                Ok(())
            })
            .await
    }
}
