//! Domain state and the persistence capability seam
//!
//! The core never touches storage directly. Both components are handed
//! an implementation of [`DomainStore`], a narrow capability interface
//! supplying a consistent read view and an all-or-nothing unit of work.
//! [`InMemoryDomainStore`] is the reference implementation used by the
//! test suites and by embedders that do not need durability.

use crate::error::Result;
use crate::types::{Permission, PermissionId, Profile, ProfileId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The process-wide root holding every live permission and profile
///
/// Entities reference each other by id, never by embedded pointers, so
/// the whole state is a plain value: cloneable, serializable, and easy
/// to snapshot in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainState {
    /// All live permissions, keyed by id
    pub permissions: HashMap<PermissionId, Permission>,

    /// All live profiles, keyed by id
    pub profiles: HashMap<ProfileId, Profile>,
}

/// Persistence capability required by the registry and profile store
///
/// `run_atomically` is the transaction boundary: the closure either
/// commits in full or leaves the state untouched, and concurrent units
/// of work are serialized against each other. The hierarchy validator's
/// ancestor walk runs inside the same unit as the edge write, which is
/// what keeps two racing `add_child` calls from jointly closing a cycle.
///
/// The closure methods are generic, so this trait is not object-safe;
/// components are generic over their store instead of holding a trait
/// object.
#[async_trait]
pub trait DomainStore: Send + Sync {
    /// Run a closure against a consistent read view of the state
    async fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&DomainState) -> R + Send,
        R: Send;

    /// Run a unit of work with all-or-nothing semantics
    ///
    /// On `Ok` every mutation the closure made becomes visible at once;
    /// on `Err` none of them do.
    async fn run_atomically<F, R>(&self, work: F) -> Result<R>
    where
        F: FnOnce(&mut DomainState) -> Result<R> + Send,
        R: Send;
}

/// In-memory [`DomainStore`] over a `tokio` read/write lock
///
/// Units of work run against a working copy of the state that is only
/// swapped in on success, so a closure that fails midway rolls back
/// even if it already mutated its copy.
#[derive(Debug, Default)]
pub struct InMemoryDomainStore {
    state: Arc<RwLock<DomainState>>,
}

impl InMemoryDomainStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DomainStore for InMemoryDomainStore {
    async fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&DomainState) -> R + Send,
        R: Send,
    {
        let state = self.state.read().await;
        f(&state)
    }

    async fn run_atomically<F, R>(&self, work: F) -> Result<R>
    where
        F: FnOnce(&mut DomainState) -> Result<R> + Send,
        R: Send,
    {
        let mut state = self.state.write().await;
        let mut working = state.clone();
        let out = work(&mut working)?;
        *state = working;
        Ok(out)
    }
}
