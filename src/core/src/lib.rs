//! # Authgraph Core
//!
//! Authorization model built from atomic permissions and hierarchically
//! composable profiles. Profiles may include other profiles as children
//! and may be granted permissions directly; this crate maintains the
//! profile composition graph as a directed acyclic structure under
//! concurrent mutation and enforces deletion safety before structural
//! changes commit.
//!
//! ## Features
//!
//! - **Acyclic hierarchy** - every child attachment is validated
//!   against the receiving profile's full ancestor closure
//! - **Atomic mutations** - validation reads and edge writes share one
//!   unit of work, so racing attachments cannot jointly close a cycle
//! - **Guarded deletion** - entities still referenced elsewhere refuse
//!   to die, and allowed deletions cascade their own edges first
//! - **Pluggable persistence** - both components run against any
//!   [`DomainStore`] capability; an in-memory provider ships for tests
//!   and embedders without durability needs
//!
//! ## Example
//!
//! ```rust
//! use authgraph_core::{
//!     InMemoryDomainStore, PermissionRegistry, ProfileDraft, ProfileStore,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryDomainStore::new());
//!     let permissions = PermissionRegistry::new(store.clone());
//!     let profiles = ProfileStore::new(store);
//!
//!     permissions.initialize().await?;
//!
//!     let staff = profiles
//!         .create(ProfileDraft::new("Staff").restricted(false).locked(false))
//!         .await?;
//!     let interns = profiles
//!         .create(ProfileDraft::new("Interns").restricted(true).locked(false))
//!         .await?;
//!
//!     profiles.add_child(staff.id, interns.id).await?;
//!
//!     let manager = permissions.manager().await.expect("bootstrapped");
//!     profiles.add_permission(staff.id, manager.id).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod hierarchy;
pub mod permission;
pub mod profile;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{AccessError, Result};
pub use permission::{PermissionRegistry, MANAGER_CODE};
pub use profile::ProfileStore;
pub use store::{DomainState, DomainStore, InMemoryDomainStore};
pub use types::{Permission, PermissionId, Profile, ProfileDraft, ProfileId};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
