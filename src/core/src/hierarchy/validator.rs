//! Ancestor closure computation and child-attachment validation

use crate::error::{AccessError, Result};
use crate::store::DomainState;
use crate::types::{Profile, ProfileId};
use std::collections::HashSet;

/// Compute the full ancestor closure of a profile
///
/// Returns every profile reachable by repeatedly following the
/// `parents` relation from `id`. The starting profile itself is not a
/// member unless the graph is malformed. Unknown ids yield an empty
/// set, matching a profile with no parents.
pub fn ancestors_of(state: &DomainState, id: ProfileId) -> HashSet<ProfileId> {
    let mut ancestors = HashSet::new();
    let mut frontier = vec![id];

    while let Some(current) = frontier.pop() {
        let Some(profile) = state.profiles.get(&current) else {
            continue;
        };
        for &parent in &profile.parents {
            // The insert doubles as the visited check
            if ancestors.insert(parent) {
                frontier.push(parent);
            }
        }
    }

    ancestors
}

/// Decide whether attaching `child` under `parent` preserves acyclicity
///
/// Rejection is immediate and non-destructive: callers only record the
/// edge after this returns `Ok`.
///
/// # Errors
///
/// - [`AccessError::SelfReference`] when `child` is `parent`
/// - [`AccessError::Cycle`] when `child` is already an ancestor of
///   `parent`, i.e. the new edge would make `parent` reachable from
///   `child`
pub fn validate_attachment(state: &DomainState, parent: &Profile, child: &Profile) -> Result<()> {
    if parent.id == child.id {
        return Err(AccessError::SelfReference {
            profile: parent.raw_name.clone(),
        });
    }

    if ancestors_of(state, parent.id).contains(&child.id) {
        return Err(AccessError::Cycle {
            parent: parent.raw_name.clone(),
            child: child.raw_name.clone(),
        });
    }

    Ok(())
}
