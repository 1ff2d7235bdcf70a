//! End-to-end scenarios over the public API
//!
//! Everything here drives the registry and profile store together the
//! way an embedding administration layer would.

use anyhow::Result;
use authgraph_e2e_tests::{draft, init_tracing, Harness};
use authgraph_core::{
    AccessError, DomainState, DomainStore, Profile, ProfileDraft, ProfileId,
};
use futures::future::join_all;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

/// Both edge directions must agree and no profile may reach itself
/// through the parent relation.
fn assert_graph_consistent(profiles: &[Profile]) {
    let by_id: HashMap<ProfileId, &Profile> = profiles.iter().map(|p| (p.id, p)).collect();

    for profile in profiles {
        for child in &profile.children {
            let child = by_id[child];
            assert!(
                child.parents.contains(&profile.id),
                "edge {} -> {} missing its inverse",
                profile.raw_name,
                child.raw_name
            );
        }
        for parent in &profile.parents {
            let parent = by_id[parent];
            assert!(
                parent.children.contains(&profile.id),
                "edge {} -> {} missing its forward direction",
                parent.raw_name,
                profile.raw_name
            );
        }

        let mut seen = HashSet::new();
        let mut frontier: Vec<ProfileId> = profile.parents.iter().copied().collect();
        while let Some(current) = frontier.pop() {
            assert_ne!(current, profile.id, "'{}' reaches itself", profile.raw_name);
            if seen.insert(current) {
                frontier.extend(by_id[&current].parents.iter().copied());
            }
        }
    }
}

// ============================================================================
// FULL ADMINISTRATION SCENARIO
// ============================================================================

#[tokio::test]
async fn test_full_administration_scenario() -> Result<()> {
    init_tracing();
    let fx = Harness::new();

    // Bootstrap and verify the reserved permission
    assert!(fx.permissions.manager().await.is_none());
    fx.permissions.initialize().await?;
    let manager = fx.permissions.manager().await.expect("manager seeded");
    assert_eq!(manager.expression(), "permission(manager)");

    // Build a small organization tree
    let everyone = fx.profiles.create(draft("Everyone")).await?;
    let staff = fx.profiles.create(draft("Staff").code("staff")).await?;
    let admins = fx
        .profiles
        .create(
            ProfileDraft::new("Administrators")
                .restricted(true)
                .locked(true)
                .custom_expression("department == 'it'"),
        )
        .await?;
    fx.profiles.add_child(everyone.id, staff.id).await?;
    fx.profiles.add_child(staff.id, admins.id).await?;

    let audit = fx.permissions.create("audit").await?;
    fx.profiles.add_permission(admins.id, manager.id).await?;
    fx.profiles.add_permission(staff.id, audit.id).await?;

    // Structural rejections leave everything intact
    assert!(matches!(
        fx.profiles.add_child(admins.id, everyone.id).await,
        Err(AccessError::Cycle { .. })
    ));
    assert!(matches!(
        fx.profiles.add_child(staff.id, staff.id).await,
        Err(AccessError::SelfReference { .. })
    ));
    assert!(matches!(
        fx.permissions.delete(audit.id).await,
        Err(AccessError::DeleteBlocked { .. })
    ));
    assert!(matches!(
        fx.profiles.delete(admins.id).await,
        Err(AccessError::DeleteBlocked { .. })
    ));

    let staff_snapshot = fx.profiles.find_by_code("staff").await.expect("staff");
    assert_eq!(staff_snapshot.children.len(), 1);
    assert_graph_consistent(&fx.profiles.find_all().await);

    // The ancestor closure of the deepest profile is the whole chain
    let ancestors: HashSet<ProfileId> = fx
        .profiles
        .find_all_parents(admins.id)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ancestors, [everyone.id, staff.id].into_iter().collect());

    // Tear down from the top: cascade detaches, survivors stay
    fx.profiles.delete(everyone.id).await?;
    let staff_now = fx.profiles.find_by_name("Staff").await.expect("staff");
    assert!(staff_now.parents.is_empty());

    fx.profiles.remove_child(staff.id, admins.id).await?;
    fx.profiles.delete(admins.id).await?;
    fx.profiles.delete(staff.id).await?;

    // All grants died with their profiles
    let audit = fx.permissions.find_by_code("audit").await.expect("audit");
    assert!(audit.granted_to.is_empty());
    fx.permissions.delete(audit.id).await?;

    Ok(())
}

// ============================================================================
// CONCURRENT MUTATION STORM
// ============================================================================

#[tokio::test]
async fn test_concurrent_mutation_storm_preserves_invariants() {
    init_tracing();
    let fx = Harness::new();

    let mut ids = Vec::new();
    for i in 0..6 {
        ids.push(fx.profiles.create(draft(&format!("node-{i}"))).await.unwrap().id);
    }

    // Every ordered pair attacked concurrently, some twice
    let mut tasks = Vec::new();
    for (i, &parent) in ids.iter().enumerate() {
        for (j, &child) in ids.iter().enumerate() {
            if i == j {
                continue;
            }
            let profiles = fx.profiles.clone();
            tasks.push(tokio::spawn(async move {
                let _ = profiles.add_child(parent, child).await;
            }));
            if (i + j) % 3 == 0 {
                let profiles = fx.profiles.clone();
                tasks.push(tokio::spawn(async move {
                    let _ = profiles.remove_child(parent, child).await;
                }));
            }
        }
    }
    for task in join_all(tasks).await {
        task.unwrap();
    }

    assert_graph_consistent(&fx.profiles.find_all().await);
}

// ============================================================================
// STATE SNAPSHOT
// ============================================================================

#[tokio::test]
async fn test_state_snapshot_round_trips_through_json() -> Result<()> {
    let fx = Harness::new();
    fx.permissions.initialize().await?;
    let staff = fx.profiles.create(draft("Staff")).await?;
    let interns = fx.profiles.create(draft("Interns")).await?;
    fx.profiles.add_child(staff.id, interns.id).await?;

    let snapshot: DomainState = fx.store.read(|state| state.clone()).await;
    let json = serde_json::to_string(&snapshot)?;
    let restored: DomainState = serde_json::from_str(&json)?;

    assert_eq!(snapshot, restored);
    Ok(())
}

// ============================================================================
// PROPERTY: NO OPERATION SEQUENCE PRODUCES A CYCLE
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_random_attachment_sequences_stay_acyclic(
        edges in proptest::collection::vec((0..8usize, 0..8usize), 0..48)
    ) {
        tokio_test::block_on(async {
            let fx = Harness::new();

            let mut ids = Vec::new();
            for i in 0..8 {
                ids.push(fx.profiles.create(draft(&format!("p-{i}"))).await.unwrap().id);
            }

            for (parent, child) in edges {
                // Rejections are expected along the way; the graph must
                // stay consistent regardless.
                let _ = fx.profiles.add_child(ids[parent], ids[child]).await;
            }

            assert_graph_consistent(&fx.profiles.find_all().await);
        });
    }

    #[test]
    fn test_random_detach_sequences_keep_both_directions_in_sync(
        ops in proptest::collection::vec((proptest::bool::ANY, 0..6usize, 0..6usize), 0..64)
    ) {
        tokio_test::block_on(async {
            let fx = Harness::new();

            let mut ids = Vec::new();
            for i in 0..6 {
                ids.push(fx.profiles.create(draft(&format!("p-{i}"))).await.unwrap().id);
            }

            for (attach, parent, child) in ops {
                if attach {
                    let _ = fx.profiles.add_child(ids[parent], ids[child]).await;
                } else {
                    let _ = fx.profiles.remove_child(ids[parent], ids[child]).await;
                }
            }

            assert_graph_consistent(&fx.profiles.find_all().await);
        });
    }
}
