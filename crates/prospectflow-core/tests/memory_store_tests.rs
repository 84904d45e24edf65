#![allow(clippy::unwrap_used, clippy::expect_used)]

//! MemoryStore contract tests
//!
//! Covers the unique constraints every `EntityStore` must enforce and the
//! listing orders the engine relies on.

mod common;

use common::{client_for, interaction_on, prospect};
use prospectflow_core::model::{
    ContactPatch, IdentityPatch, InteractionFilter, InteractionType, ProspectStatus,
};
use prospectflow_core::{EntityStore, MemoryStore, PipelineError};

#[test]
fn test_duplicate_email_is_rejected() {
    let store = MemoryStore::new();
    let first = prospect("A", "a@x.com");
    store.insert_prospect(&first).unwrap();

    let err = store.insert_prospect(&prospect("B", "a@x.com")).unwrap_err();
    assert!(matches!(err, PipelineError::DuplicateEmail { .. }));
    assert_eq!(store.count_prospects().unwrap(), 1);
    assert_eq!(store.get_prospect(&first.id).unwrap().unwrap().name, "A");
}

#[test]
fn test_identity_update_checks_email_against_others_only() {
    let store = MemoryStore::new();
    let a = prospect("A", "a@x.com");
    let b = prospect("B", "b@x.com");
    store.insert_prospect(&a).unwrap();
    store.insert_prospect(&b).unwrap();

    let same = IdentityPatch {
        email: Some("a@x.com".to_string()),
        ..IdentityPatch::default()
    };
    assert!(store.update_prospect_identity(&a.id, &same).unwrap().is_some());

    let taken = IdentityPatch {
        email: Some("b@x.com".to_string()),
        ..IdentityPatch::default()
    };
    let err = store.update_prospect_identity(&a.id, &taken).unwrap_err();
    assert!(matches!(err, PipelineError::DuplicateEmail { .. }));
}

#[test]
fn test_missing_targets_return_none() {
    let store = MemoryStore::new();
    assert!(store
        .set_prospect_status("nope", ProspectStatus::Client)
        .unwrap()
        .is_none());
    assert!(store
        .update_client_contact("nope", &ContactPatch::default())
        .unwrap()
        .is_none());
    assert_eq!(store.delete_client("nope").unwrap(), 0);
    assert_eq!(store.delete_prospect("nope").unwrap(), 0);
    assert!(store.delete_interaction("nope").unwrap().is_none());
}

#[test]
fn test_second_client_for_prospect_is_already_converted() {
    let store = MemoryStore::new();
    let p = prospect("A", "a@x.com");
    store.insert_prospect(&p).unwrap();
    store.insert_client(&client_for(&p.id)).unwrap();

    let err = store.insert_client(&client_for(&p.id)).unwrap_err();
    assert!(matches!(err, PipelineError::AlreadyConverted { .. }));
    assert_eq!(store.count_clients().unwrap(), 1);
}

#[test]
fn test_find_client_by_prospect() {
    let store = MemoryStore::new();
    let client = client_for("p1");
    store.insert_client(&client).unwrap();

    assert_eq!(
        store.find_client_by_prospect("p1").unwrap().unwrap().id,
        client.id
    );
    assert!(store.find_client_by_prospect("p2").unwrap().is_none());
}

#[test]
fn test_interaction_refs_push_and_pull() {
    let store = MemoryStore::new();
    let p = prospect("A", "a@x.com");
    store.insert_prospect(&p).unwrap();

    store.push_interaction_ref(&p.id, "i1").unwrap();
    store.push_interaction_ref(&p.id, "i2").unwrap();
    let after_pull = store.pull_interaction_ref(&p.id, "i1").unwrap().unwrap();
    assert_eq!(after_pull.interaction_ids, vec!["i2"]);
}

#[test]
fn test_filtered_interactions_are_newest_first() {
    let store = MemoryStore::new();
    for day in [3, 9, 1] {
        store
            .insert_interaction(&interaction_on("p1", InteractionType::Email, day))
            .unwrap();
    }
    store
        .insert_interaction(&interaction_on("p2", InteractionType::Email, 20))
        .unwrap();

    let filter = InteractionFilter {
        prospect_id: Some("p1".to_string()),
    };
    let days: Vec<_> = store
        .list_interactions(&filter)
        .unwrap()
        .iter()
        .map(|i| i.notes.clone())
        .collect();
    assert_eq!(
        days,
        vec!["contact on day 9", "contact on day 3", "contact on day 1"]
    );
    assert_eq!(
        store
            .list_interactions(&InteractionFilter::default())
            .unwrap()
            .len(),
        4
    );
}

#[test]
fn test_count_by_type_omits_absent_types() {
    let store = MemoryStore::new();
    store
        .insert_interaction(&interaction_on("p1", InteractionType::Call, 1))
        .unwrap();
    store
        .insert_interaction(&interaction_on("p1", InteractionType::Call, 2))
        .unwrap();
    store
        .insert_interaction(&interaction_on("p1", InteractionType::Meeting, 3))
        .unwrap();

    let counts = store.count_interactions_by_type().unwrap();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts[0].kind, InteractionType::Call);
    assert_eq!(counts[0].count, 2);
    assert_eq!(counts[1].kind, InteractionType::Meeting);
    assert_eq!(counts[1].count, 1);
}
