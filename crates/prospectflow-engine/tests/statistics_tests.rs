#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use chrono::Utc;
use common::{conversion, seed_prospect, FaultyStore};
use prospectflow_core::errors::ExErrorKind;
use prospectflow_core::model::{InteractionInput, InteractionType};
use prospectflow_core::MemoryStore;
use prospectflow_engine::commands::conversion::client_convert;
use prospectflow_engine::commands::interaction::interaction_create;
use prospectflow_engine::commands::statistics::{
    statistics_conversion_rate, statistics_interaction_stats,
};

#[test]
fn test_conversion_rate_is_fresh_each_call() {
    let store = MemoryStore::new();
    let a = seed_prospect(&store, "A");
    seed_prospect(&store, "B");
    seed_prospect(&store, "C");
    seed_prospect(&store, "D");

    let before = statistics_conversion_rate(&store).unwrap();
    assert_eq!(before.conversion_rate, Some(0.0));

    client_convert(&store, conversion(&a.id)).unwrap();
    let after = statistics_conversion_rate(&store).unwrap();
    assert_eq!(after.total_prospects, 4);
    assert_eq!(after.total_clients, 1);
    assert_eq!(after.conversion_rate, Some(25.0));
}

#[test]
fn test_interaction_stats_counts_present_types() {
    let store = MemoryStore::new();
    let prospect = seed_prospect(&store, "A");
    for kind in [
        InteractionType::Email,
        InteractionType::Email,
        InteractionType::Other,
    ] {
        interaction_create(
            &store,
            InteractionInput {
                kind,
                date: Utc::now(),
                notes: "n".to_string(),
                prospect_id: prospect.id.clone(),
            },
        )
        .unwrap();
    }

    let stats = statistics_interaction_stats(&store).unwrap();

    assert_eq!(stats.len(), 2);
    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json[0]["type"], "Email");
    assert_eq!(json[0]["count"], 2);
    assert_eq!(json[1]["type"], "Autre");
}

#[test]
fn test_store_failure_surfaces() {
    let store = FaultyStore::new();
    store.fail("count_clients");

    let err = statistics_conversion_rate(&store).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::StoreFailure);
    assert_eq!(err.op(), Some("count_clients"));
}
