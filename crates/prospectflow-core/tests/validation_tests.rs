#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Validation layer tests
//!
//! Schemas reject before anything is written; these tests pin the field
//! reported for each kind of violation and the normalization applied to
//! accepted payloads.

use proptest::prelude::*;
use prospectflow_core::errors::{ExError, ExErrorKind, PipelineError};
use prospectflow_core::model::{InteractionType, ProspectStatus};
use prospectflow_core::rules::{
    parse_client_update, parse_conversion_request, parse_interaction, parse_new_prospect,
    parse_prospect_update,
};
use serde_json::json;

fn rejected_field(err: PipelineError) -> String {
    match err {
        PipelineError::ValidationFailed { field, .. } => field,
        other => panic!("expected ValidationFailed, got {:?}", other),
    }
}

#[test]
fn test_prospect_create_requires_name() {
    let err = parse_new_prospect(&json!({"email": "a@x.com", "statut": "Prospect"})).unwrap_err();
    assert_eq!(rejected_field(err), "nom");
}

#[test]
fn test_prospect_create_rejects_bad_email() {
    let err = parse_new_prospect(&json!({"nom": "A", "email": "not-an-email", "statut": "Prospect"}))
        .unwrap_err();
    assert_eq!(rejected_field(err), "email");
}

#[test]
fn test_prospect_create_rejects_empty_name() {
    let err =
        parse_new_prospect(&json!({"nom": "   ", "email": "a@x.com", "statut": "Prospect"}))
            .unwrap_err();
    let ex: ExError = err.into();
    assert_eq!(ex.kind(), ExErrorKind::ValidationFailed);
    assert_eq!(ex.message(), "\"nom\" is not allowed to be empty");
}

#[test]
fn test_prospect_create_rejects_non_object() {
    let err = parse_new_prospect(&json!(["nom"])).unwrap_err();
    assert_eq!(rejected_field(err), "prospect");
}

#[test]
fn test_prospect_update_rejects_unknown_status() {
    let err = parse_prospect_update(&json!({"nom": "A", "email": "a@x.com", "statut": "Lead"}))
        .unwrap_err();
    assert_eq!(rejected_field(err), "statut");
}

#[test]
fn test_prospect_update_without_status() {
    let update = parse_prospect_update(&json!({"nom": "B", "email": "B@x.com"})).unwrap();
    assert_eq!(update.expected_status, None);
    assert_eq!(update.identity.email.as_deref(), Some("b@x.com"));
    assert!(update.identity.interests.is_none());
}

#[test]
fn test_prospect_update_status_is_strict() {
    let update =
        parse_prospect_update(&json!({"nom": "B", "email": "b@x.com", "statut": "Prospect"}))
            .unwrap();
    assert_eq!(update.expected_status, Some(ProspectStatus::Prospect));
}

#[test]
fn test_conversion_requires_prospect_id() {
    let err = parse_conversion_request(&json!({"adresse": "1 rue"})).unwrap_err();
    assert_eq!(rejected_field(err), "prospectId");
}

#[test]
fn test_client_update_rejects_prospect_id() {
    let err = parse_client_update(&json!({"prospectId": "p2"})).unwrap_err();
    assert_eq!(rejected_field(err), "prospectId");
}

#[test]
fn test_client_update_empty_payload_is_valid() {
    let update = parse_client_update(&json!({})).unwrap();
    assert!(update.identity.is_empty());
    assert!(update.contact.is_empty());
}

#[test]
fn test_interaction_rejects_unknown_type() {
    let err = parse_interaction(&json!({
        "type": "Fax",
        "date": "2024-01-01",
        "notes": "n",
        "prospectId": "p1",
    }))
    .unwrap_err();
    assert_eq!(rejected_field(err), "type");
}

#[test]
fn test_interaction_rejects_bad_date() {
    let err = parse_interaction(&json!({
        "type": "Email",
        "date": "next tuesday",
        "notes": "n",
        "prospectId": "p1",
    }))
    .unwrap_err();
    assert_eq!(rejected_field(err), "date");
}

#[test]
fn test_interaction_accepts_french_labels() {
    for (label, kind) in [
        ("Appel", InteractionType::Call),
        ("Réunion", InteractionType::Meeting),
        ("Autre", InteractionType::Other),
        ("Email", InteractionType::Email),
    ] {
        let input = parse_interaction(&json!({
            "type": label,
            "date": 1_714_608_000_000_i64,
            "notes": "n",
            "prospectId": "p1",
        }))
        .unwrap();
        assert_eq!(input.kind, kind);
    }
}

proptest! {
    #[test]
    fn prop_status_outside_enum_is_rejected(status in "[a-zA-Z]{1,12}") {
        prop_assume!(status != "Prospect" && status != "Client");
        let result = parse_prospect_update(&json!({"nom": "A", "email": "a@x.com", "statut": status}));
        prop_assert!(matches!(result, Err(PipelineError::ValidationFailed { .. })), "expected ValidationFailed, got {:?}", result);
    }

    #[test]
    fn prop_unknown_keys_are_rejected(key in "[a-z]{3,10}") {
        prop_assume!(!["nom", "email", "interets", "statut"].contains(&key.as_str()));
        let mut payload = json!({"nom": "A", "email": "a@x.com", "statut": "Prospect"});
        payload[key.as_str()] = json!("x");
        let err = parse_new_prospect(&payload).unwrap_err();
        prop_assert_eq!(rejected_field(err), key);
    }

    #[test]
    fn prop_emails_are_lowercased(local in "[a-zA-Z]{1,10}", domain in "[a-zA-Z]{1,10}") {
        let email = format!("  {}@{}.COM ", local, domain);
        let prospect = parse_new_prospect(&json!({"nom": "A", "email": email, "statut": "Prospect"})).unwrap();
        prop_assert_eq!(prospect.email, format!("{}@{}.com", local, domain).to_lowercase());
    }
}
