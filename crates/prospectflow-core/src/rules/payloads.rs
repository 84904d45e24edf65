//! Typed payload extraction
//!
//! Each `parse_*` validates against its schema first, then normalizes:
//! emails are trimmed and lowercased, identifiers and names trimmed, and
//! empty contact strings become `None`.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use prospectflow_core_types::Sensitive;

use super::schema::{self, parse_date, Schema};
use crate::errors::{PipelineError, Result};
use crate::model::{
    ClientUpdate, ContactDetails, ContactPatch, ConversionRequest, IdentityPatch,
    InteractionInput, InteractionType, NewProspect, ProspectStatus, ProspectUpdate,
};

/// `POST /prospects`
///
/// # Errors
///
/// `ValidationFailed` if the payload does not match the create schema.
pub fn parse_new_prospect(payload: &Value) -> Result<NewProspect> {
    let object = validated(&schema::PROSPECT_CREATE, payload)?;
    Ok(NewProspect {
        name: required_trimmed(object, "nom")?,
        email: normalize_email(&required_trimmed(object, "email")?),
        interests: interests(object).unwrap_or_default(),
    })
}

/// `PUT /prospects`
///
/// # Errors
///
/// `ValidationFailed` if the payload does not match the update schema.
pub fn parse_prospect_update(payload: &Value) -> Result<ProspectUpdate> {
    let object = validated(&schema::PROSPECT_UPDATE, payload)?;
    let expected_status = object
        .get("statut")
        .and_then(Value::as_str)
        .and_then(ProspectStatus::parse);

    Ok(ProspectUpdate {
        identity: IdentityPatch {
            name: Some(required_trimmed(object, "nom")?),
            email: Some(normalize_email(&required_trimmed(object, "email")?)),
            interests: interests(object),
        },
        expected_status,
    })
}

/// `POST /clients`
///
/// # Errors
///
/// `ValidationFailed` if the payload does not match the conversion schema.
pub fn parse_conversion_request(payload: &Value) -> Result<ConversionRequest> {
    let object = validated(&schema::CLIENT_CREATE, payload)?;
    Ok(ConversionRequest {
        prospect_id: required_trimmed(object, "prospectId")?,
        contact: ContactDetails {
            address: contact_field(object, "adresse").flatten(),
            phone: contact_field(object, "numeroTelephone").flatten(),
            payment: contact_field(object, "informationsPaiement")
                .flatten()
                .map(Sensitive::new),
        },
    })
}

/// `PUT /clients`
///
/// Every field is optional; absent fields are left untouched.
///
/// # Errors
///
/// `ValidationFailed` if the payload does not match the client update schema.
pub fn parse_client_update(payload: &Value) -> Result<ClientUpdate> {
    let object = validated(&schema::CLIENT_UPDATE, payload)?;
    Ok(ClientUpdate {
        identity: IdentityPatch {
            name: optional_trimmed(object, "nom"),
            email: optional_trimmed(object, "email").map(|e| normalize_email(&e)),
            interests: interests(object),
        },
        contact: ContactPatch {
            address: contact_field(object, "adresse"),
            phone: contact_field(object, "numeroTelephone"),
            payment: contact_field(object, "informationsPaiement")
                .map(|value| value.map(Sensitive::new)),
        },
    })
}

/// `POST /interactions` and `PUT /interactions`
///
/// # Errors
///
/// `ValidationFailed` if the payload does not match the interaction schema.
pub fn parse_interaction(payload: &Value) -> Result<InteractionInput> {
    let object = validated(&schema::INTERACTION, payload)?;

    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .and_then(InteractionType::parse)
        .ok_or_else(|| PipelineError::validation("type", "is required"))?;
    let date = object
        .get("date")
        .and_then(parse_date)
        .ok_or_else(|| PipelineError::validation("date", "must be a valid date"))?;
    let notes = object
        .get("notes")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| PipelineError::validation("notes", "is required"))?;

    Ok(InteractionInput {
        kind,
        date,
        notes,
        prospect_id: required_trimmed(object, "prospectId")?,
    })
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validated<'a>(schema: &Schema, payload: &'a Value) -> Result<&'a Map<String, Value>> {
    schema.validate(payload)?;
    payload
        .as_object()
        .ok_or_else(|| PipelineError::validation(schema.entity, "must be an object"))
}

fn required_trimmed(object: &Map<String, Value>, field: &str) -> Result<String> {
    optional_trimmed(object, field).ok_or_else(|| PipelineError::validation(field, "is required"))
}

fn optional_trimmed(object: &Map<String, Value>, field: &str) -> Option<String> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
}

fn interests(object: &Map<String, Value>) -> Option<BTreeSet<String>> {
    object.get("interets").and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.trim().to_string())
            .collect()
    })
}

/// Absent -> `None`, null or blank -> `Some(None)`, text -> `Some(Some(text))`
fn contact_field(object: &Map<String, Value>, field: &str) -> Option<Option<String>> {
    object.get(field).map(|value| {
        value
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_email_is_normalized() {
        let prospect = parse_new_prospect(&json!({
            "nom": " Ada ",
            "email": "  Ada@Example.COM ",
            "statut": "Prospect",
        }))
        .unwrap();
        assert_eq!(prospect.name, "Ada");
        assert_eq!(prospect.email, "ada@example.com");
        assert!(prospect.interests.is_empty());
    }

    #[test]
    fn test_interests_are_deduplicated() {
        let prospect = parse_new_prospect(&json!({
            "nom": "A",
            "email": "a@x.com",
            "statut": "Prospect",
            "interets": ["web", "data", "web"],
        }))
        .unwrap();
        assert_eq!(prospect.interests.len(), 2);
    }

    #[test]
    fn test_conversion_blank_contact_becomes_none() {
        let request = parse_conversion_request(&json!({
            "prospectId": "p1",
            "adresse": "",
            "numeroTelephone": null,
            "informationsPaiement": "IBAN",
        }))
        .unwrap();
        assert_eq!(request.contact.address, None);
        assert_eq!(request.contact.phone, None);
        assert_eq!(request.contact.payment.unwrap().expose(), "IBAN");
    }

    #[test]
    fn test_client_update_keeps_absent_and_null_apart() {
        let update = parse_client_update(&json!({"nom": "X", "adresse": null})).unwrap();
        assert_eq!(update.identity.name.as_deref(), Some("X"));
        assert!(update.identity.email.is_none());
        assert_eq!(update.contact.address, Some(None));
        assert_eq!(update.contact.phone, None);
    }

    #[test]
    fn test_prospect_update_reads_expected_status() {
        let update = parse_prospect_update(&json!({
            "nom": "A",
            "email": "a@x.com",
            "statut": "Client",
        }))
        .unwrap();
        assert_eq!(update.expected_status, Some(ProspectStatus::Client));
    }

    #[test]
    fn test_interaction_accepts_english_alias() {
        let input = parse_interaction(&json!({
            "type": "Meeting",
            "date": "2024-05-02",
            "notes": "demo",
            "prospectId": "p1",
        }))
        .unwrap();
        assert_eq!(input.kind, InteractionType::Meeting);
    }
}
