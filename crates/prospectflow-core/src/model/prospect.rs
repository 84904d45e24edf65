use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Pipeline status of a Prospect
///
/// Only the conversion engine changes it: `convert` sets `Client`, `revert`
/// restores the default `Prospect`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProspectStatus {
    #[default]
    Prospect,
    Client,
}

impl ProspectStatus {
    /// Wire values accepted by the status enum
    pub const VALUES: &'static [&'static str] = &["Prospect", "Client"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProspectStatus::Prospect => "Prospect",
            ProspectStatus::Client => "Client",
        }
    }

    /// Strict parse; unknown values are rejected, not coerced
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Prospect" => Some(ProspectStatus::Prospect),
            "Client" => Some(ProspectStatus::Client),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProspectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prospect - a lead not yet (or no longer) converted to a paying client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prospect {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "nom")]
    pub name: String,

    /// Unique across all prospects
    pub email: String,

    /// Interest tags; unordered, serialized as a sorted array
    #[serde(rename = "interets", default)]
    pub interests: BTreeSet<String>,

    #[serde(rename = "statut", default)]
    pub status: ProspectStatus,

    /// Interaction ids in the order they were recorded
    #[serde(rename = "historiqueInteractions", default)]
    pub interaction_ids: Vec<String>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Prospect {
    /// Create a Prospect in the default `Prospect` status with no history
    pub fn new(id: String, input: NewProspect) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: input.name,
            email: input.email,
            interests: input.interests,
            status: ProspectStatus::Prospect,
            interaction_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an identity patch in place, leaving absent fields untouched
    pub fn apply_identity(&mut self, patch: &IdentityPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(interests) = &patch.interests {
            self.interests = interests.clone();
        }
        self.updated_at = Utc::now();
    }

    /// Append an interaction id unless already present
    pub fn add_interaction_id(&mut self, interaction_id: &str) {
        if !self.interaction_ids.iter().any(|id| id == interaction_id) {
            self.interaction_ids.push(interaction_id.to_string());
        }
        self.updated_at = Utc::now();
    }

    pub fn remove_interaction_id(&mut self, interaction_id: &str) {
        self.interaction_ids.retain(|id| id != interaction_id);
        self.updated_at = Utc::now();
    }
}

/// Validated intake payload
#[derive(Debug, Clone, PartialEq)]
pub struct NewProspect {
    pub name: String,
    pub email: String,
    pub interests: BTreeSet<String>,
}

/// Identity fields of a Prospect; `None` leaves the stored value unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub interests: Option<BTreeSet<String>>,
}

impl IdentityPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.interests.is_none()
    }
}

/// Validated `PUT /prospects` payload
#[derive(Debug, Clone, PartialEq)]
pub struct ProspectUpdate {
    pub identity: IdentityPatch,
    /// Status echoed by the caller; must match the stored status
    pub expected_status: Option<ProspectStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Prospect {
        Prospect::new(
            "p1".to_string(),
            NewProspect {
                name: "A".to_string(),
                email: "a@x.com".to_string(),
                interests: ["dev".to_string()].into_iter().collect(),
            },
        )
    }

    #[test]
    fn test_new_prospect_defaults() {
        let prospect = sample();
        assert_eq!(prospect.status, ProspectStatus::Prospect);
        assert!(prospect.interaction_ids.is_empty());
        assert_eq!(prospect.created_at, prospect.updated_at);
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["_id"], "p1");
        assert_eq!(json["nom"], "A");
        assert_eq!(json["statut"], "Prospect");
        assert_eq!(json["interets"], serde_json::json!(["dev"]));
        assert_eq!(json["historiqueInteractions"], serde_json::json!([]));
    }

    #[test]
    fn test_interaction_ids_are_not_duplicated() {
        let mut prospect = sample();
        prospect.add_interaction_id("i1");
        prospect.add_interaction_id("i2");
        prospect.add_interaction_id("i1");
        assert_eq!(prospect.interaction_ids, vec!["i1", "i2"]);

        prospect.remove_interaction_id("i1");
        assert_eq!(prospect.interaction_ids, vec!["i2"]);
    }

    #[test]
    fn test_apply_identity_keeps_absent_fields() {
        let mut prospect = sample();
        prospect.apply_identity(&IdentityPatch {
            name: Some("X".to_string()),
            ..IdentityPatch::default()
        });
        assert_eq!(prospect.name, "X");
        assert_eq!(prospect.email, "a@x.com");
    }

    #[test]
    fn test_status_parse_is_strict() {
        assert_eq!(ProspectStatus::parse("Client"), Some(ProspectStatus::Client));
        assert_eq!(ProspectStatus::parse("client"), None);
        assert_eq!(ProspectStatus::parse(""), None);
    }
}
