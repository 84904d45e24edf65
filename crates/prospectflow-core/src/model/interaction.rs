use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of contact event
///
/// Wire values keep the stored French labels; the English names are
/// accepted on input as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InteractionType {
    #[serde(rename = "Email")]
    Email,
    #[serde(rename = "Appel", alias = "Call")]
    Call,
    #[serde(rename = "Réunion", alias = "Meeting")]
    Meeting,
    #[serde(rename = "Autre", alias = "Other")]
    Other,
}

impl InteractionType {
    /// Every accepted input value
    pub const VALUES: &'static [&'static str] = &[
        "Email", "Appel", "Réunion", "Autre", "Call", "Meeting", "Other",
    ];

    /// Stored label
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::Email => "Email",
            InteractionType::Call => "Appel",
            InteractionType::Meeting => "Réunion",
            InteractionType::Other => "Autre",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Email" => Some(InteractionType::Email),
            "Appel" | "Call" => Some(InteractionType::Call),
            "Réunion" | "Meeting" => Some(InteractionType::Meeting),
            "Autre" | "Other" => Some(InteractionType::Other),
            _ => None,
        }
    }
}

/// Interaction - a timestamped contact event attached to a Prospect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "type")]
    pub kind: InteractionType,

    /// When the contact happened
    pub date: DateTime<Utc>,

    pub notes: String,

    #[serde(rename = "prospectId")]
    pub prospect_id: String,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Interaction {
    pub fn new(id: String, input: InteractionInput) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind: input.kind,
            date: input.date,
            notes: input.notes,
            prospect_id: input.prospect_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every user-editable field
    pub fn apply(&mut self, input: &InteractionInput) {
        self.kind = input.kind;
        self.date = input.date;
        self.notes = input.notes.clone();
        self.prospect_id = input.prospect_id.clone();
        self.updated_at = Utc::now();
    }
}

/// Validated interaction payload (create and update share the schema)
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionInput {
    pub kind: InteractionType,
    pub date: DateTime<Utc>,
    pub notes: String,
    pub prospect_id: String,
}

/// Listing filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionFilter {
    /// Restrict to one Prospect; results then come newest first
    pub prospect_id: Option<String>,
}

/// One row of the interaction statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionTypeCount {
    #[serde(rename = "type")]
    pub kind: InteractionType,
    pub count: u64,
}
