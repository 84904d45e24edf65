//! Raw row shapes and their conversion to documents
//!
//! Rows are read as plain SQLite values first so that decoding failures
//! (bad timestamps, corrupt JSON) surface as store errors rather than
//! rusqlite conversion panics.

use chrono::{DateTime, SecondsFormat, Utc};
use prospectflow_core::errors::{PipelineError, Result};
use prospectflow_core::model::{Client, Interaction, InteractionType, Prospect, ProspectStatus};
use prospectflow_core::types::Sensitive;
use rusqlite::Row;

pub const PROSPECT_COLUMNS: &str =
    "id, name, email, interests, status, interaction_ids, created_at, updated_at";
pub const CLIENT_COLUMNS: &str = "id, prospect_id, address, phone, payment, created_at, updated_at";
pub const INTERACTION_COLUMNS: &str =
    "id, kind, occurred_at, notes, prospect_id, created_at, updated_at";

/// Fixed-width UTC timestamp; sorts lexicographically in time order
pub fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| PipelineError::store("decode_row", format!("{}: {}", column, e)))
}

pub struct ProspectRow {
    id: String,
    name: String,
    email: String,
    interests: String,
    status: String,
    interaction_ids: String,
    created_at: String,
    updated_at: String,
}

impl ProspectRow {
    pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            interests: row.get(3)?,
            status: row.get(4)?,
            interaction_ids: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    pub fn into_prospect(self) -> Result<Prospect> {
        let status = ProspectStatus::parse(&self.status).ok_or_else(|| {
            PipelineError::store("decode_row", format!("unknown status '{}'", self.status))
        })?;
        Ok(Prospect {
            interests: serde_json::from_str(&self.interests)?,
            interaction_ids: serde_json::from_str(&self.interaction_ids)?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
            id: self.id,
            name: self.name,
            email: self.email,
            status,
        })
    }
}

pub struct ClientRow {
    id: String,
    prospect_id: String,
    address: Option<String>,
    phone: Option<String>,
    payment: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ClientRow {
    pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            prospect_id: row.get(1)?,
            address: row.get(2)?,
            phone: row.get(3)?,
            payment: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    pub fn into_client(self) -> Result<Client> {
        Ok(Client {
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
            id: self.id,
            prospect_id: self.prospect_id,
            address: self.address,
            phone: self.phone,
            payment: self.payment.map(Sensitive::new),
        })
    }
}

pub struct InteractionRow {
    id: String,
    kind: String,
    occurred_at: String,
    notes: String,
    prospect_id: String,
    created_at: String,
    updated_at: String,
}

impl InteractionRow {
    pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            kind: row.get(1)?,
            occurred_at: row.get(2)?,
            notes: row.get(3)?,
            prospect_id: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    pub fn into_interaction(self) -> Result<Interaction> {
        Ok(Interaction {
            kind: parse_kind(&self.kind)?,
            date: parse_timestamp("occurred_at", &self.occurred_at)?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
            id: self.id,
            notes: self.notes,
            prospect_id: self.prospect_id,
        })
    }
}

pub fn parse_kind(raw: &str) -> Result<InteractionType> {
    InteractionType::parse(raw).ok_or_else(|| {
        PipelineError::store("decode_row", format!("unknown interaction type '{}'", raw))
    })
}
