//! SQLite implementation of `EntityStore`
//!
//! One connection behind a mutex. Every trait call holds the lock for its
//! whole duration, so read-after-write pairs inside a call (update then
//! re-select) are atomic with respect to other requests.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use prospectflow_core::errors::{PipelineError, Result};
use prospectflow_core::model::{
    Client, ContactPatch, IdentityPatch, Interaction, InteractionFilter, InteractionInput,
    InteractionTypeCount, Prospect, ProspectStatus,
};
use prospectflow_core::EntityStore;
use rusqlite::{params, Connection, OptionalExtension};

use super::rows::{
    parse_kind, timestamp, ClientRow, InteractionRow, ProspectRow, CLIENT_COLUMNS,
    INTERACTION_COLUMNS, PROSPECT_COLUMNS,
};
use crate::db;
use crate::errors::{
    from_rusqlite, is_unique_violation, CLIENT_PROSPECT_INDEX, PROSPECT_EMAIL_INDEX,
};
use crate::migrations::apply_migrations;

/// SQLite-backed entity store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and bring its schema up to date
    ///
    /// # Errors
    ///
    /// `Store` if the file cannot be opened or a migration fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut conn = db::open(path)?;
        db::configure(&conn, true)?;
        apply_migrations(&mut conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Fresh in-memory database with the schema applied
    ///
    /// # Errors
    ///
    /// `Store` if SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = db::open_in_memory()?;
        db::configure(&conn, false)?;
        apply_migrations(&mut conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already migrated connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self, op: &str) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PipelineError::store(op, "connection lock poisoned"))
    }
}

fn select_prospect(conn: &Connection, op: &str, id: &str) -> Result<Option<Prospect>> {
    conn.query_row(
        &format!("SELECT {} FROM prospects WHERE id = ?1", PROSPECT_COLUMNS),
        [id],
        ProspectRow::read,
    )
    .optional()
    .map_err(|e| from_rusqlite(op, e))?
    .map(ProspectRow::into_prospect)
    .transpose()
}

fn select_client(
    conn: &Connection,
    op: &str,
    sql_where: &str,
    arg: &str,
) -> Result<Option<Client>> {
    conn.query_row(
        &format!("SELECT {} FROM clients WHERE {}", CLIENT_COLUMNS, sql_where),
        [arg],
        ClientRow::read,
    )
    .optional()
    .map_err(|e| from_rusqlite(op, e))?
    .map(ClientRow::into_client)
    .transpose()
}

fn select_interaction(conn: &Connection, op: &str, id: &str) -> Result<Option<Interaction>> {
    conn.query_row(
        &format!("SELECT {} FROM interactions WHERE id = ?1", INTERACTION_COLUMNS),
        [id],
        InteractionRow::read,
    )
    .optional()
    .map_err(|e| from_rusqlite(op, e))?
    .map(InteractionRow::into_interaction)
    .transpose()
}

fn count(conn: &Connection, op: &str, table: &str) -> Result<u64> {
    let n: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })
        .map_err(|e| from_rusqlite(op, e))?;
    Ok(n.max(0) as u64)
}

/// `(is_set, value)` parameter pair for a CASE-guarded column patch
fn patch_param<T: Clone>(field: &Option<Option<T>>) -> (bool, Option<T>) {
    match field {
        None => (false, None),
        Some(value) => (true, value.clone()),
    }
}

impl EntityStore for SqliteStore {
    fn insert_prospect(&self, prospect: &Prospect) -> Result<()> {
        let conn = self.conn("insert_prospect")?;
        conn.execute(
            &format!(
                "INSERT INTO prospects ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                PROSPECT_COLUMNS
            ),
            params![
                prospect.id,
                prospect.name,
                prospect.email,
                serde_json::to_string(&prospect.interests)?,
                prospect.status.as_str(),
                serde_json::to_string(&prospect.interaction_ids)?,
                timestamp(&prospect.created_at),
                timestamp(&prospect.updated_at),
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e, PROSPECT_EMAIL_INDEX) {
                PipelineError::DuplicateEmail {
                    email: prospect.email.clone(),
                }
            } else {
                from_rusqlite("insert_prospect", e)
            }
        })?;

        tracing::debug!(prospect_id = %prospect.id, "inserted prospect");
        Ok(())
    }

    fn get_prospect(&self, id: &str) -> Result<Option<Prospect>> {
        let conn = self.conn("get_prospect")?;
        select_prospect(&conn, "get_prospect", id)
    }

    fn list_prospects(&self) -> Result<Vec<Prospect>> {
        let conn = self.conn("list_prospects")?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM prospects ORDER BY created_at, id",
                PROSPECT_COLUMNS
            ))
            .map_err(|e| from_rusqlite("list_prospects", e))?;
        let rows = stmt
            .query_map([], ProspectRow::read)
            .map_err(|e| from_rusqlite("list_prospects", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| from_rusqlite("list_prospects", e))?;
        rows.into_iter().map(ProspectRow::into_prospect).collect()
    }

    fn update_prospect_identity(
        &self,
        id: &str,
        patch: &IdentityPatch,
    ) -> Result<Option<Prospect>> {
        let conn = self.conn("update_prospect_identity")?;
        let interests = patch
            .interests
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let changed = conn
            .execute(
                "UPDATE prospects SET
                    name = COALESCE(?2, name),
                    email = COALESCE(?3, email),
                    interests = COALESCE(?4, interests),
                    updated_at = ?5
                 WHERE id = ?1",
                params![
                    id,
                    patch.name,
                    patch.email,
                    interests,
                    timestamp(&Utc::now())
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e, PROSPECT_EMAIL_INDEX) {
                    PipelineError::DuplicateEmail {
                        email: patch.email.clone().unwrap_or_default(),
                    }
                } else {
                    from_rusqlite("update_prospect_identity", e)
                }
            })?;

        if changed == 0 {
            return Ok(None);
        }
        select_prospect(&conn, "update_prospect_identity", id)
    }

    fn set_prospect_status(&self, id: &str, status: ProspectStatus) -> Result<Option<Prospect>> {
        let conn = self.conn("set_prospect_status")?;
        let changed = conn
            .execute(
                "UPDATE prospects SET status = ?2, updated_at = ?3 WHERE id = ?1",
                params![id, status.as_str(), timestamp(&Utc::now())],
            )
            .map_err(|e| from_rusqlite("set_prospect_status", e))?;

        if changed == 0 {
            return Ok(None);
        }
        tracing::debug!(prospect_id = %id, status = %status, "prospect status set");
        select_prospect(&conn, "set_prospect_status", id)
    }

    fn push_interaction_ref(
        &self,
        prospect_id: &str,
        interaction_id: &str,
    ) -> Result<Option<Prospect>> {
        let conn = self.conn("push_interaction_ref")?;
        conn.execute(
            "UPDATE prospects SET
                interaction_ids = json_insert(interaction_ids, '$[#]', ?2),
                updated_at = ?3
             WHERE id = ?1
               AND NOT EXISTS (
                   SELECT 1 FROM json_each(prospects.interaction_ids) WHERE value = ?2
               )",
            params![prospect_id, interaction_id, timestamp(&Utc::now())],
        )
        .map_err(|e| from_rusqlite("push_interaction_ref", e))?;

        select_prospect(&conn, "push_interaction_ref", prospect_id)
    }

    fn pull_interaction_ref(
        &self,
        prospect_id: &str,
        interaction_id: &str,
    ) -> Result<Option<Prospect>> {
        let conn = self.conn("pull_interaction_ref")?;
        conn.execute(
            "UPDATE prospects SET
                interaction_ids = (
                    SELECT json_group_array(value)
                    FROM json_each(prospects.interaction_ids)
                    WHERE value != ?2
                ),
                updated_at = ?3
             WHERE id = ?1",
            params![prospect_id, interaction_id, timestamp(&Utc::now())],
        )
        .map_err(|e| from_rusqlite("pull_interaction_ref", e))?;

        select_prospect(&conn, "pull_interaction_ref", prospect_id)
    }

    fn delete_prospect(&self, id: &str) -> Result<u64> {
        let conn = self.conn("delete_prospect")?;
        let removed = conn
            .execute("DELETE FROM prospects WHERE id = ?1", [id])
            .map_err(|e| from_rusqlite("delete_prospect", e))?;
        Ok(removed as u64)
    }

    fn count_prospects(&self) -> Result<u64> {
        let conn = self.conn("count_prospects")?;
        count(&conn, "count_prospects", "prospects")
    }

    fn insert_client(&self, client: &Client) -> Result<()> {
        let conn = self.conn("insert_client")?;
        conn.execute(
            &format!(
                "INSERT INTO clients ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                CLIENT_COLUMNS
            ),
            params![
                client.id,
                client.prospect_id,
                client.address,
                client.phone,
                client.payment.as_ref().map(|p| p.expose().clone()),
                timestamp(&client.created_at),
                timestamp(&client.updated_at),
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e, CLIENT_PROSPECT_INDEX) {
                PipelineError::AlreadyConverted {
                    prospect_id: client.prospect_id.clone(),
                }
            } else {
                from_rusqlite("insert_client", e)
            }
        })?;

        tracing::debug!(client_id = %client.id, prospect_id = %client.prospect_id, "inserted client");
        Ok(())
    }

    fn get_client(&self, id: &str) -> Result<Option<Client>> {
        let conn = self.conn("get_client")?;
        select_client(&conn, "get_client", "id = ?1", id)
    }

    fn find_client_by_prospect(&self, prospect_id: &str) -> Result<Option<Client>> {
        let conn = self.conn("find_client_by_prospect")?;
        select_client(&conn, "find_client_by_prospect", "prospect_id = ?1", prospect_id)
    }

    fn list_clients(&self) -> Result<Vec<Client>> {
        let conn = self.conn("list_clients")?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM clients ORDER BY created_at, id",
                CLIENT_COLUMNS
            ))
            .map_err(|e| from_rusqlite("list_clients", e))?;
        let rows = stmt
            .query_map([], ClientRow::read)
            .map_err(|e| from_rusqlite("list_clients", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| from_rusqlite("list_clients", e))?;
        rows.into_iter().map(ClientRow::into_client).collect()
    }

    fn update_client_contact(&self, id: &str, patch: &ContactPatch) -> Result<Option<Client>> {
        let conn = self.conn("update_client_contact")?;
        let (set_address, address) = patch_param(&patch.address);
        let (set_phone, phone) = patch_param(&patch.phone);
        let (set_payment, payment) = patch_param(&patch.payment);
        let payment = payment.map(|p| p.into_inner());

        let changed = conn
            .execute(
                "UPDATE clients SET
                    address = CASE WHEN ?2 THEN ?3 ELSE address END,
                    phone = CASE WHEN ?4 THEN ?5 ELSE phone END,
                    payment = CASE WHEN ?6 THEN ?7 ELSE payment END,
                    updated_at = ?8
                 WHERE id = ?1",
                params![
                    id,
                    set_address,
                    address,
                    set_phone,
                    phone,
                    set_payment,
                    payment,
                    timestamp(&Utc::now())
                ],
            )
            .map_err(|e| from_rusqlite("update_client_contact", e))?;

        if changed == 0 {
            return Ok(None);
        }
        select_client(&conn, "update_client_contact", "id = ?1", id)
    }

    fn delete_client(&self, id: &str) -> Result<u64> {
        let conn = self.conn("delete_client")?;
        let removed = conn
            .execute("DELETE FROM clients WHERE id = ?1", [id])
            .map_err(|e| from_rusqlite("delete_client", e))?;
        Ok(removed as u64)
    }

    fn count_clients(&self) -> Result<u64> {
        let conn = self.conn("count_clients")?;
        count(&conn, "count_clients", "clients")
    }

    fn insert_interaction(&self, interaction: &Interaction) -> Result<()> {
        let conn = self.conn("insert_interaction")?;
        conn.execute(
            &format!(
                "INSERT INTO interactions ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                INTERACTION_COLUMNS
            ),
            params![
                interaction.id,
                interaction.kind.as_str(),
                timestamp(&interaction.date),
                interaction.notes,
                interaction.prospect_id,
                timestamp(&interaction.created_at),
                timestamp(&interaction.updated_at),
            ],
        )
        .map_err(|e| from_rusqlite("insert_interaction", e))?;
        Ok(())
    }

    fn get_interaction(&self, id: &str) -> Result<Option<Interaction>> {
        let conn = self.conn("get_interaction")?;
        select_interaction(&conn, "get_interaction", id)
    }

    fn list_interactions(&self, filter: &InteractionFilter) -> Result<Vec<Interaction>> {
        let conn = self.conn("list_interactions")?;
        let rows = match &filter.prospect_id {
            None => {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {} FROM interactions ORDER BY created_at, id",
                        INTERACTION_COLUMNS
                    ))
                    .map_err(|e| from_rusqlite("list_interactions", e))?;
                let rows = stmt
                    .query_map([], InteractionRow::read)
                    .map_err(|e| from_rusqlite("list_interactions", e))?
                    .collect::<std::result::Result<Vec<_>, _>>();
                rows.map_err(|e| from_rusqlite("list_interactions", e))?
            }
            Some(prospect_id) => {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {} FROM interactions WHERE prospect_id = ?1
                         ORDER BY occurred_at DESC, id DESC",
                        INTERACTION_COLUMNS
                    ))
                    .map_err(|e| from_rusqlite("list_interactions", e))?;
                let rows = stmt
                    .query_map([prospect_id], InteractionRow::read)
                    .map_err(|e| from_rusqlite("list_interactions", e))?
                    .collect::<std::result::Result<Vec<_>, _>>();
                rows.map_err(|e| from_rusqlite("list_interactions", e))?
            }
        };
        rows.into_iter()
            .map(InteractionRow::into_interaction)
            .collect()
    }

    fn replace_interaction(
        &self,
        id: &str,
        input: &InteractionInput,
    ) -> Result<Option<Interaction>> {
        let conn = self.conn("replace_interaction")?;
        let changed = conn
            .execute(
                "UPDATE interactions SET
                    kind = ?2, occurred_at = ?3, notes = ?4, prospect_id = ?5, updated_at = ?6
                 WHERE id = ?1",
                params![
                    id,
                    input.kind.as_str(),
                    timestamp(&input.date),
                    input.notes,
                    input.prospect_id,
                    timestamp(&Utc::now())
                ],
            )
            .map_err(|e| from_rusqlite("replace_interaction", e))?;

        if changed == 0 {
            return Ok(None);
        }
        select_interaction(&conn, "replace_interaction", id)
    }

    fn delete_interaction(&self, id: &str) -> Result<Option<Interaction>> {
        let conn = self.conn("delete_interaction")?;
        let existing = select_interaction(&conn, "delete_interaction", id)?;
        if existing.is_some() {
            conn.execute("DELETE FROM interactions WHERE id = ?1", [id])
                .map_err(|e| from_rusqlite("delete_interaction", e))?;
        }
        Ok(existing)
    }

    fn count_interactions_by_type(&self) -> Result<Vec<InteractionTypeCount>> {
        let conn = self.conn("count_interactions_by_type")?;
        let mut stmt = conn
            .prepare("SELECT kind, COUNT(*) FROM interactions GROUP BY kind")
            .map_err(|e| from_rusqlite("count_interactions_by_type", e))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
            .map_err(|e| from_rusqlite("count_interactions_by_type", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| from_rusqlite("count_interactions_by_type", e))?;

        let mut counts = rows
            .into_iter()
            .map(|(kind, n)| {
                Ok(InteractionTypeCount {
                    kind: parse_kind(&kind)?,
                    count: n.max(0) as u64,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        counts.sort_by_key(|c| c.kind);
        Ok(counts)
    }
}
