use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::EntityStore;
use crate::errors::{PipelineError, Result};
use crate::model::{
    Client, ContactPatch, IdentityPatch, Interaction, InteractionFilter, InteractionInput,
    InteractionType, InteractionTypeCount, Prospect, ProspectStatus,
};

#[derive(Debug, Default)]
struct Collections {
    prospects: BTreeMap<String, Prospect>,
    clients: BTreeMap<String, Client>,
    interactions: BTreeMap<String, Interaction>,
}

impl Collections {
    fn email_taken(&self, email: &str, except_id: Option<&str>) -> bool {
        self.prospects
            .values()
            .any(|p| p.email == email && Some(p.id.as_str()) != except_id)
    }
}

/// In-memory entity store
///
/// All three collections sit behind one mutex, so every trait call is
/// atomic. Used by tests and by the server's `--in-memory` mode.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, op: &str) -> Result<MutexGuard<'_, Collections>> {
        self.inner
            .lock()
            .map_err(|_| PipelineError::store(op, "memory store lock poisoned"))
    }
}

fn oldest_first<T, F>(mut items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> (chrono::DateTime<Utc>, String),
{
    items.sort_by_key(|item| key(item));
    items
}

impl EntityStore for MemoryStore {
    fn insert_prospect(&self, prospect: &Prospect) -> Result<()> {
        let mut db = self.lock("insert_prospect")?;
        if db.email_taken(&prospect.email, None) {
            return Err(PipelineError::DuplicateEmail {
                email: prospect.email.clone(),
            });
        }
        db.prospects.insert(prospect.id.clone(), prospect.clone());
        Ok(())
    }

    fn get_prospect(&self, id: &str) -> Result<Option<Prospect>> {
        Ok(self.lock("get_prospect")?.prospects.get(id).cloned())
    }

    fn list_prospects(&self) -> Result<Vec<Prospect>> {
        let db = self.lock("list_prospects")?;
        Ok(oldest_first(
            db.prospects.values().cloned().collect(),
            |p| (p.created_at, p.id.clone()),
        ))
    }

    fn update_prospect_identity(
        &self,
        id: &str,
        patch: &IdentityPatch,
    ) -> Result<Option<Prospect>> {
        let mut db = self.lock("update_prospect_identity")?;
        if let Some(email) = &patch.email {
            if db.prospects.contains_key(id) && db.email_taken(email, Some(id)) {
                return Err(PipelineError::DuplicateEmail {
                    email: email.clone(),
                });
            }
        }
        Ok(db.prospects.get_mut(id).map(|prospect| {
            prospect.apply_identity(patch);
            prospect.clone()
        }))
    }

    fn set_prospect_status(&self, id: &str, status: ProspectStatus) -> Result<Option<Prospect>> {
        let mut db = self.lock("set_prospect_status")?;
        Ok(db.prospects.get_mut(id).map(|prospect| {
            prospect.status = status;
            prospect.updated_at = Utc::now();
            prospect.clone()
        }))
    }

    fn push_interaction_ref(
        &self,
        prospect_id: &str,
        interaction_id: &str,
    ) -> Result<Option<Prospect>> {
        let mut db = self.lock("push_interaction_ref")?;
        Ok(db.prospects.get_mut(prospect_id).map(|prospect| {
            prospect.add_interaction_id(interaction_id);
            prospect.clone()
        }))
    }

    fn pull_interaction_ref(
        &self,
        prospect_id: &str,
        interaction_id: &str,
    ) -> Result<Option<Prospect>> {
        let mut db = self.lock("pull_interaction_ref")?;
        Ok(db.prospects.get_mut(prospect_id).map(|prospect| {
            prospect.remove_interaction_id(interaction_id);
            prospect.clone()
        }))
    }

    fn delete_prospect(&self, id: &str) -> Result<u64> {
        let mut db = self.lock("delete_prospect")?;
        Ok(u64::from(db.prospects.remove(id).is_some()))
    }

    fn count_prospects(&self) -> Result<u64> {
        Ok(self.lock("count_prospects")?.prospects.len() as u64)
    }

    fn insert_client(&self, client: &Client) -> Result<()> {
        let mut db = self.lock("insert_client")?;
        if db
            .clients
            .values()
            .any(|c| c.prospect_id == client.prospect_id)
        {
            return Err(PipelineError::AlreadyConverted {
                prospect_id: client.prospect_id.clone(),
            });
        }
        db.clients.insert(client.id.clone(), client.clone());
        Ok(())
    }

    fn get_client(&self, id: &str) -> Result<Option<Client>> {
        Ok(self.lock("get_client")?.clients.get(id).cloned())
    }

    fn find_client_by_prospect(&self, prospect_id: &str) -> Result<Option<Client>> {
        let db = self.lock("find_client_by_prospect")?;
        Ok(db
            .clients
            .values()
            .find(|c| c.prospect_id == prospect_id)
            .cloned())
    }

    fn list_clients(&self) -> Result<Vec<Client>> {
        let db = self.lock("list_clients")?;
        Ok(oldest_first(
            db.clients.values().cloned().collect(),
            |c| (c.created_at, c.id.clone()),
        ))
    }

    fn update_client_contact(&self, id: &str, patch: &ContactPatch) -> Result<Option<Client>> {
        let mut db = self.lock("update_client_contact")?;
        Ok(db.clients.get_mut(id).map(|client| {
            client.apply_contact(patch);
            client.clone()
        }))
    }

    fn delete_client(&self, id: &str) -> Result<u64> {
        let mut db = self.lock("delete_client")?;
        Ok(u64::from(db.clients.remove(id).is_some()))
    }

    fn count_clients(&self) -> Result<u64> {
        Ok(self.lock("count_clients")?.clients.len() as u64)
    }

    fn insert_interaction(&self, interaction: &Interaction) -> Result<()> {
        let mut db = self.lock("insert_interaction")?;
        db.interactions
            .insert(interaction.id.clone(), interaction.clone());
        Ok(())
    }

    fn get_interaction(&self, id: &str) -> Result<Option<Interaction>> {
        Ok(self.lock("get_interaction")?.interactions.get(id).cloned())
    }

    fn list_interactions(&self, filter: &InteractionFilter) -> Result<Vec<Interaction>> {
        let db = self.lock("list_interactions")?;
        match &filter.prospect_id {
            None => Ok(oldest_first(
                db.interactions.values().cloned().collect(),
                |i| (i.created_at, i.id.clone()),
            )),
            Some(prospect_id) => {
                let mut items: Vec<Interaction> = db
                    .interactions
                    .values()
                    .filter(|i| &i.prospect_id == prospect_id)
                    .cloned()
                    .collect();
                items.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
                Ok(items)
            }
        }
    }

    fn replace_interaction(
        &self,
        id: &str,
        input: &InteractionInput,
    ) -> Result<Option<Interaction>> {
        let mut db = self.lock("replace_interaction")?;
        Ok(db.interactions.get_mut(id).map(|interaction| {
            interaction.apply(input);
            interaction.clone()
        }))
    }

    fn delete_interaction(&self, id: &str) -> Result<Option<Interaction>> {
        Ok(self.lock("delete_interaction")?.interactions.remove(id))
    }

    fn count_interactions_by_type(&self) -> Result<Vec<InteractionTypeCount>> {
        let db = self.lock("count_interactions_by_type")?;
        let mut counts: BTreeMap<InteractionType, u64> = BTreeMap::new();
        for interaction in db.interactions.values() {
            *counts.entry(interaction.kind).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(kind, count)| InteractionTypeCount { kind, count })
            .collect())
    }
}
