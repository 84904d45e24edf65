//! Shared fixtures for engine tests
//!
//! `FaultyStore` wraps a `MemoryStore` and fails chosen operations, which is
//! how the half-completed workflows are driven.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use prospectflow_core::errors::{PipelineError, Result};
use prospectflow_core::model::{
    Client, ContactDetails, ContactPatch, ConversionRequest, IdentityPatch, Interaction,
    InteractionFilter, InteractionInput, InteractionTypeCount, NewProspect, Prospect,
    ProspectStatus,
};
use prospectflow_core::{EntityStore, MemoryStore};
use prospectflow_engine::commands::prospect::prospect_create;

/// Unique email so parallel tests never collide in shared log capture
#[allow(dead_code)]
pub fn unique_email(tag: &str) -> String {
    format!("{}-{}@example.com", tag, prospectflow_core::model::new_id())
}

#[allow(dead_code)]
pub fn new_prospect(name: &str, email: &str) -> NewProspect {
    NewProspect {
        name: name.to_string(),
        email: email.to_string(),
        interests: ["saas".to_string()].into_iter().collect(),
    }
}

#[allow(dead_code)]
pub fn seed_prospect(store: &dyn EntityStore, name: &str) -> Prospect {
    prospect_create(store, new_prospect(name, &unique_email(name))).unwrap()
}

#[allow(dead_code)]
pub fn conversion(prospect_id: &str) -> ConversionRequest {
    ConversionRequest {
        prospect_id: prospect_id.to_string(),
        contact: ContactDetails {
            address: Some("3 place Bellecour".to_string()),
            phone: Some("0478000000".to_string()),
            payment: None,
        },
    }
}

/// MemoryStore with per-operation fault injection
#[derive(Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    failing: Mutex<HashSet<&'static str>>,
    concurrent_client_delete: AtomicBool,
    stale_client_lookup: AtomicBool,
}

#[allow(dead_code)]
impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call to `op` fail with a store error
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn heal(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    /// Next `delete_client` behaves as if another request removed the row
    /// first: the row disappears and this call reports zero deletions
    pub fn lose_next_client_delete(&self) {
        self.concurrent_client_delete.store(true, Ordering::SeqCst);
    }

    /// `find_client_by_prospect` reports no Client while inserts still hit
    /// the one-Client-per-Prospect constraint, as when a concurrent
    /// conversion commits between the check and the insert
    pub fn hide_clients_from_lookup(&self) {
        self.stale_client_lookup.store(true, Ordering::SeqCst);
    }

    /// Direct access for arranging broken states
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn check(&self, op: &'static str) -> Result<()> {
        if self.failing.lock().unwrap().contains(op) {
            Err(PipelineError::store(op, "injected failure"))
        } else {
            Ok(())
        }
    }
}

impl EntityStore for FaultyStore {
    fn insert_prospect(&self, prospect: &Prospect) -> Result<()> {
        self.check("insert_prospect")?;
        self.inner.insert_prospect(prospect)
    }

    fn get_prospect(&self, id: &str) -> Result<Option<Prospect>> {
        self.check("get_prospect")?;
        self.inner.get_prospect(id)
    }

    fn list_prospects(&self) -> Result<Vec<Prospect>> {
        self.check("list_prospects")?;
        self.inner.list_prospects()
    }

    fn update_prospect_identity(
        &self,
        id: &str,
        patch: &IdentityPatch,
    ) -> Result<Option<Prospect>> {
        self.check("update_prospect_identity")?;
        self.inner.update_prospect_identity(id, patch)
    }

    fn set_prospect_status(&self, id: &str, status: ProspectStatus) -> Result<Option<Prospect>> {
        self.check("set_prospect_status")?;
        self.inner.set_prospect_status(id, status)
    }

    fn push_interaction_ref(
        &self,
        prospect_id: &str,
        interaction_id: &str,
    ) -> Result<Option<Prospect>> {
        self.check("push_interaction_ref")?;
        self.inner.push_interaction_ref(prospect_id, interaction_id)
    }

    fn pull_interaction_ref(
        &self,
        prospect_id: &str,
        interaction_id: &str,
    ) -> Result<Option<Prospect>> {
        self.check("pull_interaction_ref")?;
        self.inner.pull_interaction_ref(prospect_id, interaction_id)
    }

    fn delete_prospect(&self, id: &str) -> Result<u64> {
        self.check("delete_prospect")?;
        self.inner.delete_prospect(id)
    }

    fn count_prospects(&self) -> Result<u64> {
        self.check("count_prospects")?;
        self.inner.count_prospects()
    }

    fn insert_client(&self, client: &Client) -> Result<()> {
        self.check("insert_client")?;
        self.inner.insert_client(client)
    }

    fn get_client(&self, id: &str) -> Result<Option<Client>> {
        self.check("get_client")?;
        self.inner.get_client(id)
    }

    fn find_client_by_prospect(&self, prospect_id: &str) -> Result<Option<Client>> {
        self.check("find_client_by_prospect")?;
        if self.stale_client_lookup.load(Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.find_client_by_prospect(prospect_id)
    }

    fn list_clients(&self) -> Result<Vec<Client>> {
        self.check("list_clients")?;
        self.inner.list_clients()
    }

    fn update_client_contact(&self, id: &str, patch: &ContactPatch) -> Result<Option<Client>> {
        self.check("update_client_contact")?;
        self.inner.update_client_contact(id, patch)
    }

    fn delete_client(&self, id: &str) -> Result<u64> {
        self.check("delete_client")?;
        if self.concurrent_client_delete.swap(false, Ordering::SeqCst) {
            self.inner.delete_client(id)?;
            return Ok(0);
        }
        self.inner.delete_client(id)
    }

    fn count_clients(&self) -> Result<u64> {
        self.check("count_clients")?;
        self.inner.count_clients()
    }

    fn insert_interaction(&self, interaction: &Interaction) -> Result<()> {
        self.check("insert_interaction")?;
        self.inner.insert_interaction(interaction)
    }

    fn get_interaction(&self, id: &str) -> Result<Option<Interaction>> {
        self.check("get_interaction")?;
        self.inner.get_interaction(id)
    }

    fn list_interactions(&self, filter: &InteractionFilter) -> Result<Vec<Interaction>> {
        self.check("list_interactions")?;
        self.inner.list_interactions(filter)
    }

    fn replace_interaction(
        &self,
        id: &str,
        input: &InteractionInput,
    ) -> Result<Option<Interaction>> {
        self.check("replace_interaction")?;
        self.inner.replace_interaction(id, input)
    }

    fn delete_interaction(&self, id: &str) -> Result<Option<Interaction>> {
        self.check("delete_interaction")?;
        self.inner.delete_interaction(id)
    }

    fn count_interactions_by_type(&self) -> Result<Vec<InteractionTypeCount>> {
        self.check("count_interactions_by_type")?;
        self.inner.count_interactions_by_type()
    }
}
