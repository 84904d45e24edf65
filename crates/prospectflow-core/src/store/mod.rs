//! Entity store interface
//!
//! The narrow persistence contract the engine is written against. Each call
//! is individually atomic; nothing spans calls. Multi-step workflows are
//! sequenced by the engine, which detects and logs partial completion.

pub mod memory;

pub use memory::MemoryStore;

use crate::errors::Result;
use crate::model::{
    Client, ContactPatch, IdentityPatch, Interaction, InteractionFilter, InteractionInput,
    InteractionTypeCount, Prospect, ProspectStatus,
};

/// Persistence operations over the three collections
///
/// Mutating lookups return `Ok(None)` when the target document does not
/// exist; deletes return the number of documents removed. Implementations
/// must enforce two unique constraints:
///
/// - Prospect email (`DuplicateEmail`)
/// - Client to Prospect reference (`AlreadyConverted`)
pub trait EntityStore: Send + Sync {
    // ----- prospects -----

    /// # Errors
    ///
    /// `DuplicateEmail` if another Prospect has the same email.
    fn insert_prospect(&self, prospect: &Prospect) -> Result<()>;

    /// # Errors
    ///
    /// `Store` on backend failure.
    fn get_prospect(&self, id: &str) -> Result<Option<Prospect>>;

    /// All Prospects, oldest first
    ///
    /// # Errors
    ///
    /// `Store` on backend failure.
    fn list_prospects(&self) -> Result<Vec<Prospect>>;

    /// Patch identity fields and return the updated document
    ///
    /// # Errors
    ///
    /// `DuplicateEmail` if the new email belongs to another Prospect.
    fn update_prospect_identity(
        &self,
        id: &str,
        patch: &IdentityPatch,
    ) -> Result<Option<Prospect>>;

    /// # Errors
    ///
    /// `Store` on backend failure.
    fn set_prospect_status(&self, id: &str, status: ProspectStatus) -> Result<Option<Prospect>>;

    /// Append an Interaction id to the Prospect's history
    ///
    /// # Errors
    ///
    /// `Store` on backend failure.
    fn push_interaction_ref(
        &self,
        prospect_id: &str,
        interaction_id: &str,
    ) -> Result<Option<Prospect>>;

    /// Remove an Interaction id from the Prospect's history
    ///
    /// # Errors
    ///
    /// `Store` on backend failure.
    fn pull_interaction_ref(
        &self,
        prospect_id: &str,
        interaction_id: &str,
    ) -> Result<Option<Prospect>>;

    /// # Errors
    ///
    /// `Store` on backend failure.
    fn delete_prospect(&self, id: &str) -> Result<u64>;

    /// # Errors
    ///
    /// `Store` on backend failure.
    fn count_prospects(&self) -> Result<u64>;

    // ----- clients -----

    /// # Errors
    ///
    /// `AlreadyConverted` if a Client already references the same Prospect.
    fn insert_client(&self, client: &Client) -> Result<()>;

    /// # Errors
    ///
    /// `Store` on backend failure.
    fn get_client(&self, id: &str) -> Result<Option<Client>>;

    /// # Errors
    ///
    /// `Store` on backend failure.
    fn find_client_by_prospect(&self, prospect_id: &str) -> Result<Option<Client>>;

    /// All Clients, oldest first
    ///
    /// # Errors
    ///
    /// `Store` on backend failure.
    fn list_clients(&self) -> Result<Vec<Client>>;

    /// # Errors
    ///
    /// `Store` on backend failure.
    fn update_client_contact(&self, id: &str, patch: &ContactPatch) -> Result<Option<Client>>;

    /// # Errors
    ///
    /// `Store` on backend failure.
    fn delete_client(&self, id: &str) -> Result<u64>;

    /// # Errors
    ///
    /// `Store` on backend failure.
    fn count_clients(&self) -> Result<u64>;

    // ----- interactions -----

    /// # Errors
    ///
    /// `Store` on backend failure.
    fn insert_interaction(&self, interaction: &Interaction) -> Result<()>;

    /// # Errors
    ///
    /// `Store` on backend failure.
    fn get_interaction(&self, id: &str) -> Result<Option<Interaction>>;

    /// Unfiltered: oldest first. Filtered by Prospect: newest `date` first.
    ///
    /// # Errors
    ///
    /// `Store` on backend failure.
    fn list_interactions(&self, filter: &InteractionFilter) -> Result<Vec<Interaction>>;

    /// Overwrite the user-editable fields
    ///
    /// # Errors
    ///
    /// `Store` on backend failure.
    fn replace_interaction(
        &self,
        id: &str,
        input: &InteractionInput,
    ) -> Result<Option<Interaction>>;

    /// Delete and return the removed document
    ///
    /// # Errors
    ///
    /// `Store` on backend failure.
    fn delete_interaction(&self, id: &str) -> Result<Option<Interaction>>;

    /// Occurrence count per interaction type, omitting types with none
    ///
    /// # Errors
    ///
    /// `Store` on backend failure.
    fn count_interactions_by_type(&self) -> Result<Vec<InteractionTypeCount>>;
}
