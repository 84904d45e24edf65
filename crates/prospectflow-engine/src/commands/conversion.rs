//! Conversion engine
//!
//! Moves a Prospect to Client status and back. The Prospect and the Client
//! live in separate collections with no cross-document transaction, so
//! each workflow orders its writes to keep the observable half-states
//! harmless and logs an integrity warning whenever it stops between them.
//!
//! ## Write ordering
//!
//! - convert: status flip, then Client insert. A crash in between leaves
//!   "status Client, no Client row", never two Clients for one Prospect.
//! - revert: Client delete, then status reset. A failed reset leaves an
//!   orphaned `Client` status, reported as a warning; the delete stands.
//! - identity update: Prospect identity, then Client contact fields.

use std::collections::HashMap;
use std::time::Instant;

use prospectflow_core::errors::{ExResult, PipelineError, Result};
use prospectflow_core::model::{
    new_id, Client, ClientUpdate, ClientView, ConversionRequest, Prospect, ProspectStatus,
};
use prospectflow_core::{log_integrity_warning, log_op_end, log_op_error, log_op_start};
use prospectflow_core::EntityStore;
use serde::Serialize;

use super::{boundary_error, elapsed_ms};

/// Result of deleting a Client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevertOutcome {
    pub client_id: String,
    pub prospect_id: String,
    /// False when the Prospect could not be reset; the Client is gone
    /// regardless
    pub prospect_reverted: bool,
}

/// Convert a Prospect into a Client
///
/// ## Errors
///
/// - `AlreadyConverted`: a Client already references the Prospect, including
///   when a concurrent conversion wins the unique index
/// - `NotFound`: the Prospect does not exist
/// - `StoreFailure`: either write failed
pub fn client_convert(store: &dyn EntityStore, request: ConversionRequest) -> ExResult<ClientView> {
    let prospect_id = request.prospect_id.clone();
    log_op_start!("client_convert", prospect_id = %prospect_id);
    let start = Instant::now();

    let view = client_convert_impl(store, request).map_err(|e| {
        log_op_error!(
            "client_convert",
            e.clone(),
            duration_ms = elapsed_ms(start),
            prospect_id = %prospect_id
        );
        boundary_error("client_convert", e)
    })?;

    log_op_end!(
        "client_convert",
        duration_ms = elapsed_ms(start),
        prospect_id = %prospect_id,
        client_id = %view.id
    );

    Ok(view)
}

fn client_convert_impl(store: &dyn EntityStore, request: ConversionRequest) -> Result<ClientView> {
    let ConversionRequest {
        prospect_id,
        contact,
    } = request;

    if store.find_client_by_prospect(&prospect_id)?.is_some() {
        return Err(PipelineError::AlreadyConverted { prospect_id });
    }

    let not_found = || PipelineError::ProspectNotFound {
        prospect_id: prospect_id.clone(),
    };

    store.get_prospect(&prospect_id)?.ok_or_else(not_found)?;

    // Write #1
    let prospect = store
        .set_prospect_status(&prospect_id, ProspectStatus::Client)?
        .ok_or_else(not_found)?;

    // Write #2
    let client = Client::new(new_id(), prospect_id.clone(), contact);
    match store.insert_client(&client) {
        Ok(()) => Ok(ClientView::join(&client, Some(&prospect))),
        Err(err @ PipelineError::AlreadyConverted { .. }) => Err(err),
        Err(err) => {
            log_integrity_warning!(
                "client_convert",
                "prospect status set to Client but the client insert failed",
                prospect_id = %prospect_id
            );
            Err(err)
        }
    }
}

/// Delete a Client and revert its Prospect
///
/// ## Errors
///
/// - `NotFound`: no Client with this id
/// - `DeleteRaceLost`: the Client was found but the delete removed nothing
/// - `StoreFailure`: the lookup or delete failed
///
/// A Prospect that is missing or cannot be reset is not an error; the
/// outcome reports `prospect_reverted = false`.
pub fn client_revert(store: &dyn EntityStore, client_id: &str) -> ExResult<RevertOutcome> {
    log_op_start!("client_revert", client_id = %client_id);
    let start = Instant::now();

    let outcome = client_revert_impl(store, client_id).map_err(|e| {
        log_op_error!(
            "client_revert",
            e.clone(),
            duration_ms = elapsed_ms(start),
            client_id = %client_id
        );
        boundary_error("client_revert", e)
    })?;

    log_op_end!(
        "client_revert",
        duration_ms = elapsed_ms(start),
        client_id = %client_id,
        prospect_reverted = outcome.prospect_reverted
    );

    Ok(outcome)
}

fn client_revert_impl(store: &dyn EntityStore, client_id: &str) -> Result<RevertOutcome> {
    let client = store
        .get_client(client_id)?
        .ok_or_else(|| PipelineError::ClientNotFound {
            client_id: client_id.to_string(),
        })?;

    if store.delete_client(client_id)? == 0 {
        return Err(PipelineError::DeleteRaceLost {
            client_id: client_id.to_string(),
        });
    }

    let prospect_reverted =
        match store.set_prospect_status(&client.prospect_id, ProspectStatus::Prospect) {
            Ok(Some(_)) => true,
            Ok(None) => {
                log_integrity_warning!(
                    "client_revert",
                    "client deleted but its prospect no longer exists",
                    client_id = %client_id,
                    prospect_id = %client.prospect_id
                );
                false
            }
            Err(err) => {
                log_integrity_warning!(
                    "client_revert",
                    format!("client deleted but the prospect reset failed: {}", err),
                    client_id = %client_id,
                    prospect_id = %client.prospect_id
                );
                false
            }
        };

    Ok(RevertOutcome {
        client_id: client.id,
        prospect_id: client.prospect_id,
        prospect_reverted,
    })
}

/// Update a converted Client's identity and contact fields
///
/// Identity fields are written to the backing Prospect, contact fields to
/// the Client. Fields absent from the update are left unchanged.
///
/// ## Errors
///
/// - `NotFound`: the Client or its Prospect does not exist
/// - `DuplicateEmail`: the new email belongs to another Prospect
/// - `StoreFailure`: either write failed
pub fn client_update(
    store: &dyn EntityStore,
    client_id: &str,
    update: ClientUpdate,
) -> ExResult<ClientView> {
    log_op_start!("client_update", client_id = %client_id);
    let start = Instant::now();

    let view = client_update_impl(store, client_id, update).map_err(|e| {
        log_op_error!(
            "client_update",
            e.clone(),
            duration_ms = elapsed_ms(start),
            client_id = %client_id
        );
        boundary_error("client_update", e)
    })?;

    log_op_end!(
        "client_update",
        duration_ms = elapsed_ms(start),
        client_id = %client_id
    );

    Ok(view)
}

fn client_update_impl(
    store: &dyn EntityStore,
    client_id: &str,
    update: ClientUpdate,
) -> Result<ClientView> {
    let client_not_found = || PipelineError::ClientNotFound {
        client_id: client_id.to_string(),
    };

    let client = store.get_client(client_id)?.ok_or_else(client_not_found)?;

    let prospect_not_found = || PipelineError::ProspectNotFound {
        prospect_id: client.prospect_id.clone(),
    };

    // Write #1
    let identity_written = !update.identity.is_empty();
    let prospect = if identity_written {
        store.update_prospect_identity(&client.prospect_id, &update.identity)?
    } else {
        store.get_prospect(&client.prospect_id)?
    }
    .ok_or_else(prospect_not_found)?;

    if update.contact.is_empty() {
        return Ok(ClientView::join(&client, Some(&prospect)));
    }

    // Write #2
    let written = store
        .update_client_contact(client_id, &update.contact)
        .and_then(|updated| updated.ok_or_else(client_not_found));

    match written {
        Ok(updated) => Ok(ClientView::join(&updated, Some(&prospect))),
        Err(err) => {
            if identity_written {
                log_integrity_warning!(
                    "client_update",
                    "prospect identity updated but the client contact update failed",
                    client_id = %client_id,
                    prospect_id = %client.prospect_id
                );
            }
            Err(err)
        }
    }
}

/// List every Client joined with its Prospect
///
/// A Client whose Prospect is missing is still listed, with empty identity
/// fields, and reported as an integrity warning.
///
/// ## Errors
///
/// - `StoreFailure`: a listing failed
pub fn client_list(store: &dyn EntityStore) -> ExResult<Vec<ClientView>> {
    log_op_start!("client_list");
    let start = Instant::now();

    let views = client_list_impl(store).map_err(|e| {
        log_op_error!("client_list", e.clone(), duration_ms = elapsed_ms(start));
        boundary_error("client_list", e)
    })?;

    log_op_end!(
        "client_list",
        duration_ms = elapsed_ms(start),
        count = views.len() as u64
    );

    Ok(views)
}

fn client_list_impl(store: &dyn EntityStore) -> Result<Vec<ClientView>> {
    let clients = store.list_clients()?;
    let prospects: HashMap<String, Prospect> = store
        .list_prospects()?
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();

    Ok(clients
        .iter()
        .map(|client| {
            let prospect = prospects.get(&client.prospect_id);
            if prospect.is_none() {
                log_integrity_warning!(
                    "client_list",
                    "client references a missing prospect",
                    client_id = %client.id,
                    prospect_id = %client.prospect_id
                );
            }
            ClientView::join(client, prospect)
        })
        .collect())
}
