//! Prospect commands
//!
//! Status is never written here: it changes only through conversion and
//! revert. Updates may echo the current status back, but a different value
//! is rejected.

use std::time::Instant;

use prospectflow_core::errors::{ExResult, PipelineError, Result};
use prospectflow_core::model::{new_id, NewProspect, Prospect, ProspectUpdate};
use prospectflow_core::EntityStore;
use prospectflow_core::{log_op_end, log_op_error, log_op_start};

use super::{boundary_error, elapsed_ms};

/// List all Prospects, oldest first
///
/// ## Errors
///
/// - `StoreFailure`: the listing failed
pub fn prospect_list(store: &dyn EntityStore) -> ExResult<Vec<Prospect>> {
    log_op_start!("prospect_list");
    let start = Instant::now();

    let prospects = store.list_prospects().map_err(|e| {
        log_op_error!("prospect_list", e.clone(), duration_ms = elapsed_ms(start));
        boundary_error("prospect_list", e)
    })?;

    log_op_end!(
        "prospect_list",
        duration_ms = elapsed_ms(start),
        count = prospects.len() as u64
    );

    Ok(prospects)
}

/// Create a Prospect in `Prospect` status
///
/// ## Errors
///
/// - `DuplicateEmail`: another Prospect has this email
/// - `StoreFailure`: the insert failed
pub fn prospect_create(store: &dyn EntityStore, input: NewProspect) -> ExResult<Prospect> {
    log_op_start!("prospect_create");
    let start = Instant::now();

    let prospect = Prospect::new(new_id(), input);
    store.insert_prospect(&prospect).map_err(|e| {
        log_op_error!("prospect_create", e.clone(), duration_ms = elapsed_ms(start));
        boundary_error("prospect_create", e)
    })?;

    log_op_end!(
        "prospect_create",
        duration_ms = elapsed_ms(start),
        prospect_id = %prospect.id
    );

    Ok(prospect)
}

/// Replace a Prospect's identity fields
///
/// ## Errors
///
/// - `NotFound`: no Prospect with this id
/// - `ValidationFailed`: the echoed status differs from the stored one
/// - `DuplicateEmail`: the new email belongs to another Prospect
pub fn prospect_update(
    store: &dyn EntityStore,
    prospect_id: &str,
    update: ProspectUpdate,
) -> ExResult<Prospect> {
    log_op_start!("prospect_update", prospect_id = %prospect_id);
    let start = Instant::now();

    let prospect = prospect_update_impl(store, prospect_id, update).map_err(|e| {
        log_op_error!(
            "prospect_update",
            e.clone(),
            duration_ms = elapsed_ms(start),
            prospect_id = %prospect_id
        );
        boundary_error("prospect_update", e)
    })?;

    log_op_end!(
        "prospect_update",
        duration_ms = elapsed_ms(start),
        prospect_id = %prospect_id
    );

    Ok(prospect)
}

fn prospect_update_impl(
    store: &dyn EntityStore,
    prospect_id: &str,
    update: ProspectUpdate,
) -> Result<Prospect> {
    let not_found = || PipelineError::ProspectNotFound {
        prospect_id: prospect_id.to_string(),
    };

    let existing = store.get_prospect(prospect_id)?.ok_or_else(not_found)?;

    if let Some(expected) = update.expected_status {
        if expected != existing.status {
            return Err(PipelineError::validation(
                "statut",
                format!(
                    "cannot change from {} to {}; status follows client conversion",
                    existing.status, expected
                ),
            ));
        }
    }

    store
        .update_prospect_identity(prospect_id, &update.identity)?
        .ok_or_else(not_found)
}

/// Delete a Prospect that no Client references
///
/// ## Errors
///
/// - `NotFound`: no Prospect with this id
/// - `ProspectHasClient`: a Client still references it
pub fn prospect_delete(store: &dyn EntityStore, prospect_id: &str) -> ExResult<()> {
    log_op_start!("prospect_delete", prospect_id = %prospect_id);
    let start = Instant::now();

    prospect_delete_impl(store, prospect_id).map_err(|e| {
        log_op_error!(
            "prospect_delete",
            e.clone(),
            duration_ms = elapsed_ms(start),
            prospect_id = %prospect_id
        );
        boundary_error("prospect_delete", e)
    })?;

    log_op_end!(
        "prospect_delete",
        duration_ms = elapsed_ms(start),
        prospect_id = %prospect_id
    );

    Ok(())
}

fn prospect_delete_impl(store: &dyn EntityStore, prospect_id: &str) -> Result<()> {
    let not_found = || PipelineError::ProspectNotFound {
        prospect_id: prospect_id.to_string(),
    };

    store.get_prospect(prospect_id)?.ok_or_else(not_found)?;

    if let Some(client) = store.find_client_by_prospect(prospect_id)? {
        return Err(PipelineError::ProspectHasClient {
            prospect_id: prospect_id.to_string(),
            client_id: client.id,
        });
    }

    if store.delete_prospect(prospect_id)? == 0 {
        return Err(not_found());
    }

    Ok(())
}
