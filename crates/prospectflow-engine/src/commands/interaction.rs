//! Interaction commands
//!
//! Interactions have their own lifecycle. The owning Prospect keeps an
//! ordered list of interaction ids; keeping that list in step is best
//! effort and a miss is logged rather than failing the request.

use std::time::Instant;

use prospectflow_core::errors::{ExResult, PipelineError, Result};
use prospectflow_core::model::{new_id, Interaction, InteractionFilter, InteractionInput};
use prospectflow_core::EntityStore;
use prospectflow_core::{log_integrity_warning, log_op_end, log_op_error, log_op_start};

use super::{boundary_error, elapsed_ms};

/// List Interactions, optionally for one Prospect (newest first)
///
/// ## Errors
///
/// - `StoreFailure`: the listing failed
pub fn interaction_list(
    store: &dyn EntityStore,
    filter: &InteractionFilter,
) -> ExResult<Vec<Interaction>> {
    log_op_start!("interaction_list");
    let start = Instant::now();

    let interactions = store.list_interactions(filter).map_err(|e| {
        log_op_error!("interaction_list", e.clone(), duration_ms = elapsed_ms(start));
        boundary_error("interaction_list", e)
    })?;

    log_op_end!(
        "interaction_list",
        duration_ms = elapsed_ms(start),
        count = interactions.len() as u64
    );

    Ok(interactions)
}

/// Record an Interaction against an existing Prospect
///
/// ## Errors
///
/// - `NotFound`: the Prospect does not exist
/// - `StoreFailure`: the insert failed
pub fn interaction_create(
    store: &dyn EntityStore,
    input: InteractionInput,
) -> ExResult<Interaction> {
    let prospect_id = input.prospect_id.clone();
    log_op_start!("interaction_create", prospect_id = %prospect_id);
    let start = Instant::now();

    let interaction = interaction_create_impl(store, input).map_err(|e| {
        log_op_error!(
            "interaction_create",
            e.clone(),
            duration_ms = elapsed_ms(start),
            prospect_id = %prospect_id
        );
        boundary_error("interaction_create", e)
    })?;

    log_op_end!(
        "interaction_create",
        duration_ms = elapsed_ms(start),
        interaction_id = %interaction.id
    );

    Ok(interaction)
}

fn interaction_create_impl(store: &dyn EntityStore, input: InteractionInput) -> Result<Interaction> {
    require_prospect(store, &input.prospect_id)?;

    let interaction = Interaction::new(new_id(), input);
    store.insert_interaction(&interaction)?;
    link(store, "interaction_create", &interaction.prospect_id, &interaction.id);

    Ok(interaction)
}

/// Replace an Interaction's fields
///
/// Moving it to another Prospect moves the history entry too.
///
/// ## Errors
///
/// - `NotFound`: the Interaction or the target Prospect does not exist
/// - `StoreFailure`: the update failed
pub fn interaction_update(
    store: &dyn EntityStore,
    interaction_id: &str,
    input: InteractionInput,
) -> ExResult<Interaction> {
    log_op_start!("interaction_update", interaction_id = %interaction_id);
    let start = Instant::now();

    let interaction = interaction_update_impl(store, interaction_id, input).map_err(|e| {
        log_op_error!(
            "interaction_update",
            e.clone(),
            duration_ms = elapsed_ms(start),
            interaction_id = %interaction_id
        );
        boundary_error("interaction_update", e)
    })?;

    log_op_end!(
        "interaction_update",
        duration_ms = elapsed_ms(start),
        interaction_id = %interaction_id
    );

    Ok(interaction)
}

fn interaction_update_impl(
    store: &dyn EntityStore,
    interaction_id: &str,
    input: InteractionInput,
) -> Result<Interaction> {
    let not_found = || PipelineError::InteractionNotFound {
        interaction_id: interaction_id.to_string(),
    };

    let existing = store.get_interaction(interaction_id)?.ok_or_else(not_found)?;
    require_prospect(store, &input.prospect_id)?;

    let updated = store
        .replace_interaction(interaction_id, &input)?
        .ok_or_else(not_found)?;

    if existing.prospect_id != updated.prospect_id {
        unlink(store, "interaction_update", &existing.prospect_id, interaction_id);
        link(store, "interaction_update", &updated.prospect_id, interaction_id);
    }

    Ok(updated)
}

/// Delete an Interaction and drop it from its Prospect's history
///
/// ## Errors
///
/// - `NotFound`: no Interaction with this id
/// - `StoreFailure`: the delete failed
pub fn interaction_delete(store: &dyn EntityStore, interaction_id: &str) -> ExResult<()> {
    log_op_start!("interaction_delete", interaction_id = %interaction_id);
    let start = Instant::now();

    interaction_delete_impl(store, interaction_id).map_err(|e| {
        log_op_error!(
            "interaction_delete",
            e.clone(),
            duration_ms = elapsed_ms(start),
            interaction_id = %interaction_id
        );
        boundary_error("interaction_delete", e)
    })?;

    log_op_end!(
        "interaction_delete",
        duration_ms = elapsed_ms(start),
        interaction_id = %interaction_id
    );

    Ok(())
}

fn interaction_delete_impl(store: &dyn EntityStore, interaction_id: &str) -> Result<()> {
    let removed = store
        .delete_interaction(interaction_id)?
        .ok_or_else(|| PipelineError::InteractionNotFound {
            interaction_id: interaction_id.to_string(),
        })?;

    unlink(store, "interaction_delete", &removed.prospect_id, interaction_id);
    Ok(())
}

fn require_prospect(store: &dyn EntityStore, prospect_id: &str) -> Result<()> {
    store
        .get_prospect(prospect_id)?
        .map(|_| ())
        .ok_or_else(|| PipelineError::ProspectNotFound {
            prospect_id: prospect_id.to_string(),
        })
}

fn link(store: &dyn EntityStore, op: &str, prospect_id: &str, interaction_id: &str) {
    let reason = match store.push_interaction_ref(prospect_id, interaction_id) {
        Ok(Some(_)) => return,
        Ok(None) => "interaction saved but its prospect no longer exists".to_string(),
        Err(err) => format!("interaction saved but the history append failed: {}", err),
    };
    log_integrity_warning!(
        op,
        reason,
        prospect_id = %prospect_id,
        interaction_id = %interaction_id
    );
}

fn unlink(store: &dyn EntityStore, op: &str, prospect_id: &str, interaction_id: &str) {
    let reason = match store.pull_interaction_ref(prospect_id, interaction_id) {
        Ok(Some(_)) => return,
        Ok(None) => "interaction detached but its prospect no longer exists".to_string(),
        Err(err) => format!("interaction detached but the history removal failed: {}", err),
    };
    log_integrity_warning!(
        op,
        reason,
        prospect_id = %prospect_id,
        interaction_id = %interaction_id
    );
}
