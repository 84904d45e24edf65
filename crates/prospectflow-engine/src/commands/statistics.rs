//! Query/aggregation commands
//!
//! Computed fresh on every call; nothing is cached.

use std::time::Instant;

use prospectflow_core::errors::{ExResult, Result};
use prospectflow_core::model::InteractionTypeCount;
use prospectflow_core::queries::{conversion_rate, ConversionRate};
use prospectflow_core::EntityStore;
use prospectflow_core::{log_op_end, log_op_error, log_op_start};

use super::{boundary_error, elapsed_ms};

/// Clients as a percentage of Prospects
///
/// ## Errors
///
/// - `StoreFailure`: a count failed
pub fn statistics_conversion_rate(store: &dyn EntityStore) -> ExResult<ConversionRate> {
    log_op_start!("statistics_conversion_rate");
    let start = Instant::now();

    let rate = conversion_rate_impl(store).map_err(|e| {
        log_op_error!(
            "statistics_conversion_rate",
            e.clone(),
            duration_ms = elapsed_ms(start)
        );
        boundary_error("statistics_conversion_rate", e)
    })?;

    log_op_end!(
        "statistics_conversion_rate",
        duration_ms = elapsed_ms(start),
        total_prospects = rate.total_prospects,
        total_clients = rate.total_clients
    );

    Ok(rate)
}

fn conversion_rate_impl(store: &dyn EntityStore) -> Result<ConversionRate> {
    let total_prospects = store.count_prospects()?;
    let total_clients = store.count_clients()?;
    Ok(conversion_rate(total_prospects, total_clients))
}

/// Interaction count per type, only for types that occur
///
/// ## Errors
///
/// - `StoreFailure`: the aggregation failed
pub fn statistics_interaction_stats(
    store: &dyn EntityStore,
) -> ExResult<Vec<InteractionTypeCount>> {
    log_op_start!("statistics_interaction_stats");
    let start = Instant::now();

    let counts = store.count_interactions_by_type().map_err(|e| {
        log_op_error!(
            "statistics_interaction_stats",
            e.clone(),
            duration_ms = elapsed_ms(start)
        );
        boundary_error("statistics_interaction_stats", e)
    })?;

    log_op_end!(
        "statistics_interaction_stats",
        duration_ms = elapsed_ms(start),
        types = counts.len() as u64
    );

    Ok(counts)
}
