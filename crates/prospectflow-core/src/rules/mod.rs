//! Validation layer
//!
//! Every inbound payload is checked against a declarative per-entity
//! [`Schema`] before anything is written. `payloads` turns a validated
//! document into the typed input the engine consumes.

pub mod payloads;
pub mod schema;

pub use payloads::{
    normalize_email, parse_client_update, parse_conversion_request, parse_interaction,
    parse_new_prospect, parse_prospect_update,
};
pub use schema::{parse_date, FieldKind, FieldSpec, Presence, Schema};
