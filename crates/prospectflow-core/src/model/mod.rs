pub mod client;
pub mod interaction;
pub mod prospect;

pub use client::{Client, ClientUpdate, ClientView, ContactDetails, ContactPatch, ConversionRequest};
pub use interaction::{
    Interaction, InteractionFilter, InteractionInput, InteractionType, InteractionTypeCount,
};
pub use prospect::{IdentityPatch, NewProspect, Prospect, ProspectStatus, ProspectUpdate};

use uuid::Uuid;

/// Generate a document identifier (UUIDv7, time-ordered)
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}
