use chrono::{TimeZone, Utc};
use prospectflow_core::model::{
    new_id, Client, ContactDetails, Interaction, InteractionInput, InteractionType, NewProspect,
    Prospect,
};

/// Build a Prospect with a fresh id
#[allow(dead_code)]
pub fn prospect(name: &str, email: &str) -> Prospect {
    Prospect::new(
        new_id(),
        NewProspect {
            name: name.to_string(),
            email: email.to_string(),
            interests: ["crm".to_string()].into_iter().collect(),
        },
    )
}

/// Build a Client for `prospect_id` with only an address
#[allow(dead_code)]
pub fn client_for(prospect_id: &str) -> Client {
    Client::new(
        new_id(),
        prospect_id.to_string(),
        ContactDetails {
            address: Some("12 rue de la Paix".to_string()),
            ..ContactDetails::default()
        },
    )
}

/// Build an Interaction dated `day` of March 2024
#[allow(dead_code)]
pub fn interaction_on(prospect_id: &str, kind: InteractionType, day: u32) -> Interaction {
    Interaction::new(
        new_id(),
        InteractionInput {
            kind,
            date: Utc.with_ymd_and_hms(2024, 3, day, 10, 0, 0).unwrap(),
            notes: format!("contact on day {}", day),
            prospect_id: prospect_id.to_string(),
        },
    )
}
