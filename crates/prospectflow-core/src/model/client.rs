use chrono::{DateTime, Utc};
use prospectflow_core_types::Sensitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::prospect::{IdentityPatch, Prospect};

/// Client - a converted Prospect holding billing and contact details
///
/// A Client only stores the reference to its Prospect; identity fields are
/// joined in at read time (see [`ClientView`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "_id")]
    pub id: String,

    /// Exclusive reference: at most one Client per Prospect
    #[serde(rename = "prospectId")]
    pub prospect_id: String,

    #[serde(rename = "adresse", default)]
    pub address: Option<String>,

    #[serde(rename = "numeroTelephone", default)]
    pub phone: Option<String>,

    #[serde(rename = "informationsPaiement", default)]
    pub payment: Option<Sensitive<String>>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn new(id: String, prospect_id: String, contact: ContactDetails) -> Self {
        let now = Utc::now();
        Self {
            id,
            prospect_id,
            address: contact.address,
            phone: contact.phone,
            payment: contact.payment,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a contact patch in place
    pub fn apply_contact(&mut self, patch: &ContactPatch) {
        if let Some(address) = &patch.address {
            self.address = address.clone();
        }
        if let Some(phone) = &patch.phone {
            self.phone = phone.clone();
        }
        if let Some(payment) = &patch.payment {
            self.payment = payment.clone();
        }
        self.updated_at = Utc::now();
    }
}

/// Address-family fields supplied at conversion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactDetails {
    pub address: Option<String>,
    pub phone: Option<String>,
    pub payment: Option<Sensitive<String>>,
}

/// Partial update of address-family fields
///
/// Outer `None`: field absent from the payload, keep the stored value.
/// `Some(None)`: explicit `null`, clear the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactPatch {
    pub address: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub payment: Option<Option<Sensitive<String>>>,
}

impl ContactPatch {
    pub fn is_empty(&self) -> bool {
        self.address.is_none() && self.phone.is_none() && self.payment.is_none()
    }
}

/// Validated `POST /clients` payload
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub prospect_id: String,
    pub contact: ContactDetails,
}

/// Validated `PUT /clients` payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientUpdate {
    /// Written to the backing Prospect
    pub identity: IdentityPatch,
    /// Written to the Client
    pub contact: ContactPatch,
}

/// Client joined with its Prospect's identity fields
///
/// Identity fields are `None` only when the referenced Prospect no longer
/// exists, which the engine reports as an integrity warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientView {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "prospectId")]
    pub prospect_id: String,

    #[serde(rename = "nom")]
    pub name: Option<String>,

    pub email: Option<String>,

    #[serde(rename = "interets")]
    pub interests: Option<BTreeSet<String>>,

    #[serde(rename = "adresse")]
    pub address: Option<String>,

    #[serde(rename = "numeroTelephone")]
    pub phone: Option<String>,

    #[serde(rename = "informationsPaiement")]
    pub payment: Option<Sensitive<String>>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl ClientView {
    pub fn join(client: &Client, prospect: Option<&Prospect>) -> Self {
        Self {
            id: client.id.clone(),
            prospect_id: client.prospect_id.clone(),
            name: prospect.map(|p| p.name.clone()),
            email: prospect.map(|p| p.email.clone()),
            interests: prospect.map(|p| p.interests.clone()),
            address: client.address.clone(),
            phone: client.phone.clone(),
            payment: client.payment.clone(),
            created_at: client.created_at,
            updated_at: client.updated_at,
        }
    }
}
