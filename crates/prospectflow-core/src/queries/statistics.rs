use serde::{Deserialize, Serialize};

/// Conversion rate summary
///
/// `conversion_rate` is a percentage. It is `None` (serialized `null`) when
/// there are no Prospects, so callers never see NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRate {
    #[serde(rename = "totalProspects")]
    pub total_prospects: u64,

    #[serde(rename = "totalClients")]
    pub total_clients: u64,

    #[serde(rename = "conversionRate")]
    pub conversion_rate: Option<f64>,
}

/// Compute `total_clients / total_prospects * 100`
pub fn conversion_rate(total_prospects: u64, total_clients: u64) -> ConversionRate {
    let rate = if total_prospects == 0 {
        None
    } else {
        Some(total_clients as f64 / total_prospects as f64 * 100.0)
    };

    ConversionRate {
        total_prospects,
        total_clients,
        conversion_rate: rate,
    }
}
