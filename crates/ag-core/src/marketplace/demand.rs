use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::linked::UserRef;
use super::resource::{ListingDraft, Resource};
use super::ListingValidationError;
use crate::ids::DemandId;
use crate::user::{Capability, Location};

/// A buyer's request for produce.
///
/// Fetching a single demand (`GET /demand/:id`) increments `views` on the
/// server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demand {
    #[serde(alias = "_id")]
    pub id: DemandId,
    #[serde(default)]
    pub buyer: Option<UserRef>,
    pub crop: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub max_price_per_unit: Option<f64>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub needed_by: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Resource for Demand {
    type Id = DemandId;
    type Draft = DemandDraft;

    const PATH: &'static str = "demand";

    fn id(&self) -> &DemandId {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandDraft {
    pub crop: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price_per_unit: Option<f64>,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needed_by: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ListingDraft for DemandDraft {
    const CAPABILITY: Capability = Capability::PostDemand;

    fn validate(&self) -> Result<(), ListingValidationError> {
        if self.crop.trim().is_empty() {
            return Err(ListingValidationError::Required("crop"));
        }
        if !(self.quantity > 0.0) {
            return Err(ListingValidationError::NotPositive("quantity"));
        }
        if self.unit.trim().is_empty() {
            return Err(ListingValidationError::Required("unit"));
        }
        if let Some(price) = self.max_price_per_unit {
            if !(price > 0.0) {
                return Err(ListingValidationError::NotPositive("maxPricePerUnit"));
            }
        }
        if !self.location.has_county() {
            return Err(ListingValidationError::Required("county"));
        }
        Ok(())
    }
}
