use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::linked::UserRef;
use super::resource::{ListingDraft, Resource};
use super::ListingValidationError;
use crate::ids::TransportId;
use crate::user::Capability;

/// A driver's transport offer along a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportOffer {
    #[serde(alias = "_id")]
    pub id: TransportId,
    #[serde(default)]
    pub driver: Option<UserRef>,
    pub vehicle_type: String,
    /// Capacity in kilograms.
    #[serde(default)]
    pub capacity: f64,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub price_per_km: Option<f64>,
    #[serde(default)]
    pub available_from: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Resource for TransportOffer {
    type Id = TransportId;
    type Draft = TransportDraft;

    const PATH: &'static str = "transport";

    fn id(&self) -> &TransportId {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportDraft {
    pub vehicle_type: String,
    pub capacity: f64,
    pub origin: String,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub images: Vec<String>,
}

impl ListingDraft for TransportDraft {
    const CAPABILITY: Capability = Capability::OfferTransport;

    fn validate(&self) -> Result<(), ListingValidationError> {
        if self.vehicle_type.trim().is_empty() {
            return Err(ListingValidationError::Required("vehicleType"));
        }
        if !(self.capacity > 0.0) {
            return Err(ListingValidationError::NotPositive("capacity"));
        }
        if self.origin.trim().is_empty() {
            return Err(ListingValidationError::Required("origin"));
        }
        if self.destination.trim().is_empty() {
            return Err(ListingValidationError::Required("destination"));
        }
        Ok(())
    }

    fn images_mut(&mut self) -> Option<&mut Vec<String>> {
        Some(&mut self.images)
    }
}

/// Transport suggestion for a match (`GET /transport/suggest/:matchId`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportSuggestion {
    pub transport: TransportOffer,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
}
