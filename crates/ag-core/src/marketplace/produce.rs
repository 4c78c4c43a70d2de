use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::linked::UserRef;
use super::resource::{ListingDraft, Resource};
use super::ListingValidationError;
use crate::ids::ListingId;
use crate::user::{Capability, Location};

/// Produce posts must carry at least this many photos.
pub const MIN_PRODUCE_IMAGES: usize = 1;

/// A farmer's produce listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Produce {
    #[serde(alias = "_id")]
    pub id: ListingId,
    #[serde(default)]
    pub farmer: Option<UserRef>,
    pub crop: String,
    #[serde(default)]
    pub variety: Option<String>,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub price_per_unit: Option<f64>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub harvest_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Resource for Produce {
    type Id = ListingId;
    type Draft = ProduceDraft;

    const PATH: &'static str = "produce";

    fn id(&self) -> &ListingId {
        &self.id
    }
}

/// Create/update body for a produce listing. `images` holds base64 data URLs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduceDraft {
    pub crop: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variety: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub price_per_unit: f64,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub harvest_date: Option<NaiveDate>,
}

impl ListingDraft for ProduceDraft {
    const CAPABILITY: Capability = Capability::PostProduce;

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
        if !(self.price_per_unit > 0.0) {
            return Err(ListingValidationError::NotPositive("pricePerUnit"));
        }
        if !self.location.has_county() {
            return Err(ListingValidationError::Required("county"));
        }
        if self.images.len() < MIN_PRODUCE_IMAGES {
            return Err(ListingValidationError::TooFewImages {
                min: MIN_PRODUCE_IMAGES,
                got: self.images.len(),
            });
        }
        Ok(())
    }

    fn images_mut(&mut self) -> Option<&mut Vec<String>> {
        Some(&mut self.images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProduceDraft {
        ProduceDraft {
            crop: "maize".into(),
            quantity: 20.0,
            unit: "bags".into(),
            price_per_unit: 3500.0,
            location: Location::county("Uasin Gishu"),
            images: vec!["data:image/jpeg;base64,AA==".into()],
            ..Default::default()
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert_eq!(draft().validate(), Ok(()));
    }

    #[test]
    fn photo_is_required() {
        let mut d = draft();
        d.images.clear();
        assert_eq!(
            d.validate(),
            Err(ListingValidationError::TooFewImages { min: 1, got: 0 })
        );
    }

    #[test]
    fn zero_or_nan_quantity_rejected() {
        let mut d = draft();
        d.quantity = f64::NAN;
        assert_eq!(
            d.validate(),
            Err(ListingValidationError::NotPositive("quantity"))
        );
    }

    #[test]
    fn deserializes_sparse_listing() {
        let p: Produce =
            serde_json::from_str(r#"{"_id":"p1","crop":"beans","farmer":"u1"}"#).unwrap();
        assert_eq!(p.id, ListingId::from("p1"));
        assert!(p.images.is_empty());
        assert_eq!(p.quantity, 0.0);
    }
}
