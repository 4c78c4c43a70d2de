use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::demand::Demand;
use super::linked::{Linked, UserRef};
use super::produce::Produce;
use super::resource::Resource;
use super::transport::TransportOffer;
use crate::ids::{DemandId, ListingId, MatchId, TransportId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Cancelled,
    InTransit,
    Completed,
    #[serde(other)]
    Unknown,
}

/// A pairing between a produce listing and a demand, optionally extended
/// with a transport driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    #[serde(alias = "_id")]
    pub id: MatchId,
    #[serde(default)]
    pub listing: Option<Linked<ListingId, Produce>>,
    #[serde(default)]
    pub demand: Option<Linked<DemandId, Demand>>,
    #[serde(default)]
    pub farmer: Option<UserRef>,
    #[serde(default)]
    pub buyer: Option<UserRef>,
    #[serde(default)]
    pub driver: Option<UserRef>,
    #[serde(default)]
    pub transport: Option<Linked<TransportId, TransportOffer>>,
    pub status: MatchStatus,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub agreed_price: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Match {
    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            MatchStatus::Pending | MatchStatus::Accepted | MatchStatus::InTransit
        )
    }

    /// Whether `user` is one of the parties of this match.
    pub fn involves(&self, user: &UserId) -> bool {
        [&self.farmer, &self.buyer, &self.driver]
            .into_iter()
            .flatten()
            .any(|party| party.user_id() == Some(user))
    }
}

impl Resource for Match {
    type Id = MatchId;
    type Draft = NewMatch;

    const PATH: &'static str = "match";

    fn id(&self) -> &MatchId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMatch {
    pub listing_id: ListingId,
    pub demand_id: DemandId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agreed_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignDriver {
    pub driver_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_id: Option<TransportId>,
}

/// Sub-actions on a match, each a `POST /match/:id/<action>`.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchCommand {
    Accept,
    Cancel,
    AssignDriver(AssignDriver),
    Complete,
}

impl MatchCommand {
    pub fn path_segment(&self) -> &'static str {
        match self {
            MatchCommand::Accept => "accept",
            MatchCommand::Cancel => "cancel",
            MatchCommand::AssignDriver(_) => "assign-driver",
            MatchCommand::Complete => "complete",
        }
    }
}

/// `GET /matching/suggestions` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionQuery {
    ForDemand { demand_id: DemandId, limit: u32 },
    ForListing { listing_id: ListingId, limit: u32 },
}

impl SuggestionQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            SuggestionQuery::ForDemand { demand_id, limit } => vec![
                ("type", "forDemand".to_string()),
                ("demandId", demand_id.to_string()),
                ("limit", limit.to_string()),
            ],
            SuggestionQuery::ForListing { listing_id, limit } => vec![
                ("type", "forListing".to_string()),
                ("listingId", listing_id.to_string()),
                ("limit", limit.to_string()),
            ],
        }
    }
}

/// A scored candidate returned by the server-side matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSuggestion {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub listing: Option<Produce>,
    #[serde(default)]
    pub demand: Option<Demand>,
    #[serde(default)]
    pub reasons: Vec<String>,
}
