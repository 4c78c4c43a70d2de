//! Realtime channel vocabulary: pushed events and room commands.

use serde_json::Value;

use crate::ids::MatchId;
use crate::marketplace::{Demand, Match, Message, Produce, Resource, TransportOffer};

pub const NEW_DEMAND: &str = "newDemand";
pub const NEW_LISTING: &str = "newListing";
pub const NEW_MATCH: &str = "newMatch";
pub const MATCH_ACCEPTED: &str = "matchAccepted";
pub const MATCH_CANCELLED: &str = "matchCancelled";
pub const MATCH_DRIVER_ASSIGNED: &str = "matchDriverAssigned";
pub const MATCH_COMPLETED: &str = "matchCompleted";
pub const NEW_MESSAGE: &str = "newMessage";

pub const JOIN_MATCH: &str = "joinMatch";
pub const LEAVE_MATCH: &str = "leaveMatch";

/// Events pushed by the server.
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    NewDemand(Demand),
    NewListing(Produce),
    NewMatch(Match),
    MatchAccepted(Match),
    MatchCancelled(Match),
    MatchDriverAssigned(Match),
    MatchCompleted(Match),
    NewMessage(Message),
}

#[derive(Debug, thiserror::Error)]
#[error("malformed `{event}` payload: {source}")]
pub struct RealtimeDecodeError {
    pub event: String,
    #[source]
    pub source: serde_json::Error,
}

impl RealtimeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RealtimeEvent::NewDemand(_) => NEW_DEMAND,
            RealtimeEvent::NewListing(_) => NEW_LISTING,
            RealtimeEvent::NewMatch(_) => NEW_MATCH,
            RealtimeEvent::MatchAccepted(_) => MATCH_ACCEPTED,
            RealtimeEvent::MatchCancelled(_) => MATCH_CANCELLED,
            RealtimeEvent::MatchDriverAssigned(_) => MATCH_DRIVER_ASSIGNED,
            RealtimeEvent::MatchCompleted(_) => MATCH_COMPLETED,
            RealtimeEvent::NewMessage(_) => NEW_MESSAGE,
        }
    }

    /// Decodes a named event. Unknown event names yield `Ok(None)`.
    pub fn decode(name: &str, payload: Value) -> Result<Option<Self>, RealtimeDecodeError> {
        fn parse<T: serde::de::DeserializeOwned>(
            name: &str,
            payload: Value,
        ) -> Result<T, RealtimeDecodeError> {
            serde_json::from_value(payload).map_err(|source| RealtimeDecodeError {
                event: name.to_string(),
                source,
            })
        }

        let event = match name {
            NEW_DEMAND => RealtimeEvent::NewDemand(parse(name, payload)?),
            NEW_LISTING => RealtimeEvent::NewListing(parse(name, payload)?),
            NEW_MATCH => RealtimeEvent::NewMatch(parse(name, payload)?),
            MATCH_ACCEPTED => RealtimeEvent::MatchAccepted(parse(name, payload)?),
            MATCH_CANCELLED => RealtimeEvent::MatchCancelled(parse(name, payload)?),
            MATCH_DRIVER_ASSIGNED => RealtimeEvent::MatchDriverAssigned(parse(name, payload)?),
            MATCH_COMPLETED => RealtimeEvent::MatchCompleted(parse(name, payload)?),
            NEW_MESSAGE => RealtimeEvent::NewMessage(parse(name, payload)?),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    /// The match this event concerns, if any.
    pub fn match_id(&self) -> Option<&MatchId> {
        match self {
            RealtimeEvent::NewMatch(m)
            | RealtimeEvent::MatchAccepted(m)
            | RealtimeEvent::MatchCancelled(m)
            | RealtimeEvent::MatchDriverAssigned(m)
            | RealtimeEvent::MatchCompleted(m) => Some(&m.id),
            RealtimeEvent::NewMessage(msg) => Some(&msg.match_id),
            RealtimeEvent::NewDemand(_) | RealtimeEvent::NewListing(_) => None,
        }
    }
}

/// Commands the client emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeCommand {
    JoinMatch(MatchId),
    LeaveMatch(MatchId),
}

impl RealtimeCommand {
    pub fn name(&self) -> &'static str {
        match self {
            RealtimeCommand::JoinMatch(_) => JOIN_MATCH,
            RealtimeCommand::LeaveMatch(_) => LEAVE_MATCH,
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            RealtimeCommand::JoinMatch(id) | RealtimeCommand::LeaveMatch(id) => {
                Value::String(id.to_string())
            }
        }
    }
}

/// How a pushed event changes a list of `R`.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate<R> {
    /// A new item, shown at the top without filter reconciliation.
    Prepend(R),
    /// A newer version of an item that may already be listed.
    Replace(R),
}

/// Resources whose lists follow the realtime channel.
pub trait LiveResource: Resource {
    fn feed_update(_event: &RealtimeEvent) -> Option<FeedUpdate<Self>> {
        None
    }
}

impl LiveResource for Produce {
    fn feed_update(event: &RealtimeEvent) -> Option<FeedUpdate<Self>> {
        match event {
            RealtimeEvent::NewListing(listing) => Some(FeedUpdate::Prepend(listing.clone())),
            _ => None,
        }
    }
}

impl LiveResource for Demand {
    fn feed_update(event: &RealtimeEvent) -> Option<FeedUpdate<Self>> {
        match event {
            RealtimeEvent::NewDemand(demand) => Some(FeedUpdate::Prepend(demand.clone())),
            _ => None,
        }
    }
}

impl LiveResource for Match {
    fn feed_update(event: &RealtimeEvent) -> Option<FeedUpdate<Self>> {
        match event {
            RealtimeEvent::NewMatch(m) => Some(FeedUpdate::Prepend(m.clone())),
            RealtimeEvent::MatchAccepted(m)
            | RealtimeEvent::MatchCancelled(m)
            | RealtimeEvent::MatchDriverAssigned(m)
            | RealtimeEvent::MatchCompleted(m) => Some(FeedUpdate::Replace(m.clone())),
            _ => None,
        }
    }
}

impl LiveResource for TransportOffer {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_known_events() {
        let event = RealtimeEvent::decode(
            NEW_MESSAGE,
            json!({"_id": "x", "match": "m1", "content": "hello"}),
        )
        .unwrap()
        .unwrap();
        assert_eq!(event.name(), NEW_MESSAGE);
        assert_eq!(event.match_id(), Some(&MatchId::from("m1")));
    }

    #[test]
    fn unknown_event_is_ignored() {
        assert!(RealtimeEvent::decode("typing", json!({})).unwrap().is_none());
    }

    #[test]
    fn malformed_payload_names_the_event() {
        let err = RealtimeEvent::decode(NEW_DEMAND, json!({"nope": true})).unwrap_err();
        assert_eq!(err.event, NEW_DEMAND);
    }

    #[test]
    fn room_commands_carry_match_id() {
        let cmd = RealtimeCommand::JoinMatch(MatchId::from("m9"));
        assert_eq!(cmd.name(), JOIN_MATCH);
        assert_eq!(cmd.payload(), json!("m9"));
    }
}
