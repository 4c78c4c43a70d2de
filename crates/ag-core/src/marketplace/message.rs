use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::linked::UserRef;
use crate::ids::{MatchId, MessageId};

/// A chat message inside a match thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(alias = "_id")]
    pub id: MessageId,
    #[serde(rename = "match", alias = "matchId")]
    pub match_id: MatchId,
    #[serde(default)]
    pub sender: Option<UserRef>,
    pub content: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub match_id: MatchId,
    pub content: String,
}

impl NewMessage {
    /// Trims the content; blank messages are not sent.
    pub fn new(match_id: MatchId, content: &str) -> Option<Self> {
        let content = content.trim();
        (!content.is_empty()).then(|| Self {
            match_id,
            content: content.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_match_field_or_match_id() {
        let a: Message =
            serde_json::from_str(r#"{"_id":"1","match":"m1","content":"hi"}"#).unwrap();
        let b: Message =
            serde_json::from_str(r#"{"_id":"1","matchId":"m1","content":"hi"}"#).unwrap();
        assert_eq!(a.match_id, b.match_id);
    }

    #[test]
    fn blank_message_is_dropped() {
        assert!(NewMessage::new(MatchId::from("m"), "   ").is_none());
        assert_eq!(
            NewMessage::new(MatchId::from("m"), " sawa ").unwrap().content,
            "sawa"
        );
    }
}
