use serde::{Deserialize, Serialize};

use crate::ids::UserId;
use crate::user::{Location, Role, RoleSet, Tier};

/// A reference the backend may or may not have populated.
///
/// Depending on the endpoint a field such as `farmer` arrives either as a
/// bare id string or as the embedded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Linked<I, T> {
    Id(I),
    Populated(Box<T>),
}

impl<I, T> Linked<I, T> {
    pub fn populated(&self) -> Option<&T> {
        match self {
            Linked::Id(_) => None,
            Linked::Populated(value) => Some(value),
        }
    }
}

impl<T> Linked<UserId, T>
where
    T: HasUserId,
{
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Linked::Id(id) => Some(id),
            Linked::Populated(user) => user.user_id(),
        }
    }
}

pub trait HasUserId {
    fn user_id(&self) -> Option<&UserId>;
}

/// Public profile projection (`GET /users/:id`, populated references).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSummary {
    #[serde(alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub name: Option<String>,
    pub phone: Option<String>,
    #[serde(deserialize_with = "crate::user::role::deserialize_optional_role")]
    pub primary_role: Option<Role>,
    pub roles: RoleSet,
    pub location: Option<Location>,
    pub is_verified: bool,
    pub tier: Option<Tier>,
    pub rating: Option<f64>,
}

impl HasUserId for UserSummary {
    fn user_id(&self) -> Option<&UserId> {
        self.id.as_ref()
    }
}

pub type UserRef = Linked<UserId, UserSummary>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bare_id_or_document() {
        let bare: UserRef = serde_json::from_str("\"u1\"").unwrap();
        assert_eq!(bare.user_id(), Some(&UserId::from("u1")));
        assert!(bare.populated().is_none());

        let doc: UserRef =
            serde_json::from_str(r#"{"_id":"u2","name":"Kamau","roles":["buyer"]}"#).unwrap();
        assert_eq!(doc.user_id(), Some(&UserId::from("u2")));
        assert_eq!(doc.populated().unwrap().name.as_deref(), Some("Kamau"));
    }
}
