//! Roles and the capabilities they grant.
//!
//! Feature visibility is decided by asking a [`RoleSet`] whether it grants a
//! [`Capability`], never by comparing role strings at the call site.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Marketplace role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Farmer,
    Buyer,
    Driver,
    /// Granted by the backend only; never selectable during onboarding.
    Admin,
}

impl Role {
    /// Roles a user may pick in the onboarding wizard.
    pub const SELECTABLE: [Role; 3] = [Role::Farmer, Role::Buyer, Role::Driver];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Farmer => "farmer",
            Role::Buyer => "buyer",
            Role::Driver => "driver",
            Role::Admin => "admin",
        }
    }

    pub fn is_selectable(&self) -> bool {
        Self::SELECTABLE.contains(self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "farmer" => Ok(Role::Farmer),
            "buyer" => Ok(Role::Buyer),
            "driver" => Ok(Role::Driver),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Something a user can do in the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    PostProduce,
    PostDemand,
    OfferTransport,
    ProposeMatch,
    AssignDriver,
    CompleteDelivery,
    ReviewVerifications,
}

impl Capability {
    fn granted_by(&self, role: Role) -> bool {
        use Capability::*;
        match self {
            PostProduce => role == Role::Farmer,
            PostDemand => role == Role::Buyer,
            OfferTransport | CompleteDelivery => role == Role::Driver,
            ProposeMatch => matches!(role, Role::Farmer | Role::Buyer),
            AssignDriver => matches!(role, Role::Driver | Role::Admin),
            ReviewVerifications => role == Role::Admin,
        }
    }
}

/// Set of roles granted to a user.
///
/// Unknown role strings coming from the backend are dropped on
/// deserialization instead of failing the whole user record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(role: Role) -> Self {
        Self(BTreeSet::from([role]))
    }

    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.0.iter().any(|role| capability.granted_by(*role))
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(raw.iter().filter_map(|s| s.parse().ok()).collect())
    }
}

/// Lenient `Option<Role>` deserializer: unknown or empty strings become `None`.
pub(crate) fn deserialize_optional_role<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}
