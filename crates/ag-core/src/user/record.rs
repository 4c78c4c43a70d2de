use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::location::Location;
use super::role::{deserialize_optional_role, Role, RoleSet};
use crate::ids::UserId;

/// Server-assigned verification status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Subscription plan level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Basic,
    Pro,
    Business,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Basic, Tier::Pro, Tier::Business];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Basic => "basic",
            Tier::Pro => "pro",
            Tier::Business => "business",
        }
    }

    /// Paid tiers unlock the premium features.
    pub fn is_premium(&self) -> bool {
        !matches!(self, Tier::Basic)
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Tier::Basic),
            "pro" => Ok(Tier::Pro),
            "business" => Ok(Tier::Business),
            other => Err(format!("unknown tier: {other}")),
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated user's record as returned by `GET /users/me`.
///
/// This is a projection: the client never persists it and re-fetches it on
/// every navigation. Missing fields deserialize to their empty value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    #[serde(alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(deserialize_with = "deserialize_optional_role")]
    pub primary_role: Option<Role>,
    pub roles: RoleSet,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub location: Option<Location>,
    pub verification_status: VerificationStatus,
    pub is_verified: bool,
    pub tier: Option<Tier>,
    pub verification_retry_count: u32,
    pub verification_rejected_reason: Option<String>,
    pub national_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// A profile field the gate requires before anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    PrimaryRole,
    Roles,
    Name,
    Phone,
    County,
}

impl UserRecord {
    /// Required profile fields that are still missing, in display order.
    pub fn missing_profile_fields(&self) -> Vec<ProfileField> {
        let mut missing = Vec::new();
        if self.primary_role.is_none() {
            missing.push(ProfileField::PrimaryRole);
        }
        if self.roles.is_empty() {
            missing.push(ProfileField::Roles);
        }
        if !present(&self.name) {
            missing.push(ProfileField::Name);
        }
        if !present(&self.phone) {
            missing.push(ProfileField::Phone);
        }
        if !self.location.as_ref().is_some_and(Location::has_county) {
            missing.push(ProfileField::County);
        }
        missing
    }

    pub fn is_profile_complete(&self) -> bool {
        self.missing_profile_fields().is_empty()
    }

    pub fn is_approved(&self) -> bool {
        self.is_verified && self.verification_status == VerificationStatus::Approved
    }

    pub fn is_rejected(&self) -> bool {
        self.verification_status == VerificationStatus::Rejected
    }

    pub fn has_premium(&self) -> bool {
        self.tier.is_some_and(|t| t.is_premium())
    }
}

/// Partial update body for `PUT /users/me`. Only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<RoleSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    /// Base64 data URL of the ID document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<VerificationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_retry_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
}

impl ProfileUpdate {
    pub fn tier(tier: Tier) -> Self {
        Self {
            tier: Some(tier),
            ..Default::default()
        }
    }
}

/// Admin decision body for `POST /users/:id/verify`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationDecision {
    pub verification_status: VerificationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_rejected_reason: Option<String>,
}

impl VerificationDecision {
    pub fn approve() -> Self {
        Self {
            verification_status: VerificationStatus::Approved,
            verification_rejected_reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            verification_status: VerificationStatus::Rejected,
            verification_rejected_reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_record_with_mongo_id() {
        let json = r#"{
            "_id": "u1",
            "primaryRole": "farmer",
            "roles": ["farmer"],
            "name": "A",
            "phone": "0700",
            "location": {"county": "Nairobi"},
            "isVerified": true,
            "verificationStatus": "approved",
            "tier": "basic"
        }"#;
        let record: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, Some(UserId::from("u1")));
        assert_eq!(record.primary_role, Some(Role::Farmer));
        assert!(record.is_profile_complete());
        assert!(record.is_approved());
        assert_eq!(record.tier, Some(Tier::Basic));
        assert_eq!(record.verification_retry_count, 0);
    }

    #[test]
    fn empty_object_is_incomplete_and_pending() {
        let record: UserRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record.verification_status, VerificationStatus::Pending);
        assert_eq!(
            record.missing_profile_fields(),
            vec![
                ProfileField::PrimaryRole,
                ProfileField::Roles,
                ProfileField::Name,
                ProfileField::Phone,
                ProfileField::County,
            ]
        );
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let record = UserRecord {
            primary_role: Some(Role::Buyer),
            roles: RoleSet::single(Role::Buyer),
            name: Some("   ".into()),
            phone: Some("0711".into()),
            location: Some(Location::county("")),
            ..Default::default()
        };
        assert_eq!(
            record.missing_profile_fields(),
            vec![ProfileField::Name, ProfileField::County]
        );
    }

    #[test]
    fn verified_flag_alone_is_not_approval() {
        let record = UserRecord {
            is_verified: true,
            verification_status: VerificationStatus::Pending,
            ..Default::default()
        };
        assert!(!record.is_approved());
    }

    #[test]
    fn profile_update_only_sends_set_fields() {
        let body = serde_json::to_value(ProfileUpdate::tier(Tier::Pro)).unwrap();
        assert_eq!(body, serde_json::json!({"tier": "pro"}));
    }

    #[test]
    fn rejection_carries_reason() {
        let body = serde_json::to_value(VerificationDecision::reject("blurry ID")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "verificationStatus": "rejected",
                "verificationRejectedReason": "blurry ID"
            })
        );
    }
}
