use serde::Serialize;

use crate::user::{
    canonical_county, Location, ProfileUpdate, Role, RoleSet, UserRecord, VerificationStatus,
};

/// Fields accumulated across the wizard steps. Nothing is written to the
/// backend until the legal-details step is submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OnboardingDraft {
    pub role: Option<Role>,
    pub name: String,
    pub phone: String,
    pub location: Location,
    pub national_id: Option<String>,
    /// Base64 data URL of the ID document.
    #[serde(skip)]
    pub id_image: Option<String>,
}

/// Validation failures, each scoped to the step that raises it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum WizardError {
    #[error("please choose a role")]
    RoleRequired,
    #[error("this role cannot be chosen during onboarding")]
    RoleNotSelectable,
    #[error("name is required")]
    NameRequired,
    #[error("phone number is required")]
    PhoneRequired,
    #[error("county is required")]
    CountyRequired,
    #[error("unknown county: {0}")]
    UnknownCounty(String),
    #[error("{0}")]
    SubmitFailed(String),
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl OnboardingDraft {
    /// Pre-fills the draft from whatever the backend already knows.
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            role: record.primary_role.filter(Role::is_selectable),
            name: record.name.clone().unwrap_or_default(),
            phone: record.phone.clone().unwrap_or_default(),
            location: record.location.clone().unwrap_or_default(),
            national_id: record.national_id.clone(),
            id_image: None,
        }
    }

    pub fn validate_role(&self) -> Result<Role, WizardError> {
        let role = self.role.ok_or(WizardError::RoleRequired)?;
        if !role.is_selectable() {
            return Err(WizardError::RoleNotSelectable);
        }
        Ok(role)
    }

    /// Checks the profile step and canonicalizes the county spelling.
    pub fn validate_profile(&mut self) -> Result<(), WizardError> {
        if non_empty(&self.name).is_none() {
            return Err(WizardError::NameRequired);
        }
        if non_empty(&self.phone).is_none() {
            return Err(WizardError::PhoneRequired);
        }
        let county = self
            .location
            .county
            .as_deref()
            .and_then(non_empty)
            .ok_or(WizardError::CountyRequired)?;
        let canonical =
            canonical_county(&county).ok_or_else(|| WizardError::UnknownCounty(county.clone()))?;
        self.location.county = Some(canonical.to_string());
        Ok(())
    }

    /// Builds the single combined write for role + profile + legal details.
    ///
    /// `previous_retries` is set when the user is resubmitting after a
    /// rejection; the counter is bumped in the same write.
    pub fn to_update(&self, previous_retries: Option<u32>) -> Result<ProfileUpdate, WizardError> {
        let role = self.validate_role()?;
        Ok(ProfileUpdate {
            primary_role: Some(role),
            roles: Some(RoleSet::single(role)),
            name: non_empty(&self.name),
            phone: non_empty(&self.phone),
            location: Some(self.location.clone()),
            national_id: self.national_id.as_deref().and_then(non_empty),
            id_image: self.id_image.clone(),
            verification_status: Some(VerificationStatus::Pending),
            verification_retry_count: previous_retries.map(|n| n.saturating_add(1)),
            tier: None,
        })
    }
}
