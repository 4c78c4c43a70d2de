use std::fmt::Display;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::user::Capability;

/// A REST collection under `/api/<PATH>`.
pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {
    type Id: Clone + Eq + Display + Send + Sync + 'static;
    /// Body of a create/update request.
    type Draft: Serialize + Send + Sync;

    const PATH: &'static str;

    fn id(&self) -> &Self::Id;
}

/// Create form of a listing-like resource.
pub trait ListingDraft {
    /// Capability the author must hold.
    const CAPABILITY: Capability;

    fn validate(&self) -> Result<(), super::ListingValidationError>;

    /// Image slots of the form, `None` when the resource takes no photos.
    fn images_mut(&mut self) -> Option<&mut Vec<String>> {
        None
    }
}
