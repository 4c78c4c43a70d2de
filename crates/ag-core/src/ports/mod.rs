//! Port interfaces for the application layer
//!
//! Ports define the contract between the use cases and the adapters that
//! talk to the backend, the realtime server, the identity provider and the
//! local file system.
//!
//! ## Port Placement Guidelines
//!
//! A port belongs here when it represents a capability of an external
//! collaborator, is used by more than one use case, and is implemented in
//! `ag-infra` (or by a UI shell).

pub mod errors;
mod matches;
mod media;
mod messages;
mod notifier;
mod realtime;
mod resource;
mod reviews;
mod session;
mod sms;
mod transport;
mod users;

pub use errors::{
    ApiError, ImageEncodeError, RealtimeError, GENERIC_ERROR_MESSAGE, NETWORK_ERROR_MESSAGE,
};
pub use matches::MatchPort;
pub use media::ImageEncoderPort;
pub use messages::MessagePort;
pub use notifier::NotifierPort;
pub use realtime::RealtimePort;
pub use resource::{ResourceReadPort, ResourceWritePort};
pub use reviews::ReviewPort;
pub use session::SessionPort;
pub use sms::SmsPort;
pub use transport::TransportPort;
pub use users::{UserProfilePort, VerificationAdminPort};
