//! # Application Dependencies
//!
//! Dependency grouping for constructing use cases.
//!
//! **Note**: This is NOT a Builder pattern.
//! - No build steps
//! - No default values
//! - Just parameter grouping

use std::sync::Arc;

use ag_core::marketplace::{Demand, Match, Produce, TransportOffer};
use ag_core::ports::*;

/// Application dependency grouping (non-Builder, just parameter grouping)
///
/// All dependencies are required - no defaults, no optional fields.
#[derive(Clone)]
pub struct AppDeps {
    // Identity
    pub session: Arc<dyn SessionPort>,

    // Users
    pub users: Arc<dyn UserProfilePort>,
    pub verification_admin: Arc<dyn VerificationAdminPort>,

    // Collections
    pub produce: Arc<dyn ResourceReadPort<Produce>>,
    pub produce_writer: Arc<dyn ResourceWritePort<Produce>>,
    pub demands: Arc<dyn ResourceReadPort<Demand>>,
    pub demand_writer: Arc<dyn ResourceWritePort<Demand>>,
    pub transport_offers: Arc<dyn ResourceReadPort<TransportOffer>>,
    pub transport_writer: Arc<dyn ResourceWritePort<TransportOffer>>,
    pub match_list: Arc<dyn ResourceReadPort<Match>>,

    // Marketplace actions
    pub matches: Arc<dyn MatchPort>,
    pub messages: Arc<dyn MessagePort>,
    pub transport: Arc<dyn TransportPort>,
    pub reviews: Arc<dyn ReviewPort>,
    pub sms: Arc<dyn SmsPort>,

    // Realtime channel (connection owned by the application root)
    pub realtime: Arc<dyn RealtimePort>,

    // Local helpers
    pub images: Arc<dyn ImageEncoderPort>,
    pub notifier: Arc<dyn NotifierPort>,
}
