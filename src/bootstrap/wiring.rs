//! # Dependency Injection
//!
//! ## Responsibilities
//!
//! - Create the infra adapters from the loaded [`AppConfig`]
//! - Group them into [`AppDeps`] behind port traits
//! - Own the single realtime connection of the process
//!
//! ## Prohibited
//!
//! - No business logic
//! - No configuration validation (config.rs already loaded it)
//!
//! This is the only place allowed to depend on ag-infra and ag-app at the
//! same time, and only for assembly.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use ag_app::usecases::{AwaitVerification, RoleGate};
use ag_app::AppDeps;
use ag_core::ports::{ApiError, RealtimePort};
use ag_core::AppConfig;
use ag_infra::{
    ApiClient, FileImageEncoder, InMemoryRealtimeHub, SocketIoPollingClient, StaticSession,
    TracingNotifier,
};

pub type WiringResult<T> = Result<T, WiringError>;

#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("HTTP client initialization failed: {0}")]
    HttpClient(#[from] ApiError),
}

/// Everything a command needs, assembled once per process.
pub struct AppServices {
    pub config: AppConfig,
    pub deps: AppDeps,
    pub gate: Arc<RoleGate>,
}

pub fn wire_dependencies(config: AppConfig) -> WiringResult<AppServices> {
    let session = Arc::new(StaticSession::new(config.session_token.clone()));
    let api = Arc::new(ApiClient::new(&config.api_url, session.clone())?);

    let realtime: Arc<dyn RealtimePort> = if config.socket_url.trim().is_empty() {
        info!("no socket URL configured, realtime updates disabled");
        Arc::new(InMemoryRealtimeHub::new())
    } else {
        Arc::new(SocketIoPollingClient::new(&config.socket_url, session.clone()))
    };

    let deps = AppDeps {
        session: session.clone(),
        users: api.clone(),
        verification_admin: api.clone(),
        produce: api.clone(),
        produce_writer: api.clone(),
        demands: api.clone(),
        demand_writer: api.clone(),
        transport_offers: api.clone(),
        transport_writer: api.clone(),
        match_list: api.clone(),
        matches: api.clone(),
        messages: api.clone(),
        transport: api.clone(),
        reviews: api.clone(),
        sms: api.clone(),
        realtime,
        images: Arc::new(FileImageEncoder),
        notifier: Arc::new(TracingNotifier::new(Duration::from_millis(
            config.toast_dismiss_ms,
        ))),
    };

    let gate = Arc::new(
        RoleGate::new(deps.users.clone(), deps.session.clone())
            .with_debounce(Duration::from_millis(config.gate_debounce_ms)),
    );

    Ok(AppServices { config, deps, gate })
}

impl AppServices {
    pub fn verification_poll(&self) -> AwaitVerification {
        AwaitVerification::new(self.deps.users.clone())
            .with_interval(Duration::from_secs(self.config.verification_poll_secs))
    }

    /// Opens the shared realtime connection. Failure leaves the app usable
    /// without live updates.
    pub async fn connect_realtime(&self) -> bool {
        match self.deps.realtime.connect().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "realtime connection failed, continuing without live updates");
                false
            }
        }
    }

    pub async fn shutdown(&self) {
        if let Err(err) = self.deps.realtime.disconnect().await {
            warn!(error = %err, "realtime disconnect failed");
        }
    }
}
