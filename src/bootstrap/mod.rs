pub mod config;
pub mod run;
pub mod tracing;
pub mod wiring;

pub use config::{load_config, ConfigOverrides};
pub use run::run_command;
pub use self::tracing::init_tracing_subscriber;
pub use wiring::{wire_dependencies, AppServices};
