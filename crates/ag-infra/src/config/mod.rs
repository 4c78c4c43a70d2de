//! # Configuration Loader
//!
//! ## Responsibilities
//!
//! - Layer built-in defaults, an optional TOML file, `AGRILINK_*` variables
//!   and the deployment `VITE_*` variables, in that order
//! - Map the result onto the [`AppConfig`] DTO
//! - Report I/O and parsing errors with context
//!
//! ## Prohibited
//!
//! - No validation logic (an empty URL is a fact, not an error)
//! - No business rules

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use tracing::debug;

use ag_core::AppConfig;

pub const ENV_PREFIX: &str = "AGRILINK";
pub const VITE_API_URL: &str = "VITE_API_URL";
pub const VITE_SOCKET_URL: &str = "VITE_SOCKET_URL";
pub const VITE_CLERK_PUBLISHABLE_KEY: &str = "VITE_CLERK_PUBLISHABLE_KEY";

const CONFIG_FILE: &str = "config.toml";

/// `<platform config dir>/agrilink/config.toml`, when the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("agrilink").join(CONFIG_FILE))
}

/// Loads configuration from the process environment.
///
/// A `.env` file in the working directory is read first; variables already
/// set in the environment win over it.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match dotenvy::dotenv() {
        Ok(file) => debug!(path = %file.display(), "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => return Err(err).context("Failed to read .env file"),
    }
    load_config_from(path, std::env::vars().collect())
}

/// Same as [`load_config`] with an explicit environment.
///
/// A missing file at `path` is not an error; a malformed one is.
pub fn load_config_from(
    path: Option<&Path>,
    env: HashMap<String, String>,
) -> anyhow::Result<AppConfig> {
    let mut builder = Config::builder()
        .set_default("api_url", "http://localhost:5000/api")?
        .set_default("socket_url", "http://localhost:5000")?
        .set_default("clerk_publishable_key", "")?
        .set_default("verification_poll_secs", 5)?
        .set_default("gate_debounce_ms", 10)?
        .set_default("toast_dismiss_ms", 4000)?
        .set_default("suggestion_limit", 10)?;

    if let Some(path) = path {
        debug!(path = %path.display(), "layering config file");
        builder = builder.add_source(
            File::from(path)
                .format(FileFormat::Toml)
                .required(false),
        );
    }

    builder = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(Some(env.clone())),
        )
        .set_override_option("api_url", env.get(VITE_API_URL).cloned())?
        .set_override_option("socket_url", env.get(VITE_SOCKET_URL).cloned())?
        .set_override_option(
            "clerk_publishable_key",
            env.get(VITE_CLERK_PUBLISHABLE_KEY).cloned(),
        )?;

    builder
        .build()
        .context("Failed to assemble configuration")?
        .try_deserialize()
        .context("Failed to map configuration onto AppConfig")
}
