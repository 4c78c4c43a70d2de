//! Resolves which configuration file to read and applies command-line
//! overrides on top of the loaded values.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use ag_core::AppConfig;

/// Explicit path first, then the platform default location.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(ag_infra::config::default_config_path)
}

/// Overrides given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub socket_url: Option<String>,
    pub token: Option<String>,
}

pub fn load_config(explicit: Option<&Path>, overrides: ConfigOverrides) -> anyhow::Result<AppConfig> {
    let path = resolve_config_path(explicit);
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("config file {} does not exist", path.display());
        }
    }
    debug!(path = ?path, "loading configuration");

    let mut config = ag_infra::config::load_config(path.as_deref())
        .context("Failed to load configuration")?;
    apply_overrides(&mut config, overrides);
    Ok(config)
}

fn apply_overrides(config: &mut AppConfig, overrides: ConfigOverrides) {
    if let Some(api_url) = overrides.api_url {
        config.api_url = api_url;
    }
    if let Some(socket_url) = overrides.socket_url {
        config.socket_url = socket_url;
    }
    if overrides.token.is_some() {
        config.session_token = overrides.token;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn command_line_wins() {
        let mut config = ag_infra::config::load_config_from(None, HashMap::new()).unwrap();

        apply_overrides(
            &mut config,
            ConfigOverrides {
                api_url: Some("https://agrilink.example/api".into()),
                socket_url: None,
                token: Some("tok".into()),
            },
        );

        assert_eq!(config.api_url, "https://agrilink.example/api");
        assert_eq!(config.socket_url, "http://localhost:5000");
        assert_eq!(config.session_token.as_deref(), Some("tok"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load_config(
            Some(Path::new("/nonexistent/agrilink.toml")),
            ConfigOverrides::default(),
        )
        .unwrap_err();

        assert!(err.to_string().contains("does not exist"));
    }
}
