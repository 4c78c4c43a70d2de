use clap::Parser;
use tracing::{error, info};

use agrilink_lib::bootstrap::{
    init_tracing_subscriber, load_config, run_command, wire_dependencies, ConfigOverrides,
};
use agrilink_lib::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(err) = init_tracing_subscriber(cli.verbose) {
        eprintln!("Failed to initialize tracing: {err:#}");
    }

    let overrides = ConfigOverrides {
        api_url: cli.api_url,
        socket_url: cli.socket_url,
        token: cli.token,
    };
    let config = load_config(cli.config.as_deref(), overrides)?;
    info!(api_url = %config.api_url, "configuration loaded");

    let services = wire_dependencies(config)?;
    if let Err(err) = run_command(cli.command, services).await {
        error!(error = %err, "command failed");
        return Err(err);
    }
    Ok(())
}
