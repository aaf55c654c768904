use clap::Parser;
use common::utils::config::get_config;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod session;

use cli::{Cli, Runtime};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean for results
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    let config = get_config()?;
    info!(
        asset_dir = %config.asset_dir,
        asset_base_url = ?config.asset_base_url,
        "configuration loaded"
    );

    let client = reqwest::Client::builder()
        .user_agent(concat!("konkordans/", env!("CARGO_PKG_VERSION")))
        .build()?;

    cli::run(cli, Runtime { config, client }).await
}
