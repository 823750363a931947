//! Main entry point for the zipbrowse server.
//!
//! Serves the directory given by `--base-path` over HTTP until the process
//! is stopped.

use anyhow::{Result, anyhow};
use clap::Parser;
use env_logger::Env;
use log::info;
use std::sync::Arc;

use zipbrowse::Cli;
use zipbrowse::server::{self, App};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(cli.log_level.as_str()))
        .format_timestamp_millis()
        .try_init()?;

    if !cli.base_path.is_dir() {
        anyhow::bail!("Base path is not a directory: {}", cli.base_path.display());
    }

    let server = tiny_http::Server::http(cli.listen.as_str())
        .map_err(|err| anyhow!("Cannot listen on {}: {}", cli.listen, err))?;
    let app = App::new(cli.server_config());
    info!(
        "serving {} on http://{}{}/",
        cli.base_path.display(),
        cli.listen,
        app.context_path()
    );

    server::run(Arc::new(server), Arc::new(app)).await
}
