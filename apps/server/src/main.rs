use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use toggles::domain::config::ApiConfig;
use toggles::domain::constants::CONFIG_FILE_ENV;
use toggles::kernel::config::load_config;
use toggles_logger::Logger;
use toggles_server::Server;

/// Feature toggles service.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file; `toggles.{toml,yaml,json}` in the working directory when omitted.
    #[arg(short, long, env = CONFIG_FILE_ENV)]
    config: Option<PathBuf>,

    /// Print the merged configuration as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg: ApiConfig =
        load_config(cli.config.as_deref()).context("Critical: Configuration is malformed")?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        return Ok(());
    }

    let _log = Logger::from_config(env!("CARGO_PKG_NAME"), &cfg.log, cfg.log_json())?;

    Server::builder().config(cfg).build()?.run().await
}
