mod args;
mod commands;

use anyhow::Context;
use asp::domain::config::AspConfig;
use asp::kernel::config::load_config;
use asp_logger::Logger;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = args::Cli::parse();

    let mut cfg: AspConfig = load_config(cli.config.as_deref()).context("Critical: Configuration is malformed")?;
    match cli.verbose {
        0 => {},
        1 => cfg.logging.level = "debug".to_owned(),
        _ => cfg.logging.level = "trace".to_owned(),
    }

    let _log = Logger::from_config(env!("CARGO_BIN_NAME"), &cfg.logging)?;
    tracing::debug!(isis = asp::capabilities::isis_enabled(), "Starting asp");

    commands::run(cli.command, &cfg)
}
