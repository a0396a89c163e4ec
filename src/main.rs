use anyhow::Result;
use clap::Parser;
use colored::*;
use tracing_subscriber::EnvFilter;

use pocowebc::commands::{self, Globals};
use pocowebc::config::{default_config_path, Settings};
use pocowebc::{Cli, GlobalArgs, OutputMode};

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn globals(args: &GlobalArgs) -> Result<Globals> {
    let config_path = match (&args.config, args.noconfig) {
        (_, true) => None,
        (Some(path), false) => Some(path.clone()),
        (None, false) => Some(default_config_path()?),
    };
    let settings = Settings::from_sources(
        args.url.as_deref(),
        args.auth.as_deref(),
        args.skip_verify,
        config_path,
        |name| std::env::var(name).ok(),
    )?;
    tracing::debug!(url = %settings.url, config = ?settings.config_path, "settings");
    if args.no_color {
        colored::control::set_override(false);
    }
    Ok(Globals {
        settings,
        mode: OutputMode::from_flags(args.json, args.format.as_deref()),
        color: !args.no_color,
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.debug);

    let result = match globals(&cli.global) {
        Ok(globals) => commands::run(cli.command, &globals).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        eprintln!("{} {:#}", "[error]".red(), e);
        std::process::exit(1);
    }
}
