mod cli;
mod commands;
mod manifest;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use azmigrate::MigrateError;
use cli::{Cli, Commands};

/// Exit status when the plan no longer matches the files on disk.
const EXIT_DIVERGED: i32 = 2;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        let diverged = e
            .downcast_ref::<MigrateError>()
            .is_some_and(MigrateError::is_fatal);
        std::process::exit(if diverged { EXIT_DIVERGED } else { 1 });
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = commands::resolve_settings(&cli)?;

    match &cli.command {
        Commands::Classify(args) => commands::classify::run(&settings, args)?,
        Commands::Migrate(args) => commands::migrate::run(&settings, args)?,
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = if verbose > 0 { "debug" } else { "info" };
    // RUST_LOG wins over -v
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false));

    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        let _ = tracing_log::LogTracer::init();
    }
}
