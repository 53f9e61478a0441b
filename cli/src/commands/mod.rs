pub mod classify;
pub mod migrate;

use anyhow::{Context, Result};

use azmigrate::{load_settings, Classifier, DependencyTable, Settings};

use crate::cli::{Cli, Commands};

/// Settings from file and environment, with command line flags applied last.
pub fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = load_settings(cli.config.as_deref()).context("Failed to load settings")?;

    if let Some(table) = &cli.table {
        settings.dependency_table = Some(table.clone());
    }
    if let Commands::Migrate(args) = &cli.command {
        if let Some(dir) = &args.dir {
            settings.working_dir = dir.clone();
        }
    }

    Ok(settings)
}

pub fn load_classifier(settings: &Settings) -> Result<Classifier> {
    let table = DependencyTable::load(settings.dependency_table.as_deref())
        .context("Failed to load dependency table")?;
    Ok(Classifier::new(table))
}
