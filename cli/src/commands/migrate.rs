use anyhow::{bail, Context, Result};

use azmigrate::{Plan, Reconciler, Settings};

use crate::cli::MigrateArgs;
use crate::manifest::Manifest;

use super::load_classifier;

pub fn run(settings: &Settings, args: &MigrateArgs) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)?;
    let plan = match &args.plan {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read plan {}", path.display()))?;
            Some(Plan::from_json(&content)?)
        }
        None => None,
    };

    let migrations = manifest.into_migrations(plan.as_ref())?;
    let reconciler = Reconciler::new(settings.working_set(), load_classifier(settings)?);

    let report = reconciler.migrate_all(&migrations)?;
    for outcome in &report.completed {
        if outcome.found {
            println!("{} -> {}", outcome.old_address, outcome.new_address);
        } else {
            println!("{} not declared, skipped", outcome.old_address);
        }
    }

    if !report.is_success() {
        for (address, reason) in &report.failed {
            eprintln!("{}: {}", address, reason);
        }
        bail!("{} migration(s) failed", report.failed.len());
    }
    Ok(())
}
