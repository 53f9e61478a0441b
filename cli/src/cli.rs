use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "azmigrate")]
#[command(about = "Migrate generic resource declarations to provider-native ones")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (JSON)
    #[arg(short, long, global = true, env = "AZMIGRATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Dependency table override (JSON or YAML)
    #[arg(short, long, global = true)]
    pub table: Option<PathBuf>,

    /// More output; repeat for more
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the resource types a resource identifier can map to
    Classify(ClassifyArgs),
    /// Replace declarations as described by a migration manifest
    Migrate(MigrateArgs),
}

#[derive(clap::Args)]
pub struct ClassifyArgs {
    /// Resource identifier, e.g. /subscriptions/.../resourceGroups/rg
    pub id: String,

    /// Also print the recorded example configuration of each type
    #[arg(short, long)]
    pub example: bool,
}

#[derive(clap::Args)]
pub struct MigrateArgs {
    /// Migration manifest (JSON)
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Planner output used for migrations without inline states
    #[arg(short, long)]
    pub plan: Option<PathBuf>,

    /// Directory holding the configuration files
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
}
