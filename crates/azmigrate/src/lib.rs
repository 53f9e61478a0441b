pub mod config;
pub mod dependency;
pub mod document;
pub mod error;
pub mod plan;
pub mod reconcile;
pub mod snapshot;

pub use config::{load_settings, Settings};
pub use dependency::{Classifier, DependencyTable, ResourceId, TypeResolver};
pub use document::{Address, ConfigDocument, WorkingSet};
pub use error::{IdentifierError, MergeError, MigrateError, Result, SettingsError, TableError};
pub use plan::Plan;
pub use reconcile::{Migration, MigrationOutcome, MigrationReport, Reconciler, Reference};
pub use snapshot::{Snapshot, StatePair};
