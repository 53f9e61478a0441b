//! Moves declarations from a generic resource type to a native one.
//!
//! A migration locates the old declaration, builds its replacement from a
//! generated candidate block, swaps it in place and finally points every
//! literal copy of the resource's identifier at the new declaration.

pub mod merge;
pub mod references;

use hcl_edit::structure::Block;
use tracing::info_span;

use crate::dependency::Classifier;
use crate::document::{block_address, Address, WorkingSet};
use crate::error::{IdentifierError, Result};
use crate::snapshot::StatePair;

pub use merge::merge;
pub use references::{inject_references, rewrite_body, Reference};

/// One declaration to migrate.
#[derive(Debug, Clone)]
pub struct Migration {
    /// Address of the declaration being replaced.
    pub address: Address,
    /// Cloud identifier of the resource, when known.
    pub resource_id: Option<String>,
    /// Generated declaration for the target resource type.
    pub candidate: Block,
    /// Planner values for the old declaration. Without them the candidate
    /// replaces the old declaration as is.
    pub states: Option<StatePair>,
    /// Rewrites applied to the replacement before it is written.
    pub references: Vec<Reference>,
}

impl Migration {
    pub fn new(address: Address, candidate: Block) -> Self {
        Self {
            address,
            resource_id: None,
            candidate,
            states: None,
            references: Vec::new(),
        }
    }

    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    pub fn with_states(mut self, states: StatePair) -> Self {
        self.states = Some(states);
        self
    }

    pub fn with_references(mut self, references: Vec<Reference>) -> Self {
        self.references = references;
        self
    }

    /// Address the replacement is declared under.
    pub fn target(&self) -> Address {
        block_address(&self.candidate)
    }
}

/// What a migration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub old_address: Address,
    pub new_address: Address,
    /// False when no document declared the old address.
    pub found: bool,
    /// Documents rewritten by the reference pass.
    pub rewritten_documents: usize,
}

/// Outcome of a batch of migrations.
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub completed: Vec<MigrationOutcome>,
    /// Migrations that failed without stopping the batch.
    pub failed: Vec<(Address, String)>,
}

impl MigrationReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Reconciler {
    working_set: WorkingSet,
    classifier: Classifier,
}

impl Reconciler {
    pub fn new(working_set: WorkingSet, classifier: Classifier) -> Self {
        Self {
            working_set,
            classifier,
        }
    }

    pub fn working_set(&self) -> &WorkingSet {
        &self.working_set
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Runs one migration.
    pub fn migrate(&self, migration: &Migration) -> Result<MigrationOutcome> {
        let new_address = migration.target();
        let _span = info_span!("migrate", from = %migration.address, to = %new_address).entered();

        if let Err(e) = self.classify_migration(migration) {
            log::warn!("Cannot classify {}: {}", migration.address, e);
        }

        let existing = self.working_set.find_block(&migration.address)?;
        let mut replacement = match (&migration.states, existing) {
            (Some(states), Some((_, old))) => {
                let mut merged = old;
                merge(&mut merged, &migration.candidate, &states.before, &states.after)?;
                merged.ident = migration.candidate.ident.clone();
                merged.labels = migration.candidate.labels.clone();
                merged
            }
            _ => migration.candidate.clone(),
        };
        inject_references(&mut replacement, &migration.references);

        let found = self
            .working_set
            .replace_block(&migration.address, Some(replacement))?;

        if !found {
            log::info!("{} is not declared, nothing to migrate", migration.address);
            return Ok(MigrationOutcome {
                old_address: migration.address.clone(),
                new_address,
                found,
                rewritten_documents: 0,
            });
        }

        let outputs = self.output_references(migration, &new_address);
        let rewritten_documents = self.working_set.rewrite_all_outputs(&outputs)?;

        log::info!(
            "Migrated {} to {} ({} document(s) re-pointed)",
            migration.address,
            new_address,
            rewritten_documents
        );

        Ok(MigrationOutcome {
            old_address: migration.address.clone(),
            new_address,
            found,
            rewritten_documents,
        })
    }

    /// Runs migrations in order.
    ///
    /// A structural divergence stops the batch and is returned as the
    /// error; other failures are recorded and the batch continues.
    pub fn migrate_all(&self, migrations: &[Migration]) -> Result<MigrationReport> {
        let mut report = MigrationReport::default();

        for migration in migrations {
            match self.migrate(migration) {
                Ok(outcome) => report.completed.push(outcome),
                Err(e) if e.is_fatal() => {
                    log::error!("Stopping at {}: {}", migration.address, e);
                    return Err(e);
                }
                Err(e) => {
                    log::error!("Failed to migrate {}: {}", migration.address, e);
                    report.failed.push((migration.address.clone(), e.to_string()));
                }
            }
        }

        Ok(report)
    }

    /// Candidate types for the migration's resource identifier.
    ///
    /// Logs a warning when the candidate block's type is not among them.
    /// Migrations without an identifier yield no candidates.
    pub fn classify_migration(
        &self,
        migration: &Migration,
    ) -> std::result::Result<Vec<String>, IdentifierError> {
        let Some(id) = migration.resource_id.as_deref() else {
            return Ok(Vec::new());
        };

        let candidates = self.classifier.classify(id)?;
        let target = migration.target();
        if let Some(resource_type) = target.resource_type() {
            if !candidates.iter().any(|c| c == resource_type) {
                log::warn!(
                    "{} is declared as {} but its identifier matches [{}]",
                    target,
                    resource_type,
                    candidates.join(", ")
                );
            }
        }
        Ok(candidates)
    }

    /// Rewrites pointing the old declaration's anchor, and literal copies
    /// of the resource identifier, at the new declaration.
    fn output_references(&self, migration: &Migration, new_address: &Address) -> Vec<Reference> {
        let Some(anchor) = new_address
            .resource_type()
            .and_then(|t| self.classifier.table().anchor_for(t))
        else {
            log::debug!("{} has no dependency anchor", new_address);
            return Vec::new();
        };

        let mut references = Vec::new();
        if &migration.address != new_address {
            references.push(Reference::new(
                format!("{}.{}", migration.address, anchor),
                format!("{}.{}", new_address, anchor),
            ));
        }
        if let Some(id) = migration.resource_id.as_deref() {
            references.push(Reference::anchor(id, new_address, anchor));
        }
        references
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::DependencyTable;
    use crate::document::parse_block;
    use crate::error::{MergeError, MigrateError};
    use crate::snapshot::Snapshot;
    use std::fs;
    use tempfile::TempDir;

    const VNET_ID: &str =
        "/subscriptions/0000/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet";

    const MAIN_TF: &str = r#"variable "location" {
  default = "westeurope"
}

# the network
resource "azapi_resource" "vnet" {
  type      = "Microsoft.Network/virtualNetworks@2023-04-01"
  name      = "vnet"
  location  = var.location
  parent_id = azurerm_resource_group.rg.id
}
"#;

    const OUTPUTS_TF: &str = r#"output "vnet_id" {
  value = azapi_resource.vnet.id
}

output "vnet_literal" {
  value = "/subscriptions/0000/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet"
}
"#;

    const CANDIDATE: &str = r#"resource "azurerm_virtual_network" "vnet" {
  name                = "vnet"
  location            = "westeurope"
  resource_group_name = "rg"
  address_space       = ["10.0.0.0/16"]
}
"#;

    fn setup() -> (TempDir, Reconciler) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.tf"), MAIN_TF).unwrap();
        fs::write(dir.path().join("outputs.tf"), OUTPUTS_TF).unwrap();

        let reconciler = Reconciler::new(
            WorkingSet::new(dir.path()),
            Classifier::new(DependencyTable::bundled().unwrap()),
        );
        (dir, reconciler)
    }

    fn migration() -> Migration {
        Migration::new(
            Address::resource("azapi_resource", "vnet"),
            parse_block(CANDIDATE).unwrap(),
        )
        .with_resource_id(VNET_ID)
    }

    fn states() -> StatePair {
        let before = Snapshot::from(serde_json::json!({
            "name": "vnet",
            "location": "westeurope",
            "type": "Microsoft.Network/virtualNetworks@2023-04-01",
            "parent_id": "/subscriptions/0000/resourceGroups/rg"
        }));
        let after = Snapshot::from(serde_json::json!({
            "name": "vnet",
            "location": "westeurope",
            "resource_group_name": "rg",
            "address_space": ["10.0.0.0/16"]
        }));
        StatePair::new(before, after)
    }

    #[test]
    fn test_migrate_with_states_keeps_unchanged_expressions() {
        let (dir, reconciler) = setup();

        let outcome = reconciler.migrate(&migration().with_states(states())).unwrap();

        assert!(outcome.found);
        assert_eq!(outcome.new_address, Address::resource("azurerm_virtual_network", "vnet"));

        let main = fs::read_to_string(dir.path().join("main.tf")).unwrap();
        assert!(main.starts_with("variable \"location\""));
        assert!(main.contains("# the network\nresource \"azurerm_virtual_network\" \"vnet\""));
        assert!(main.contains("location  = var.location"));
        assert!(main.contains("resource_group_name = \"rg\""));
        assert!(main.contains("address_space       = [\"10.0.0.0/16\"]"));
        assert!(!main.contains("parent_id"));
        assert!(!main.contains("azapi_resource"));
    }

    #[test]
    fn test_migrate_without_states_takes_candidate() {
        let (dir, reconciler) = setup();

        reconciler.migrate(&migration()).unwrap();

        let main = fs::read_to_string(dir.path().join("main.tf")).unwrap();
        assert!(main.contains("location            = \"westeurope\""));
        assert!(!main.contains("var.location"));
    }

    #[test]
    fn test_migrate_repoints_outputs() {
        let (dir, reconciler) = setup();

        let outcome = reconciler.migrate(&migration()).unwrap();

        assert_eq!(outcome.rewritten_documents, 1);
        let outputs = fs::read_to_string(dir.path().join("outputs.tf")).unwrap();
        assert!(outputs.contains("value = azurerm_virtual_network.vnet.id\n}\n\noutput \"vnet_literal\""));
        assert!(!outputs.contains("azapi_resource"));
        assert!(!outputs.contains(VNET_ID));
    }

    #[test]
    fn test_migrate_injects_references() {
        let (dir, reconciler) = setup();
        let migration = migration().with_references(vec![Reference::literal(
            "rg",
            "azurerm_resource_group.rg.name",
        )]);

        reconciler.migrate(&migration).unwrap();

        let main = fs::read_to_string(dir.path().join("main.tf")).unwrap();
        assert!(main.contains("resource_group_name = azurerm_resource_group.rg.name"));
    }

    #[test]
    fn test_missing_declaration_is_not_an_error() {
        let (dir, reconciler) = setup();
        let migration = Migration::new(
            Address::resource("azapi_resource", "gone"),
            parse_block(CANDIDATE).unwrap(),
        );

        let outcome = reconciler.migrate(&migration).unwrap();

        assert!(!outcome.found);
        assert_eq!(fs::read_to_string(dir.path().join("main.tf")).unwrap(), MAIN_TF);
    }

    #[test]
    fn test_missing_declaration_leaves_dependents_alone() {
        let (dir, reconciler) = setup();
        let migration = Migration::new(
            Address::resource("azapi_resource", "gone"),
            parse_block(CANDIDATE).unwrap(),
        )
        .with_resource_id(VNET_ID);

        let outcome = reconciler.migrate(&migration).unwrap();

        assert!(!outcome.found);
        assert_eq!(outcome.rewritten_documents, 0);
        assert_eq!(fs::read_to_string(dir.path().join("main.tf")).unwrap(), MAIN_TF);
        assert_eq!(
            fs::read_to_string(dir.path().join("outputs.tf")).unwrap(),
            OUTPUTS_TF
        );
    }

    #[test]
    fn test_classify_migration() {
        let (_dir, reconciler) = setup();

        assert_eq!(
            reconciler.classify_migration(&migration()).unwrap(),
            vec!["azurerm_virtual_network"]
        );

        let bad = migration().with_resource_id("/subscriptions/0/resourceGroups");
        assert!(reconciler.classify_migration(&bad).is_err());

        let no_id = Migration::new(
            Address::resource("azapi_resource", "vnet"),
            parse_block(CANDIDATE).unwrap(),
        );
        assert!(reconciler.classify_migration(&no_id).unwrap().is_empty());
    }

    #[test]
    fn test_migrate_all_stops_at_divergence() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("main.tf"),
            "resource \"azapi_resource\" \"a\" {\n  rule {\n    n = 1\n  }\n}\n\nresource \"azapi_resource\" \"b\" {\n  name = \"b\"\n}\n",
        )
        .unwrap();
        let reconciler = Reconciler::new(
            WorkingSet::new(dir.path()),
            Classifier::new(DependencyTable::bundled().unwrap()),
        );

        let diverging = Migration::new(
            Address::resource("azapi_resource", "a"),
            parse_block("resource \"azurerm_thing\" \"a\" {\n  rule {\n    n = 2\n  }\n}\n").unwrap(),
        )
        .with_states(StatePair::new(
            Snapshot::from(serde_json::json!({ "rule": [{ "n": 1 }, { "n": 3 }] })),
            Snapshot::from(serde_json::json!({ "rule": [{ "n": 2 }] })),
        ));
        let next = Migration::new(
            Address::resource("azapi_resource", "b"),
            parse_block("resource \"azurerm_thing\" \"b\" {\n  name = \"b\"\n}\n").unwrap(),
        );

        let err = reconciler.migrate_all(&[diverging, next]).unwrap_err();

        assert!(matches!(
            err,
            MigrateError::Merge(MergeError::StructuralDivergence { .. })
        ));
        let main = fs::read_to_string(dir.path().join("main.tf")).unwrap();
        assert!(main.contains("\"azapi_resource\" \"a\""));
        assert!(main.contains("\"azapi_resource\" \"b\""));
    }

    #[test]
    fn test_migrate_all_reports_each_migration() {
        let (_dir, reconciler) = setup();
        let gone = Migration::new(
            Address::resource("azapi_resource", "gone"),
            parse_block("resource \"azurerm_thing\" \"gone\" {}\n").unwrap(),
        );

        let report = reconciler.migrate_all(&[migration(), gone]).unwrap();

        assert!(report.is_success());
        assert_eq!(report.completed.len(), 2);
        assert!(report.completed[0].found);
        assert!(!report.completed[1].found);
    }
}
