//! Migration manifest: which declarations to replace and with what.
//!
//! ```json
//! {
//!   "migrations": [
//!     {
//!       "address": "azapi_resource.vnet",
//!       "resourceId": "/subscriptions/.../virtualNetworks/vnet",
//!       "candidate": "resource \"azurerm_virtual_network\" \"vnet\" { ... }",
//!       "before": { ... },
//!       "after": { ... }
//!     }
//!   ],
//!   "references": [{ "value": "\"rg\"", "expression": "azurerm_resource_group.rg.name" }]
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use azmigrate::document::parse_block;
use azmigrate::{Address, Migration, Plan, Reference, Snapshot, StatePair};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub migrations: Vec<ManifestEntry>,
    /// Applied to every replacement.
    #[serde(default)]
    pub references: Vec<Reference>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub address: String,
    #[serde(default)]
    pub resource_id: Option<String>,
    /// Configuration text of the replacement declaration.
    pub candidate: String,
    #[serde(default, deserialize_with = "present")]
    pub before: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "present")]
    pub after: Option<serde_json::Value>,
}

/// Keeps an explicit `null` as `Some(Value::Null)`; only a missing key is `None`.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl ManifestEntry {
    /// Inline states when either side is given.
    fn states(&self) -> Option<StatePair> {
        if self.before.is_none() && self.after.is_none() {
            return None;
        }
        Some(StatePair::new(
            self.before.clone().map(Snapshot::from).unwrap_or_default(),
            self.after.clone().map(Snapshot::from).unwrap_or_default(),
        ))
    }
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid manifest {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Builds migrations in manifest order. States come from the entry,
    /// else from the plan, else there are none.
    pub fn into_migrations(self, plan: Option<&Plan>) -> Result<Vec<Migration>> {
        let mut migrations = Vec::with_capacity(self.migrations.len());

        for entry in &self.migrations {
            let address: Address = entry
                .address
                .parse()
                .map_err(anyhow::Error::msg)?;
            let candidate = parse_block(&entry.candidate)
                .with_context(|| format!("Invalid candidate for {}", entry.address))?;

            let states = entry
                .states()
                .or_else(|| plan.and_then(|p| p.states_for(&address)).cloned());

            let mut migration =
                Migration::new(address, candidate).with_references(self.references.clone());
            if let Some(id) = &entry.resource_id {
                migration = migration.with_resource_id(id);
            }
            if let Some(states) = states {
                migration = migration.with_states(states);
            }
            migrations.push(migration);
        }

        Ok(migrations)
    }
}
