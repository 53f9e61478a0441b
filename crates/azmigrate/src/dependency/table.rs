//! Dependency table: which resource types an identifier skeleton maps to,
//! and which attribute of those types anchors references to them.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TableError;

const BUNDLED_TABLE_JSON: &str = include_str!("../../data/dependencies.json");

/// The only anchor attribute the table currently keeps.
pub const ID_ANCHOR: &str = "id";

/// One record of a dependency table source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRecord {
    #[serde(alias = "resource_type")]
    pub resource_type: String,

    /// Identifier skeleton. Empty marks an exclusion.
    #[serde(default, alias = "id_pattern")]
    pub id_pattern: String,

    #[serde(default, alias = "example_configuration", skip_serializing_if = "Option::is_none")]
    pub example_configuration: Option<String>,

    #[serde(default = "default_anchor", alias = "anchor_attribute")]
    pub anchor_attribute: String,
}

fn default_anchor() -> String {
    ID_ANCHOR.to_string()
}

/// A resolved table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Identifier skeleton, possibly empty.
    pub pattern: String,
    pub resource_type: String,
    pub anchor_attribute: String,
    pub example_configuration: Option<String>,
}

impl Dependency {
    /// Key under which a later source overrides an earlier one.
    pub fn merge_key(&self) -> String {
        format!("{}.{}", self.resource_type, self.anchor_attribute)
    }

    /// Exclusions only exist to suppress an entry of an earlier source.
    pub fn is_exclusion(&self) -> bool {
        self.pattern.is_empty()
    }
}

impl From<DependencyRecord> for Dependency {
    fn from(record: DependencyRecord) -> Self {
        Self {
            pattern: record.id_pattern.trim().to_string(),
            resource_type: record.resource_type,
            anchor_attribute: record.anchor_attribute,
            example_configuration: record.example_configuration,
        }
    }
}

/// Immutable table of dependencies, ordered by merge key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyTable {
    entries: Vec<Dependency>,
}

impl DependencyTable {
    /// The table compiled into the binary.
    pub fn bundled() -> Result<Self, TableError> {
        let defaults = parse_records_json(BUNDLED_TABLE_JSON)?;
        Self::from_records(defaults, Vec::new())
    }

    /// The bundled table with an optional override file merged over it.
    pub fn load(override_path: Option<&Path>) -> Result<Self, TableError> {
        let defaults = parse_records_json(BUNDLED_TABLE_JSON)?;
        let overrides = match override_path {
            Some(path) => read_records(path)?,
            None => Vec::new(),
        };

        let table = Self::from_records(defaults, overrides)?;
        log::debug!("Loaded dependency table with {} entries", table.len());
        Ok(table)
    }

    /// Merges two record sources. On a merge key collision the override
    /// wins; only identifier anchors are kept.
    pub fn from_records(
        defaults: Vec<DependencyRecord>,
        overrides: Vec<DependencyRecord>,
    ) -> Result<Self, TableError> {
        let mut merged: BTreeMap<String, Dependency> = BTreeMap::new();

        for (index, record) in defaults.into_iter().chain(overrides).enumerate() {
            if record.resource_type.trim().is_empty() {
                return Err(TableError::InvalidRecord {
                    index,
                    reason: "resourceType is empty".to_string(),
                });
            }
            let dependency = Dependency::from(record);
            merged.insert(dependency.merge_key(), dependency);
        }

        let entries = merged
            .into_values()
            .filter(|d| d.anchor_attribute == ID_ANCHOR)
            .collect();

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[Dependency] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Anchor attribute of a resource type, unless the type is excluded.
    pub fn anchor_for(&self, resource_type: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|d| d.resource_type == resource_type && !d.is_exclusion())
            .map(|d| d.anchor_attribute.as_str())
    }

    /// Example configuration recorded for a resource type.
    pub fn example_for(&self, resource_type: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|d| d.resource_type == resource_type)
            .and_then(|d| d.example_configuration.as_deref())
    }
}

/// Parses records from a JSON array.
pub fn parse_records_json(content: &str) -> Result<Vec<DependencyRecord>, TableError> {
    Ok(serde_json::from_str(content)?)
}

/// Parses records from a YAML sequence.
pub fn parse_records_yaml(content: &str) -> Result<Vec<DependencyRecord>, TableError> {
    Ok(serde_yaml::from_str(content)?)
}

/// Reads a record file, YAML when the extension says so and JSON otherwise.
pub fn read_records(path: &Path) -> Result<Vec<DependencyRecord>, TableError> {
    let content = fs::read_to_string(path).map_err(|e| TableError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if ext == "yaml" || ext == "yml" {
        parse_records_yaml(&content)
    } else {
        parse_records_json(&content)
    }
}
