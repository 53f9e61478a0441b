//! Untyped before/after state trees reported by the planner.

use std::collections::BTreeMap;

use serde::Deserialize;

/// A resource state value as emitted by the planner.
///
/// Equality is structural: two snapshots are equal when they have the same
/// variant and equal contents, recursively. Scalars keep the JSON text of
/// the value, so `1` and `"1"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum Snapshot {
    Null,
    Scalar(String),
    Sequence(Vec<Snapshot>),
    Mapping(BTreeMap<String, Snapshot>),
}

impl Snapshot {
    /// Returns an empty mapping.
    pub fn empty() -> Self {
        Snapshot::Mapping(BTreeMap::new())
    }

    /// Looks up a field. Only mappings have fields.
    pub fn get(&self, name: &str) -> Option<&Snapshot> {
        match self {
            Snapshot::Mapping(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Views the value as the elements of a repeatable block group.
    ///
    /// A single mapping counts as one element; null and scalars have none.
    pub fn elements(&self) -> &[Snapshot] {
        match self {
            Snapshot::Sequence(items) => items,
            Snapshot::Mapping(_) => std::slice::from_ref(self),
            Snapshot::Null | Snapshot::Scalar(_) => &[],
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot::empty()
    }
}

impl From<serde_json::Value> for Snapshot {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Snapshot::Null,
            Value::Bool(b) => Snapshot::Scalar(b.to_string()),
            Value::Number(n) => Snapshot::Scalar(n.to_string()),
            Value::String(s) => Snapshot::Scalar(s),
            Value::Array(items) => Snapshot::Sequence(items.into_iter().map(Snapshot::from).collect()),
            Value::Object(fields) => Snapshot::Mapping(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Snapshot::from(v)))
                    .collect(),
            ),
        }
    }
}

/// The before and after state of one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StatePair {
    #[serde(default)]
    pub before: Snapshot,
    #[serde(default)]
    pub after: Snapshot,
}

impl StatePair {
    pub fn new(before: Snapshot, after: Snapshot) -> Self {
        Self { before, after }
    }
}
