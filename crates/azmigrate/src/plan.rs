//! Planner output.
//!
//! Only the parts the reconciliation needs are read: the address of each
//! resource change and its before/after values.

use std::collections::HashMap;

use serde::Deserialize;

use crate::document::Address;
use crate::error::{MigrateError, Result};
use crate::snapshot::{Snapshot, StatePair};

#[derive(Debug, Clone, Deserialize)]
struct RawPlan {
    #[serde(default)]
    resource_changes: Vec<RawResourceChange>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawResourceChange {
    address: String,
    #[serde(default)]
    change: RawChange,
}

/// `before`/`after` keep an explicit `null`; a missing key is an empty object.
#[derive(Debug, Clone, Deserialize)]
struct RawChange {
    #[serde(default = "empty_object")]
    before: serde_json::Value,
    #[serde(default = "empty_object")]
    after: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Default for RawChange {
    fn default() -> Self {
        Self {
            before: empty_object(),
            after: empty_object(),
        }
    }
}

/// One resource change reported by the planner.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceChange {
    pub address: Address,
    pub states: StatePair,
}

/// Resource changes keyed by declaration address.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    changes: Vec<ResourceChange>,
    index: HashMap<Address, usize>,
}

impl Plan {
    /// Parses the planner's JSON output.
    ///
    /// A missing `before` or `after` key becomes an empty mapping; an
    /// explicit `null` stays `null`. Changes whose address cannot be read
    /// are skipped.
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: RawPlan = serde_json::from_str(content).map_err(MigrateError::Plan)?;

        let mut plan = Plan::default();
        for change in raw.resource_changes {
            let Some(address) = Address::from_plan_address(&change.address) else {
                log::warn!("Skipping plan entry with unreadable address {}", change.address);
                continue;
            };

            let states = StatePair::new(
                Snapshot::from(change.change.before),
                Snapshot::from(change.change.after),
            );

            // First instance of a counted resource wins
            if plan.index.contains_key(&address) {
                continue;
            }
            plan.index.insert(address.clone(), plan.changes.len());
            plan.changes.push(ResourceChange { address, states });
        }

        Ok(plan)
    }

    pub fn change_for(&self, address: &Address) -> Option<&ResourceChange> {
        self.index.get(address).map(|&i| &self.changes[i])
    }

    /// Before/after values for the resource at `address`.
    pub fn states_for(&self, address: &Address) -> Option<&StatePair> {
        self.change_for(address).map(|c| &c.states)
    }
}
