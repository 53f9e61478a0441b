//! Fixture builders for declarations and planner values.

#![allow(dead_code)]

use azmigrate::document::parse_block;
use azmigrate::{Address, Migration, Snapshot, StatePair};
use hcl_edit::structure::Block;

/// Builder for resource declaration text.
pub struct ResourceBuilder {
    resource_type: String,
    name: String,
    lines: Vec<String>,
}

impl ResourceBuilder {
    pub fn new(resource_type: &str, name: &str) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            name: name.to_string(),
            lines: Vec::new(),
        }
    }

    /// Add an attribute; `value` is raw expression text.
    pub fn attr(mut self, key: &str, value: &str) -> Self {
        self.lines.push(format!("  {} = {}", key, value));
        self
    }

    /// Add a nested block of attributes.
    pub fn block(mut self, block_type: &str, attrs: &[(&str, &str)]) -> Self {
        self.lines.push(format!("  {} {{", block_type));
        for (key, value) in attrs {
            self.lines.push(format!("    {} = {}", key, value));
        }
        self.lines.push("  }".to_string());
        self
    }

    pub fn text(&self) -> String {
        let mut text = format!("resource \"{}\" \"{}\" {{\n", self.resource_type, self.name);
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text.push_str("}\n");
        text
    }

    pub fn parse(&self) -> Block {
        parse_block(&self.text()).expect("Builder produced invalid configuration")
    }
}

pub fn states(before: serde_json::Value, after: serde_json::Value) -> StatePair {
    StatePair::new(Snapshot::from(before), Snapshot::from(after))
}

pub fn migration(from: (&str, &str), candidate: &ResourceBuilder) -> Migration {
    Migration::new(Address::resource(from.0, from.1), candidate.parse())
}
