use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::document::working_set::DEFAULT_EXTENSIONS;
use crate::document::WorkingSet;

/// Where a migration run reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    /// Override source merged over the bundled dependency table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_table: Option<PathBuf>,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_working_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            dependency_table: None,
            extensions: default_extensions(),
        }
    }
}

impl Settings {
    pub fn working_set(&self) -> WorkingSet {
        WorkingSet::new(&self.working_dir).with_extensions(self.extensions.clone())
    }
}
