//! Test harness for isolated migration runs.
//!
//! The `TestHarness` owns a temporary working directory, writes fixture
//! files into it and builds a `Reconciler` over it with the bundled
//! dependency table.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use azmigrate::{Classifier, DependencyTable, Reconciler, WorkingSet};

pub struct TestHarness {
    temp_dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Create a harness with the given files already written.
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let harness = Self::new();
        for (name, content) in files {
            harness.write(name, content);
        }
        harness
    }

    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir().join(name)
    }

    pub fn write(&self, name: &str, content: &str) {
        fs::write(self.path(name), content).expect("Failed to write fixture");
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).expect("Failed to read fixture")
    }

    pub fn working_set(&self) -> WorkingSet {
        WorkingSet::new(self.dir())
    }

    pub fn reconciler(&self) -> Reconciler {
        let table = DependencyTable::bundled().expect("Bundled table must load");
        Reconciler::new(self.working_set(), Classifier::new(table))
    }

    /// Snapshot of every file in the directory, sorted by name.
    pub fn contents(&self) -> Vec<(String, String)> {
        let mut files: Vec<(String, String)> = fs::read_dir(self.dir())
            .expect("Failed to list temp directory")
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .map(|e| {
                let name = e.file_name().to_string_lossy().to_string();
                let content = fs::read_to_string(e.path()).unwrap_or_default();
                (name, content)
            })
            .collect();
        files.sort();
        files
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
