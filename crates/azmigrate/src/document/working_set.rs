//! The set of configuration files a migration pass works on.
//!
//! Every declaration address is assumed to be unique across the whole set,
//! so locating or replacing a declaration stops at the first file that has
//! it.

use std::path::{Path, PathBuf};

use hcl_edit::structure::Block;
use walkdir::WalkDir;

use super::error::{DocumentError, Result};
use super::{display_name, Address, ConfigDocument};
use crate::reconcile::references::{rewrite_body, Reference};

/// File extensions recognised as configuration documents.
pub const DEFAULT_EXTENSIONS: &[&str] = &["tf"];

/// Configuration documents in one directory.
#[derive(Debug, Clone)]
pub struct WorkingSet {
    dir: PathBuf,
    extensions: Vec<String>,
}

impl WorkingSet {
    /// Creates a working set over the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Overrides the recognised file extensions (without the leading dot).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    fn is_recognised(&self, path: &Path) -> bool {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };

        // Skip hidden files such as editor backups
        if name.starts_with('.') {
            return false;
        }

        self.extensions
            .iter()
            .any(|ext| name.len() > ext.len() + 1 && name.ends_with(&format!(".{}", ext)))
    }

    /// Paths of all recognised files, sorted by file name.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Err(DocumentError::ReadDirectory {
                path: self.dir.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }

        let files = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1) // Only the root module, not nested module directories
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|entry| entry.into_path())
            .filter(|path| path.is_file() && self.is_recognised(path))
            .collect();

        Ok(files)
    }

    /// Loads one document. Returns `None` for a document that does not parse,
    /// after logging it.
    fn load_best_effort(&self, path: &Path) -> Result<Option<ConfigDocument>> {
        match ConfigDocument::load(path) {
            Ok(doc) => Ok(Some(doc)),
            Err(e) if e.is_skippable() => {
                log::warn!("Skipping {}: {}", path.display(), e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Finds the declaration with the given address.
    pub fn find_block(&self, address: &Address) -> Result<Option<(PathBuf, Block)>> {
        for path in self.files()? {
            let Some(doc) = self.load_best_effort(&path)? else {
                continue;
            };
            if let Some(block) = doc.block(address) {
                return Ok(Some((path, block.clone())));
            }
        }
        Ok(None)
    }

    /// Replaces the declaration with the given address by `replacement`, or
    /// removes it when `replacement` is `None`.
    ///
    /// Only the document holding the declaration is written, and scanning
    /// stops there. Returns false when no document has the address; that is
    /// not an error, the declaration may already be gone.
    pub fn replace_block(&self, address: &Address, replacement: Option<Block>) -> Result<bool> {
        let mut replacement = replacement;
        let mut replaced = false;

        for path in self.files()? {
            let Some(mut doc) = self.load_best_effort(&path)? else {
                continue;
            };
            if doc.position_of(address).is_none() {
                continue;
            }

            doc.replace_block(address, replacement.take());
            if doc.is_modified() {
                doc.save()?;
                log::info!("Rewrote {} in {}", address, display_name(&path));
            } else {
                log::debug!("{} in {} is already up to date", address, display_name(&path));
            }
            replaced = true;
            break;
        }

        if !replaced {
            log::debug!("No declaration {} in {}", address, self.dir.display());
        }
        Ok(replaced)
    }

    /// Applies the reference rewrite to every declaration of every document.
    ///
    /// Documents are written one at a time and only when their text changed.
    /// Returns the number of documents written.
    pub fn rewrite_all_outputs(&self, references: &[Reference]) -> Result<usize> {
        if references.is_empty() {
            return Ok(0);
        }

        let mut written = 0;
        for path in self.files()? {
            let Some(mut doc) = self.load_best_effort(&path)? else {
                continue;
            };

            let rewrites = rewrite_body(doc.body_mut(), references);
            if rewrites == 0 || !doc.is_modified() {
                continue;
            }

            doc.save()?;
            log::info!(
                "Rewrote {} reference(s) in {}",
                rewrites,
                display_name(&path)
            );
            written += 1;
        }
        Ok(written)
    }
}
