//! Configuration documents.
//!
//! A document is one configuration file parsed into a format-preserving
//! tree: an ordered list of top-level declarations, each a block with an
//! identifier, labels, attributes and nested blocks. Editing a document
//! and rendering it again leaves every untouched byte as it was.

pub mod address;
pub mod body;
pub mod error;
pub mod working_set;

use std::fs;
use std::path::{Path, PathBuf};

use hcl_edit::parser;
use hcl_edit::structure::{Block, Body, Structure};
use hcl_edit::Decorate;

pub use address::Address;
pub use error::DocumentError;
pub use working_set::WorkingSet;

use error::Result;

/// Returns the address of a top-level declaration.
pub fn block_address(block: &Block) -> Address {
    Address::new(
        block.ident.as_str(),
        block.labels.iter().map(|label| label.as_str().to_string()),
    )
}

/// Parses the first block out of a configuration fragment.
pub fn parse_block(text: &str) -> Result<Block> {
    let body = parser::parse_body(text).map_err(|e| DocumentError::Parse {
        path: PathBuf::from("<candidate>"),
        message: e.to_string(),
    })?;

    let block = body
        .iter()
        .find_map(|s| match s {
            Structure::Block(block) => Some(block.clone()),
            Structure::Attribute(_) => None,
        });
    block.ok_or(DocumentError::NoBlock)
}

/// File name only, for log fields.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// A parsed configuration file.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    path: PathBuf,
    body: Body,
    source: String,
}

impl ConfigDocument {
    /// Parses `content` as the document stored at `path`.
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self> {
        let path = path.into();
        let body = parser::parse_body(content).map_err(|e| DocumentError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            path,
            body,
            source: content.to_string(),
        })
    }

    /// Reads and parses a document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| DocumentError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(path, &content)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Addresses of all top-level declarations, in file order.
    pub fn addresses(&self) -> Vec<Address> {
        self.body
            .iter()
            .filter_map(|s| match s {
                Structure::Block(block) => Some(block_address(block)),
                Structure::Attribute(_) => None,
            })
            .collect()
    }

    /// Position of the declaration with the given address.
    pub fn position_of(&self, address: &Address) -> Option<usize> {
        self.body
            .iter()
            .position(|s| matches!(s, Structure::Block(block) if block_address(block) == *address))
    }

    /// Returns the declaration with the given address.
    pub fn block(&self, address: &Address) -> Option<&Block> {
        self.body.iter().find_map(|s| match s {
            Structure::Block(block) if block_address(block) == *address => Some(block),
            _ => None,
        })
    }

    /// Removes the declaration with the given address and, when a
    /// replacement is given, inserts it at the same position. Comments and
    /// blank lines in front of the old declaration are carried over.
    ///
    /// Returns false when the document has no such declaration.
    pub fn replace_block(&mut self, address: &Address, replacement: Option<Block>) -> bool {
        let Some(pos) = self.position_of(address) else {
            return false;
        };

        let old = self.body.remove(pos);
        if let Some(mut block) = replacement {
            if let Structure::Block(old) = &old {
                *block.decor_mut() = old.decor().clone();
            }
            self.body.insert(pos, block);
        }
        true
    }

    /// Renders the document text.
    pub fn render(&self) -> String {
        self.body.to_string()
    }

    /// Returns true when the rendered text differs from what was loaded.
    pub fn is_modified(&self) -> bool {
        self.render() != self.source
    }

    /// Writes the rendered document back to its path.
    pub fn save(&mut self) -> Result<()> {
        let _span = tracing::info_span!("document.save", file = %display_name(&self.path)).entered();

        let content = self.render();
        fs::write(&self.path, &content).map_err(|e| DocumentError::WriteFile {
            path: self.path.clone(),
            source: e,
        })?;
        self.source = content;

        Ok(())
    }
}
