use crate::error::IdentifierError;

use super::identifier::ResourceId;
use super::table::DependencyTable;

/// Picks one resource type when an identifier matches several.
///
/// Implementations typically ask the cloud API about the live resource.
pub trait TypeResolver {
    fn resolve(&self, id: &ResourceId, candidates: &[String]) -> Option<String>;
}

/// Maps resource identifiers to candidate resource types.
pub struct Classifier {
    table: DependencyTable,
    /// Lowercased skeleton per table entry; `None` for exclusions
    patterns: Vec<Option<String>>,
}

impl Classifier {
    pub fn new(table: DependencyTable) -> Self {
        let patterns = table
            .entries()
            .iter()
            .map(|d| (!d.is_exclusion()).then(|| d.pattern.to_lowercase()))
            .collect();

        Self { table, patterns }
    }

    pub fn table(&self) -> &DependencyTable {
        &self.table
    }

    /// Returns every resource type whose pattern matches the identifier's
    /// skeleton, compared case-insensitively, in table order.
    pub fn classify(&self, id: &str) -> Result<Vec<String>, IdentifierError> {
        let id = ResourceId::parse(id)?;
        Ok(self.classify_id(&id))
    }

    pub fn classify_id(&self, id: &ResourceId) -> Vec<String> {
        let skeleton = id.skeleton().to_lowercase();

        let mut candidates: Vec<String> = Vec::new();
        for (dependency, pattern) in self.table.entries().iter().zip(&self.patterns) {
            if pattern.as_deref() != Some(skeleton.as_str()) {
                continue;
            }
            if !candidates.contains(&dependency.resource_type) {
                candidates.push(dependency.resource_type.clone());
            }
        }
        candidates
    }

    /// Narrows the candidates down to one type.
    ///
    /// A single candidate is returned as is. With several, the resolver
    /// decides if one is given; its answer must be one of the candidates.
    pub fn resolve(
        &self,
        id: &str,
        resolver: Option<&dyn TypeResolver>,
    ) -> Result<Option<String>, IdentifierError> {
        let id = ResourceId::parse(id)?;
        let mut candidates = self.classify_id(&id);

        match candidates.len() {
            0 => {
                log::debug!("No resource type matches {}", id);
                Ok(None)
            }
            1 => Ok(candidates.pop()),
            _ => {
                let resolved = resolver
                    .and_then(|r| r.resolve(&id, &candidates))
                    .filter(|t| candidates.contains(t));
                if resolved.is_none() {
                    log::warn!(
                        "{} matches several resource types: {}",
                        id,
                        candidates.join(", ")
                    );
                }
                Ok(resolved)
            }
        }
    }
}
