//! Cloud resource identifiers and their skeletons.

use std::fmt;

use crate::error::IdentifierError;

/// Segment key whose value is kept in the skeleton.
const PROVIDERS_KEY: &str = "providers";

/// A resource identifier split into `/key/value` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    raw: String,
    pairs: Vec<(String, String)>,
}

impl ResourceId {
    /// Parses an identifier such as
    /// `/subscriptions/0000/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet`.
    pub fn parse(id: &str) -> Result<Self, IdentifierError> {
        let trimmed = id.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            return Err(IdentifierError::Empty(id.to_string()));
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        if let Some(position) = segments.iter().position(|s| s.trim().is_empty()) {
            return Err(IdentifierError::EmptySegment {
                id: id.to_string(),
                position,
            });
        }
        if segments.len() % 2 != 0 {
            return Err(IdentifierError::OddSegments {
                id: id.to_string(),
                segments: segments.len(),
            });
        }

        let pairs = segments
            .chunks(2)
            .map(|pair| (pair[0].to_string(), pair[1].to_string()))
            .collect();

        Ok(Self {
            raw: id.trim().to_string(),
            pairs,
        })
    }

    /// The identifier with instance names collapsed: every key is kept,
    /// values only after a `providers` key.
    pub fn skeleton(&self) -> String {
        let mut skeleton = String::new();
        for (key, value) in &self.pairs {
            skeleton.push('/');
            skeleton.push_str(key);
            if key.eq_ignore_ascii_case(PROVIDERS_KEY) {
                skeleton.push('/');
                skeleton.push_str(value);
            }
        }
        skeleton
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
