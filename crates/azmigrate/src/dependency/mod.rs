//! Resource type classification.
//!
//! A resource identifier is reduced to a skeleton (`/subscriptions/resourceGroups/providers/Microsoft.Network/virtualNetworks`)
//! and looked up in a dependency table assembled from the bundled defaults
//! and an optional override source.

pub mod classifier;
pub mod identifier;
pub mod table;

pub use classifier::{Classifier, TypeResolver};
pub use identifier::ResourceId;
pub use table::{Dependency, DependencyRecord, DependencyTable, ID_ANCHOR};
