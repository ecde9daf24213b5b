//! Readers for the external inputs: edge list, labeled split and entity type table.

pub mod walker;
pub mod edges;
pub mod split;
pub mod types;

pub use walker::{RelationDir, discover_relation_dirs};
pub use edges::{NamedTriple, read_edges};
pub use split::{Instance, Label, Split, Subset};
pub use types::EntityTypes;
