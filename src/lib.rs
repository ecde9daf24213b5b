pub mod config;
pub mod error;
pub mod vocab;
pub mod atomic;
pub mod ingest;
pub mod graph;
pub mod paths;
pub mod extract;
pub mod translate;
pub mod cache;
pub mod pipeline;

pub use config::Config;
pub use error::{RelpathError, Result};
pub use graph::{build_graph, AdjacencyGraph, PathEnumerator};
pub use paths::{PathDirectory, PathForm, PathIndex, PathKind};
pub use vocab::Vocabulary;
