//! Canonical path representation, path directories and the per-relation path index.
//!
//! A path is stored once as a [`PathForm`]: either relation-only (`r1-_r2`) or
//! entity-bearing (`a-r1-b-_r2-c`). Which of the two a path directory holds is decided
//! from its `params.json` when it is opened, never by looking at individual strings.

mod canonical;
mod params;
mod reader;
mod writer;

pub use canonical::{canonical_string, PathCanonicalizer};
pub use params::{PathParams, PARAMS_FILE};
pub use reader::{compare_indexes, matrix_file_name, PairDifference, PathDirectory, ReadStats};
pub use writer::{
    format_matrix_line, matrix_path_string, write_path_directory, write_relation_files, InstancePaths,
    RelationRecords,
};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Separator between tokens of one path.
pub const EDGE_SEPARATOR: char = '-';
/// Separator between paths of one instance in `*_matrix.tsv` files.
pub const PATHS_SEPARATOR: &str = "-#-";
/// Separator between paths in translated dataset files.
pub const TRANSLATED_PATHS_SEPARATOR: &str = "###";

/// Which representation the paths of a directory use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    RelationOnly,
    EntityBearing,
}

impl PathKind {
    pub fn from_include_entity(include_entity: bool) -> Self {
        if include_entity {
            PathKind::EntityBearing
        } else {
            PathKind::RelationOnly
        }
    }
}

/// One canonical path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathForm {
    /// Relation tokens only: `r1`, `_r2`.
    RelationOnly(Vec<String>),
    /// Alternating entity and relation tokens, starting and ending on an entity.
    EntityBearing(Vec<String>),
}

impl PathForm {
    pub fn kind(&self) -> PathKind {
        match self {
            PathForm::RelationOnly(_) => PathKind::RelationOnly,
            PathForm::EntityBearing(_) => PathKind::EntityBearing,
        }
    }

    pub fn tokens(&self) -> &[String] {
        match self {
            PathForm::RelationOnly(tokens) | PathForm::EntityBearing(tokens) => tokens,
        }
    }

    /// Number of relation steps.
    pub fn step_count(&self) -> usize {
        match self {
            PathForm::RelationOnly(tokens) => tokens.len(),
            PathForm::EntityBearing(tokens) => tokens.len().saturating_sub(1) / 2,
        }
    }

    /// Relation tokens in order, entities dropped.
    pub fn relation_tokens(&self) -> Vec<&str> {
        match self {
            PathForm::RelationOnly(tokens) => tokens.iter().map(String::as_str).collect(),
            PathForm::EntityBearing(tokens) => tokens
                .iter()
                .skip(1)
                .step_by(2)
                .map(String::as_str)
                .collect(),
        }
    }

    /// The canonical `-`-joined string.
    pub fn canonical(&self) -> String {
        join_tokens(self.tokens())
    }

    /// Relation-only canonical string, the path type shared across pairs.
    pub fn relation_signature(&self) -> String {
        self.relation_tokens().join("-")
    }

    /// Form written to translated dataset files: entity-bearing paths lose their source and
    /// target entities, relation-only paths are unchanged.
    pub fn translated(&self) -> String {
        match self {
            PathForm::RelationOnly(tokens) => join_tokens(tokens),
            PathForm::EntityBearing(tokens) if tokens.len() > 2 => {
                join_tokens(&tokens[1..tokens.len() - 1])
            }
            PathForm::EntityBearing(tokens) => join_tokens(tokens),
        }
    }

    /// Bracketed form used by random-walk extractors, with a unit weight.
    pub fn bracketed(&self) -> String {
        format!("-{}-,1.0", self.canonical())
    }
}

impl fmt::Display for PathForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

fn join_tokens(tokens: &[String]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            out.push(EDGE_SEPARATOR);
        }
        out.push_str(token);
    }
    out
}

/// The deduplicated paths of one labeled occurrence of a pair.
pub type PathSet = BTreeSet<PathForm>;

/// Ordered `(subject, object)` entity names.
pub type PairKey = (String, String);

/// Paths recorded for every pair of one relation-under-study.
#[derive(Debug, Clone, Default)]
pub struct RelationPaths {
    /// Pair → one path set per occurrence. Single-instance mode keeps exactly one set.
    pub pairs: BTreeMap<PairKey, Vec<PathSet>>,
    /// Every path type observed for this relation.
    pub path_types: BTreeSet<PathForm>,
}

impl RelationPaths {
    /// Record the paths of one instance line. In single-instance mode the latest set wins.
    pub fn record(&mut self, subject: &str, object: &str, paths: PathSet, multiple_instances: bool) {
        self.path_types.extend(paths.iter().cloned());
        let key = (subject.to_string(), object.to_string());
        if multiple_instances {
            self.pairs.entry(key).or_default().push(paths);
        } else {
            self.pairs.insert(key, vec![paths]);
        }
    }

    pub fn occurrences(&self, subject: &str, object: &str) -> Option<&[PathSet]> {
        self.pairs
            .get(&(subject.to_string(), object.to_string()))
            .map(Vec::as_slice)
    }

    /// Distinct relation-only signatures across all path types.
    pub fn relation_signatures(&self) -> BTreeSet<String> {
        self.path_types.iter().map(PathForm::relation_signature).collect()
    }
}

/// Paths of every relation-under-study read from one path directory.
#[derive(Debug, Clone)]
pub struct PathIndex {
    pub kind: PathKind,
    pub multiple_instances_per_pair: bool,
    pub relations: BTreeMap<String, RelationPaths>,
}

impl PathIndex {
    pub fn new(kind: PathKind, multiple_instances_per_pair: bool) -> Self {
        Self {
            kind,
            multiple_instances_per_pair,
            relations: BTreeMap::new(),
        }
    }

    pub fn relation(&self, relation: &str) -> Option<&RelationPaths> {
        self.relations.get(relation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_step_count_by_kind() {
        let rel = PathForm::RelationOnly(tokens(&["r1", "_r2"]));
        let ent = PathForm::EntityBearing(tokens(&["a", "r1", "b", "_r2", "c"]));
        assert_eq!(rel.step_count(), 2);
        assert_eq!(ent.step_count(), 2);
    }

    #[test]
    fn test_relation_signature_drops_entities() {
        let ent = PathForm::EntityBearing(tokens(&["a", "r1", "b", "_r2", "c"]));
        assert_eq!(ent.relation_signature(), "r1-_r2");
        assert_eq!(ent.canonical(), "a-r1-b-_r2-c");
    }

    #[test]
    fn test_translated_cuts_endpoints_only_for_entity_paths() {
        let ent = PathForm::EntityBearing(tokens(&["a", "r1", "b", "r2", "c"]));
        let rel = PathForm::RelationOnly(tokens(&["r1"]));
        assert_eq!(ent.translated(), "r1-b-r2");
        assert_eq!(rel.translated(), "r1");
    }

    #[test]
    fn test_bracketed_round_trips_through_canonicalizer() {
        let rel = PathForm::RelationOnly(tokens(&["r1", "r2"]));
        assert_eq!(rel.bracketed(), "-r1-r2-,1.0");
        assert_eq!(canonical_string(&rel.bracketed(), PathKind::RelationOnly).unwrap(), "r1-r2");
    }

    #[test]
    fn test_record_single_instance_overwrites() {
        let mut paths = RelationPaths::default();
        let first: PathSet = [PathForm::RelationOnly(tokens(&["r1"]))].into_iter().collect();
        let second: PathSet = [PathForm::RelationOnly(tokens(&["r2"]))].into_iter().collect();
        paths.record("a", "b", first, false);
        paths.record("a", "b", second.clone(), false);
        assert_eq!(paths.occurrences("a", "b").unwrap(), &[second]);
        assert_eq!(paths.path_types.len(), 2);
    }

    #[test]
    fn test_record_multiple_instances_keeps_each_occurrence() {
        let mut paths = RelationPaths::default();
        let first: PathSet = [PathForm::RelationOnly(tokens(&["r1"]))].into_iter().collect();
        let second: PathSet = [PathForm::RelationOnly(tokens(&["r1"]))].into_iter().collect();
        paths.record("a", "b", first, true);
        paths.record("a", "b", second, true);
        assert_eq!(paths.occurrences("a", "b").unwrap().len(), 2);
        assert_eq!(paths.path_types.len(), 1);
        assert!(paths.occurrences("b", "a").is_none());
    }
}
