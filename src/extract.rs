//! Path extraction for every instance of a split.
//!
//! Relations are processed in parallel over the shared read-only graph; each worker owns the
//! records and pair cache of its relation.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;

use crate::error::Result;
use crate::graph::{AdjacencyGraph, EnumeratorConfig, PairEnumeration, PathEnumerator};
use crate::ingest::Split;
use crate::paths::{InstancePaths, PathForm, PathParams, RelationRecords};
use crate::vocab::Vocabulary;

/// Per-relation extraction counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub instances: usize,
    pub pathless: usize,
    pub paths: usize,
    /// Pairs that hit the path cap.
    pub capped_pairs: usize,
    /// Pairs whose expansion budget ran out.
    pub exhausted_pairs: usize,
}

impl ExtractionStats {
    fn merge(&mut self, other: &ExtractionStats) {
        self.instances += other.instances;
        self.pathless += other.pathless;
        self.paths += other.paths;
        self.capped_pairs += other.capped_pairs;
        self.exhausted_pairs += other.exhausted_pairs;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRelation {
    pub records: RelationRecords,
    pub stats: ExtractionStats,
}

/// Enumeration settings derived from the parameters recorded in `params.json`.
pub fn enumerator_config(params: &PathParams, max_expansions_per_pair: Option<usize>) -> EnumeratorConfig {
    let per_occurrence = params.max_paths_per_pair.unwrap_or(usize::MAX);
    let occurrences = if params.multiple_instances_per_pair {
        params.max_instances_per_pair.unwrap_or(1).max(1)
    } else {
        1
    };
    EnumeratorConfig {
        max_length: params.max_length,
        include_entity: params.include_entity,
        include_path_len1: params.include_path_len1,
        max_paths_per_pair: per_occurrence.saturating_mul(occurrences),
        max_expansions_per_pair,
    }
}

/// Split enumerated paths into occurrences.
///
/// In multiple-instances mode the paths are cut into consecutive chunks of at most
/// `max_paths_per_pair`, one per occurrence, up to `max_instances_per_pair` occurrences.
fn occurrences(params: &PathParams, paths: &[PathForm]) -> Vec<Vec<PathForm>> {
    if paths.is_empty() {
        return Vec::new();
    }
    if !params.multiple_instances_per_pair {
        return vec![paths.to_vec()];
    }
    let chunk = params.max_paths_per_pair.unwrap_or(paths.len()).max(1);
    let limit = params.max_instances_per_pair.unwrap_or(1).max(1);
    paths.chunks(chunk).take(limit).map(<[PathForm]>::to_vec).collect()
}

fn extract_relation(
    enumerator: &PathEnumerator<'_>,
    params: &PathParams,
    split: &Split,
    relation: &str,
) -> Result<ExtractedRelation> {
    let mut records = RelationRecords {
        relation: relation.to_string(),
        subsets: BTreeMap::new(),
    };
    let mut stats = ExtractionStats::default();
    let mut cache: HashMap<(String, String), PairEnumeration> = HashMap::new();

    for subset in split.subsets(relation) {
        let mut entries = Vec::new();
        for instance in split.instances(relation, subset).into_iter().flatten() {
            let key = (instance.subject.clone(), instance.object.clone());
            let found = match cache.entry(key) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let found = enumerator.enumerate_names(&instance.subject, &instance.object)?;
                    stats.capped_pairs += usize::from(found.capped);
                    stats.exhausted_pairs += usize::from(found.budget_exhausted);
                    entry.insert(found)
                }
            };

            stats.instances += 1;
            if found.paths.is_empty() {
                stats.pathless += 1;
            }
            let occurrences = occurrences(params, &found.paths);
            stats.paths += occurrences.iter().map(Vec::len).sum::<usize>();
            entries.push(InstancePaths {
                instance: instance.clone(),
                occurrences,
            });
        }
        records.subsets.insert(subset, entries);
    }

    log::debug!(
        "Extracted {} paths for {} instances of {} ({} pathless)",
        stats.paths,
        stats.instances,
        relation,
        stats.pathless
    );
    Ok(ExtractedRelation { records, stats })
}

/// Enumerate paths for every instance of every relation in `split`.
pub fn extract_paths(
    graph: &AdjacencyGraph,
    vocab: &Vocabulary,
    split: &Split,
    params: &PathParams,
    max_expansions_per_pair: Option<usize>,
) -> Result<Vec<ExtractedRelation>> {
    let enumerator = PathEnumerator::new(graph, vocab, enumerator_config(params, max_expansions_per_pair));
    let relations: Vec<&str> = split.relations().collect();

    let extracted = relations
        .par_iter()
        .map(|relation| extract_relation(&enumerator, params, split, relation))
        .collect::<Result<Vec<_>>>()?;

    let mut totals = ExtractionStats::default();
    for relation in &extracted {
        totals.merge(&relation.stats);
    }
    log::info!(
        "Extracted {} paths for {} instances over {} relations, {} instances without paths",
        totals.paths,
        totals.instances,
        extracted.len(),
        totals.pathless
    );
    if totals.capped_pairs > 0 {
        log::info!("{} pairs reached the per-pair path cap", totals.capped_pairs);
    }
    if totals.exhausted_pairs > 0 {
        log::warn!(
            "{} pairs ran out of expansion budget; their paths may be incomplete",
            totals.exhausted_pairs
        );
    }
    Ok(extracted)
}

/// Convenience view of the records for writing.
pub fn relation_records(extracted: &[ExtractedRelation]) -> Vec<RelationRecords> {
    extracted.iter().map(|e| e.records.clone()).collect()
}
