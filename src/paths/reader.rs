//! Reading a path directory back against its split.
//!
//! Every line must name an instance of the split subset it was read from; a mismatch means the
//! path data and the split have drifted apart and is fatal. Random-walk extractors only produce
//! training and testing files, so when the split has a development subset that the directory
//! lacks, training lines may also belong to the development subset and the relation directory
//! is rewritten with the split's own train/dev/test partition once everything has been read.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::writer::{write_relation_files, InstancePaths, RelationRecords};
use super::{PathCanonicalizer, PathIndex, PathKind, PathParams, PathSet, RelationPaths};
use crate::atomic::atomic_replace_directory;
use crate::error::{RelpathError, Result};
use crate::ingest::{discover_relation_dirs, Instance, Label, Split, Subset};

/// File name of one subset's paths inside a relation directory.
pub fn matrix_file_name(subset: Subset) -> String {
    format!("{}_matrix.tsv", subset.name())
}

/// Counters gathered while reading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadStats {
    pub instances: usize,
    /// Instances read without any path.
    pub misses: usize,
    /// Sum of per-instance distinct path counts, over instances with paths.
    pub path_total: usize,
    /// Sum of path step counts, over every distinct path of every instance.
    pub length_total: usize,
    pub relations_with_synthesized_dev: usize,
}

impl ReadStats {
    pub fn miss_ratio(&self) -> f64 {
        ratio(self.misses, self.instances)
    }

    pub fn avg_paths_per_instance(&self) -> f64 {
        ratio(self.path_total, self.instances - self.misses)
    }

    pub fn avg_path_length(&self) -> f64 {
        ratio(self.length_total, self.path_total)
    }

    fn merge(&mut self, other: &ReadStats) {
        self.instances += other.instances;
        self.misses += other.misses;
        self.path_total += other.path_total;
        self.length_total += other.length_total;
        self.relations_with_synthesized_dev += other.relations_with_synthesized_dev;
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Message of a nested schema error, without the variant prefix it would repeat.
fn schema_detail(err: RelpathError) -> String {
    match err {
        RelpathError::Schema(msg) => msg,
        other => other.to_string(),
    }
}

struct MatrixLine {
    instance: Instance,
    paths: PathSet,
}

/// An opened path directory.
#[derive(Debug, Clone)]
pub struct PathDirectory {
    root: PathBuf,
    params: PathParams,
    canonicalizer: PathCanonicalizer,
}

impl PathDirectory {
    /// Open a directory by reading its `params.json`.
    pub fn open(root: &Path) -> Result<Self> {
        let params = PathParams::read(root)?;
        let kind = PathKind::from_include_entity(params.include_entity);
        log::info!(
            "Opened path directory {} (max length {}, {:?} paths)",
            root.display(),
            params.max_length,
            kind
        );
        Ok(Self {
            root: root.to_path_buf(),
            params,
            canonicalizer: PathCanonicalizer::new(kind),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn kind(&self) -> PathKind {
        self.canonicalizer.kind()
    }

    /// Read the paths of every relation of `split`.
    pub fn read_paths(&self, split: &Split) -> Result<(PathIndex, ReadStats)> {
        let dirs = discover_relation_dirs(&self.root)?;
        let on_disk: BTreeSet<&str> = dirs.iter().map(|d| d.relation.as_str()).collect();

        for relation in split.relations() {
            if !on_disk.contains(relation) {
                return Err(RelpathError::Schema(format!(
                    "no path directory for relation {} under {}",
                    relation,
                    self.root.display()
                )));
            }
        }
        for relation in &on_disk {
            if split.subsets(relation).next().is_none() {
                log::warn!("Ignoring path directory {} with no relation in the split", relation);
            }
        }

        let mut index = PathIndex::new(self.kind(), self.params.multiple_instances_per_pair);
        let mut totals = ReadStats::default();

        for relation in split.relations() {
            let (paths, stats) = self.read_relation(split, relation)?;
            log::debug!(
                "Relation {}: {} path types, {} relation signatures",
                relation,
                paths.path_types.len(),
                paths.relation_signatures().len()
            );
            totals.merge(&stats);
            index.relations.insert(relation.to_string(), paths);
        }

        log::info!(
            "Read {} instances, {} without paths ({:.2}%)",
            totals.instances,
            totals.misses,
            totals.miss_ratio() * 100.0
        );
        log::info!(
            "Avg paths per instance {:.2}, avg path length {:.2}",
            totals.avg_paths_per_instance(),
            totals.avg_path_length()
        );
        Ok((index, totals))
    }

    fn read_relation(&self, split: &Split, relation: &str) -> Result<(RelationPaths, ReadStats)> {
        let dir = self.root.join(relation);
        let synthesize_dev = split.has_subset(relation, Subset::Development)
            && !dir.join(matrix_file_name(Subset::Development)).exists();

        let mut paths = RelationPaths::default();
        let mut stats = ReadStats::default();

        for subset in split.subsets(relation) {
            if subset == Subset::Development && synthesize_dev {
                continue;
            }
            let file = dir.join(matrix_file_name(subset));
            if !file.exists() {
                return Err(RelpathError::Schema(format!("missing path file {}", file.display())));
            }

            let before = stats.instances;
            for line in self.read_matrix_file(&file)? {
                let known = split.contains(relation, subset, &line.instance)
                    || (synthesize_dev && split.contains(relation, Subset::Development, &line.instance));
                if !known {
                    return Err(RelpathError::Schema(format!(
                        "{}: instance ({}, {}, {}) is not in the {} split of {}",
                        file.display(),
                        line.instance.subject,
                        line.instance.object,
                        line.instance.label,
                        subset,
                        relation
                    )));
                }

                stats.instances += 1;
                if line.paths.is_empty() {
                    stats.misses += 1;
                    continue;
                }
                stats.path_total += line.paths.len();
                stats.length_total += line.paths.iter().map(|p| p.step_count()).sum::<usize>();
                paths.record(
                    &line.instance.subject,
                    &line.instance.object,
                    line.paths,
                    self.params.multiple_instances_per_pair,
                );
            }
            log::debug!("Read {} {} instances for {}", stats.instances - before, subset, relation);
        }

        if synthesize_dev {
            log::info!("Splitting training paths of {} into training/development", relation);
            self.rewrite_with_split(split, relation, &paths)?;
            stats.relations_with_synthesized_dev += 1;
        }

        Ok((paths, stats))
    }

    fn read_matrix_file(&self, path: &Path) -> Result<Vec<MatrixLine>> {
        let reader = BufReader::new(File::open(path)?);
        let mut lines = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let at = |msg: String| RelpathError::Schema(format!("{}:{}: {}", path.display(), line_no + 1, msg));

            let fields: Vec<&str> = line.split('\t').collect();
            let (pair, label, raw_paths) = match fields.as_slice() {
                [pair, label] => (*pair, *label, ""),
                [pair, label, paths] => (*pair, *label, *paths),
                _ => return Err(at(format!("expected 2 or 3 columns, found {}", fields.len()))),
            };
            let (subject, object) = match pair.split(',').collect::<Vec<_>>().as_slice() {
                [s, o] => (s.to_string(), o.to_string()),
                _ => return Err(at(format!("malformed entity pair {:?}", pair))),
            };
            let label = Label::parse(label).map_err(|e| at(schema_detail(e)))?;
            let raw_paths = raw_paths.trim();
            let paths = if raw_paths.is_empty() {
                PathSet::new()
            } else {
                self.canonicalizer
                    .canonicalize_field(raw_paths)
                    .map_err(|e| at(schema_detail(e)))?
            };

            lines.push(MatrixLine {
                instance: Instance::new(subject, object, label),
                paths,
            });
        }

        Ok(lines)
    }

    fn rewrite_with_split(&self, split: &Split, relation: &str, paths: &RelationPaths) -> Result<()> {
        let mut records = RelationRecords {
            relation: relation.to_string(),
            subsets: BTreeMap::new(),
        };
        for subset in split.subsets(relation) {
            let instances = split
                .instances(relation, subset)
                .into_iter()
                .flatten()
                .map(|instance| InstancePaths {
                    instance: instance.clone(),
                    occurrences: paths
                        .occurrences(&instance.subject, &instance.object)
                        .unwrap_or(&[])
                        .iter()
                        .map(|set| set.iter().cloned().collect())
                        .collect(),
                })
                .collect();
            records.subsets.insert(subset, instances);
        }

        let kind = self.kind();
        let ignore_pathless = self.params.ignore_no_path_entity_pair;
        atomic_replace_directory(&self.root.join(relation), |tmp| {
            write_relation_files(tmp, kind, ignore_pathless, &records)
        })
    }
}

/// A pair whose recorded paths differ between two indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairDifference {
    pub relation: String,
    pub subject: String,
    pub object: String,
    /// Distinct paths on each side; `None` when the pair is absent there.
    pub left: Option<usize>,
    pub right: Option<usize>,
}

fn distinct_paths(sets: &[PathSet]) -> usize {
    sets.iter().flatten().collect::<BTreeSet<_>>().len()
}

/// Pairs present on only one side, or with a different number of distinct paths.
pub fn compare_indexes(left: &PathIndex, right: &PathIndex) -> Vec<PairDifference> {
    let relations: BTreeSet<&String> = left.relations.keys().chain(right.relations.keys()).collect();
    let empty = RelationPaths::default();
    let mut differences = Vec::new();

    for relation in relations {
        let l = left.relations.get(relation).unwrap_or(&empty);
        let r = right.relations.get(relation).unwrap_or(&empty);
        let pairs: BTreeSet<_> = l.pairs.keys().chain(r.pairs.keys()).collect();

        for pair in pairs {
            let left_count = l.pairs.get(pair).map(|sets| distinct_paths(sets));
            let right_count = r.pairs.get(pair).map(|sets| distinct_paths(sets));
            if left_count != right_count {
                differences.push(PairDifference {
                    relation: relation.clone(),
                    subject: pair.0.clone(),
                    object: pair.1.clone(),
                    left: left_count,
                    right: right_count,
                });
            }
        }
    }

    log::info!("Compared path indexes: {} differing pairs", differences.len());
    differences
}
