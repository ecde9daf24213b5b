//! Path directory output.
//!
//! A path directory holds `params.json` and one subdirectory per relation-under-study with a
//! `<subset>_matrix.tsv` file per subset of the split:
//!
//! ```text
//! subject,object<TAB>label<TAB>path1-#-path2
//! subject,object<TAB>label
//! ```
//!
//! The second form is a labeled instance without paths.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use super::reader::matrix_file_name;
use super::{PathForm, PathKind, PathParams, PATHS_SEPARATOR};
use crate::atomic::atomic_replace_directory;
use crate::error::Result;
use crate::ingest::{Instance, Subset};

/// One labeled instance and the path sets found for it, one set per occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct InstancePaths {
    pub instance: Instance,
    pub occurrences: Vec<Vec<PathForm>>,
}

impl InstancePaths {
    pub fn has_paths(&self) -> bool {
        self.occurrences.iter().any(|paths| !paths.is_empty())
    }
}

/// Everything written for one relation-under-study.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationRecords {
    pub relation: String,
    pub subsets: BTreeMap<Subset, Vec<InstancePaths>>,
}

/// Raw string for one path inside a directory of `kind`.
///
/// Relation-only paths in an entity-bearing directory keep their brackets so that reading the
/// file back yields the same form.
pub fn matrix_path_string(path: &PathForm, kind: PathKind) -> String {
    match (path, kind) {
        (PathForm::RelationOnly(_), PathKind::EntityBearing) => path.bracketed(),
        _ => path.canonical(),
    }
}

/// Format one `*_matrix.tsv` line. No paths gives the two-column form.
pub fn format_matrix_line(instance: &Instance, paths: &[PathForm], kind: PathKind) -> String {
    let mut line = format!("{},{}\t{}", instance.subject, instance.object, instance.label);
    if !paths.is_empty() {
        line.push('\t');
        let joined: Vec<String> = paths.iter().map(|p| matrix_path_string(p, kind)).collect();
        line.push_str(&joined.join(PATHS_SEPARATOR));
    }
    line
}

/// Write the subset files of one relation into `dir`, which must exist.
///
/// Every non-empty occurrence is its own line. Instances without any path are written in the
/// two-column form unless `ignore_pathless` is set.
pub fn write_relation_files(
    dir: &Path,
    kind: PathKind,
    ignore_pathless: bool,
    records: &RelationRecords,
) -> Result<()> {
    for (subset, instances) in &records.subsets {
        let path = dir.join(matrix_file_name(*subset));
        let mut out = BufWriter::new(File::create(&path)?);
        let mut lines = 0usize;

        for entry in instances {
            if !entry.has_paths() {
                if !ignore_pathless {
                    writeln!(out, "{}", format_matrix_line(&entry.instance, &[], kind))?;
                    lines += 1;
                }
                continue;
            }
            for paths in entry.occurrences.iter().filter(|paths| !paths.is_empty()) {
                writeln!(out, "{}", format_matrix_line(&entry.instance, paths, kind))?;
                lines += 1;
            }
        }

        out.flush()?;
        log::debug!("Wrote {} lines to {}", lines, path.display());
    }
    Ok(())
}

/// Write a complete path directory, replacing `root` atomically.
pub fn write_path_directory(root: &Path, params: &PathParams, relations: &[RelationRecords]) -> Result<()> {
    let kind = PathKind::from_include_entity(params.include_entity);
    atomic_replace_directory(root, |tmp| {
        params.write(tmp)?;
        for records in relations {
            let dir = tmp.join(&records.relation);
            fs::create_dir_all(&dir)?;
            write_relation_files(&dir, kind, params.ignore_no_path_entity_pair, records)?;
        }
        Ok(())
    })?;
    log::info!("Wrote paths for {} relations to {}", relations.len(), root.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Label;
    use tempfile::TempDir;

    fn rel(parts: &[&str]) -> PathForm {
        PathForm::RelationOnly(parts.iter().map(|s| s.to_string()).collect())
    }

    fn params(ignore: bool) -> PathParams {
        PathParams {
            max_length: 2,
            include_entity: false,
            include_path_len1: true,
            ignore_no_path_entity_pair: ignore,
            multiple_instances_per_pair: false,
            max_paths_per_pair: Some(10),
            max_instances_per_pair: None,
        }
    }

    #[test]
    fn test_format_matrix_line() {
        let instance = Instance::new("a", "b", Label::Positive);
        let line = format_matrix_line(&instance, &[rel(&["r1"]), rel(&["r2", "_r3"])], PathKind::RelationOnly);
        assert_eq!(line, "a,b\t1\tr1-#-r2-_r3");

        let negative = Instance::new("c", "d", Label::Negative);
        assert_eq!(format_matrix_line(&negative, &[], PathKind::RelationOnly), "c,d\t-1");
    }

    #[test]
    fn test_relation_only_paths_keep_brackets_in_entity_directories() {
        let instance = Instance::new("a", "b", Label::Positive);
        let line = format_matrix_line(&instance, &[rel(&["r1", "r2"])], PathKind::EntityBearing);
        assert_eq!(line, "a,b\t1\t-r1-r2-,1.0");
    }

    #[test]
    fn test_write_path_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("paths");

        let mut subsets = BTreeMap::new();
        subsets.insert(
            Subset::Training,
            vec![
                InstancePaths {
                    instance: Instance::new("a", "b", Label::Positive),
                    occurrences: vec![vec![rel(&["r1"])]],
                },
                InstancePaths {
                    instance: Instance::new("c", "d", Label::Negative),
                    occurrences: vec![],
                },
            ],
        );
        let records = RelationRecords {
            relation: "rel1".to_string(),
            subsets,
        };

        write_path_directory(&root, &params(false), &[records.clone()]).unwrap();
        let content = fs::read_to_string(root.join("rel1/training_matrix.tsv")).unwrap();
        assert_eq!(content, "a,b\t1\tr1\nc,d\t-1\n");
        assert_eq!(PathParams::read(&root).unwrap(), params(false));

        write_path_directory(&root, &params(true), &[records]).unwrap();
        let content = fs::read_to_string(root.join("rel1/training_matrix.tsv")).unwrap();
        assert_eq!(content, "a,b\t1\tr1\n");
    }

    #[test]
    fn test_each_occurrence_is_a_line() {
        let temp_dir = TempDir::new().unwrap();
        let mut subsets = BTreeMap::new();
        subsets.insert(
            Subset::Testing,
            vec![InstancePaths {
                instance: Instance::new("a", "b", Label::Positive),
                occurrences: vec![vec![rel(&["r1"])], vec![], vec![rel(&["r2"])]],
            }],
        );
        let records = RelationRecords {
            relation: "rel1".to_string(),
            subsets,
        };
        write_relation_files(temp_dir.path(), PathKind::RelationOnly, false, &records).unwrap();
        let content = fs::read_to_string(temp_dir.path().join("testing_matrix.tsv")).unwrap();
        assert_eq!(content, "a,b\t1\tr1\na,b\t1\tr2\n");
    }
}
