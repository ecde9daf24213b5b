//! Translation of a path index into the dataset layout of the downstream path encoder.
//!
//! ```text
//! <out>/vocab/domain-label
//! <out>/vocab/relation_vocab.txt
//! <out>/vocab/entity_vocab.txt            (optional)
//! <out>/vocab/entity_type_vocab.txt       (with an entity types table)
//! <out>/vocab/entity_to_list_type.json    (with an entity types table)
//! <out>/data_input/<relation>/positive_matrix.tsv.translated
//! <out>/data_input/<relation>/negative_matrix.tsv.translated
//! <out>/data_input/<relation>/test_matrix.tsv.translated
//! <out>/data_input/<relation>/dev_matrix.tsv.translated
//! ```
//!
//! Instances without recorded paths are left out of every file, since the encoder cannot
//! represent them.

pub mod vocab_files;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::atomic::atomic_replace_directory;
use crate::error::{RelpathError, Result};
use crate::ingest::{EntityTypes, Instance, Label, Split, Subset};
use crate::paths::{PathIndex, PathSet, RelationPaths, TRANSLATED_PATHS_SEPARATOR};
use crate::vocab::Vocabulary;

pub const VOCAB_DIR: &str = "vocab";
pub const DATA_DIR: &str = "data_input";
pub const POSITIVE_FILE: &str = "positive_matrix.tsv.translated";
pub const NEGATIVE_FILE: &str = "negative_matrix.tsv.translated";
pub const TEST_FILE: &str = "test_matrix.tsv.translated";
pub const DEV_FILE: &str = "dev_matrix.tsv.translated";

#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Also write `entity_vocab.txt`.
    pub entity_vocab: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationStats {
    pub relations: usize,
    pub lines: usize,
    /// Instances left out for lack of paths.
    pub excluded: usize,
    pub typed_entities: usize,
}

/// Join one path set in its translated form.
pub fn translated_field(paths: &PathSet) -> String {
    paths
        .iter()
        .map(|p| p.translated())
        .collect::<Vec<_>>()
        .join(TRANSLATED_PATHS_SEPARATOR)
}

struct DataWriter<'a> {
    paths: &'a RelationPaths,
    stats: &'a mut TranslationStats,
}

impl DataWriter<'_> {
    /// Write the lines of one instance; one line per non-empty occurrence.
    fn write_instance(&mut self, out: &mut impl Write, instance: &Instance, with_label: bool) -> Result<()> {
        let sets: Vec<&PathSet> = self
            .paths
            .occurrences(&instance.subject, &instance.object)
            .unwrap_or(&[])
            .iter()
            .filter(|set| !set.is_empty())
            .collect();

        if sets.is_empty() {
            self.stats.excluded += 1;
            return Ok(());
        }

        for set in sets {
            write!(out, "{}\t{}\t{}", instance.subject, instance.object, translated_field(set))?;
            if with_label {
                write!(out, "\t{}", instance.label)?;
            }
            writeln!(out)?;
            self.stats.lines += 1;
        }
        Ok(())
    }
}

fn write_relation_data(
    dir: &Path,
    split: &Split,
    relation: &str,
    paths: &RelationPaths,
    stats: &mut TranslationStats,
) -> Result<()> {
    fs::create_dir_all(dir)?;
    let mut writer = DataWriter { paths, stats };
    let instances = |subset| split.instances(relation, subset).into_iter().flatten();

    let mut positive = BufWriter::new(File::create(dir.join(POSITIVE_FILE))?);
    let mut negative = BufWriter::new(File::create(dir.join(NEGATIVE_FILE))?);
    for instance in instances(Subset::Training) {
        let out = match instance.label {
            Label::Positive => &mut positive,
            Label::Negative => &mut negative,
        };
        writer.write_instance(out, instance, false)?;
    }
    positive.flush()?;
    negative.flush()?;

    for (subset, file) in [(Subset::Testing, TEST_FILE), (Subset::Development, DEV_FILE)] {
        let mut out = BufWriter::new(File::create(dir.join(file))?);
        for instance in instances(subset) {
            writer.write_instance(&mut out, instance, true)?;
        }
        out.flush()?;
    }

    Ok(())
}

/// Write the full dataset for `split` to `out_dir`, replacing it atomically.
pub fn write_dataset(
    out_dir: &Path,
    split: &Split,
    index: &PathIndex,
    vocab: &Vocabulary,
    entity_types: Option<&EntityTypes>,
    options: &TranslateOptions,
) -> Result<TranslationStats> {
    for relation in split.relations() {
        if index.relation(relation).is_none() {
            return Err(RelpathError::Schema(format!("no paths were read for relation {}", relation)));
        }
    }

    let mut stats = TranslationStats::default();
    atomic_replace_directory(out_dir, |tmp| {
        let vocab_dir = tmp.join(VOCAB_DIR);
        fs::create_dir_all(&vocab_dir)?;
        vocab_files::write_domain_label(&vocab_dir)?;
        vocab_files::write_relation_vocab(&vocab_dir, vocab)?;
        if options.entity_vocab {
            vocab_files::write_entity_vocab(&vocab_dir, vocab)?;
        }
        if let Some(types) = entity_types {
            stats.typed_entities = vocab_files::write_entity_types(&vocab_dir, vocab, types)?;
        }

        let data_dir = tmp.join(DATA_DIR);
        for (relation, paths) in split
            .relations()
            .filter_map(|relation| index.relation(relation).map(|paths| (relation, paths)))
        {
            log::debug!("Writing data for {}", relation);
            write_relation_data(&data_dir.join(relation), split, relation, paths, &mut stats)?;
            stats.relations += 1;
        }
        Ok(())
    })?;

    log::info!(
        "Wrote {} lines for {} relations to {} ({} instances without paths left out)",
        stats.lines,
        stats.relations,
        out_dir.display(),
        stats.excluded
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::{PathForm, PathKind};
    use tempfile::TempDir;

    fn set(paths: &[PathForm]) -> PathSet {
        paths.iter().cloned().collect()
    }

    fn rel(tokens: &[&str]) -> PathForm {
        PathForm::RelationOnly(tokens.iter().map(|s| s.to_string()).collect())
    }

    fn vocab() -> Vocabulary {
        let mut vocab = Vocabulary::new();
        for entity in ["a", "b", "c", "d"] {
            vocab.intern_entity(entity).unwrap();
        }
        vocab.intern_relation("r1").unwrap();
        vocab
    }

    fn index_with(paths: RelationPaths, multiple: bool) -> PathIndex {
        let mut index = PathIndex::new(PathKind::RelationOnly, multiple);
        index.relations.insert("rel1".to_string(), paths);
        index
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_pathless_instances_are_excluded() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("dataset");

        let mut split = Split::new();
        split.insert("rel1", Subset::Training, Instance::new("a", "b", Label::Positive)).unwrap();
        split.insert("rel1", Subset::Training, Instance::new("c", "d", Label::Negative)).unwrap();
        let mut paths = RelationPaths::default();
        paths.record("a", "b", set(&[rel(&["r1"])]), false);

        let stats = write_dataset(&out, &split, &index_with(paths, false), &vocab(), None, &TranslateOptions::default())
            .unwrap();

        let data = out.join(DATA_DIR).join("rel1");
        assert_eq!(read(&data.join(POSITIVE_FILE)), "a\tb\tr1\n");
        assert_eq!(read(&data.join(NEGATIVE_FILE)), "");
        assert_eq!(read(&data.join(TEST_FILE)), "");
        // no development subset still gives a dev file
        assert_eq!(read(&data.join(DEV_FILE)), "");
        assert_eq!(stats.excluded, 1);
        assert_eq!(stats.lines, 1);
        assert!(out.join(VOCAB_DIR).join(vocab_files::DOMAIN_LABEL_FILE).exists());
        assert!(!out.join(VOCAB_DIR).join(vocab_files::ENTITY_VOCAB_FILE).exists());
    }

    #[test]
    fn test_test_and_dev_files_carry_labels() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("dataset");

        let mut split = Split::new();
        split.insert("rel1", Subset::Testing, Instance::new("a", "b", Label::Negative)).unwrap();
        split.insert("rel1", Subset::Development, Instance::new("c", "d", Label::Positive)).unwrap();
        let mut paths = RelationPaths::default();
        paths.record("a", "b", set(&[rel(&["r1"]), rel(&["r1", "_r1"])]), false);
        paths.record("c", "d", set(&[rel(&["r1"])]), false);

        let options = TranslateOptions { entity_vocab: true };
        write_dataset(&out, &split, &index_with(paths, false), &vocab(), None, &options).unwrap();

        let data = out.join(DATA_DIR).join("rel1");
        assert_eq!(read(&data.join(TEST_FILE)), "a\tb\tr1###r1-_r1\t-1\n");
        assert_eq!(read(&data.join(DEV_FILE)), "c\td\tr1\t1\n");
        assert!(out.join(VOCAB_DIR).join(vocab_files::ENTITY_VOCAB_FILE).exists());
    }

    #[test]
    fn test_multiple_instances_write_a_line_per_occurrence() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("dataset");

        let mut split = Split::new();
        split.insert("rel1", Subset::Training, Instance::new("a", "b", Label::Positive)).unwrap();
        let mut paths = RelationPaths::default();
        paths.record("a", "b", set(&[rel(&["r1"])]), true);
        paths.record("a", "b", set(&[rel(&["r1", "r1"])]), true);

        write_dataset(&out, &split, &index_with(paths, true), &vocab(), None, &TranslateOptions::default())
            .unwrap();
        let data = out.join(DATA_DIR).join("rel1");
        assert_eq!(read(&data.join(POSITIVE_FILE)), "a\tb\tr1\na\tb\tr1-r1\n");
    }

    #[test]
    fn test_entity_bearing_paths_lose_endpoints() {
        let path = PathForm::EntityBearing(["a", "r1", "b", "r2", "c"].iter().map(|s| s.to_string()).collect());
        assert_eq!(translated_field(&set(&[path])), "r1-b-r2");
    }

    #[test]
    fn test_relation_missing_from_index_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let mut split = Split::new();
        split.insert("rel2", Subset::Training, Instance::new("a", "b", Label::Positive)).unwrap();
        let index = index_with(RelationPaths::default(), false);
        let err = write_dataset(temp_dir.path().join("out").as_path(), &split, &index, &vocab(), None, &TranslateOptions::default())
            .unwrap_err();
        assert!(matches!(err, RelpathError::Schema(_)));
        assert!(!temp_dir.path().join("out").exists());
    }

    #[test]
    fn test_rewrite_replaces_previous_dataset() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("dataset");
        fs::create_dir_all(out.join("stale")).unwrap();

        let mut split = Split::new();
        split.add_subset("rel1", Subset::Training);
        write_dataset(&out, &split, &index_with(RelationPaths::default(), false), &vocab(), None, &TranslateOptions::default())
            .unwrap();
        assert!(!out.join("stale").exists());
        assert!(out.join(DATA_DIR).join("rel1").join(POSITIVE_FILE).exists());
    }
}
