//! Labeled train/dev/test split.
//!
//! On disk a split is a directory with one subdirectory per relation-under-study, each holding
//! `training.tsv`, `testing.tsv` and optionally `development.tsv` with
//! `subject<TAB>object<TAB>label` lines.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{RelpathError, Result};
use crate::ingest::discover_relation_dirs;

/// Instance label, written `1` / `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Positive,
    Negative,
}

impl Label {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim() {
            "1" | "+1" => Ok(Label::Positive),
            "-1" => Ok(Label::Negative),
            other => Err(RelpathError::Schema(format!("label is not recognized: {:?}", other))),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Positive => write!(f, "1"),
            Label::Negative => write!(f, "-1"),
        }
    }
}

/// Named subset of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subset {
    Training,
    Testing,
    Development,
}

impl Subset {
    pub const ALL: [Subset; 3] = [Subset::Training, Subset::Testing, Subset::Development];

    pub fn name(self) -> &'static str {
        match self {
            Subset::Training => "training",
            Subset::Testing => "testing",
            Subset::Development => "development",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Subset::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One labeled `(subject, object)` instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Instance {
    pub subject: String,
    pub object: String,
    pub label: Label,
}

impl Instance {
    pub fn new(subject: impl Into<String>, object: impl Into<String>, label: Label) -> Self {
        Self {
            subject: subject.into(),
            object: object.into(),
            label,
        }
    }
}

/// Relation → subset → instances.
#[derive(Debug, Clone, Default)]
pub struct Split {
    relations: BTreeMap<String, BTreeMap<Subset, BTreeSet<Instance>>>,
}

impl Split {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a relation with an empty subset, so it exists even without instances.
    pub fn add_subset(&mut self, relation: &str, subset: Subset) {
        self.relations
            .entry(relation.to_string())
            .or_default()
            .entry(subset)
            .or_default();
    }

    /// Add an instance. `(subject, object, label)` must be unique across a relation's subsets.
    pub fn insert(&mut self, relation: &str, subset: Subset, instance: Instance) -> Result<()> {
        let subsets = self.relations.entry(relation.to_string()).or_default();
        if let Some((existing, _)) = subsets.iter().find(|(_, set)| set.contains(&instance)) {
            return Err(RelpathError::Schema(format!(
                "duplicate instance ({}, {}, {}) for relation {} (already in {})",
                instance.subject, instance.object, instance.label, relation, existing
            )));
        }
        subsets.entry(subset).or_default().insert(instance);
        Ok(())
    }

    pub fn relations(&self) -> impl Iterator<Item = &str> {
        self.relations.keys().map(String::as_str)
    }

    pub fn subsets(&self, relation: &str) -> impl Iterator<Item = Subset> + '_ {
        self.relations
            .get(relation)
            .into_iter()
            .flat_map(|subsets| subsets.keys().copied())
    }

    pub fn has_subset(&self, relation: &str, subset: Subset) -> bool {
        self.relations
            .get(relation)
            .map(|subsets| subsets.contains_key(&subset))
            .unwrap_or(false)
    }

    /// Instances of one subset; `None` when the subset is absent.
    pub fn instances(&self, relation: &str, subset: Subset) -> Option<&BTreeSet<Instance>> {
        self.relations.get(relation)?.get(&subset)
    }

    pub fn contains(&self, relation: &str, subset: Subset, instance: &Instance) -> bool {
        self.instances(relation, subset)
            .map(|set| set.contains(instance))
            .unwrap_or(false)
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    /// Read a split directory.
    pub fn read_dir(root: &Path) -> Result<Self> {
        let mut split = Split::new();

        for dir in discover_relation_dirs(root)? {
            let mut found = 0;
            for subset in Subset::ALL {
                let path = dir.path.join(format!("{}.tsv", subset.name()));
                if !path.exists() {
                    continue;
                }
                found += 1;
                split.add_subset(&dir.relation, subset);
                for instance in read_instances(&path)? {
                    split.insert(&dir.relation, subset, instance)?;
                }
            }
            if found == 0 {
                log::warn!("Relation directory {} has no subset files", dir.path.display());
            }
        }

        log::info!("Read split with {} relations from {}", split.relation_count(), root.display());
        Ok(split)
    }
}

fn read_instances(path: &Path) -> Result<Vec<Instance>> {
    let reader = BufReader::new(File::open(path)?);
    let mut instances = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            return Err(RelpathError::Schema(format!(
                "{}:{}: expected subject, object and label, found {} fields",
                path.display(),
                line_no + 1,
                fields.len()
            )));
        }
        let label = Label::parse(fields[2])
            .map_err(|e| RelpathError::Schema(format!("{}:{}: {}", path.display(), line_no + 1, e)))?;
        instances.push(Instance::new(fields[0].trim(), fields[1].trim(), label));
    }

    Ok(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_label_parse_and_display() {
        assert_eq!(Label::parse("1").unwrap(), Label::Positive);
        assert_eq!(Label::parse("-1").unwrap(), Label::Negative);
        assert!(Label::parse("0").is_err());
        assert_eq!(Label::Negative.to_string(), "-1");
    }

    #[test]
    fn test_subset_names() {
        assert_eq!(Subset::from_name("development"), Some(Subset::Development));
        assert_eq!(Subset::from_name("dev"), None);
        assert_eq!(Subset::Testing.to_string(), "testing");
    }

    #[test]
    fn test_duplicate_across_subsets_rejected() {
        let mut split = Split::new();
        let inst = Instance::new("a", "b", Label::Positive);
        split.insert("rel1", Subset::Training, inst.clone()).unwrap();
        assert!(split.insert("rel1", Subset::Testing, inst.clone()).is_err());
        // same pair with the other label is a different instance
        split
            .insert("rel1", Subset::Testing, Instance::new("a", "b", Label::Negative))
            .unwrap();
        // other relations are independent
        split.insert("rel2", Subset::Training, inst).unwrap();
    }

    #[test]
    fn test_read_dir() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("rel1")).unwrap();
        fs::write(root.join("rel1/training.tsv"), "a\tb\t1\nc\td\t-1\n").unwrap();
        fs::write(root.join("rel1/testing.tsv"), "e\tf\t1\n").unwrap();

        let split = Split::read_dir(root).unwrap();
        assert_eq!(split.relations().collect::<Vec<_>>(), vec!["rel1"]);
        assert_eq!(split.instances("rel1", Subset::Training).unwrap().len(), 2);
        assert!(!split.has_subset("rel1", Subset::Development));
        assert!(split.contains("rel1", Subset::Testing, &Instance::new("e", "f", Label::Positive)));
        assert_eq!(
            split.subsets("rel1").collect::<Vec<_>>(),
            vec![Subset::Training, Subset::Testing]
        );
    }

    #[test]
    fn test_read_dir_bad_label() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("rel1")).unwrap();
        fs::write(root.join("rel1/training.tsv"), "a\tb\t2\n").unwrap();
        let err = Split::read_dir(root).unwrap_err();
        assert!(matches!(err, RelpathError::Schema(_)));
    }
}
