use walkdir::WalkDir;
use std::path::{Path, PathBuf};
use crate::error::{RelpathError, Result};

/// A per-relation directory found under a split or path directory.
#[derive(Debug, Clone)]
pub struct RelationDir {
    pub relation: String,
    pub path: PathBuf,
}

/// Discover the per-relation subdirectories of `root`, sorted by relation name.
///
/// Only the immediate children are considered; files at the top level (e.g. `params.json`)
/// and leftover `*_TMP` directories from an interrupted replace are skipped.
pub fn discover_relation_dirs(root: &Path) -> Result<Vec<RelationDir>> {
    if !root.is_dir() {
        return Err(RelpathError::Config(format!(
            "not a directory: {}",
            root.display()
        )));
    }

    let mut dirs = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| RelpathError::Io(e.into()))?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let relation = entry.file_name().to_string_lossy().to_string();
        if relation.ends_with("_TMP") {
            log::warn!("Skipping leftover temporary directory {}", entry.path().display());
            continue;
        }

        dirs.push(RelationDir {
            relation,
            path: entry.path().to_path_buf(),
        });
    }

    log::debug!("Discovered {} relation directories in {}", dirs.len(), root.display());
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use std::fs;

    #[test]
    fn test_discover_relation_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("hypernym")).unwrap();
        fs::create_dir_all(root.join("also_see/nested")).unwrap();
        fs::create_dir_all(root.join("has_part_TMP")).unwrap();
        fs::write(root.join("params.json"), "{}").unwrap();

        let dirs = discover_relation_dirs(root).unwrap();
        let names: Vec<_> = dirs.iter().map(|d| d.relation.as_str()).collect();

        // nested dirs and the leftover temporary are not relations
        assert_eq!(names, vec!["also_see", "hypernym"]);
        assert!(dirs[1].path.ends_with("hypernym"));
    }

    #[test]
    fn test_discover_relation_dirs_empty() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = discover_relation_dirs(temp_dir.path()).unwrap();
        assert!(dirs.is_empty());
    }

    #[test]
    fn test_discover_relation_dirs_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        assert!(discover_relation_dirs(&missing).is_err());
    }
}
