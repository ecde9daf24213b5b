//! Entity → type hierarchy side table.
//!
//! Keys are untyped surface names (`bowl`); values are ordered type labels. The file is a JSON
//! object and its key order is kept, since type vocabulary indices follow first appearance.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{RelpathError, Result};

/// Ordered untyped-name → types table.
#[derive(Debug, Clone, Default)]
pub struct EntityTypes {
    entries: Vec<(String, Vec<String>)>,
}

impl EntityTypes {
    pub fn new(entries: Vec<(String, Vec<String>)>) -> Self {
        Self { entries }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let map: Map<String, Value> = serde_json::from_str(content)?;
        let mut entries = Vec::with_capacity(map.len());
        for (entity, types) in map {
            let types: Vec<String> = serde_json::from_value(types).map_err(|e| {
                RelpathError::Schema(format!("types of {:?} are not a list of strings: {}", entity, e))
            })?;
            entries.push((entity, types));
        }
        Ok(Self { entries })
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let types = Self::from_json_str(&content)?;
        log::info!("Read types for {} entities from {}", types.len(), path.display());
        Ok(types)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(e, t)| (e.as_str(), t.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_order_is_preserved() {
        let types = EntityTypes::from_json_str(
            r#"{"zebra": ["animal", "entity"], "apple": ["fruit", "entity"]}"#,
        )
        .unwrap();
        let names: Vec<&str> = types.iter().map(|(e, _)| e).collect();
        assert_eq!(names, vec!["zebra", "apple"]);
        assert_eq!(types.len(), 2);
    }

    #[test]
    fn test_non_list_types_rejected() {
        let err = EntityTypes::from_json_str(r#"{"zebra": "animal"}"#).unwrap_err();
        assert!(matches!(err, RelpathError::Schema(_)));
    }
}
