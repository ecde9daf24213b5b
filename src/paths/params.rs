//! `params.json`: how the paths of a directory were generated.
//!
//! Two layouts exist. Directories written by this crate use the simple layout, marked by a
//! top-level `"simple"` key. Directories written by the random-walk extractor nest their
//! settings under `operation.features."path finder"`; for those the entity flag comes from
//! the path type factory and the remaining flags are fixed by how that extractor works.
//! Its walks start from both ends of a pair and meet, so a path can have up to twice the
//! configured number of steps.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RelpathError, Result};

/// File name of the parameter side-channel inside a path directory.
pub const PARAMS_FILE: &str = "params.json";

const PATH_FINDER_POINTER: &str = "/operation/features/path finder";
const LEXICALIZED_FACTORY: &str = "LexicalizedPathTypeFactory";

/// Path generation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathParams {
    /// Maximum number of relation steps.
    pub max_length: usize,
    pub include_entity: bool,
    pub include_path_len1: bool,
    pub ignore_no_path_entity_pair: bool,
    pub multiple_instances_per_pair: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_paths_per_pair: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_instances_per_pair: Option<usize>,
}

#[derive(Serialize)]
struct SimpleParamsFile<'a> {
    simple: bool,
    #[serde(flatten)]
    params: &'a PathParams,
}

impl PathParams {
    /// Parse either layout. Missing keys are fatal: they mean the directory was written by an
    /// incompatible tool version.
    pub fn from_value(value: &Value) -> Result<Self> {
        if value.get("simple").is_some() {
            return serde_json::from_value(value.clone())
                .map_err(|e| RelpathError::Config(format!("incompatible simple params.json: {}", e)));
        }

        let finder = value.pointer(PATH_FINDER_POINTER).ok_or_else(|| {
            RelpathError::Config(
                "params.json has neither a \"simple\" key nor an operation.features.\"path finder\" block"
                    .to_string(),
            )
        })?;

        let steps = finder
            .get("number of steps")
            .or_else(|| finder.get("path finding iterations"))
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                RelpathError::Config(
                    "path finder block has no \"number of steps\" or \"path finding iterations\"".to_string(),
                )
            })?;

        let include_entity = finder
            .get("path type factory")
            .and_then(Value::as_str)
            .map(|factory| factory == LEXICALIZED_FACTORY)
            .unwrap_or(false);

        Ok(Self {
            max_length: (steps as usize).saturating_mul(2),
            include_entity,
            include_path_len1: true,
            ignore_no_path_entity_pair: true,
            multiple_instances_per_pair: false,
            max_paths_per_pair: None,
            max_instances_per_pair: None,
        })
    }

    pub fn read(dir: &Path) -> Result<Self> {
        let path = dir.join(PARAMS_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            RelpathError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|e| {
            RelpathError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        Self::from_value(&value)
    }

    /// Write the simple layout.
    pub fn write(&self, dir: &Path) -> Result<()> {
        let file = SimpleParamsFile { simple: true, params: self };
        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(dir.join(PARAMS_FILE), json)?;
        Ok(())
    }
}
