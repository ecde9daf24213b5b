use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::graph::SearchBudget;
use crate::paths::PathParams;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Input and output locations
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Edge list, one `subject<TAB>relation<TAB>object` triple per line.
    pub edges_file: PathBuf,
    /// Split directory: `<relation>/<subset>.tsv`.
    pub split_dir: PathBuf,
    /// Path directory written by extraction and read by translation.
    pub path_dir: PathBuf,
    /// Translated dataset directory.
    pub output_dir: PathBuf,
    #[serde(default)]
    pub entity_types_file: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Path enumeration settings, recorded in the path directory's `params.json`
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    pub max_length: usize,
    #[serde(default)]
    pub include_entity: bool,
    #[serde(default = "default_include_path_len1")]
    pub include_path_len1: bool,
    #[serde(default)]
    pub ignore_no_path_entity_pair: bool,
    #[serde(default)]
    pub multiple_instances_per_pair: bool,
    #[serde(default = "default_max_paths_per_pair")]
    pub max_paths_per_pair: usize,
    #[serde(default = "default_max_instances_per_pair")]
    pub max_instances_per_pair: usize,
    /// Branch expansions allowed per pair; unbounded when absent.
    #[serde(default)]
    pub max_expansions_per_pair: Option<usize>,
}

fn default_include_path_len1() -> bool {
    true
}

fn default_max_paths_per_pair() -> usize {
    1000
}

fn default_max_instances_per_pair() -> usize {
    1
}

/// Entity inference settings
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            max_results: default_max_results(),
            max_expansions: default_max_expansions(),
        }
    }
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_max_results() -> usize {
    1000
}

fn default_max_expansions() -> usize {
    100_000
}

/// Translated dataset settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Also write `entity_vocab.txt`.
    #[serde(default)]
    pub entity_vocab: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Every directive of an env_logger filter (`info`, `relpath=debug`) must end in a known level.
fn check_log_filter(filter: &str) -> Result<()> {
    for directive in filter.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        let directive = directive.split_once('/').map_or(directive, |(d, _)| d);
        let level = directive.rsplit_once('=').map_or(directive, |(_, level)| level);
        if level.parse::<log::LevelFilter>().is_err() {
            anyhow::bail!("data.log_level has an unknown level {:?} in {:?}", level, filter);
        }
    }
    Ok(())
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in RELPATH_CONFIG environment variable
    /// 2. ./relpath.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("RELPATH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("relpath.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config = Self::from_toml_str(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Parse without validating.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Start logging, filtered by `data.log_level` unless `RUST_LOG` is set.
    pub fn init_logging(&self) {
        env_logger::Builder::from_env(
            env_logger::Env::default()
                .filter_or("RUST_LOG", self.data.log_level.as_str())
        ).init();
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        check_log_filter(&self.data.log_level)?;

        if !self.data.split_dir.is_dir() {
            anyhow::bail!(
                "split_dir must be an existing directory: {}",
                self.data.split_dir.display()
            );
        }

        if !self.data.edges_file.is_file() {
            anyhow::bail!("edges_file does not exist: {}", self.data.edges_file.display());
        }

        if let Some(types) = &self.data.entity_types_file {
            if !types.is_file() {
                anyhow::bail!("entity_types_file does not exist: {}", types.display());
            }
        }

        if self.extraction.max_length == 0 {
            anyhow::bail!("extraction.max_length must be greater than 0");
        }

        if self.extraction.max_paths_per_pair == 0 {
            anyhow::bail!("extraction.max_paths_per_pair must be greater than 0");
        }

        if self.extraction.multiple_instances_per_pair && self.extraction.max_instances_per_pair == 0 {
            anyhow::bail!("extraction.max_instances_per_pair must be greater than 0");
        }

        if self.extraction.max_expansions_per_pair == Some(0) {
            anyhow::bail!("extraction.max_expansions_per_pair must be greater than 0 when set");
        }

        if self.inference.cache_capacity == 0 {
            anyhow::bail!("inference.cache_capacity must be greater than 0");
        }

        if self.inference.max_results == 0 || self.inference.max_expansions == 0 {
            anyhow::bail!("inference.max_results and inference.max_expansions must be greater than 0");
        }

        Ok(())
    }

    /// Parameters written to `params.json` by extraction.
    pub fn path_params(&self) -> PathParams {
        let e = &self.extraction;
        PathParams {
            max_length: e.max_length,
            include_entity: e.include_entity,
            include_path_len1: e.include_path_len1,
            ignore_no_path_entity_pair: e.ignore_no_path_entity_pair,
            multiple_instances_per_pair: e.multiple_instances_per_pair,
            max_paths_per_pair: Some(e.max_paths_per_pair),
            max_instances_per_pair: e.multiple_instances_per_pair.then_some(e.max_instances_per_pair),
        }
    }

    pub fn search_budget(&self) -> SearchBudget {
        SearchBudget {
            max_results: self.inference.max_results,
            max_expansions: self.inference.max_expansions,
        }
    }

    pub fn path_dir(&self) -> &Path {
        &self.data.path_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.data.output_dir
    }
}
