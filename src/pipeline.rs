//! Config-driven steps shared by the binaries.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::extract::{extract_paths, relation_records};
use crate::graph::{build_graph, AdjacencyGraph};
use crate::ingest::{read_edges, EntityTypes, Split};
use crate::paths::{write_path_directory, PathDirectory, ReadStats};
use crate::translate::{write_dataset, TranslateOptions, TranslationStats};
use crate::vocab::Vocabulary;

/// Graph, vocabulary and split loaded from the configured inputs.
pub struct Inputs {
    pub vocab: Vocabulary,
    pub graph: AdjacencyGraph,
    pub split: Split,
}

impl Inputs {
    pub fn load(config: &Config) -> Result<Self> {
        let edges_file = &config.data.edges_file;
        let triples = read_edges(edges_file)
            .with_context(|| format!("Failed to read edges from {}", edges_file.display()))?;
        let (vocab, graph) = build_graph(&triples).context("Failed to build graph")?;

        let split = Split::read_dir(&config.data.split_dir)
            .with_context(|| format!("Failed to read split from {}", config.data.split_dir.display()))?;

        Ok(Self { vocab, graph, split })
    }
}

/// Enumerate paths for the split and write the configured path directory.
pub fn run_extraction(config: &Config, inputs: &Inputs) -> Result<()> {
    let params = config.path_params();
    let extracted = extract_paths(
        &inputs.graph,
        &inputs.vocab,
        &inputs.split,
        &params,
        config.extraction.max_expansions_per_pair,
    )?;
    write_path_directory(config.path_dir(), &params, &relation_records(&extracted))
        .with_context(|| format!("Failed to write paths to {}", config.path_dir().display()))?;
    Ok(())
}

/// Read `path_dir` against the split and write the translated dataset to `output_dir`.
pub fn run_translation(
    inputs: &Inputs,
    path_dir: &Path,
    output_dir: &Path,
    entity_types_file: Option<&Path>,
    options: &TranslateOptions,
) -> Result<(ReadStats, TranslationStats)> {
    let directory = PathDirectory::open(path_dir)
        .with_context(|| format!("Failed to open path directory {}", path_dir.display()))?;
    let (index, read_stats) = directory.read_paths(&inputs.split)?;

    let entity_types = entity_types_file
        .map(|path| EntityTypes::read(path).with_context(|| format!("Failed to read {}", path.display())))
        .transpose()?;

    let stats = write_dataset(
        output_dir,
        &inputs.split,
        &index,
        &inputs.vocab,
        entity_types.as_ref(),
        options,
    )
    .with_context(|| format!("Failed to write dataset to {}", output_dir.display()))?;
    Ok((read_stats, stats))
}
