use anyhow::{Context, Result};
use clap::Parser;
use relpath::cache::InferenceCache;
use relpath::graph::infer_entities;
use relpath::paths::{PathDirectory, PathForm};
use relpath::pipeline::Inputs;
use relpath::Config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "infer")]
#[command(about = "Recover the entity sequences behind relation-only paths")]
struct Args {
    /// Source entity
    #[arg(required_unless_present = "path_dir")]
    source: Option<String>,

    /// Target entity
    #[arg(required_unless_present = "path_dir")]
    target: Option<String>,

    /// Relation-only path, e.g. r1-_r2
    #[arg(required_unless_present = "path_dir")]
    relation_path: Option<String>,

    /// Report inference counts for every recorded path of a relation in this path directory
    #[arg(long, requires = "relation")]
    path_dir: Option<PathBuf>,

    /// Relation-under-study for --path-dir
    #[arg(long)]
    relation: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;
    config.init_logging();
    let inputs = Inputs::load(&config)?;

    match (args.path_dir, args.relation) {
        (Some(path_dir), Some(relation)) => report_directory(&config, &inputs, &path_dir, &relation),
        _ => {
            let (Some(source), Some(target), Some(relation_path)) =
                (args.source, args.target, args.relation_path)
            else {
                anyhow::bail!("Usage: infer <source> <target> <relation-path>");
            };
            let outcome = infer_entities(
                &inputs.graph,
                &inputs.vocab,
                &source,
                &target,
                &relation_path,
                config.search_budget(),
            )?;
            for form in outcome.forms(&inputs.vocab)? {
                println!("{}", form);
            }
            if outcome.truncated {
                eprintln!("(search budget exhausted; results may be incomplete)");
            }
            Ok(())
        }
    }
}

fn report_directory(config: &Config, inputs: &Inputs, path_dir: &std::path::Path, relation: &str) -> Result<()> {
    let directory = PathDirectory::open(path_dir)?;
    let (index, _) = directory.read_paths(&inputs.split)?;
    let paths = index
        .relation(relation)
        .with_context(|| format!("Relation {} is not in the split", relation))?;

    let cache = InferenceCache::new(config.inference.cache_capacity, config.search_budget());
    let mut pairs = 0usize;
    let mut without_entities = 0usize;
    let mut truncated = 0usize;

    for ((subject, object), sets) in &paths.pairs {
        let (Some(source), Some(target)) = (inputs.vocab.entity(subject), inputs.vocab.entity(object)) else {
            log::warn!("Pair ({}, {}) is not in the graph", subject, object);
            continue;
        };
        pairs += 1;
        for path in sets.iter().flatten() {
            let steps = match path {
                PathForm::RelationOnly(_) => path
                    .relation_tokens()
                    .iter()
                    .map(|token| inputs.vocab.parse_step(token))
                    .collect::<relpath::Result<Vec<_>>>()?,
                PathForm::EntityBearing(_) => continue,
            };
            let outcome = cache.get_or_infer(&inputs.graph, source, target, &steps);
            if outcome.paths.is_empty() {
                without_entities += 1;
                log::debug!("No entity sequence for {} between {} and {}", path, subject, object);
            }
            truncated += usize::from(outcome.truncated);
        }
    }

    println!("\n=== Entity Inference: {} ===\n", relation);
    println!("Pairs:                         {}", pairs);
    println!("Distinct queries cached:       {}", cache.len());
    println!("Paths without entity sequence: {}", without_entities);
    println!("Searches stopped by budget:    {}", truncated);

    Ok(())
}
