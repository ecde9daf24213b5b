use anyhow::Result;
use relpath::paths::{PathKind, PathParams};
use relpath::pipeline::{run_extraction, run_translation, Inputs};
use relpath::translate::TranslateOptions;
use relpath::Config;

fn main() -> Result<()> {
    let config = Config::load()?;
    // RUST_LOG overrides data.log_level
    config.init_logging();
    log::info!("Starting relpath v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("verify");

    match command {
        "run" => run_pipeline(&config)?,
        "verify" => run_verification(&config)?,
        other => {
            log::warn!("Unknown command {:?}, running verify", other);
            run_verification(&config)?;
        }
    }

    Ok(())
}

/// Extract paths, then translate them into the downstream dataset.
fn run_pipeline(config: &Config) -> Result<()> {
    let inputs = Inputs::load(config)?;

    run_extraction(config, &inputs)?;

    let options = TranslateOptions {
        entity_vocab: config.output.entity_vocab,
    };
    let (_, stats) = run_translation(
        &inputs,
        config.path_dir(),
        config.output_dir(),
        config.data.entity_types_file.as_deref(),
        &options,
    )?;
    log::info!(
        "Pipeline complete: {} relations, {} lines written",
        stats.relations,
        stats.lines
    );

    Ok(())
}

/// Load inputs and check that the configured path directory can be read.
fn run_verification(config: &Config) -> Result<()> {
    log::info!("Configuration loaded successfully");
    log::info!("Edges: {}", config.data.edges_file.display());
    log::info!("Split: {}", config.data.split_dir.display());

    let inputs = Inputs::load(config)?;
    log::info!(
        "Graph has {} entities, {} relations, {} edges; split has {} relations",
        inputs.vocab.entity_count(),
        inputs.vocab.relation_count(),
        inputs.graph.edge_count(),
        inputs.split.relation_count()
    );

    if config.path_dir().exists() {
        let params = PathParams::read(config.path_dir())?;
        log::info!(
            "Path directory {} holds {:?} paths up to length {}",
            config.path_dir().display(),
            PathKind::from_include_entity(params.include_entity),
            params.max_length
        );
        if params != config.path_params() {
            log::warn!("Path directory parameters differ from the extraction config; re-run extraction to refresh");
        }
    } else {
        log::info!("No path directory yet at {}", config.path_dir().display());
    }

    log::info!("Ready for extraction");

    Ok(())
}
