use anyhow::Result;
use clap::Parser;
use relpath::pipeline::{run_extraction, Inputs};
use relpath::Config;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "extract")]
#[command(about = "Enumerate graph paths for every instance of the split and write a path directory")]
struct Args {
    /// Override the maximum path length from the config
    #[arg(long)]
    max_length: Option<usize>,

    /// Override the path directory from the config
    #[arg(long)]
    path_dir: Option<PathBuf>,

    /// Keep interior entities in the written paths
    #[arg(long)]
    include_entity: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load()?;
    config.init_logging();
    if let Some(max_length) = args.max_length {
        if max_length == 0 {
            anyhow::bail!("--max-length must be greater than 0");
        }
        config.extraction.max_length = max_length;
    }
    if let Some(path_dir) = args.path_dir {
        config.data.path_dir = path_dir;
    }
    if args.include_entity {
        config.extraction.include_entity = true;
    }

    log::info!(
        "Extracting paths up to length {} into {}",
        config.extraction.max_length,
        config.path_dir().display()
    );

    let start = Instant::now();
    let inputs = Inputs::load(&config)?;
    run_extraction(&config, &inputs)?;

    log::info!("Extraction finished in {:.2?}", start.elapsed());
    Ok(())
}
