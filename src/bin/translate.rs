use anyhow::Result;
use clap::Parser;
use relpath::pipeline::{run_translation, Inputs};
use relpath::translate::TranslateOptions;
use relpath::Config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "translate")]
#[command(about = "Translate a path directory into the downstream path-encoder dataset")]
struct Args {
    /// Path directory to read (defaults to the configured one)
    #[arg(long)]
    path_dir: Option<PathBuf>,

    /// Output directory (defaults to the configured one); replaced as a whole
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Entity to type-hierarchy JSON table
    #[arg(long)]
    entity_types: Option<PathBuf>,

    /// Also write the entity vocabulary
    #[arg(long)]
    entity_vocab: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load()?;
    config.init_logging();

    let path_dir = args.path_dir.unwrap_or_else(|| config.path_dir().to_path_buf());
    let output_dir = args.output_dir.unwrap_or_else(|| config.output_dir().to_path_buf());
    let entity_types = args.entity_types.or_else(|| config.data.entity_types_file.clone());
    let options = TranslateOptions {
        entity_vocab: args.entity_vocab || config.output.entity_vocab,
    };

    let inputs = Inputs::load(&config)?;
    let (read_stats, stats) = run_translation(
        &inputs,
        &path_dir,
        &output_dir,
        entity_types.as_deref(),
        &options,
    )?;

    println!("\n=== Translation Summary ===\n");
    println!("Instances read:            {}", read_stats.instances);
    println!("Instances without paths:   {} ({:.2}%)", read_stats.misses, read_stats.miss_ratio() * 100.0);
    println!("Avg paths per instance:    {:.2}", read_stats.avg_paths_per_instance());
    println!("Avg path length:           {:.2}", read_stats.avg_path_length());
    println!("Relations written:         {}", stats.relations);
    println!("Lines written:             {}", stats.lines);
    println!("Instances left out:        {}", stats.excluded);
    if entity_types.is_some() {
        println!("Typed entities:            {}", stats.typed_entities);
    }

    Ok(())
}
