//! cellhood - per-cell neighborhood matrices for serial-section tissue
//!
//! Computes the neighbor list of every cell across a stack of aligned
//! sections, then summarizes each cell's neighborhood as counts and minimum
//! distances per cell type, either within its own section (2D) or across the
//! whole volume (3D).

use std::path::PathBuf;

use anyhow::{Context, Result};
use cellhood_core::{NeighborhoodPipeline, PassSummary, PipelineConfig, SearchStrategy};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Neighbor search strategy.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    /// R-tree radius queries
    Indexed,
    /// Distance to every cell
    Exhaustive,
}

impl From<Strategy> for SearchStrategy {
    fn from(s: Strategy) -> Self {
        match s {
            Strategy::Indexed => Self::Indexed,
            Strategy::Exhaustive => Self::Exhaustive,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble 3D coordinates and write the neighbor list of every cell
    Neighbors,

    /// Write 2D summary tables (neighbors within the cell's own section)
    Section2d {
        /// Sections to summarize (default: sections from the configuration)
        #[arg(short = 's', long = "section")]
        sections: Vec<String>,
    },

    /// Write the 3D summary table (neighbors across all sections)
    Volume3d,

    /// Neighbor list, configured 2D sections, then the 3D table
    Run,

    /// Print the effective configuration as JSON
    Config,
}

/// Per-cell neighborhood matrices for serial-section tissue.
#[derive(Parser, Debug)]
#[command(name = "cellhood")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// JSON configuration file; flags below override its values
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Directory with metadata.csv and the <section>_aligned.csv files
    #[arg(short = 'i', long = "input-dir", global = true)]
    input_dir: Option<PathBuf>,

    /// Directory receiving the neighbor list and summary tables
    #[arg(short = 'o', long = "output-dir", global = true)]
    output_dir: Option<PathBuf>,

    /// Neighbor discovery radius in microns
    #[arg(long = "discovery-radius", global = true)]
    discovery_radius: Option<f64>,

    /// Aggregation radius in microns
    #[arg(short = 'r', long = "radius", global = true)]
    radius: Option<f64>,

    /// Neighbor search strategy
    #[arg(long, value_enum, global = true)]
    strategy: Option<Strategy>,

    /// Worker threads (default: available parallelism)
    #[arg(short = 'j', long, global = true)]
    threads: Option<usize>,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue, global = true)]
    debug: bool,
}

/// Load the configuration file, if any, and apply command line overrides.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(dir) = &args.input_dir {
        config.input_dir = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(r) = args.discovery_radius {
        config.discovery_radius_um = r;
    }
    if let Some(r) = args.radius {
        config.aggregation_radius_um = r;
    }
    if let Some(s) = args.strategy {
        config.strategy = s.into();
    }
    if args.threads.is_some() {
        config.threads = args.threads;
    }
    if let Command::Section2d { sections } = &args.command
        && !sections.is_empty()
    {
        config.sections = sections.clone();
    }

    config.validate()?;
    Ok(config)
}

fn init_logging(debug: bool) {
    let default_filter = if debug {
        "cellhood=debug,cellhood_core=debug"
    } else {
        "cellhood=info,cellhood_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn report(summary: &PassSummary) {
    println!(
        "{}: {} records -> {} ({:.1}s)",
        summary.pass,
        summary.records,
        summary.output.display(),
        summary.elapsed.as_secs_f64()
    );
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let config = build_config(&args)?;
    if let Command::Config = args.command {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let pipeline = NeighborhoodPipeline::new(config)?;
    let summaries = match &args.command {
        Command::Neighbors => vec![pipeline.compute_neighbor_list()?],
        Command::Section2d { .. } => {
            let metadata = pipeline.load_metadata()?;
            pipeline
                .config()
                .sections
                .iter()
                .map(|section| {
                    pipeline
                        .compute_section_table_with(section, &metadata)
                        .with_context(|| format!("2D pass for {section}"))
                })
                .collect::<Result<Vec<_>>>()?
        }
        Command::Volume3d => vec![pipeline.compute_volume_table()?],
        Command::Run => pipeline.run_all()?,
        Command::Config => Vec::new(),
    };

    for summary in &summaries {
        report(summary);
    }
    Ok(())
}
