use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use dotview_core::LoadTag;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "dotview")]
#[command(about = "dotview - Interactive dot-plot engine for comparative genomics")]
#[command(version)]
#[command(long_about = "
dotview renders pairwise genome alignments as dot plots. It reads a
section-marked coordinate index plus a byte-indexed coordinate file and
produces SVG snapshots headlessly; coordinate chunks are fetched lazily by
byte range, so large alignment sets never have to be loaded whole.

Examples:
  dotview info --index alignments.idx
  dotview info --index alignments.idx.gz --json
  dotview render --index alignments.idx --coords alignments.coords --out plot.svg
  dotview render --index alignments.idx --coords alignments.coords --out plot.svg \\
      --refs chr1,chr2 --load both --annotations genes.json \\
      --set 'minimum alignment length=500'
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a dot plot to SVG
    Render {
        /// Coordinate index file (plain or .gz)
        #[arg(long, required = true)]
        index: PathBuf,

        /// Coordinate file the index's byte ranges point into (uncompressed)
        #[arg(long, required = true)]
        coords: PathBuf,

        /// Output SVG file
        #[arg(short, long, required = true)]
        out: PathBuf,

        /// Plot width in pixels
        #[arg(long, default_value = "1000")]
        width: u32,

        /// Plot height in pixels
        #[arg(long, default_value = "800")]
        height: u32,

        /// Comma-separated reference names to select
        #[arg(long)]
        refs: Option<String>,

        /// Comma-separated query names to select
        #[arg(long)]
        queries: Option<String>,

        /// Which coordinate chunks to load for the queries in view
        #[arg(long, default_value = "both")]
        load: LoadChoice,

        /// Annotation dataset files (JSON), one track each
        #[arg(long)]
        annotations: Vec<PathBuf>,

        /// Style overrides as 'name=value', repeatable
        #[arg(long)]
        set: Vec<String>,
    },

    /// Inspect a coordinate index
    Info {
        /// Coordinate index file (plain or .gz)
        #[arg(long, required = true)]
        index: PathBuf,

        /// Emit machine-readable JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LoadChoice {
    None,
    Unique,
    Repetitive,
    Both,
}

impl LoadChoice {
    pub fn tag(self) -> Option<LoadTag> {
        match self {
            LoadChoice::None => None,
            LoadChoice::Unique => Some(LoadTag::Unique),
            LoadChoice::Repetitive => Some(LoadTag::Repetitive),
            LoadChoice::Both => Some(LoadTag::Both),
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        std::env::set_var("RUST_LOG", "error");
    } else {
        let level = match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        std::env::set_var("RUST_LOG", level);
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Render {
            index,
            coords,
            out,
            width,
            height,
            refs,
            queries,
            load,
            annotations,
            set,
        } => {
            commands::render::execute(
                index,
                coords,
                out,
                width,
                height,
                refs,
                queries,
                load,
                annotations,
                set,
            )?;
        }

        Commands::Info { index, json } => {
            commands::info::execute(index, json)?;
        }
    }

    Ok(())
}
