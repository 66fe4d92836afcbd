use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::PipelineConfig;

#[derive(Parser)]
#[command(name = "nbr-calc")]
#[command(about = "Normalized Burn Ratio from Sentinel-2 imagery")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output file path (overrides outputPath)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the catalog, fetch B08/B12 and compute NBR for an area
    Run {
        /// GeoJSON file describing the search area
        geojson: PathBuf,

        /// Days back from today to search
        #[arg(short, long)]
        days: Option<u32>,

        /// How to choose among the scenes found
        #[arg(long, value_enum, default_value_t = SelectMode::Interactive)]
        select: SelectMode,

        /// Pick the scene at this position instead of asking
        #[arg(long)]
        scene: Option<usize>,

        /// Download bands even if the files already exist
        #[arg(long)]
        force_download: bool,
    },

    /// Normalized Burn Ratio from local files: (NIR-SWIR)/(NIR+SWIR)
    Compute {
        /// NIR band, Sentinel-2 B08 (10 m)
        #[arg(short = 'a', long)]
        nir: PathBuf,

        /// SWIR band, Sentinel-2 B12 (20 m)
        #[arg(short = 'b', long)]
        swir: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SelectMode {
    /// Prompt on the terminal
    Interactive,
    /// Take the scene with the least cloud cover
    LowestCloud,
}

impl Cli {
    /// Apply command-line overrides on top of the configuration file
    pub fn apply_overrides(&self, config: &mut PipelineConfig) {
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }

        if let Commands::Run {
            days,
            force_download,
            ..
        } = &self.command
        {
            if let Some(days) = days {
                config.search_window_days = *days;
            }
            if *force_download {
                config.skip_download_if_present = false;
            }
        }
    }
}
