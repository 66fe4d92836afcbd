// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use nbr_calc::catalog::{
    FixedIndex, HttpDownloader, InteractiveSelector, LowestCloudCover, SceneSelector,
    SciHubClient,
};
use nbr_calc::cli::{Cli, Commands, SelectMode};
use nbr_calc::config::PipelineConfig;
use nbr_calc::pipeline::{compute_nbr, Pipeline};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    cli.apply_overrides(&mut config);
    config.validate()?;

    match &cli.command {
        Commands::Run {
            geojson,
            select,
            scene,
            ..
        } => {
            let client = SciHubClient::new(&config.api_url, config.credentials.clone())?;
            let downloader = HttpDownloader::new(config.credentials.clone())?;
            let selector: Box<dyn SceneSelector> = match (scene, select) {
                (Some(index), _) => Box::new(FixedIndex(*index)),
                (None, SelectMode::LowestCloud) => Box::new(LowestCloudCover),
                (None, SelectMode::Interactive) => Box::new(InteractiveSelector::stdio()),
            };

            let pipeline = Pipeline::new(
                Box::new(client.clone()),
                selector,
                Box::new(client),
                Box::new(downloader),
            );
            let report = pipeline
                .run(&config, geojson)
                .with_context(|| format!("Pipeline failed for {}", geojson.display()))?;

            info!(
                "Scene {}: NIR {:?}, SWIR {:?}",
                report.scene.title, report.nir, report.swir
            );
        }
        Commands::Compute { nir, swir } => {
            compute_nbr(&config, nir, swir).with_context(|| {
                format!("Failed to compute NBR from {} and {}", nir.display(), swir.display())
            })?;
        }
    }

    println!("Processing complete: {}", config.output_path.display());
    Ok(())
}
