// src/pipeline.rs
use chrono::{NaiveDate, Utc};
use log::info;
use std::path::{Path, PathBuf};

use crate::catalog::{
    read_footprint, BandLocator, BandUrls, Downloader, Scene, SceneCatalog, SceneQuery,
    SceneSelector,
};
use crate::config::PipelineConfig;
use crate::error::{NbrError, Result};
use crate::processing::indices::NBR;
use crate::processing::{IndexStats, Processor};

/// How a band file ended up on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Downloaded(u64),
    Reused,
}

/// State handed from one pipeline stage to the next
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub footprint_wkt: String,
    pub scenes: Vec<Scene>,
    pub selected: Option<Scene>,
    pub bands: Option<BandUrls>,
    pub nir_path: PathBuf,
    pub swir_path: PathBuf,
}

impl PipelineContext {
    pub fn new(config: &PipelineConfig, footprint_wkt: String) -> Self {
        Self {
            footprint_wkt,
            scenes: Vec::new(),
            selected: None,
            bands: None,
            nir_path: config.nir_path(),
            swir_path: config.swir_path(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub scene: Scene,
    pub nir: FetchOutcome,
    pub swir: FetchOutcome,
    pub output_path: PathBuf,
    pub stats: IndexStats,
}

/// Search -> select -> locate -> fetch -> compute
pub struct Pipeline {
    catalog: Box<dyn SceneCatalog>,
    selector: Box<dyn SceneSelector>,
    locator: Box<dyn BandLocator>,
    downloader: Box<dyn Downloader>,
}

impl Pipeline {
    pub fn new(
        catalog: Box<dyn SceneCatalog>,
        selector: Box<dyn SceneSelector>,
        locator: Box<dyn BandLocator>,
        downloader: Box<dyn Downloader>,
    ) -> Self {
        Self {
            catalog,
            selector,
            locator,
            downloader,
        }
    }

    pub fn run(&self, config: &PipelineConfig, aoi_path: &Path) -> Result<PipelineReport> {
        self.run_on(config, aoi_path, Utc::now().date_naive())
    }

    /// Run with the search window ending on `today`
    pub fn run_on(
        &self,
        config: &PipelineConfig,
        aoi_path: &Path,
        today: NaiveDate,
    ) -> Result<PipelineReport> {
        config.validate()?;

        let footprint_wkt = read_footprint(aoi_path)?;
        let mut ctx = PipelineContext::new(config, footprint_wkt);

        self.search(config, &mut ctx, today)?;
        let scene = self.select(&mut ctx)?;
        let bands = self.locate(&mut ctx, &scene)?;

        let nir = self.fetch_band(&bands.nir, &ctx.nir_path, config.skip_download_if_present)?;
        let swir =
            self.fetch_band(&bands.swir, &ctx.swir_path, config.skip_download_if_present)?;

        let stats = compute_nbr(config, &ctx.nir_path, &ctx.swir_path)?;

        Ok(PipelineReport {
            scene,
            nir,
            swir,
            output_path: config.output_path.clone(),
            stats,
        })
    }

    fn search(
        &self,
        config: &PipelineConfig,
        ctx: &mut PipelineContext,
        today: NaiveDate,
    ) -> Result<()> {
        let query = SceneQuery::from_config(config, ctx.footprint_wkt.clone(), today);
        info!(
            "Searching {} {} scenes from {} to {}",
            query.platform_name, query.product_type, query.start, query.end
        );

        ctx.scenes = self.catalog.search(&query)?;
        if ctx.scenes.is_empty() {
            return Err(NbrError::NoScenes);
        }
        Ok(())
    }

    fn select(&self, ctx: &mut PipelineContext) -> Result<Scene> {
        let index = self.selector.choose_scene(&ctx.scenes)?;
        let scene = ctx.scenes.get(index).cloned().ok_or_else(|| {
            NbrError::Selection(format!(
                "selector returned {index} for {} candidates",
                ctx.scenes.len()
            ))
        })?;

        info!("Selected scene {} ({})", scene.id, scene.title);
        ctx.selected = Some(scene.clone());
        Ok(scene)
    }

    fn locate(&self, ctx: &mut PipelineContext, scene: &Scene) -> Result<BandUrls> {
        let bands = self.locator.locate(scene)?;
        ctx.bands = Some(bands.clone());
        Ok(bands)
    }

    /// Download `url` to `dest` unless reuse is allowed and the file is already there
    pub fn fetch_band(
        &self,
        url: &str,
        dest: &Path,
        skip_if_present: bool,
    ) -> Result<FetchOutcome> {
        if skip_if_present && dest.is_file() {
            info!("Reusing existing {}", dest.display());
            return Ok(FetchOutcome::Reused);
        }
        let bytes = self.downloader.download(url, dest)?;
        Ok(FetchOutcome::Downloaded(bytes))
    }
}

/// Compute NBR from local band files into `config.output_path`
pub fn compute_nbr(
    config: &PipelineConfig,
    nir_path: &Path,
    swir_path: &Path,
) -> Result<IndexStats> {
    let processor = Processor::new(config.align_policy, config.write_options());
    let nbr = NBR::new(0, 1, None).with_zero_denominator(config.zero_denominator);

    let stats = processor.process(
        &nbr,
        &[nir_path.to_path_buf(), swir_path.to_path_buf()],
        &config.output_path,
    )?;

    info!(
        "NBR: {} valid, {} NaN, {} infinite, {} nodata pixels; range {:?}..{:?}, mean {:?}",
        stats.valid, stats.nan, stats.infinite, stats.no_data, stats.min, stats.max, stats.mean
    );
    Ok(stats)
}
