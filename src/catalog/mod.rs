// src/catalog/mod.rs
//! Scene discovery and band acquisition.
//!
//! Each stage of acquisition sits behind a trait so the pipeline can run
//! against the remote hub or against local fakes.

use chrono::{Duration, NaiveDate};
use std::fmt;
use std::path::Path;

use crate::config::PipelineConfig;
use crate::error::Result;

pub mod download;
pub mod footprint;
pub mod scihub;
pub mod select;

pub use download::HttpDownloader;
pub use footprint::read_footprint;
pub use scihub::SciHubClient;
pub use select::{FixedIndex, InteractiveSelector, LowestCloudCover};

/// One catalog product
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub id: String,
    pub title: String,
    /// SAFE directory name, the root node of the product tree
    pub filename: String,
    pub begin_position: String,
    pub cloud_cover: f64,
    /// Base URL of the product's node hierarchy
    pub link_alternative: String,
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Date: {} - Cloud cover: {:.2}% - {}",
            self.begin_position, self.cloud_cover, self.title
        )
    }
}

/// Search parameters for a catalog query
#[derive(Debug, Clone, PartialEq)]
pub struct SceneQuery {
    pub footprint_wkt: String,
    pub start: NaiveDate,
    /// Exclusive upper bound
    pub end: NaiveDate,
    pub product_type: String,
    pub platform_name: String,
    pub max_results: usize,
}

impl SceneQuery {
    /// Query covering the `searchWindowDays` before `today`, today included
    pub fn from_config(config: &PipelineConfig, footprint_wkt: String, today: NaiveDate) -> Self {
        Self {
            footprint_wkt,
            start: today - Duration::days(i64::from(config.search_window_days)),
            end: today + Duration::days(1),
            product_type: config.product_type.clone(),
            platform_name: config.platform_name.clone(),
            max_results: config.max_results,
        }
    }

    /// Render as an OpenSearch `q` expression
    pub fn to_opensearch(&self) -> String {
        format!(
            "beginposition:[{}T00:00:00Z TO {}T00:00:00Z] AND producttype:{} AND platformname:{} AND footprint:\"Intersects({})\"",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d"),
            self.product_type,
            self.platform_name,
            self.footprint_wkt
        )
    }
}

/// Download locations of the bands needed for NBR
#[derive(Debug, Clone, PartialEq)]
pub struct BandUrls {
    /// B08, 10 m
    pub nir: String,
    /// B12, 20 m
    pub swir: String,
    /// TCI, 10 m
    pub true_color: Option<String>,
}

pub trait SceneCatalog {
    fn search(&self, query: &SceneQuery) -> Result<Vec<Scene>>;
}

/// Picks one of the candidate scenes, returning its index
pub trait SceneSelector {
    fn choose_scene(&self, candidates: &[Scene]) -> Result<usize>;
}

pub trait BandLocator {
    fn locate(&self, scene: &Scene) -> Result<BandUrls>;
}

pub trait Downloader {
    /// Fetch `url` into `dest`, returning the number of bytes written
    fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}
