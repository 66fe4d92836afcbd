// src/config.rs
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{NbrError, Result};
use crate::io::WriteOptions;
use crate::processing::align::AlignPolicy;
use crate::processing::indices::ZeroDenominator;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pass: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default = "default_search_window_days")]
    pub search_window_days: u32,
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    #[serde(default = "default_true")]
    pub skip_download_if_present: bool,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    #[serde(default = "default_nir_file")]
    pub nir_file: String,
    #[serde(default = "default_swir_file")]
    pub swir_file: String,
    #[serde(default = "default_product_type")]
    pub product_type: String,
    #[serde(default = "default_platform_name")]
    pub platform_name: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default)]
    pub zero_denominator: ZeroDenominator,
    #[serde(default)]
    pub align_policy: AlignPolicy,
    #[serde(default = "default_compress")]
    pub compress: String,
    #[serde(default = "default_compress_level")]
    pub compress_level: u8,
    #[serde(default = "default_true")]
    pub tiled: bool,
}

fn default_search_window_days() -> u32 {
    10
}

fn default_output_path() -> PathBuf {
    PathBuf::from("nbr.tif")
}

fn default_api_url() -> String {
    "https://apihub.copernicus.eu/apihub".to_string()
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_nir_file() -> String {
    "nir_B08_10m.jp2".to_string()
}

fn default_swir_file() -> String {
    "swir_B12_20m.jp2".to_string()
}

fn default_product_type() -> String {
    "S2MSI2A".to_string()
}

fn default_platform_name() -> String {
    "Sentinel-2".to_string()
}

fn default_max_results() -> usize {
    100
}

fn default_compress() -> String {
    "DEFLATE".to_string()
}

fn default_compress_level() -> u8 {
    6
}

fn default_true() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            search_window_days: default_search_window_days(),
            output_path: default_output_path(),
            skip_download_if_present: true,
            api_url: default_api_url(),
            work_dir: default_work_dir(),
            nir_file: default_nir_file(),
            swir_file: default_swir_file(),
            product_type: default_product_type(),
            platform_name: default_platform_name(),
            max_results: default_max_results(),
            zero_denominator: ZeroDenominator::default(),
            align_policy: AlignPolicy::default(),
            compress: default_compress(),
            compress_level: default_compress_level(),
            tiled: true,
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.search_window_days == 0 {
            return Err(NbrError::Config(
                "searchWindowDays must be at least 1".to_string(),
            ));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(NbrError::Config("outputPath must not be empty".to_string()));
        }
        if self.nir_file == self.swir_file {
            return Err(NbrError::Config(format!(
                "nirFile and swirFile must differ (both are {})",
                self.nir_file
            )));
        }
        if self.max_results == 0 {
            return Err(NbrError::Config("maxResults must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn nir_path(&self) -> PathBuf {
        self.work_dir.join(&self.nir_file)
    }

    pub fn swir_path(&self) -> PathBuf {
        self.work_dir.join(&self.swir_file)
    }

    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            compress: self.compress.clone(),
            compress_level: self.compress_level,
            tiled: self.tiled,
            no_data: self.zero_denominator.no_data(),
            ..WriteOptions::default()
        }
    }
}
