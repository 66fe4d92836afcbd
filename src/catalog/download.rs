// src/catalog/download.rs
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use reqwest::blocking::Client;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

use super::Downloader;
use crate::config::Credentials;
use crate::error::{NbrError, Result};

const MIN_CHUNK_SIZE: u64 = 1024 * 1024;

/// Authenticated HTTP downloader
pub struct HttpDownloader {
    client: Client,
    credentials: Credentials,
    show_progress: bool,
}

impl HttpDownloader {
    pub fn new(credentials: Credentials) -> Result<Self> {
        // Only the connect phase is bounded
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(None::<Duration>)
            .build()?;

        Ok(Self {
            client,
            credentials,
            show_progress: true,
        })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn progress_bar(&self, total: Option<u64>, dest: &Path) -> ProgressBar {
        match total {
            Some(len) if self.show_progress => {
                let bar = ProgressBar::new(len);
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template("{msg} [{bar:50}] {bytes}/{total_bytes} ({eta})")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("█."),
                );
                bar.set_message(
                    dest.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                );
                bar
            }
            _ => ProgressBar::hidden(),
        }
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        info!("Downloading {} from {url}", dest.display());

        let mut response = self
            .client
            .get(url)
            .basic_auth(&self.credentials.user, Some(&self.credentials.pass))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(NbrError::Http(format!("GET {url} returned {status}")));
        }

        let total = response.content_length();
        let chunk_size = total.map_or(MIN_CHUNK_SIZE, |len| (len / 1000).max(MIN_CHUNK_SIZE));
        let progress = self.progress_bar(total, dest);

        let dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;
        let mut file = NamedTempFile::new_in(dir)?;

        let mut chunk = vec![0u8; chunk_size as usize];
        let mut written = 0u64;
        loop {
            let n = response.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            file.write_all(&chunk[..n])?;
            written += n as u64;
            progress.set_position(written);
        }
        progress.finish_and_clear();

        if let Some(len) = total {
            if written != len {
                return Err(NbrError::Http(format!(
                    "{url} ended after {written} of {len} bytes"
                )));
            }
        }

        file.flush()?;
        file.persist(dest).map_err(|e| NbrError::Io(e.error))?;

        info!("Saved {} ({written} bytes)", dest.display());
        Ok(written)
    }
}
