// src/registry/client.rs

//! HTTP client for registry operations
//!
//! Wraps reqwest's blocking client for fetching package metadata and
//! streaming source archives to disk. There is no retry at this layer: a
//! transient failure is indistinguishable from a permanent one, and the
//! resolver drops the affected subtree either way.

use crate::error::{Error, Result};
use indicatif::ProgressBar;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use super::metadata::ProjectMetadata;
use super::Registry;

/// Public PyPI instance
pub const DEFAULT_REGISTRY_URL: &str = "https://pypi.org";

/// Default timeout for HTTP requests (30 seconds)
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Buffer size for streaming downloads (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

/// Stream an HTTP response body to a file with optional progress tracking
///
/// Always streams data in chunks, never buffering the entire response in
/// memory, so archives of any size are safe to download.
fn stream_response_to_file(
    mut response: reqwest::blocking::Response,
    file: &mut File,
    progress: Option<&ProgressBar>,
) -> Result<u64> {
    if let Some(pb) = progress {
        if let Some(total) = response.content_length() {
            pb.set_length(total);
        }
    }

    let mut downloaded: u64 = 0;
    let mut buffer = [0u8; STREAM_BUFFER_SIZE];

    loop {
        let bytes_read = response
            .read(&mut buffer)
            .map_err(|e| Error::IoError(format!("Failed to read response: {e}")))?;

        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])
            .map_err(|e| Error::IoError(format!("Failed to write data: {e}")))?;

        downloaded += bytes_read as u64;

        if let Some(pb) = progress {
            pb.set_position(downloaded);
        }
    }

    Ok(downloaded)
}

/// HTTP wrapper for registry metadata and archive downloads
pub struct RegistryClient {
    client: Client,
    base_url: String,
}

impl RegistryClient {
    /// Create a client against the public registry
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_REGISTRY_URL)
    }

    /// Create a client against a custom registry base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::DownloadError(format!("Failed to create HTTP client: {e}")))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { client, base_url })
    }

    fn project_url(&self, name: &str, version: Option<&str>) -> String {
        match version {
            Some(version) => format!("{}/pypi/{}/{}/json", self.base_url, name, version),
            None => format!("{}/pypi/{}/json", self.base_url, name),
        }
    }

    /// Download a URL to `dest_path`, streaming through a temp file
    ///
    /// The body is written to `dest_path` with extension `.tmp` and moved
    /// into place once complete, so an interrupted download never leaves a
    /// plausible-looking partial file at the destination.
    pub fn download_file(
        &self,
        url: &str,
        dest_path: &Path,
        progress: Option<&ProgressBar>,
    ) -> Result<()> {
        info!("Downloading {} to {}", url, dest_path.display());

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::IoError(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::DownloadError(format!("Failed to fetch {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::DownloadError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let temp_path = dest_path.with_extension("tmp");
        let mut file = File::create(&temp_path).map_err(|e| {
            Error::IoError(format!("Failed to create file {}: {e}", temp_path.display()))
        })?;

        let downloaded = stream_response_to_file(response, &mut file, progress)?;
        debug!("Downloaded {} bytes", downloaded);

        fs::rename(&temp_path, dest_path).map_err(|e| {
            Error::IoError(format!(
                "Failed to move {} to {}: {e}",
                temp_path.display(),
                dest_path.display()
            ))
        })?;

        Ok(())
    }
}

impl Registry for RegistryClient {
    fn project(&self, name: &str, version: Option<&str>) -> Result<ProjectMetadata> {
        let url = self.project_url(name, version);
        debug!("Fetching package metadata from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| Error::DownloadError(format!("Failed to fetch {url}: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFoundError(match version {
                Some(version) => format!("package {name} {version} not in registry"),
                None => format!("package {name} not in registry"),
            }));
        }

        if !response.status().is_success() {
            return Err(Error::DownloadError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        response
            .json()
            .map_err(|e| Error::DownloadError(format!("Failed to parse metadata JSON: {e}")))
    }
}
