use crate::{Config, Error, PackageMetadata, ProgressCallback, Registry, Result};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

/// Size of each read from the download stream
pub const DOWNLOAD_CHUNK_SIZE: usize = 1024;

pub struct HttpRegistryClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpRegistryClient {
    /// Create a client for the registry at `base_url`
    ///
    /// Without a timeout a stalled server blocks the caller indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("knightos/", env!("CARGO_PKG_VERSION")))
            // The blocking client defaults to 30s; None really means no limit
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a client from user settings
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.registry.url, config.registry.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Host name used in user-facing messages (falls back to the full URL)
    pub fn host(&self) -> String {
        reqwest::Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| self.base_url.clone())
    }

    /// One-line diagnostic for a request about `package` that never got a response
    fn contact_error(&self, package: &str, e: reqwest::Error) -> Error {
        let reason = if e.is_connect() {
            "could not connect; check your network connection and the registry URL"
        } else if e.is_timeout() {
            "the request timed out"
        } else {
            "the request failed"
        };
        Error::Registry(format!(
            "An error occurred while contacting {} for information about '{}': {}.",
            self.host(),
            package,
            reason
        ))
    }
}

impl Registry for HttpRegistryClient {
    /// Get package metadata from `<base>/api/v1/<repo>/<name>`
    fn fetch_metadata(&self, package: &str) -> Result<PackageMetadata> {
        let url = format!("{}/api/v1/{}", self.base_url, package);
        tracing::debug!(%url, "fetching package metadata");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.contact_error(package, e))?;

        let status = response.status();

        if status == 404 {
            return Err(Error::PackageNotFound {
                package: package.to_string(),
                registry: self.host(),
            });
        }

        if status != 200 {
            tracing::debug!(status = status.as_u16(), "registry returned an error");
            return Err(Error::Registry(format!(
                "An error occurred while contacting {} for information about '{}' (HTTP {}).",
                self.host(),
                package,
                status.as_u16()
            )));
        }

        response.json::<PackageMetadata>().map_err(|e| {
            Error::Registry(format!(
                "Failed to parse metadata for '{}' from {}: {}",
                package,
                self.host(),
                e
            ))
        })
    }

    /// Stream `<base>/<full_name>/download` into `dest`
    fn download_archive(
        &self,
        full_name: &str,
        dest: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<u64> {
        let url = format!("{}/{}/download", self.base_url, full_name);
        tracing::debug!(%url, dest = %dest.display(), "downloading archive");

        let mut response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.contact_error(full_name, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Registry(format!(
                "Download of '{}' failed: HTTP {}",
                full_name,
                status.as_u16()
            )));
        }

        // Unknown length still downloads, it just can't report a percentage
        let total = response.content_length().unwrap_or(0);
        if let Some(ref cb) = progress {
            cb(full_name, 0, total);
        }

        let mut file = File::create(dest)?;
        let mut buffer = [0u8; DOWNLOAD_CHUNK_SIZE];
        let mut written: u64 = 0;

        loop {
            let bytes_read = response.read(&mut buffer).map_err(|e| {
                Error::Registry(format!("Download of '{}' interrupted: {}", full_name, e))
            })?;
            if bytes_read == 0 {
                break;
            }
            file.write_all(&buffer[..bytes_read])?;
            written += bytes_read as u64;

            if let Some(ref cb) = progress {
                cb(full_name, written, total);
            }
        }
        file.flush()?;

        Ok(written)
    }
}
