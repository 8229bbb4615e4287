//! Package registry interface and metadata types
//!
//! Resolution and installation only talk to the registry through the
//! [`Registry`] trait, so they can be driven by a scripted registry in tests.
//! [`HttpRegistryClient`](crate::registry_http::HttpRegistryClient) is the
//! real implementation.
//!
//! # Examples
//!
//! ```no_run
//! use knightos::{Config, HttpRegistryClient, Registry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = HttpRegistryClient::from_config(&Config::load()?)?;
//!
//! let metadata = registry.fetch_metadata("core/castle")?;
//! println!("{} {}", metadata.full_name, metadata.version);
//! for dep in &metadata.dependencies {
//!     println!("  depends on {}", dep);
//! }
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Progress callback for downloads
///
/// Called with:
/// - `package`: Package being downloaded
/// - `current`: Bytes written so far
/// - `total`: Expected size in bytes, or 0 when the server did not say
pub type ProgressCallback = Arc<dyn Fn(&str, u64, u64) + Send + Sync>;

/// Package metadata as returned by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    pub repo: String,
    pub full_name: String,
    pub version: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl PackageMetadata {
    /// File name the archive is stored under in the package cache
    pub fn archive_filename(&self) -> String {
        format!("{}-{}.pkg", self.name, self.version)
    }
}

/// A declared dependency, `repo/name` with an optional `:constraint`
///
/// The constraint is carried along but never evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub id: String,
    pub constraint: Option<String>,
}

impl Dependency {
    /// Strip any `:constraint` suffix from a dependency string
    pub fn bare_id(spec: &str) -> &str {
        spec.split_once(':').map_or(spec, |(id, _)| id)
    }
}

impl FromStr for Dependency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (id, constraint) = match s.split_once(':') {
            Some((id, c)) => (id, Some(c.to_string())),
            None => (s, None),
        };

        match id.split_once('/') {
            Some((repo, name)) if !repo.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self {
                    id: id.to_string(),
                    constraint,
                })
            }
            _ => Err(Error::Other(format!(
                "Invalid package '{}': expected repo/name",
                s
            ))),
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(c) => write!(f, "{}:{}", self.id, c),
            None => f.write_str(&self.id),
        }
    }
}

/// A source of package metadata and archives
pub trait Registry {
    /// Fetch metadata for `repo/name`
    ///
    /// Fails with [`Error::PackageNotFound`] when the registry does not know
    /// the package and [`Error::Registry`] for any other failure.
    fn fetch_metadata(&self, package: &str) -> Result<PackageMetadata>;

    /// Stream the archive for `full_name` into `dest`, returning the byte count
    fn download_archive(
        &self,
        full_name: &str,
        dest: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<u64>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted in-memory registry shared by resolver and installer tests

    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    pub struct FakeRegistry {
        packages: HashMap<String, (PackageMetadata, Vec<u8>)>,
        failing: HashMap<String, String>,
        pub queries: RefCell<Vec<String>>,
        pub downloads: RefCell<Vec<String>>,
    }

    impl FakeRegistry {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_package(
            mut self,
            full_name: &str,
            version: &str,
            dependencies: &[&str],
            archive: Vec<u8>,
        ) -> Self {
            let (repo, name) = full_name.split_once('/').unwrap();
            let metadata = PackageMetadata {
                name: name.to_string(),
                repo: repo.to_string(),
                full_name: full_name.to_string(),
                version: version.to_string(),
                dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            };
            self.packages
                .insert(full_name.to_string(), (metadata, archive));
            self
        }

        pub fn with_failure(mut self, package: &str, message: &str) -> Self {
            self.failing
                .insert(package.to_string(), message.to_string());
            self
        }
    }

    impl Registry for FakeRegistry {
        fn fetch_metadata(&self, package: &str) -> Result<PackageMetadata> {
            self.queries.borrow_mut().push(package.to_string());
            if let Some(message) = self.failing.get(package) {
                return Err(Error::Registry(message.clone()));
            }
            self.packages
                .get(package)
                .map(|(m, _)| m.clone())
                .ok_or_else(|| Error::PackageNotFound {
                    package: package.to_string(),
                    registry: "fake registry".to_string(),
                })
        }

        fn download_archive(
            &self,
            full_name: &str,
            dest: &Path,
            progress: Option<ProgressCallback>,
        ) -> Result<u64> {
            self.downloads.borrow_mut().push(full_name.to_string());
            let (_, bytes) = self
                .packages
                .get(full_name)
                .ok_or_else(|| Error::Registry(format!("no archive for {}", full_name)))?;
            std::fs::write(dest, bytes)?;
            let len = bytes.len() as u64;
            if let Some(cb) = progress {
                cb(full_name, len, len);
            }
            Ok(len)
        }
    }
}
