//! knightos - project-local package manager for KnightOS projects
//!
//! A KnightOS project declares its dependencies in `package.config`. This
//! crate keeps that list up to date, pulls packages and their dependencies
//! from the package registry, extracts them into the project's
//! `.knightos/pkgroot`, and regenerates `.knightos/packages.make` so the
//! project's build can link against them.
//!
//! # Examples
//!
//! ```no_run
//! use knightos::{Config, HttpRegistryClient, InstallOptions, Installer, KpackExtractor, Project};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let project = Project::discover(std::env::current_dir()?)?;
//!
//! let registry = HttpRegistryClient::from_config(&config)?;
//! let extractor = KpackExtractor::new(&config.tools.kpack);
//!
//! let installed = Installer::new(&project, &registry, &extractor)
//!     .install(&["core/castle".to_string()], InstallOptions::default())?;
//! println!("Installed {} packages", installed.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`package_config`] - Read and rewrite `package.config`
//! - [`project`] - Project root discovery and layout
//! - [`registry`] - Registry trait and package metadata
//! - [`registry_http`] - HTTP registry client
//! - [`resolver`] - Implicit dependency discovery
//! - [`archive`] - kpack header reader and extraction
//! - [`installer`] - The install transaction
//! - [`manifest`] - `packages.make` generation
//! - [`config`] - User settings
//! - [`error`] - Error types and result handling

pub mod archive;
pub mod config;
pub mod error;
pub mod installer;
pub mod manifest;
pub mod package_config;
pub mod project;
pub mod registry;
pub mod registry_http;
pub mod resolver;

pub use archive::{Extractor, KpackExtractor, PackageInfo};
pub use config::Config;
pub use error::{Error, Result};
pub use installer::{force_symlink, link_ui, InstallOptions, Installer, UI_LINKS};
pub use manifest::{ManifestGenerator, ManifestLibrary, ManifestPackage, ManifestVars};
pub use package_config::{ConfigStore, PACKAGE_CONFIG_NAME};
pub use project::{find_root, Project, STATE_DIR_NAME};
pub use registry::{Dependency, PackageMetadata, ProgressCallback, Registry};
pub use registry_http::{HttpRegistryClient, DOWNLOAD_CHUNK_SIZE};
pub use resolver::resolve_implicit;
