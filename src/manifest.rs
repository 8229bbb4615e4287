//! Generation of `.knightos/packages.make`
//!
//! The manifest is derived entirely from what is on disk: every archive in
//! the package cache and every file in `pkgroot/slib`. It is rebuilt from
//! scratch each time and never edited in place.
//!
//! Templates are rendered with handlebars and receive two variables:
//!
//! - `packages`: list of `{ name, repo, filename }`
//! - `libraries`: list of `{ path }` (absolute), only present when
//!   `pkgroot/slib` exists
//!
//! # Examples
//!
//! ```no_run
//! use knightos::{ManifestGenerator, Project};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let project = Project::discover(".")?;
//! let path = ManifestGenerator::default().regenerate(&project)?;
//! println!("Wrote {}", path.display());
//! # Ok(())
//! # }
//! ```

use crate::{Config, PackageInfo, Project, Result};
use handlebars::Handlebars;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const DEFAULT_TEMPLATE: &str = include_str!("../templates/packages.make");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestPackage {
    pub name: String,
    pub repo: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestLibrary {
    pub path: String,
}

/// Template input
#[derive(Debug, Clone, Default, Serialize)]
pub struct ManifestVars {
    pub packages: Vec<ManifestPackage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libraries: Option<Vec<ManifestLibrary>>,
}

#[derive(Debug, Clone)]
pub struct ManifestGenerator {
    template: String,
}

impl Default for ManifestGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl ManifestGenerator {
    pub fn new<S: Into<String>>(template: S) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Use the template override from settings, or the built-in template
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.manifest.template_path() {
            Some(path) => {
                tracing::debug!(template = %path.display(), "using manifest template override");
                Ok(Self::new(fs::read_to_string(path)?))
            }
            None => Ok(Self::default()),
        }
    }

    /// Scan the project for archives and libraries
    pub fn collect(project: &Project) -> Result<ManifestVars> {
        let mut packages = Vec::new();
        for path in files_under(&project.packages_dir())? {
            let info = PackageInfo::read_package(&path)?;
            let filename = path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_default();
            packages.push(ManifestPackage {
                name: info.name,
                repo: info.repo,
                filename,
            });
        }

        let slib = project.slib_dir();
        let libraries = if slib.exists() {
            Some(
                files_under(&slib)?
                    .into_iter()
                    .map(|path| ManifestLibrary {
                        path: path.to_string_lossy().into_owned(),
                    })
                    .collect(),
            )
        } else {
            None
        };

        Ok(ManifestVars {
            packages,
            libraries,
        })
    }

    pub fn render(&self, vars: &ManifestVars) -> Result<String> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        Ok(handlebars.render_template(&self.template, vars)?)
    }

    /// Rebuild the project's manifest, overwriting any previous content
    pub fn regenerate(&self, project: &Project) -> Result<PathBuf> {
        let vars = Self::collect(project)?;
        let output = self.render(&vars)?;

        let path = project.manifest_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, output)?;

        tracing::debug!(
            path = %path.display(),
            packages = vars.packages.len(),
            libraries = vars.libraries.as_ref().map_or(0, Vec::len),
            "regenerated manifest"
        );
        Ok(path)
    }
}

/// Every regular file below `dir`, in walk order. A missing `dir` has none.
fn files_under(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
