//! The install transaction
//!
//! Installing resolves implicit dependencies, downloads and extracts every
//! package into `.knightos/pkgroot`, records the requested packages in
//! `package.config`, and regenerates `packages.make`.
//!
//! Installation is not transactional across packages. A registry failure
//! part-way through leaves the packages already downloaded and extracted in
//! place, and `package.config` untouched.
//!
//! # Examples
//!
//! ```no_run
//! use knightos::{Config, HttpRegistryClient, InstallOptions, Installer, KpackExtractor, Project};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let project = Project::discover(".")?;
//! let registry = HttpRegistryClient::from_config(&config)?;
//! let extractor = KpackExtractor::new(&config.tools.kpack);
//!
//! let installer = Installer::new(&project, &registry, &extractor);
//! let installed = installer.install(&["core/castle".to_string()], InstallOptions::default())?;
//! println!("Installed {} packages", installed.len());
//! # Ok(())
//! # }
//! ```

use crate::{
    resolve_implicit, Dependency, Extractor, ManifestGenerator, ProgressCallback, Project,
    Registry, Result,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Links created in `pkgroot/bin` by a linked install: (target, link name)
pub const UI_LINKS: &[(&str, &str)] = &[
    ("bin/castle", "launcher"),
    ("bin/threadlist", "switcher"),
    ("bin/fileman", "browser"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    /// Install without recording the packages as declared dependencies
    pub site_only: bool,
    /// First-time project setup; `package.config` is written by the caller
    pub init: bool,
    /// Create the UI entry-point links in `pkgroot/bin`
    pub link: bool,
}

pub struct Installer<'a> {
    project: &'a Project,
    registry: &'a dyn Registry,
    extractor: &'a dyn Extractor,
    manifest: ManifestGenerator,
    progress: Option<ProgressCallback>,
}

impl<'a> Installer<'a> {
    pub fn new(
        project: &'a Project,
        registry: &'a dyn Registry,
        extractor: &'a dyn Extractor,
    ) -> Self {
        Self {
            project,
            registry,
            extractor,
            manifest: ManifestGenerator::default(),
            progress: None,
        }
    }

    pub fn with_manifest(mut self, manifest: ManifestGenerator) -> Self {
        self.manifest = manifest;
        self
    }

    /// Report download progress through `progress`
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Install `requested` and their implicit dependencies
    ///
    /// Returns every package that was downloaded, implicit dependencies
    /// first, in install order.
    pub fn install(&self, requested: &[String], options: InstallOptions) -> Result<Vec<String>> {
        if requested.is_empty() {
            // TODO: install from a local directory containing a package.config
            println!("Installing local packages is not supported yet; nothing to do.");
            return Ok(Vec::new());
        }

        let self_id = self.project.full_name();
        let mut declared = self.project.declared();
        let explicit = self.project.declared_ids();

        let mut all = resolve_implicit(self.registry, requested, &explicit, self_id.as_deref())?;
        all.extend(requested.iter().map(|p| Dependency::bare_id(p).to_string()));
        all.retain(|p| Some(p.as_str()) != self_id.as_deref());

        let packages_dir = self.project.packages_dir();
        let pkgroot = self.project.pkgroot();
        fs::create_dir_all(&packages_dir)?;
        fs::create_dir_all(&pkgroot)?;

        for package in &all {
            self.fetch_and_extract(package, &packages_dir, &pkgroot)?;
        }

        if !options.site_only {
            declared.extend(requested.iter().cloned());
        }
        if !options.init {
            self.project
                .config()
                .set("dependencies", &declared.join(" "))?;
        }

        if options.link {
            link_ui(&pkgroot)?;
        }

        self.manifest.regenerate(self.project)?;

        Ok(all)
    }

    fn fetch_and_extract(
        &self,
        package: &str,
        packages_dir: &Path,
        pkgroot: &Path,
    ) -> Result<PathBuf> {
        let metadata = self.registry.fetch_metadata(package)?;
        let archive = packages_dir.join(metadata.archive_filename());

        let bytes =
            self.registry
                .download_archive(&metadata.full_name, &archive, self.progress.clone())?;
        tracing::debug!(
            package = %metadata.full_name,
            version = %metadata.version,
            bytes,
            "downloaded archive"
        );

        self.extractor.extract(&archive, pkgroot, false);
        self.extractor.extract(&archive, pkgroot, true);

        Ok(archive)
    }
}

/// Create the UI entry-point links inside `pkgroot/bin`, replacing old ones
pub fn link_ui(pkgroot: &Path) -> io::Result<()> {
    let bin = pkgroot.join("bin");
    fs::create_dir_all(&bin)?;
    for (target, name) in UI_LINKS {
        force_symlink(Path::new(target), &bin.join(name))?;
    }
    Ok(())
}

/// Create `link` pointing at `target`, replacing whatever is at `link`
///
/// Replacement is remove-then-create, so there is a short window in which
/// `link` does not exist.
pub fn force_symlink(target: &Path, link: &Path) -> io::Result<()> {
    match symlink(target, link) {
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            fs::remove_file(link)?;
            symlink(target, link)
        }
        other => other,
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}
