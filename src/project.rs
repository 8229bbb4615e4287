//! Project root discovery and on-disk layout
//!
//! A project is any directory containing a `.knightos` state directory. All
//! derived state lives beneath it:
//!
//! ```text
//! MyProject/
//! ├── package.config        ← declared dependencies, name, repo
//! └── .knightos/
//!     ├── packages/         ← downloaded archives (<name>-<version>.pkg)
//!     ├── pkgroot/          ← extracted packages (bin/, slib/, ...)
//!     └── packages.make     ← generated build include
//! ```

use crate::{ConfigStore, Dependency, Error, Result, PACKAGE_CONFIG_NAME};
use std::path::{Path, PathBuf};

/// Name of the marker/state directory inside a project root
pub const STATE_DIR_NAME: &str = ".knightos";

/// Find the nearest ancestor of `start` (including `start`) that contains
/// the `.knightos` directory.
///
/// Stops at the filesystem root.
pub fn find_root<P: AsRef<Path>>(start: P) -> Option<PathBuf> {
    start
        .as_ref()
        .ancestors()
        .find(|dir| dir.join(STATE_DIR_NAME).is_dir())
        .map(Path::to_path_buf)
}

#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: ConfigStore,
}

impl Project {
    /// Open the project rooted at `root` without checking for the marker
    pub fn open<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let config = ConfigStore::new(root.join(PACKAGE_CONFIG_NAME));
        Self { root, config }
    }

    /// Locate the project containing `start`
    pub fn discover<P: AsRef<Path>>(start: P) -> Result<Self> {
        let start = start.as_ref();
        let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
        find_root(&start).map(Self::open).ok_or(Error::NoProject)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR_NAME)
    }

    /// Archive cache
    pub fn packages_dir(&self) -> PathBuf {
        self.state_dir().join("packages")
    }

    /// Extraction target for every package
    pub fn pkgroot(&self) -> PathBuf {
        self.state_dir().join("pkgroot")
    }

    /// Compiled libraries shipped by installed packages
    pub fn slib_dir(&self) -> PathBuf {
        self.pkgroot().join("slib")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.state_dir().join("packages.make")
    }

    /// `repo/name` of this project, if both are configured
    pub fn full_name(&self) -> Option<String> {
        let repo = self.config.get("repo").filter(|r| !r.is_empty())?;
        let name = self.config.get("name").filter(|n| !n.is_empty())?;
        Some(format!("{}/{}", repo, name))
    }

    /// Declared dependencies exactly as written, constraints included
    pub fn declared(&self) -> Vec<String> {
        self.config
            .get("dependencies")
            .map(|deps| {
                deps.split(' ')
                    .filter(|d| !d.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Declared dependencies as bare `repo/name` identifiers
    pub fn declared_ids(&self) -> Vec<String> {
        self.declared()
            .iter()
            .map(|d| Dependency::bare_id(d).to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project_with_config(content: &str) -> (TempDir, Project) {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(STATE_DIR_NAME)).unwrap();
        fs::write(temp_dir.path().join(PACKAGE_CONFIG_NAME), content).unwrap();
        let project = Project::open(temp_dir.path());
        (temp_dir, project)
    }

    #[test]
    fn test_find_root_from_nested_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(STATE_DIR_NAME)).unwrap();
        let nested = temp_dir.path().join("src").join("gfx");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_root(&nested), Some(temp_dir.path().to_path_buf()));
        assert_eq!(
            find_root(temp_dir.path()),
            Some(temp_dir.path().to_path_buf())
        );
    }

    #[test]
    fn test_find_root_picks_nearest() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(STATE_DIR_NAME)).unwrap();
        let inner = temp_dir.path().join("inner");
        fs::create_dir_all(inner.join(STATE_DIR_NAME)).unwrap();

        assert_eq!(find_root(inner.join(STATE_DIR_NAME)), Some(inner));
    }

    #[test]
    fn test_find_root_ignores_marker_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("not-a-project");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(STATE_DIR_NAME), "").unwrap();

        assert_ne!(find_root(&dir), Some(dir));
    }

    #[test]
    fn test_discover_without_project() {
        let temp_dir = TempDir::new().unwrap();
        // Only fails if no ancestor of the temp dir is a project
        if find_root(temp_dir.path()).is_none() {
            let err = Project::discover(temp_dir.path()).unwrap_err();
            assert!(matches!(err, Error::NoProject));
            assert!(err.to_string().contains("knightos init"));
        }
    }

    #[test]
    fn test_layout() {
        let project = Project::open("/work/demo");
        assert_eq!(project.packages_dir(), Path::new("/work/demo/.knightos/packages"));
        assert_eq!(project.pkgroot(), Path::new("/work/demo/.knightos/pkgroot"));
        assert_eq!(project.slib_dir(), Path::new("/work/demo/.knightos/pkgroot/slib"));
        assert_eq!(
            project.manifest_path(),
            Path::new("/work/demo/.knightos/packages.make")
        );
        assert_eq!(project.config().path(), Path::new("/work/demo/package.config"));
    }

    #[test]
    fn test_full_name() {
        let (_dir, project) = project_with_config("name=demo\nrepo=extra\n");
        assert_eq!(project.full_name().as_deref(), Some("extra/demo"));
    }

    #[test]
    fn test_full_name_requires_repo_and_name() {
        let (_dir, project) = project_with_config("name=demo\n");
        assert_eq!(project.full_name(), None);

        let (_dir, project) = project_with_config("name=demo\nrepo=\n");
        assert_eq!(project.full_name(), None);
    }

    #[test]
    fn test_declared_preserves_order_and_constraints() {
        let (_dir, project) =
            project_with_config("dependencies=core/init core/corelib:>=1.0 extra/bed\n");

        assert_eq!(
            project.declared(),
            vec!["core/init", "core/corelib:>=1.0", "extra/bed"]
        );
        assert_eq!(
            project.declared_ids(),
            vec!["core/init", "core/corelib", "extra/bed"]
        );
    }

    #[test]
    fn test_declared_missing_or_empty() {
        let (_dir, project) = project_with_config("name=demo\n");
        assert!(project.declared().is_empty());

        let (_dir, project) = project_with_config("dependencies=\n");
        assert!(project.declared().is_empty());
    }
}
