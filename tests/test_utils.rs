//! Test utilities for knightos CLI tests.
//!
//! Every test gets its own project directory and its own settings directory,
//! so nothing leaks between tests or into the user's real configuration.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated project and settings directories
pub struct TestProject {
    pub temp_dir: TempDir,
    pub project_path: PathBuf,
    pub config_dir: PathBuf,
}

impl TestProject {
    /// Create an empty directory with no `.knightos` yet
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let project_path = temp_dir.path().join("demo");
        let config_dir = temp_dir.path().join("settings");

        fs::create_dir_all(&project_path).expect("Failed to create project directory");
        fs::create_dir_all(&config_dir).expect("Failed to create settings directory");

        // kpack is never available in tests; extraction failures are tolerated
        fs::write(
            config_dir.join("config.toml"),
            "[tools]\nkpack = \"/nonexistent/kpack\"\n",
        )
        .expect("Failed to write settings");

        Self {
            temp_dir,
            project_path,
            config_dir,
        }
    }

    /// Create a project with `.knightos` and the given `package.config`
    pub fn with_config(content: &str) -> Self {
        let project = Self::new();
        fs::create_dir_all(project.project_path.join(".knightos"))
            .expect("Failed to create .knightos");
        fs::write(project.project_path.join("package.config"), content)
            .expect("Failed to write package.config");
        project
    }

    /// `knightos` running inside the project against `registry_url`
    pub fn cmd(&self, registry_url: &str) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_knightos"));
        cmd.current_dir(&self.project_path)
            .env("KNIGHTOS_CONFIG_DIR", &self.config_dir)
            .env("KNIGHTOS_REGISTRY", registry_url)
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn path(&self) -> &Path {
        &self.project_path
    }

    pub fn read_package_config(&self) -> String {
        fs::read_to_string(self.project_path.join("package.config"))
            .expect("Failed to read package.config")
    }

    pub fn read_manifest(&self) -> String {
        fs::read_to_string(self.project_path.join(".knightos").join("packages.make"))
            .expect("Failed to read packages.make")
    }

    pub fn has_archive(&self, filename: &str) -> bool {
        self.project_path
            .join(".knightos")
            .join("packages")
            .join(filename)
            .is_file()
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal kpack archive: header with name, repo and version, then payload
pub fn kpack_archive(name: &str, repo: &str, version: [u8; 3]) -> Vec<u8> {
    let mut bytes = b"KPKG".to_vec();
    bytes.extend_from_slice(&[0, 3]);
    bytes.extend_from_slice(&[0x00, name.len() as u8]);
    bytes.extend_from_slice(name.as_bytes());
    bytes.extend_from_slice(&[0x01, repo.len() as u8]);
    bytes.extend_from_slice(repo.as_bytes());
    bytes.extend_from_slice(&[0x04, 3]);
    bytes.extend_from_slice(&version);
    bytes.extend_from_slice(b"payload");
    bytes
}

/// Registry JSON for one package
pub fn metadata_json(full_name: &str, version: &str, dependencies: &[&str]) -> String {
    let (repo, name) = full_name.split_once('/').expect("repo/name");
    let deps: Vec<String> = dependencies.iter().map(|d| format!("\"{}\"", d)).collect();
    format!(
        r#"{{"name": "{}", "repo": "{}", "full_name": "{}", "version": "{}", "dependencies": [{}]}}"#,
        name,
        repo,
        full_name,
        version,
        deps.join(", ")
    )
}
