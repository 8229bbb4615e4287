pub mod config;
pub mod init;
pub mod install;
pub mod list;
pub mod manifest;

use anyhow::Result;
use knightos::{Error, Project, STATE_DIR_NAME};
use std::env;
use std::path::Path;

/// Open the project at `--root`, or find the one containing the working directory
pub fn open_project(root: Option<&Path>) -> Result<Project> {
    match root {
        Some(root) => {
            let root = root.canonicalize().map_err(|_| Error::NoProject)?;
            if !root.join(STATE_DIR_NAME).is_dir() {
                return Err(Error::NoProject.into());
            }
            Ok(Project::open(root))
        }
        None => Ok(Project::discover(env::current_dir()?)?),
    }
}
